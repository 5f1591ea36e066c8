//! Typed views of the gateway responses.
//!
//! Only the fields the pipeline consumes are modelled; everything else in
//! the payloads is ignored during deserialization.

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub(crate) struct PlayurlResponse {
    pub data: PlayurlData,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PlayurlData {
    pub playurl: Playurl,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Playurl {
    pub video: Vec<VideoVariant>,
    pub audio_resource: Vec<AudioVariant>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SubtitleResponse {
    pub data: SubtitleData,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SubtitleData {
    pub subtitles: Vec<SubtitleVariant>,
}

/// One selectable video rendition.
#[derive(Debug, Clone, Deserialize)]
pub struct VideoVariant {
    pub video_resource: VideoResource,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VideoResource {
    pub width: u32,
    pub height: u32,
    pub codecs: String,
    pub size: u64,
    /// Empty or missing for premium-gated renditions.
    #[serde(default)]
    pub url: String,
}

impl VideoVariant {
    /// Premium-gated renditions ship without a download URL and must never
    /// be selectable.
    pub fn is_downloadable(&self) -> bool {
        !self.video_resource.url.is_empty()
    }

    pub fn label(&self) -> String {
        let resource = &self.video_resource;
        let mut label = format!(
            "{}x{} - {} - {:.2} MB",
            resource.width,
            resource.height,
            resource.codecs,
            mebibytes(resource.size)
        );
        if !self.is_downloadable() {
            label.push_str(" (PREMIUM ONLY)");
        }
        label
    }
}

/// One selectable audio rendition.
#[derive(Debug, Clone, Deserialize)]
pub struct AudioVariant {
    pub quality: String,
    pub codecs: String,
    pub size: u64,
    pub url: String,
}

impl AudioVariant {
    pub fn label(&self) -> String {
        format!(
            "{} - {} - {:.2} MB",
            self.quality,
            self.codecs,
            mebibytes(self.size)
        )
    }
}

/// One selectable subtitle track.
#[derive(Debug, Clone, Deserialize)]
pub struct SubtitleVariant {
    pub lang_key: String,
    pub lang: String,
    pub url: String,
}

impl SubtitleVariant {
    pub fn label(&self) -> String {
        format!("{} - {}", self.lang_key, self.lang)
    }
}

fn mebibytes(size: u64) -> f64 {
    size as f64 / 1024.0 / 1024.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn playurl_payload_deserializes_into_variants() {
        let payload = serde_json::json!({
            "data": {
                "playurl": {
                    "video": [
                        {
                            "video_resource": {
                                "width": 1920,
                                "height": 1080,
                                "codecs": "avc1.640028",
                                "size": 734_003_200u64,
                                "url": ""
                            }
                        },
                        {
                            "video_resource": {
                                "width": 1280,
                                "height": 720,
                                "codecs": "avc1.64001f",
                                "size": 367_001_600u64,
                                "url": "https://upos.example/video.m4v"
                            }
                        }
                    ],
                    "audio_resource": [
                        {
                            "quality": "High",
                            "codecs": "mp4a.40.2",
                            "size": 52_428_800u64,
                            "url": "https://upos.example/audio.m4a"
                        }
                    ]
                }
            }
        });

        let response: PlayurlResponse = serde_json::from_value(payload).unwrap();
        let playurl = response.data.playurl;
        assert_eq!(playurl.video.len(), 2);
        assert!(!playurl.video[0].is_downloadable());
        assert!(playurl.video[1].is_downloadable());
        assert_eq!(playurl.audio_resource[0].label(), "High - mp4a.40.2 - 50.00 MB");
    }

    #[test]
    fn gated_video_label_carries_the_premium_suffix() {
        let variant = VideoVariant {
            video_resource: VideoResource {
                width: 1920,
                height: 1080,
                codecs: "hev1.1.6.L120".to_string(),
                size: 1_048_576,
                url: String::new(),
            },
        };
        assert_eq!(
            variant.label(),
            "1920x1080 - hev1.1.6.L120 - 1.00 MB (PREMIUM ONLY)"
        );
    }

    #[test]
    fn subtitle_payload_deserializes_into_variants() {
        let payload = serde_json::json!({
            "data": {
                "subtitles": [
                    { "lang_key": "vi", "lang": "Tiếng Việt", "url": "https://upos.example/vi.json" },
                    { "lang_key": "en", "lang": "English", "url": "https://upos.example/en.json" }
                ]
            }
        });

        let response: SubtitleResponse = serde_json::from_value(payload).unwrap();
        assert_eq!(response.data.subtitles.len(), 2);
        assert_eq!(response.data.subtitles[1].label(), "en - English");
    }

    #[test]
    fn missing_video_url_defaults_to_gated() {
        let payload = serde_json::json!({
            "video_resource": {
                "width": 1920,
                "height": 1080,
                "codecs": "avc1.640028",
                "size": 0u64
            }
        });
        let variant: VideoVariant = serde_json::from_value(payload).unwrap();
        assert!(!variant.is_downloadable());
    }
}
