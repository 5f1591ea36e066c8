//! Gateway client and episode source resolution.

mod models;

pub use models::{AudioVariant, SubtitleVariant, VideoResource, VideoVariant};

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::{COOKIE, HeaderMap, HeaderValue, REFERER};
use thiserror::Error;

use crate::config::Config;

const GATEWAY_BASE: &str = "https://api.bilibili.tv/intl/gateway/web";
const REFERER_URL: &str = "https://www.bilibili.tv/";

/// Candidate lists for one episode, in the order the gateway returned them.
#[derive(Debug, Clone)]
pub struct EpisodeSources {
    pub video: Vec<VideoVariant>,
    pub audio: Vec<AudioVariant>,
    pub subtitles: Vec<SubtitleVariant>,
}

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("gateway request failed: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("gateway returned status {0}")]
    Status(StatusCode),
    #[error("unexpected gateway response: {0}")]
    UnexpectedResponse(#[source] reqwest::Error),
}

/// Resolves an episode id into its selectable sources.
#[async_trait]
pub trait SourceResolver: Send + Sync {
    async fn resolve_sources(&self, episode_id: u64) -> Result<EpisodeSources, ResolveError>;
}

/// Build the HTTP client shared by the resolver and the fetcher.
///
/// The referer and the forwarded cookie ride along as default headers, so
/// resource downloads carry the credential exactly like the catalog calls.
pub fn build_http_client(config: &Config) -> Result<reqwest::Client> {
    let mut headers = HeaderMap::new();
    headers.insert(REFERER, HeaderValue::from_static(REFERER_URL));
    if let Some(cookie) = &config.cookie {
        let value = HeaderValue::from_str(cookie).context("COOKIE value is not a valid header")?;
        headers.insert(COOKIE, value);
    }

    reqwest::Client::builder()
        .user_agent(concat!(
            env!("CARGO_PKG_NAME"),
            "/",
            env!("CARGO_PKG_VERSION")
        ))
        .default_headers(headers)
        .build()
        .context("Failed to create HTTP client")
}

/// Thin client over the two read-only gateway endpoints.
pub struct BiliClient {
    http: reqwest::Client,
}

impl BiliClient {
    pub fn new(http: reqwest::Client) -> Self {
        Self { http }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T, ResolveError> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(ResolveError::Transport)?;

        if !response.status().is_success() {
            return Err(ResolveError::Status(response.status()));
        }

        response
            .json::<T>()
            .await
            .map_err(ResolveError::UnexpectedResponse)
    }
}

#[async_trait]
impl SourceResolver for BiliClient {
    async fn resolve_sources(&self, episode_id: u64) -> Result<EpisodeSources, ResolveError> {
        let playurl: models::PlayurlResponse = self
            .get_json(&format!(
                "{GATEWAY_BASE}/playurl?s_locale=vi_VN&platform=web&ep_id={episode_id}"
            ))
            .await?;

        let subtitle: models::SubtitleResponse = self
            .get_json(&format!(
                "{GATEWAY_BASE}/v2/subtitle?s_locale=vi_VN&platform=web&episode_id={episode_id}"
            ))
            .await?;

        Ok(EpisodeSources {
            video: playurl.data.playurl.video,
            audio: playurl.data.playurl.audio_resource,
            subtitles: subtitle.data.subtitles,
        })
    }
}
