//! The download-convert-merge pipeline.
//!
//! Stages run strictly in sequence; the first failure aborts the run.
//! Cleanup happens once, after a successful merge, so an abort mid-run
//! leaves whatever was already downloaded in the scratch directory.

use std::fs;
use std::io::BufRead;
use std::path::PathBuf;
use std::sync::OnceLock;

use colored::Colorize;
use regex::Regex;
use thiserror::Error;

use crate::api::{EpisodeSources, ResolveError, SourceResolver};
use crate::common::progress::ProgressBarObserver;
use crate::config::Config;
use crate::download::{FetchError, ResourceFetcher};
use crate::interact::{ask_line, select_one};
use crate::merge::{MergeError, Merger};
use crate::subtitle::{SubtitleDocument, format_srt};

const LINK_PROMPT: &str = "* Input episode link, eg: https://www.bilibili.tv/vi/play/1060488/11434299\n > Your link: ";

const EPISODE_LINK_PATTERN: &str = r"^https://www\.bilibili\.tv/[a-z]{2}/play/[0-9]+/([0-9]+)";

/// Extract the episode id from an episode link.
///
/// Returns `None` for anything that does not match the episode URL shape;
/// callers must reject such links before touching the network.
pub fn parse_episode_link(link: &str) -> Option<u64> {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let pattern = PATTERN
        .get_or_init(|| Regex::new(EPISODE_LINK_PATTERN).expect("episode link pattern is valid"));
    pattern.captures(link)?.get(1)?.as_str().parse().ok()
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Link not supported.")]
    InvalidLink,
    #[error("failed to resolve episode sources: {0}")]
    Resolve(#[from] ResolveError),
    #[error("episode has no selectable {0} sources")]
    NoSources(&'static str),
    #[error("failed to download {resource}: {source}")]
    Fetch {
        resource: &'static str,
        #[source]
        source: FetchError,
    },
    #[error("subtitle payload is malformed: {0}")]
    SubtitleParse(#[from] serde_json::Error),
    #[error("merge failed: {0}")]
    Merge(#[from] MergeError),
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

impl PipelineError {
    fn io(context: impl Into<String>) -> impl FnOnce(std::io::Error) -> Self {
        let context = context.into();
        move |source| Self::Io { context, source }
    }
}

/// Drives the full sequence behind one episode download.
pub struct Pipeline<'a, R, F, M> {
    resolver: &'a R,
    fetcher: &'a F,
    merger: &'a M,
    config: &'a Config,
}

impl<'a, R, F, M> Pipeline<'a, R, F, M>
where
    R: SourceResolver,
    F: ResourceFetcher,
    M: Merger,
{
    pub fn new(resolver: &'a R, fetcher: &'a F, merger: &'a M, config: &'a Config) -> Self {
        Self {
            resolver,
            fetcher,
            merger,
            config,
        }
    }

    /// Run the pipeline to completion, returning the output path.
    ///
    /// Prompts are read from `input`; every prompt blocks until a line is
    /// available and the selection prompts re-ask indefinitely on invalid
    /// answers.
    pub async fn run(&self, input: &mut dyn BufRead) -> Result<PathBuf, PipelineError> {
        let link = ask_line(LINK_PROMPT, input).map_err(PipelineError::io("reading episode link"))?;
        let episode_id = parse_episode_link(&link).ok_or(PipelineError::InvalidLink)?;

        let sources = self.resolver.resolve_sources(episode_id).await?;
        let (video_url, audio_url, subtitle_url) = self.select_variants(&sources, input)?;

        let video_path = self.config.temp_dir.join("video.m4v");
        let audio_path = self.config.temp_dir.join("audio.m4a");
        let subtitle_json_path = self.config.temp_dir.join("subtitle.json");
        let subtitle_srt_path = self.config.temp_dir.join("subtitle.srt");

        self.fetch("video", &video_url, &video_path).await?;
        self.fetch("audio", &audio_url, &audio_path).await?;
        self.fetch("subtitle", &subtitle_url, &subtitle_json_path)
            .await?;

        let payload = fs::read_to_string(&subtitle_json_path)
            .map_err(PipelineError::io("reading downloaded subtitle payload"))?;
        let document: SubtitleDocument = serde_json::from_str(&payload)?;
        fs::write(&subtitle_srt_path, format_srt(&document.body))
            .map_err(PipelineError::io("writing converted subtitle"))?;

        let output_path = self.config.output_dir.join(&self.config.output_name);
        println!("{}", "Merge resources:".cyan());
        let bar = ProgressBarObserver::new();
        self.merger.merge(
            &video_path,
            &audio_path,
            &subtitle_srt_path,
            &output_path,
            &bar,
        )?;
        bar.finish();

        for path in [
            &video_path,
            &audio_path,
            &subtitle_json_path,
            &subtitle_srt_path,
        ] {
            fs::remove_file(path).map_err(PipelineError::io(format!(
                "removing temporary file {}",
                path.display()
            )))?;
        }

        Ok(output_path)
    }

    /// Run the three selection prompts and hand back the chosen URLs.
    fn select_variants(
        &self,
        sources: &EpisodeSources,
        input: &mut dyn BufRead,
    ) -> Result<(String, String, String), PipelineError> {
        if !sources.video.iter().any(|variant| variant.is_downloadable()) {
            return Err(PipelineError::NoSources("video"));
        }
        if sources.audio.is_empty() {
            return Err(PipelineError::NoSources("audio"));
        }
        if sources.subtitles.is_empty() {
            return Err(PipelineError::NoSources("subtitle"));
        }

        let video_labels: Vec<String> = sources.video.iter().map(|v| v.label()).collect();
        let video_index = select_one(
            "* Please select video quality:",
            &video_labels,
            |i| sources.video[i].is_downloadable(),
            input,
        )
        .map_err(PipelineError::io("reading video selection"))?;

        let audio_labels: Vec<String> = sources.audio.iter().map(|a| a.label()).collect();
        let audio_index = select_one(
            "* Please select audio quality:",
            &audio_labels,
            |_| true,
            input,
        )
        .map_err(PipelineError::io("reading audio selection"))?;

        let subtitle_labels: Vec<String> = sources.subtitles.iter().map(|s| s.label()).collect();
        let subtitle_index = select_one(
            "* Please select subtitle:",
            &subtitle_labels,
            |_| true,
            input,
        )
        .map_err(PipelineError::io("reading subtitle selection"))?;

        Ok((
            sources.video[video_index].video_resource.url.clone(),
            sources.audio[audio_index].url.clone(),
            sources.subtitles[subtitle_index].url.clone(),
        ))
    }

    /// Announce and download one resource into the scratch directory.
    async fn fetch(
        &self,
        resource: &'static str,
        url: &str,
        dest: &std::path::Path,
    ) -> Result<(), PipelineError> {
        println!("{}", format!("Start download {resource}:").cyan());
        let bar = ProgressBarObserver::new();
        self.fetcher
            .fetch(url, dest, &bar)
            .await
            .map_err(|source| PipelineError::Fetch { resource, source })?;
        bar.finish();
        Ok(())
    }
}
