//! Streaming resource downloads with progress reporting.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use futures_util::StreamExt;
use thiserror::Error;

use crate::common::progress::ProgressObserver;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("server returned status {0}")]
    Status(reqwest::StatusCode),
    #[error("failed to write {}: {source}", path.display())]
    Destination {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Streams one remote resource to local storage.
#[async_trait]
pub trait ResourceFetcher: Send + Sync {
    async fn fetch(
        &self,
        url: &str,
        dest: &Path,
        observer: &dyn ProgressObserver,
    ) -> Result<(), FetchError>;
}

/// Fetcher backed by the shared HTTP client.
pub struct HttpFetcher {
    http: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(http: reqwest::Client) -> Self {
        Self { http }
    }
}

#[async_trait]
impl ResourceFetcher for HttpFetcher {
    /// Stream `url` to `dest`, overwriting any existing file.
    ///
    /// When the response declares a content length, the observer receives
    /// the written fraction after every chunk; lengths are cumulative, so
    /// the sequence never decreases. Without a declared length no events
    /// are emitted and the transfer still completes.
    ///
    /// The destination handle is dropped on every exit path. Partial
    /// content is left behind on failure; cleanup belongs to the caller.
    async fn fetch(
        &self,
        url: &str,
        dest: &Path,
        observer: &dyn ProgressObserver,
    ) -> Result<(), FetchError> {
        let response = self.http.get(url).send().await?;
        if !response.status().is_success() {
            return Err(FetchError::Status(response.status()));
        }

        let total = response.content_length().filter(|length| *length > 0);
        let mut file = File::create(dest).map_err(|source| FetchError::Destination {
            path: dest.to_path_buf(),
            source,
        })?;

        let mut written: u64 = 0;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            file.write_all(&chunk)
                .map_err(|source| FetchError::Destination {
                    path: dest.to_path_buf(),
                    source,
                })?;
            written += chunk.len() as u64;
            if let Some(total) = total {
                observer.on_progress(written as f64 / total as f64);
            }
        }

        Ok(())
    }
}
