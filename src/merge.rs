//! Muxing via the system ffmpeg binary.

use std::io::Read;
use std::path::Path;
use std::process::{Command, Stdio};

use thiserror::Error;

use crate::common::progress::ProgressObserver;

#[derive(Debug, Error)]
pub enum MergeError {
    #[error("failed to spawn ffmpeg: {0}")]
    Spawn(#[source] std::io::Error),
    #[error("ffmpeg exited with status {code:?}: {detail}")]
    Failed { code: Option<i32>, detail: String },
    #[error("failed to read ffmpeg output: {0}")]
    Io(#[from] std::io::Error),
}

/// Combines three local streams into one output container.
pub trait Merger: Send + Sync {
    fn merge(
        &self,
        video: &Path,
        audio: &Path,
        subtitle: &Path,
        output: &Path,
        observer: &dyn ProgressObserver,
    ) -> Result<(), MergeError>;
}

/// Merger that shells out to the system ffmpeg.
///
/// Video and audio streams are copied without re-encoding; the subtitle
/// track is rewritten as mov_text so the MP4 container accepts it.
#[derive(Debug, Default, Clone, Copy)]
pub struct FfmpegMerger {
    /// Echo every ffmpeg stderr line instead of only tracking progress.
    pub verbose: bool,
}

impl Merger for FfmpegMerger {
    fn merge(
        &self,
        video: &Path,
        audio: &Path,
        subtitle: &Path,
        output: &Path,
        observer: &dyn ProgressObserver,
    ) -> Result<(), MergeError> {
        // Fractions need a denominator; without a probed duration the
        // observer stays silent and the merge still runs to completion.
        let total_duration = probe_duration_seconds(video);

        let mut child = Command::new("ffmpeg")
            .arg("-i")
            .arg(video)
            .arg("-i")
            .arg(audio)
            .arg("-i")
            .arg(subtitle)
            .args(["-map", "0", "-map", "1", "-map", "2"])
            .args(["-c", "copy", "-c:s", "mov_text"])
            .arg("-y")
            .arg(output)
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(MergeError::Spawn)?;

        let stderr = child.stderr.take().expect("stderr was piped");

        let mut last_line = String::new();
        let mut error_lines: Vec<String> = Vec::new();
        let read_result = track_ffmpeg_stderr(
            stderr,
            self.verbose,
            total_duration,
            observer,
            &mut last_line,
            &mut error_lines,
        );

        let status = child.wait()?;
        read_result?;

        if !status.success() {
            let detail = if error_lines.is_empty() {
                last_line
            } else {
                error_lines.join("\n")
            };
            return Err(MergeError::Failed {
                code: status.code(),
                detail: detail.trim().to_string(),
            });
        }

        Ok(())
    }
}

/// Consume ffmpeg's stderr, forwarding progress fractions to the observer.
///
/// ffmpeg rewrites its status line with carriage returns, so lines are
/// split on both `\r` and `\n`.
fn track_ffmpeg_stderr<R: Read>(
    mut stderr: R,
    verbose: bool,
    total_duration: Option<f64>,
    observer: &dyn ProgressObserver,
    last_line: &mut String,
    error_lines: &mut Vec<String>,
) -> Result<(), MergeError> {
    let mut buffer = [0u8; 4096];
    let mut accumulated = String::new();

    loop {
        let bytes_read = stderr.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }

        accumulated.push_str(&String::from_utf8_lossy(&buffer[..bytes_read]));

        while let Some(pos) = accumulated.find(['\r', '\n']) {
            let line = accumulated[..pos].to_string();
            accumulated = accumulated[pos + 1..].to_string();

            if line.is_empty() {
                continue;
            }

            *last_line = line.clone();

            if verbose {
                eprintln!("{line}");
            }

            if line.contains("error") || line.contains("Error") {
                error_lines.push(line.clone());
            }

            if let (Some(total), Some(position)) = (total_duration, parse_progress_seconds(&line))
            {
                observer.on_progress((position / total).clamp(0.0, 1.0));
            }
        }
    }

    Ok(())
}

/// Pull the `time=HH:MM:SS.ss` position out of an ffmpeg status line.
fn parse_progress_seconds(line: &str) -> Option<f64> {
    let rest = &line[line.find("time=")? + 5..];
    let value = rest.split_whitespace().next()?;

    let mut parts = value.split(':');
    let hours: f64 = parts.next()?.parse().ok()?;
    let minutes: f64 = parts.next()?.parse().ok()?;
    let seconds: f64 = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }

    Some(hours * 3600.0 + minutes * 60.0 + seconds)
}

/// Ask ffprobe for a container duration in seconds. Best-effort.
fn probe_duration_seconds(path: &Path) -> Option<f64> {
    let output = Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-show_entries",
            "format=duration",
            "-of",
            "default=noprint_wrappers=1:nokey=1",
        ])
        .arg(path)
        .output()
        .ok()?;

    if !output.status.success() {
        return None;
    }

    String::from_utf8_lossy(&output.stdout).trim().parse().ok()
}
