//! Subtitle payload parsing and SRT generation.

use std::fmt::Write;

use serde::Deserialize;

/// One timed cue as served by the subtitle endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct SubtitleCue {
    /// Start offset in fractional seconds.
    pub from: f64,
    /// End offset in fractional seconds.
    pub to: f64,
    /// Cue text.
    pub content: String,
}

/// Top-level shape of the downloaded subtitle JSON document.
#[derive(Debug, Deserialize)]
pub struct SubtitleDocument {
    pub body: Vec<SubtitleCue>,
}

/// Render cues as SRT blocks in input order.
///
/// Cue `i` (1-based) becomes four lines: the index, the
/// `HH:MM:SS.mmm --> HH:MM:SS.mmm` range, the text, and a blank separator.
/// Cues are never reordered or merged; an empty slice renders to an empty
/// string.
pub fn format_srt(cues: &[SubtitleCue]) -> String {
    let mut out = String::new();
    for (i, cue) in cues.iter().enumerate() {
        writeln!(out, "{}", i + 1).unwrap();
        writeln!(
            out,
            "{} --> {}",
            format_timestamp(cue.from),
            format_timestamp(cue.to)
        )
        .unwrap();
        writeln!(out, "{}", cue.content).unwrap();
        writeln!(out).unwrap();
    }
    out
}

/// Format a fractional-second offset as zero-padded `HH:MM:SS.mmm`.
///
/// The offset is rounded to the nearest millisecond before being split into
/// fields, so any value already at millisecond precision formats exactly.
pub fn format_timestamp(seconds: f64) -> String {
    let total_millis = (seconds * 1000.0).round() as u64;
    let millis = total_millis % 1000;
    let total_secs = total_millis / 1000;
    let secs = total_secs % 60;
    let minutes = (total_secs / 60) % 60;
    let hours = total_secs / 3600;
    format!("{hours:02}:{minutes:02}:{secs:02}.{millis:03}")
}
