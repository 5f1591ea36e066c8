//! Runtime configuration resolved once at startup.

use std::env;
use std::fs;
use std::io;
use std::path::PathBuf;

/// Name of the environment variable carrying the session cookie.
pub const COOKIE_ENV: &str = "COOKIE";

/// Everything the pipeline needs from the process environment, captured
/// once and passed by reference. No component reads ambient state.
#[derive(Debug, Clone)]
pub struct Config {
    /// Session cookie forwarded on every request, when present. Absence is
    /// not an error; requests simply go out unauthenticated.
    pub cookie: Option<String>,
    /// Scratch directory holding in-flight artifacts for one run.
    pub temp_dir: PathBuf,
    /// Directory receiving the merged output.
    pub output_dir: PathBuf,
    /// File name of the merged output.
    pub output_name: String,
    /// Pass ffmpeg output through verbatim.
    pub debug: bool,
}

impl Config {
    pub fn from_env(debug: bool) -> Self {
        Self {
            cookie: env::var(COOKIE_ENV).ok().filter(|value| !value.is_empty()),
            temp_dir: PathBuf::from("temp"),
            output_dir: PathBuf::from("output"),
            output_name: "final.mp4".to_string(),
            debug,
        }
    }

    /// Create the scratch and output directories if they are missing.
    pub fn ensure_dirs(&self) -> io::Result<()> {
        fs::create_dir_all(&self.temp_dir)?;
        fs::create_dir_all(&self.output_dir)
    }
}
