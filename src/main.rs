mod api;
mod common;
mod config;
mod download;
mod interact;
mod merge;
mod pipeline;
mod subtitle;

use std::io;
use std::process;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;

use crate::api::BiliClient;
use crate::config::Config;
use crate::download::HttpFetcher;
use crate::merge::FfmpegMerger;
use crate::pipeline::Pipeline;

/// Interactive Bstation episode downloader
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Show ffmpeg output and keep transport detail in errors
    #[arg(short, long, global = true)]
    debug: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let config = Config::from_env(cli.debug);

    if let Err(err) = run(&config).await {
        eprintln!("{} {err:#}", "Error:".red());
        process::exit(1);
    }
}

async fn run(config: &Config) -> Result<()> {
    config
        .ensure_dirs()
        .context("Failed to create the scratch and output directories")?;

    let http = api::build_http_client(config)?;
    let resolver = BiliClient::new(http.clone());
    let fetcher = HttpFetcher::new(http);
    let merger = FfmpegMerger {
        verbose: config.debug,
    };

    let pipeline = Pipeline::new(&resolver, &fetcher, &merger, config);
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let output = pipeline.run(&mut input).await?;

    println!("{} {}", "✓ Saved".green(), output.display());
    Ok(())
}
