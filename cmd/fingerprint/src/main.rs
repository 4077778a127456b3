//! fingerprint - print the acoustic fingerprint of an audio file as JSON.

mod config;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use giztoy_fingerprint::{
    CollisionPolicy, FfmpegNormalizer, Fingerprint, Fingerprinter, PcmNormalizer,
    RawPcmNormalizer, Taper, WindowMode,
};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Print the acoustic fingerprint of an audio file.
///
/// Encoded audio is converted with ffmpeg to 16kHz mono PCM16 first;
/// pass --raw if the file already is PCM16LE mono at the target rate.
#[derive(Parser, Debug)]
#[command(name = "fingerprint")]
#[command(about = "Print the acoustic fingerprint of an audio file as JSON")]
#[command(version)]
struct Args {
    /// Audio file to fingerprint
    input: PathBuf,

    /// Config file (YAML or JSON)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Input is raw PCM16LE mono; skip ffmpeg
    #[arg(long)]
    raw: bool,

    /// Peaks kept per analysis window
    #[arg(short = 'k', long)]
    peaks: Option<usize>,

    /// Following peaks each anchor is paired with
    #[arg(long)]
    fan_out: Option<usize>,

    /// Analysis window size in samples
    #[arg(long, conflicts_with = "whole_clip")]
    window: Option<usize>,

    /// Window hop in samples (default: half the window)
    #[arg(long, conflicts_with = "whole_clip")]
    hop: Option<usize>,

    /// Analyze the whole clip as a single window
    #[arg(long)]
    whole_clip: bool,

    /// Apply a Hann taper to each window
    #[arg(long)]
    hann: bool,

    /// Keep the first anchor timestamp on hash collisions
    #[arg(long)]
    first_wins: bool,

    /// ffmpeg executable
    #[arg(long)]
    ffmpeg: Option<String>,

    /// Conversion timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Longest stretch of audio analyzed, in seconds
    #[arg(long)]
    max_duration: Option<u64>,

    /// Output JSON to file (default: stdout)
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,

    /// Verbose output
    #[arg(short = 'v', long)]
    verbose: bool,
}

#[derive(Serialize)]
struct Report<'a> {
    clip: &'a str,
    count: usize,
    #[serde(flatten)]
    fingerprint: &'a Fingerprint,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let mut file = match &args.config {
        Some(path) => config::load(path)?,
        None => config::ConfigFile::default(),
    };
    apply_overrides(&args, &mut file);

    let fingerprinter = Fingerprinter::new(file.fingerprint.clone())?;
    let normalizer: Box<dyn PcmNormalizer> = if args.raw {
        Box::new(RawPcmNormalizer)
    } else {
        Box::new(FfmpegNormalizer::new(
            file.ffmpeg.clone().unwrap_or_else(|| "ffmpeg".to_string()),
        ))
    };

    let audio = tokio::fs::read(&args.input)
        .await
        .with_context(|| format!("read {}", args.input.display()))?;
    let clip = args.input.display().to_string();

    let fingerprint = fingerprinter
        .fingerprint_audio(normalizer.as_ref(), &audio, &file.normalize, &clip)
        .await?;

    let report = Report {
        clip: &clip,
        count: fingerprint.len(),
        fingerprint: &fingerprint,
    };
    let json = serde_json::to_string_pretty(&report)?;

    match &args.output {
        Some(path) => {
            tokio::fs::write(path, json + "\n")
                .await
                .with_context(|| format!("write {}", path.display()))?;
            info!(
                clip = %clip,
                output = %path.display(),
                hashes = report.count,
                "wrote fingerprint"
            );
        }
        None => println!("{json}"),
    }
    Ok(())
}

/// Layers command line flags over the config file.
fn apply_overrides(args: &Args, file: &mut config::ConfigFile) {
    let cfg = &mut file.fingerprint;
    if let Some(k) = args.peaks {
        cfg.peaks_per_window = k;
    }
    if let Some(f) = args.fan_out {
        cfg.fan_out = f;
    }
    if args.whole_clip {
        cfg.window = WindowMode::WholeClip;
    } else if args.window.is_some() || args.hop.is_some() {
        let (size, hop) = match cfg.window {
            WindowMode::Sliding { size, hop } => (size, hop),
            WindowMode::WholeClip => (1024, 512),
        };
        let size = args.window.unwrap_or(size);
        let hop = args.hop.unwrap_or(if args.window.is_some() { size / 2 } else { hop });
        cfg.window = WindowMode::Sliding { size, hop };
    }
    if args.hann {
        cfg.taper = Taper::Hann;
    }
    if args.first_wins {
        cfg.collision = CollisionPolicy::FirstWins;
    }

    if let Some(path) = &args.ffmpeg {
        file.ffmpeg = Some(path.clone());
    }
    if let Some(secs) = args.timeout {
        file.normalize.timeout_secs = secs;
    }
    if let Some(secs) = args.max_duration {
        file.normalize.max_duration_secs = secs;
    }
}
