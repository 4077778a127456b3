//! Conversion of encoded audio into fingerprintable PCM.

use std::io;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::error::ConversionError;
use crate::pcm::PcmFormat;

/// Target format and resource limits for a normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizeParams {
    /// Output sample rate in Hz (default: 16000).
    pub sample_rate: u32,
    /// Longest stretch of audio kept, in seconds (default: 30).
    pub max_duration_secs: u64,
    /// Wall-clock limit for one conversion, in seconds (default: 30).
    pub timeout_secs: u64,
}

impl Default for NormalizeParams {
    fn default() -> Self {
        Self {
            sample_rate: 16000,
            max_duration_secs: 30,
            timeout_secs: 30,
        }
    }
}

impl NormalizeParams {
    pub fn format(&self) -> PcmFormat {
        PcmFormat::mono(self.sample_rate)
    }

    pub fn max_duration(&self) -> Duration {
        Duration::from_secs(self.max_duration_secs)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Turns encoded audio into PCM16 signed little-endian mono at
/// `params.sample_rate`, capped at `params.max_duration()`.
///
/// Failures are terminal for the clip; callers do not retry.
///
/// # Thread Safety
///
/// Implementations must be safe for concurrent use.
#[async_trait]
pub trait PcmNormalizer: Send + Sync {
    async fn normalize(
        &self,
        audio: &[u8],
        params: &NormalizeParams,
    ) -> Result<Vec<u8>, ConversionError>;
}

/// Normalizer for input that is already PCM16LE mono at the target rate.
/// Only the duration cap is applied.
#[derive(Debug, Clone, Copy, Default)]
pub struct RawPcmNormalizer;

#[async_trait]
impl PcmNormalizer for RawPcmNormalizer {
    async fn normalize(
        &self,
        audio: &[u8],
        params: &NormalizeParams,
    ) -> Result<Vec<u8>, ConversionError> {
        let pcm = params.format().truncate(audio, params.max_duration());
        debug!(input = audio.len(), output = pcm.len(), "raw pcm passthrough");
        Ok(pcm.to_vec())
    }
}

/// Normalizer backed by an `ffmpeg` child process.
///
/// Audio is streamed through stdin/stdout; nothing touches the disk. The
/// child is killed if the timeout fires or the future is dropped.
#[derive(Debug, Clone)]
pub struct FfmpegNormalizer {
    program: String,
}

impl Default for FfmpegNormalizer {
    fn default() -> Self {
        Self::new("ffmpeg")
    }
}

impl FfmpegNormalizer {
    /// Creates a normalizer that runs `program` (a path or a name looked up
    /// in `PATH`).
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    fn command(&self, params: &NormalizeParams) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(["-hide_banner", "-loglevel", "error", "-i", "pipe:0"])
            .args(["-ac", "1"])
            .args(["-ar", &params.sample_rate.to_string()])
            .args(["-f", "s16le"])
            .args(["-t", &params.max_duration_secs.to_string()])
            .arg("pipe:1")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }
}

#[async_trait]
impl PcmNormalizer for FfmpegNormalizer {
    async fn normalize(
        &self,
        audio: &[u8],
        params: &NormalizeParams,
    ) -> Result<Vec<u8>, ConversionError> {
        info!(program = %self.program, bytes = audio.len(), "converting audio to pcm");

        let mut child = self
            .command(params)
            .spawn()
            .map_err(|source| ConversionError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| io::Error::other("transcoder stdin not captured"))?;

        let feed = async move {
            let result = stdin.write_all(audio).await;
            drop(stdin);
            match result {
                // The transcoder stops reading once it hits the duration cap.
                Err(e) if e.kind() != io::ErrorKind::BrokenPipe => Err(e),
                _ => Ok(()),
            }
        };

        let after = params.timeout();
        let run = async { tokio::try_join!(feed, child.wait_with_output()) };
        let ((), output) = match tokio::time::timeout(after, run).await {
            Ok(result) => result?,
            Err(_) => {
                warn!(program = %self.program, ?after, "audio conversion timed out");
                return Err(ConversionError::Timeout { after });
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            warn!(
                program = %self.program,
                status = %output.status,
                %stderr,
                "audio conversion failed"
            );
            return Err(ConversionError::Failed {
                status: output.status.to_string(),
                stderr,
            });
        }

        let pcm = params
            .format()
            .truncate(&output.stdout, params.max_duration())
            .to_vec();
        if pcm.is_empty() {
            return Err(ConversionError::Empty);
        }

        info!(bytes = pcm.len(), "converted audio to pcm");
        Ok(pcm)
    }
}
