//! Signal feature providers
//!
//! Frame-level DSP (chroma, RMS, spectral statistics, onset strength, beat
//! tracking) lives behind [`SignalFeatureProvider`]. The engine only consumes
//! the returned [`RawSeries`].

use crate::analysis::features::{RawSeries, Signal};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::process::Command;
use tracing::debug;

/// Computes raw series for a mono signal
pub trait SignalFeatureProvider {
    fn extract(&self, signal: &Signal<'_>) -> Result<RawSeries>;
}

/// `[provider]` configuration section
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Extractor executable; receives a WAV path as its last argument
    pub command: Option<String>,
    /// Arguments placed before the WAV path
    pub args: Vec<String>,
}

/// Runs an external extractor on a temporary WAV file
///
/// The command must print a [`RawSeries`] JSON document on stdout.
#[derive(Debug, Clone)]
pub struct CommandProvider {
    command: String,
    args: Vec<String>,
}

impl CommandProvider {
    pub fn new(command: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            command: command.into(),
            args,
        }
    }

    pub fn from_config(config: &ProviderConfig) -> Result<Self> {
        match config.command.as_deref().map(str::trim) {
            Some(command) if !command.is_empty() => Ok(Self::new(command, config.args.clone())),
            _ => Err(Error::Provider(
                "no feature extractor configured, set [provider] command".to_string(),
            )),
        }
    }

    fn run(&self, wav_path: &Path) -> Result<RawSeries> {
        let output = Command::new(&self.command)
            .args(&self.args)
            .arg(wav_path)
            .output()
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => {
                    Error::Provider(format!("extractor not found: {}", self.command))
                }
                _ => Error::Provider(format!("failed to run {}: {}", self.command, e)),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::Provider(format!(
                "{} exited with {:?}: {}",
                self.command,
                output.status.code(),
                stderr.trim()
            )));
        }

        let raw: RawSeries = serde_json::from_slice(&output.stdout)
            .map_err(|e| Error::Provider(format!("unparsable extractor output: {}", e)))?;
        raw.validate()?;
        Ok(raw)
    }
}

impl SignalFeatureProvider for CommandProvider {
    fn extract(&self, signal: &Signal<'_>) -> Result<RawSeries> {
        let wav = tempfile::Builder::new()
            .prefix("audial_span_")
            .suffix(".wav")
            .tempfile()?;
        write_wav(wav.path(), signal)?;

        debug!(
            command = %self.command,
            wav = %wav.path().display(),
            seconds = signal.duration_secs(),
            "Running feature extractor"
        );
        self.run(wav.path())
    }
}

/// Write a signal as 16-bit mono PCM
pub fn write_wav(path: &Path, signal: &Signal<'_>) -> Result<()> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: signal.sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let to_err = |e: hound::Error| Error::Provider(format!("failed to write WAV: {}", e));

    let mut writer = hound::WavWriter::create(path, spec).map_err(to_err)?;
    for &sample in signal.samples {
        let pcm = (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
        writer.write_sample(pcm).map_err(to_err)?;
    }
    writer.finalize().map_err(to_err)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unconfigured_provider_rejected() {
        let result = CommandProvider::from_config(&ProviderConfig::default());
        assert!(matches!(result, Err(Error::Provider(_))));
    }

    #[test]
    fn test_write_wav_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("span.wav");
        let samples = vec![0.0f32, 0.5, -0.5, 1.5];
        write_wav(&path, &Signal::new(&samples, 22050)).unwrap();

        let mut reader = hound::WavReader::open(&path).unwrap();
        assert_eq!(reader.spec().sample_rate, 22050);
        assert_eq!(reader.spec().channels, 1);
        let pcm: Vec<i16> = reader.samples::<i16>().map(|s| s.unwrap()).collect();
        assert_eq!(pcm.len(), 4);
        assert_eq!(pcm[3], i16::MAX);
    }

    #[cfg(unix)]
    #[test]
    fn test_command_output_parsed() {
        let script = r#"test -s "$0" && echo '{"chroma":[[1],[0],[0],[0],[1],[0],[0],[1],[0],[0],[0],[0]],"rms":[0.05],"tempo":100.0}'"#;
        let provider = CommandProvider::new("sh", vec!["-c".to_string(), script.to_string()]);
        let samples = vec![0.1f32; 2205];
        let raw = provider.extract(&Signal::new(&samples, 22050)).unwrap();
        assert_eq!(raw.tempo, 100.0);
        assert_eq!(raw.rms, vec![0.05]);
    }

    #[cfg(unix)]
    #[test]
    fn test_command_failure_is_provider_error() {
        let provider = CommandProvider::new("sh", vec!["-c".to_string(), "exit 3".to_string()]);
        let samples = vec![0.0f32; 100];
        let result = provider.extract(&Signal::new(&samples, 22050));
        assert!(matches!(result, Err(Error::Provider(msg)) if msg.contains("Some(3)")));
    }

    #[test]
    fn test_missing_binary_is_provider_error() {
        let provider = CommandProvider::new("audial-no-such-extractor", Vec::new());
        let samples = vec![0.0f32; 100];
        let result = provider.extract(&Signal::new(&samples, 22050));
        assert!(matches!(result, Err(Error::Provider(_))));
    }
}
