//! Signal and feature data types
//!
//! [`Signal`] is what the engine hands to a feature provider, [`RawSeries`]
//! is what comes back, and [`FeatureVector`] is the normalized description
//! of one analyzed span.

use crate::analysis::key_detector::Mode;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Borrowed mono PCM at a fixed sample rate
#[derive(Debug, Clone, Copy)]
pub struct Signal<'a> {
    pub samples: &'a [f32],
    pub sample_rate: u32,
}

impl<'a> Signal<'a> {
    pub fn new(samples: &'a [f32], sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    /// Length in seconds
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.sample_rate as f64
    }

    /// Sub-signal covering `[start_secs, end_secs)`, clamped to the buffer
    pub fn window(&self, start_secs: f64, end_secs: f64) -> Signal<'a> {
        let rate = self.sample_rate as f64;
        let len = self.samples.len();
        let start = ((start_secs.max(0.0) * rate) as usize).min(len);
        let end = ((end_secs.max(0.0) * rate) as usize).clamp(start, len);
        Signal {
            samples: &self.samples[start..end],
            sample_rate: self.sample_rate,
        }
    }
}

/// Frame-level series returned by a feature provider
///
/// `chroma` is 12 rows (C through B) by time frames; every other series is
/// one value per frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawSeries {
    #[serde(default)]
    pub chroma: Vec<Vec<f64>>,
    #[serde(default)]
    pub rms: Vec<f64>,
    #[serde(default)]
    pub centroid: Vec<f64>,
    #[serde(default)]
    pub bandwidth: Vec<f64>,
    #[serde(default)]
    pub flatness: Vec<f64>,
    #[serde(default)]
    pub zcr: Vec<f64>,
    #[serde(default)]
    pub onset_strength: Vec<f64>,
    /// Global tempo estimate in BPM
    pub tempo: f64,
}

impl RawSeries {
    /// Reject output that breaks the provider contract
    pub fn validate(&self) -> Result<()> {
        if self.chroma.len() != 12 {
            return Err(Error::Provider(format!(
                "chroma must have 12 pitch-class rows, got {}",
                self.chroma.len()
            )));
        }
        // 0 is how beat trackers report "no beat found"
        if !self.tempo.is_finite() || self.tempo < 0.0 {
            return Err(Error::Provider(format!(
                "tempo estimate must be a non-negative number, got {}",
                self.tempo
            )));
        }
        Ok(())
    }
}

/// Normalized description of one analyzed span
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    /// Seconds
    pub duration: f64,
    /// BPM
    pub tempo: f64,
    pub key: String,
    pub mode: Mode,
    /// Pearson correlation of the winning key template
    pub key_confidence: f64,
    pub energy: f64,
    pub brightness: f64,
    pub density: f64,
    pub flatness: f64,
    pub percussiveness: f64,
    pub rhythmic_activity: f64,
    pub dynamics: f64,
}

impl FeatureVector {
    /// `"{key} {mode}"`
    pub fn key_label(&self) -> String {
        format!("{} {}", self.key, self.mode)
    }
}
