//! Key detection from chroma statistics
//!
//! The chroma matrix is averaged over time into a 12-bin profile, which is
//! correlated against every rotation of the Krumhansl-Kessler major and
//! minor templates. The best rotation of each mode competes; major wins only
//! on a strictly higher correlation.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Pitch-class names, index 0 = C
pub const KEY_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Krumhansl-Kessler major profile, index 0 = tonic
pub const MAJOR_PROFILE: [f64; 12] = [
    6.35, 2.23, 3.48, 2.33, 4.38, 4.09, 2.52, 5.19, 2.39, 3.66, 2.29, 2.88,
];

/// Krumhansl-Kessler minor profile, index 0 = tonic
pub const MINOR_PROFILE: [f64; 12] = [
    6.33, 2.68, 3.52, 5.38, 2.60, 3.53, 2.54, 4.75, 3.98, 2.69, 3.34, 3.17,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Major,
    Minor,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Major => "major",
            Mode::Minor => "minor",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Best-fit key for a chroma profile
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyEstimate {
    /// Tonic pitch class, 0 = C
    pub pitch_class: usize,
    pub mode: Mode,
    /// Correlation of the winning template, -1..1
    pub confidence: f64,
}

impl KeyEstimate {
    pub fn name(&self) -> &'static str {
        KEY_NAMES[self.pitch_class % 12]
    }
}

/// Average a 12-row chroma matrix over time
///
/// An empty row averages to zero.
pub fn chroma_profile(chroma: &[Vec<f64>]) -> Result<[f64; 12]> {
    if chroma.len() != 12 {
        return Err(Error::Provider(format!(
            "chroma must have 12 pitch-class rows, got {}",
            chroma.len()
        )));
    }
    let mut profile = [0.0; 12];
    for (bin, row) in profile.iter_mut().zip(chroma) {
        if !row.is_empty() {
            *bin = row.iter().sum::<f64>() / row.len() as f64;
        }
    }
    Ok(profile)
}

/// Detect the key of a chroma matrix
pub fn detect_key(chroma: &[Vec<f64>]) -> Result<KeyEstimate> {
    let profile = chroma_profile(chroma)?;
    detect_key_from_profile(&profile)
}

/// Detect the key of an already averaged chroma profile
///
/// Fails with [`Error::DegenerateSignal`] when any correlation is undefined
/// (constant profile, e.g. silence).
pub fn detect_key_from_profile(profile: &[f64; 12]) -> Result<KeyEstimate> {
    let (major_idx, major_corr) = best_rotation(profile, &MAJOR_PROFILE)?;
    let (minor_idx, minor_corr) = best_rotation(profile, &MINOR_PROFILE)?;

    let estimate = if major_corr > minor_corr {
        KeyEstimate {
            pitch_class: major_idx,
            mode: Mode::Major,
            confidence: major_corr,
        }
    } else {
        KeyEstimate {
            pitch_class: minor_idx,
            mode: Mode::Minor,
            confidence: minor_corr,
        }
    };

    tracing::debug!(
        key = estimate.name(),
        mode = %estimate.mode,
        confidence = estimate.confidence,
        "Key detected"
    );
    Ok(estimate)
}

/// First rotation with the highest correlation against `template`
fn best_rotation(profile: &[f64; 12], template: &[f64; 12]) -> Result<(usize, f64)> {
    let mut best = (0, f64::NEG_INFINITY);
    for shift in 0..12 {
        let rolled: [f64; 12] = std::array::from_fn(|j| profile[(j + shift) % 12]);
        let corr = pearson(&rolled, template);
        if corr.is_nan() {
            return Err(Error::DegenerateSignal(
                "chroma profile has no variation, key correlation undefined".to_string(),
            ));
        }
        if corr > best.1 {
            best = (shift, corr);
        }
    }
    Ok(best)
}

/// Pearson correlation; NaN when either side has zero variance
pub fn pearson(a: &[f64], b: &[f64]) -> f64 {
    let n = a.len().min(b.len());
    if n == 0 {
        return f64::NAN;
    }
    let mean_a = a[..n].iter().sum::<f64>() / n as f64;
    let mean_b = b[..n].iter().sum::<f64>() / n as f64;

    let mut cov = 0.0;
    let mut var_a = 0.0;
    let mut var_b = 0.0;
    for (x, y) in a[..n].iter().zip(&b[..n]) {
        let dx = x - mean_a;
        let dy = y - mean_b;
        cov += dx * dy;
        var_a += dx * dx;
        var_b += dy * dy;
    }

    let denom = (var_a * var_b).sqrt();
    if denom == 0.0 {
        return f64::NAN;
    }
    cov / denom
}
