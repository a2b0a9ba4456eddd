//! Raw series to bounded feature scores
//!
//! Each score is a linear transform of a series mean, clipped to [0, 1].
//! The transform constants are calibration knobs loaded from
//! `[analysis.calibration]`.
//!
//! Stored values are rounded (scores to 2 places, flatness and
//! percussiveness to 3, tempo and duration to 1) and mood tagging reads the
//! rounded values, so a catalog record re-tags to the same labels.

use crate::analysis::features::{FeatureVector, RawSeries};
use crate::analysis::key_detector::KeyEstimate;
use serde::{Deserialize, Serialize};

/// Calibration constants for score normalization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Calibration {
    /// Mean RMS that maps to energy 1.0
    pub energy_rms_scale: f64,
    /// Centroid (Hz) that maps to brightness 0.0
    pub brightness_offset_hz: f64,
    /// Centroid span (Hz) from offset to brightness 1.0
    pub brightness_span_hz: f64,
    /// Mean bandwidth (Hz) that maps to density 1.0
    pub density_bandwidth_hz: f64,
    /// Mean onset strength that maps to rhythmic activity 1.0
    pub rhythm_onset_scale: f64,
    /// Guards the dynamics denominator
    pub dynamics_epsilon: f64,
}

impl Default for Calibration {
    fn default() -> Self {
        Self {
            energy_rms_scale: 0.15,
            brightness_offset_hz: 500.0,
            brightness_span_hz: 4000.0,
            density_bandwidth_hz: 3000.0,
            rhythm_onset_scale: 15.0,
            dynamics_epsilon: 1e-8,
        }
    }
}

impl Calibration {
    pub fn validate(&self) -> crate::Result<()> {
        let scales = [
            ("energy_rms_scale", self.energy_rms_scale),
            ("brightness_span_hz", self.brightness_span_hz),
            ("density_bandwidth_hz", self.density_bandwidth_hz),
            ("rhythm_onset_scale", self.rhythm_onset_scale),
        ];
        for (name, value) in scales {
            if !(value.is_finite() && value > 0.0) {
                return Err(crate::Error::InvalidInput(format!(
                    "calibration {} must be positive, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }

    pub fn energy(&self, rms: &[f64]) -> f64 {
        clip_unit(mean(rms) / self.energy_rms_scale)
    }

    pub fn brightness(&self, centroid: &[f64]) -> f64 {
        clip_unit((mean(centroid) - self.brightness_offset_hz) / self.brightness_span_hz)
    }

    pub fn density(&self, bandwidth: &[f64]) -> f64 {
        clip_unit(mean(bandwidth) / self.density_bandwidth_hz)
    }

    pub fn rhythmic_activity(&self, onset_strength: &[f64]) -> f64 {
        clip_unit(mean(onset_strength) / self.rhythm_onset_scale)
    }

    /// Coefficient of variation of the RMS envelope
    pub fn dynamics(&self, rms: &[f64]) -> f64 {
        let cv = std_dev(rms) / (mean(rms) + self.dynamics_epsilon);
        non_negative(cv)
    }
}

/// Build the feature vector for one span
pub fn normalize(
    raw: &RawSeries,
    key: &KeyEstimate,
    duration_secs: f64,
    calibration: &Calibration,
) -> FeatureVector {
    FeatureVector {
        duration: round_to(non_negative(duration_secs), 1),
        tempo: round_to(raw.tempo, 1),
        key: key.name().to_string(),
        mode: key.mode,
        key_confidence: round_to(key.confidence, 2),
        energy: round_to(calibration.energy(&raw.rms), 2),
        brightness: round_to(calibration.brightness(&raw.centroid), 2),
        density: round_to(calibration.density(&raw.bandwidth), 2),
        flatness: round_to(clip_unit(mean(&raw.flatness)), 3),
        percussiveness: round_to(non_negative(mean(&raw.zcr)), 3),
        rhythmic_activity: round_to(calibration.rhythmic_activity(&raw.onset_strength), 2),
        dynamics: round_to(calibration.dynamics(&raw.rms), 2),
    }
}

/// Arithmetic mean, 0 for an empty series
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation, 0 for an empty series
pub fn std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    let var = values.iter().map(|v| (v - m) * (v - m)).sum::<f64>() / values.len() as f64;
    var.sqrt()
}

/// Clamp into [0, 1]; NaN becomes 0
pub fn clip_unit(x: f64) -> f64 {
    if x.is_nan() {
        0.0
    } else {
        x.clamp(0.0, 1.0)
    }
}

fn non_negative(x: f64) -> f64 {
    if x.is_nan() {
        0.0
    } else {
        x.max(0.0)
    }
}

/// Round half away from zero to `places` decimals
pub fn round_to(x: f64, places: i32) -> f64 {
    if !x.is_finite() {
        return x;
    }
    let factor = 10f64.powi(places);
    (x * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::key_detector::Mode;

    #[test]
    fn test_scores_stay_in_unit_interval() {
        let cal = Calibration::default();
        let extremes = [
            -1e12,
            -1.0,
            0.0,
            0.05,
            1.0,
            1e6,
            f64::INFINITY,
            f64::NEG_INFINITY,
            f64::NAN,
        ];
        for x in extremes {
            let series = [x, x];
            for score in [
                cal.energy(&series),
                cal.brightness(&series),
                cal.density(&series),
                cal.rhythmic_activity(&series),
            ] {
                assert!((0.0..=1.0).contains(&score), "{} -> {}", x, score);
            }
        }
    }

    #[test]
    fn test_calibration_reference_points() {
        let cal = Calibration::default();
        assert!((cal.energy(&[0.075]) - 0.5).abs() < 1e-12);
        assert_eq!(cal.brightness(&[500.0]), 0.0);
        assert!((cal.brightness(&[2500.0]) - 0.5).abs() < 1e-12);
        assert_eq!(cal.density(&[6000.0]), 1.0);
        assert!((cal.rhythmic_activity(&[3.0]) - 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_empty_series_mean_is_zero() {
        let cal = Calibration::default();
        assert_eq!(cal.energy(&[]), 0.0);
        assert_eq!(cal.brightness(&[]), 0.0);
        assert_eq!(cal.dynamics(&[]), 0.0);
    }

    #[test]
    fn test_dynamics_is_coefficient_of_variation() {
        let cal = Calibration::default();
        assert!(cal.dynamics(&[0.1, 0.1, 0.1]) < 1e-9);
        // mean 0.2, population std 0.1
        assert!((cal.dynamics(&[0.1, 0.3]) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_normalize_rounds_stored_values() {
        let raw = RawSeries {
            chroma: vec![vec![0.0]; 12],
            rms: vec![0.0333],
            centroid: vec![1234.0],
            bandwidth: vec![1000.0],
            flatness: vec![0.01234],
            zcr: vec![0.04567],
            onset_strength: vec![2.0],
            tempo: 87.654,
        };
        let key = KeyEstimate {
            pitch_class: 2,
            mode: Mode::Minor,
            confidence: 0.8765,
        };
        let fv = normalize(&raw, &key, 61.234, &Calibration::default());
        assert_eq!(fv.duration, 61.2);
        assert_eq!(fv.tempo, 87.7);
        assert_eq!(fv.key, "D");
        assert_eq!(fv.key_confidence, 0.88);
        assert_eq!(fv.energy, 0.22);
        assert_eq!(fv.brightness, 0.18);
        assert_eq!(fv.density, 0.33);
        assert_eq!(fv.flatness, 0.012);
        assert_eq!(fv.percussiveness, 0.046);
        assert_eq!(fv.rhythmic_activity, 0.13);
    }

    #[test]
    fn test_invalid_calibration_rejected() {
        let cal = Calibration {
            energy_rms_scale: 0.0,
            ..Default::default()
        };
        assert!(cal.validate().is_err());
        assert!(Calibration::default().validate().is_ok());
    }
}
