//! Fixed-window feature timeline
//!
//! The signal is cut into consecutive non-overlapping windows; a trailing
//! remainder shorter than the minimum tail is dropped. Each window is
//! analyzed on its own with no state carried between windows.
//!
//! A window whose chroma is degenerate (a silent fade-out, say) is kept in
//! the timeline with its error instead of failing the whole track.

use crate::analysis::features::{FeatureVector, Signal};
use crate::analysis::mood::{MoodTags, MoodThresholds};
use crate::analysis::normalizer::round_to;
use crate::{Error, Result};
use serde::Serialize;
use tracing::{debug, warn};

/// Features and tags of one window
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectionAnalysis {
    #[serde(flatten)]
    pub features: FeatureVector,
    pub tags: MoodTags,
}

/// What analyzing a window produced
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SectionOutcome {
    Analyzed(SectionAnalysis),
    /// The window could not be classified; the message is shown in reports
    Degenerate { error: String },
}

/// One window of a track
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Section {
    /// Seconds, 1 decimal place
    pub start: f64,
    pub end: f64,
    #[serde(flatten)]
    pub outcome: SectionOutcome,
}

impl Section {
    pub fn features(&self) -> Option<&FeatureVector> {
        match &self.outcome {
            SectionOutcome::Analyzed(a) => Some(&a.features),
            SectionOutcome::Degenerate { .. } => None,
        }
    }

    pub fn tags(&self) -> Option<&MoodTags> {
        match &self.outcome {
            SectionOutcome::Analyzed(a) => Some(&a.tags),
            SectionOutcome::Degenerate { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.outcome {
            SectionOutcome::Analyzed(_) => None,
            SectionOutcome::Degenerate { error } => Some(error),
        }
    }
}

/// `(start, end)` offsets of every analyzed window
pub fn window_bounds(total_secs: f64, window_secs: f64, min_tail_secs: f64) -> Vec<(f64, f64)> {
    let mut bounds = Vec::new();
    if window_secs.is_nan() || window_secs <= 0.0 || !total_secs.is_finite() {
        return bounds;
    }

    let mut offset = 0.0;
    while offset < total_secs - min_tail_secs {
        let end = (offset + window_secs).min(total_secs);
        bounds.push((offset, end));
        offset += window_secs;
    }
    bounds
}

/// Analyze every window with `analyze_span`
///
/// [`Error::DegenerateSignal`] is recorded on its section; any other error
/// aborts the timeline.
pub fn build_timeline<F>(
    signal: &Signal<'_>,
    window_secs: f64,
    min_tail_secs: f64,
    thresholds: &MoodThresholds,
    mut analyze_span: F,
) -> Result<Vec<Section>>
where
    F: FnMut(&Signal<'_>) -> Result<FeatureVector>,
{
    let bounds = window_bounds(signal.duration_secs(), window_secs, min_tail_secs);
    let mut sections = Vec::with_capacity(bounds.len());

    for (start, end) in bounds {
        let window = signal.window(start, end);
        let outcome = match analyze_span(&window) {
            Ok(features) => {
                let tags = thresholds.classify(&features);
                debug!(
                    start,
                    end,
                    energy = features.energy,
                    brightness = features.brightness,
                    "Section analyzed"
                );
                SectionOutcome::Analyzed(SectionAnalysis { features, tags })
            }
            Err(Error::DegenerateSignal(reason)) => {
                warn!(start, end, %reason, "Section skipped: degenerate signal");
                SectionOutcome::Degenerate {
                    error: format!("degenerate signal: {}", reason),
                }
            }
            Err(e) => return Err(e),
        };
        sections.push(Section {
            start: round_to(start, 1),
            end: round_to(end, 1),
            outcome,
        });
    }

    Ok(sections)
}
