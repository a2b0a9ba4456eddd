//! Whole-track analysis
//!
//! signal -> provider series -> key + normalized features -> mood tags ->
//! prompt and suggestions, plus a section timeline for longer tracks.

use crate::analysis::features::{FeatureVector, Signal};
use crate::analysis::key_detector::detect_key;
use crate::analysis::mood::MoodTags;
use crate::analysis::normalizer::normalize;
use crate::analysis::provider::SignalFeatureProvider;
use crate::analysis::timeline::{build_timeline, Section};
use crate::config::EngineConfig;
use crate::prompt::{suggestions, synthesize_prompt, Suggestion};
use crate::Result;
use audial_common::TrackRecord;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

/// Result of analyzing one track
#[derive(Debug, Clone, Serialize)]
pub struct TrackAnalysis {
    #[serde(flatten)]
    pub features: FeatureVector,
    #[serde(rename = "mood_tags")]
    pub tags: MoodTags,
    pub suggestions: Vec<Suggestion>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeline: Option<Vec<Section>>,
    pub audial_prompt: String,
}

impl TrackAnalysis {
    /// Catalog record carrying the audio-derived fields
    pub fn to_record(
        &self,
        youtube_id: impl Into<String>,
        title: impl Into<String>,
        analyzed_at: DateTime<Utc>,
    ) -> TrackRecord {
        let f = &self.features;
        TrackRecord {
            duration: Some(f.duration),
            bpm: Some(f.tempo),
            key: Some(f.key.clone()),
            mode: Some(f.mode.to_string()),
            key_confidence: Some(f.key_confidence),
            energy: Some(f.energy),
            brightness: Some(f.brightness),
            density: Some(f.density),
            rhythmic_activity: Some(f.rhythmic_activity),
            flatness: Some(f.flatness),
            percussiveness: Some(f.percussiveness),
            dynamics: Some(f.dynamics),
            tags: self.tags.to_strings(),
            audial_prompt: Some(self.audial_prompt.clone()),
            analyzed_at: Some(analyzed_at),
            ..TrackRecord::new(youtube_id, title)
        }
    }
}

/// Runs the analysis pipeline against a feature provider
pub struct Analyzer<'a, P: SignalFeatureProvider + ?Sized> {
    provider: &'a P,
    config: &'a EngineConfig,
}

impl<'a, P: SignalFeatureProvider + ?Sized> Analyzer<'a, P> {
    pub fn new(provider: &'a P, config: &'a EngineConfig) -> Self {
        Self { provider, config }
    }

    /// Key detection and normalization for one span
    pub fn analyze_span(&self, signal: &Signal<'_>) -> Result<FeatureVector> {
        let raw = self.provider.extract(signal)?;
        raw.validate()?;
        let key = detect_key(&raw.chroma)?;
        Ok(normalize(
            &raw,
            &key,
            signal.duration_secs(),
            &self.config.analysis.calibration,
        ))
    }

    /// Section timeline, regardless of track length
    pub fn timeline(&self, signal: &Signal<'_>) -> Result<Vec<Section>> {
        let analysis = &self.config.analysis;
        build_timeline(
            signal,
            analysis.window_secs,
            analysis.min_tail_secs,
            &self.config.mood,
            |window| self.analyze_span(window),
        )
    }

    /// Full analysis; the timeline is built only for long enough tracks
    pub fn analyze_track(&self, signal: &Signal<'_>) -> Result<TrackAnalysis> {
        let features = self.analyze_span(signal)?;
        let tags = self.config.mood.classify(&features);
        let audial_prompt = synthesize_prompt(&features, &tags);
        let suggestions = suggestions(&tags);

        let timeline = if features.duration > self.config.analysis.timeline_min_duration_secs {
            Some(self.timeline(signal)?)
        } else {
            None
        };

        info!(
            duration = features.duration,
            key = %features.key_label(),
            sections = timeline.as_ref().map_or(0, Vec::len),
            "Track analyzed"
        );

        Ok(TrackAnalysis {
            features,
            tags,
            suggestions,
            timeline,
            audial_prompt,
        })
    }
}
