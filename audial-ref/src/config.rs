//! Engine configuration
//!
//! Read from the same TOML file as the bootstrap settings in
//! `audial_common::config`. Every section is optional:
//!
//! ```toml
//! [analysis]
//! sample_rate = 22050
//! window_secs = 15.0
//!
//! [analysis.calibration]
//! energy_rms_scale = 0.15
//!
//! [mood.tempo]
//! rungs = [{ below = 70, tag = "very slow" }, { below = 100, tag = "slow" }]
//! top = "fast"
//!
//! [similarity]
//! energy = 2.0
//!
//! [recommend]
//! top_k = 3
//!
//! [provider]
//! command = "audial-features"
//! ```

use crate::analysis::mood::MoodThresholds;
use crate::analysis::normalizer::Calibration;
use crate::analysis::provider::ProviderConfig;
use crate::retrieval::similarity::SimilarityWeights;
use crate::{Error, Result};
use audial_common::config::ConfigFile;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub analysis: AnalysisConfig,
    pub mood: MoodThresholds,
    pub similarity: SimilarityWeights,
    pub recommend: RecommendConfig,
    pub provider: ProviderConfig,
}

impl EngineConfig {
    /// Parse and validate the engine sections of a config file
    pub fn load(file: &ConfigFile) -> Result<Self> {
        let config: EngineConfig = file.parse()?;
        config.validate()?;
        debug!(?config.analysis, ?config.recommend, "Engine configuration loaded");
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.analysis.validate()?;
        self.mood.validate()?;
        if self.recommend.top_k == 0 {
            return Err(Error::InvalidInput(
                "recommend.top_k must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// `[analysis]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Rate every signal is resampled to before feature extraction
    pub sample_rate: u32,
    /// Timeline window length
    pub window_secs: f64,
    /// Trailing remainders shorter than this are not analyzed
    pub min_tail_secs: f64,
    /// Tracks must be longer than this to get a timeline
    pub timeline_min_duration_secs: f64,
    pub calibration: Calibration,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            sample_rate: 22050,
            window_secs: 15.0,
            min_tail_secs: 5.0,
            timeline_min_duration_secs: 30.0,
            calibration: Calibration::default(),
        }
    }
}

impl AnalysisConfig {
    pub fn validate(&self) -> Result<()> {
        if self.sample_rate == 0 {
            return Err(Error::InvalidInput(
                "analysis.sample_rate must be positive".to_string(),
            ));
        }
        if !(self.window_secs.is_finite() && self.window_secs > 0.0) {
            return Err(Error::InvalidInput(format!(
                "analysis.window_secs must be positive, got {}",
                self.window_secs
            )));
        }
        if !(self.min_tail_secs.is_finite() && self.min_tail_secs >= 0.0) {
            return Err(Error::InvalidInput(format!(
                "analysis.min_tail_secs must be non-negative, got {}",
                self.min_tail_secs
            )));
        }
        self.calibration.validate()
    }
}

/// `[recommend]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecommendConfig {
    /// Candidates shown and blended
    pub top_k: usize,
    /// Descriptive fragments kept in a blended prompt
    pub max_fragments: usize,
}

impl Default for RecommendConfig {
    fn default() -> Self {
        Self {
            top_k: 3,
            max_fragments: 8,
        }
    }
}
