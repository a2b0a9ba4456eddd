//! Feature classification: key detection, normalization, mood tagging and
//! the section timeline

pub mod features;
pub mod key_detector;
pub mod mood;
pub mod normalizer;
pub mod pipeline;
pub mod provider;
pub mod timeline;

pub use features::{FeatureVector, RawSeries, Signal};
pub use key_detector::{detect_key, KeyEstimate, Mode};
pub use mood::{MoodTags, MoodThresholds};
pub use pipeline::{Analyzer, TrackAnalysis};
pub use provider::{CommandProvider, SignalFeatureProvider};
pub use timeline::{Section, SectionAnalysis, SectionOutcome};
