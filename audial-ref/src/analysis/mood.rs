//! Threshold-ladder mood tagging
//!
//! Every dimension is an ordered list of `(below, tag)` rungs plus a top
//! tag: the first rung whose bound exceeds the value wins. Ladders are data,
//! loaded from `[mood.*]`, so bounds can be tuned without code changes.

use crate::analysis::features::FeatureVector;
use crate::analysis::key_detector::Mode;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// One band of a ladder: values strictly below `below` get `tag`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rung<T> {
    pub below: f64,
    pub tag: T,
}

/// Ordered threshold ladder for one dimension
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ladder<T> {
    pub rungs: Vec<Rung<T>>,
    /// Tag for values at or above the last bound
    pub top: T,
}

impl<T: Copy> Ladder<T> {
    pub fn new(rungs: &[(f64, T)], top: T) -> Self {
        Self {
            rungs: rungs
                .iter()
                .map(|&(below, tag)| Rung { below, tag })
                .collect(),
            top,
        }
    }

    /// Tag for `value`; NaN falls through to the top tag
    pub fn classify(&self, value: f64) -> T {
        self.rungs
            .iter()
            .find(|rung| value < rung.below)
            .map(|rung| rung.tag)
            .unwrap_or(self.top)
    }

    /// Bounds must be finite and strictly ascending
    pub fn validate(&self, dimension: &str) -> Result<()> {
        let mut previous = f64::NEG_INFINITY;
        for rung in &self.rungs {
            if !rung.below.is_finite() || rung.below <= previous {
                return Err(Error::InvalidInput(format!(
                    "mood.{} bounds must be finite and strictly ascending",
                    dimension
                )));
            }
            previous = rung.below;
        }
        Ok(())
    }
}

macro_rules! mood_tag {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $label:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $label)]
                $variant,
            )+
        }

        impl $name {
            pub fn label(&self) -> &'static str {
                match self {
                    $($name::$variant => $label,)+
                }
            }
        }
    };
}

mood_tag!(
    /// Energy dimension
    EnergyTag {
        Still => "still",
        Calm => "calm",
        Moderate => "moderate energy",
        Energetic => "energetic",
        Intense => "intense",
    }
);

mood_tag!(
    BrightnessTag {
        VeryDark => "very dark",
        Dark => "dark",
        Neutral => "neutral tone",
        Bright => "bright",
        VeryBright => "very bright",
    }
);

mood_tag!(
    /// Affect implied by the detected mode
    ModeTag {
        Melancholy => "melancholy",
        Uplifting => "uplifting",
    }
);

mood_tag!(
    /// Tempo feel, from BPM
    TempoTag {
        VerySlow => "very slow",
        Slow => "slow",
        Moderate => "moderate pace",
        Fast => "fast",
        VeryFast => "very fast",
    }
);

mood_tag!(
    DensityTag {
        Sparse => "sparse",
        Balanced => "balanced texture",
        Dense => "dense",
    }
);

mood_tag!(
    RhythmTag {
        Ambient => "ambient",
        Gentle => "gentle rhythm",
        Rhythmic => "rhythmic",
    }
);

mood_tag!(
    /// Optional character tag from spectral flatness
    TextureTag {
        Noisy => "noisy/textural",
        Tonal => "tonal/pure",
    }
);

impl From<Mode> for ModeTag {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Minor => ModeTag::Melancholy,
            Mode::Major => ModeTag::Uplifting,
        }
    }
}

/// Flatness bounds for the optional texture tag
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextureThresholds {
    pub noisy_above: f64,
    pub tonal_below: f64,
}

impl Default for TextureThresholds {
    fn default() -> Self {
        Self {
            noisy_above: 0.1,
            tonal_below: 0.01,
        }
    }
}

impl TextureThresholds {
    pub fn classify(&self, flatness: f64) -> Option<TextureTag> {
        if flatness > self.noisy_above {
            Some(TextureTag::Noisy)
        } else if flatness < self.tonal_below {
            Some(TextureTag::Tonal)
        } else {
            None
        }
    }
}

/// Ladder tables for every dimension
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MoodThresholds {
    pub energy: Ladder<EnergyTag>,
    pub brightness: Ladder<BrightnessTag>,
    pub tempo: Ladder<TempoTag>,
    pub density: Ladder<DensityTag>,
    pub rhythm: Ladder<RhythmTag>,
    pub texture: TextureThresholds,
}

impl Default for MoodThresholds {
    fn default() -> Self {
        use BrightnessTag as B;
        use EnergyTag as E;
        use TempoTag as T;

        Self {
            energy: Ladder::new(
                &[
                    (0.15, E::Still),
                    (0.35, E::Calm),
                    (0.6, E::Moderate),
                    (0.8, E::Energetic),
                ],
                E::Intense,
            ),
            brightness: Ladder::new(
                &[
                    (0.2, B::VeryDark),
                    (0.35, B::Dark),
                    (0.55, B::Neutral),
                    (0.75, B::Bright),
                ],
                B::VeryBright,
            ),
            tempo: Ladder::new(
                &[
                    (70.0, T::VerySlow),
                    (100.0, T::Slow),
                    (130.0, T::Moderate),
                    (160.0, T::Fast),
                ],
                T::VeryFast,
            ),
            density: Ladder::new(
                &[(0.3, DensityTag::Sparse), (0.6, DensityTag::Balanced)],
                DensityTag::Dense,
            ),
            rhythm: Ladder::new(
                &[(0.2, RhythmTag::Ambient), (0.5, RhythmTag::Gentle)],
                RhythmTag::Rhythmic,
            ),
            texture: TextureThresholds::default(),
        }
    }
}

impl MoodThresholds {
    pub fn validate(&self) -> Result<()> {
        self.energy.validate("energy")?;
        self.brightness.validate("brightness")?;
        self.tempo.validate("tempo")?;
        self.density.validate("density")?;
        self.rhythm.validate("rhythm")?;
        Ok(())
    }

    /// Tag a feature vector, one tag per dimension
    pub fn classify(&self, features: &FeatureVector) -> MoodTags {
        MoodTags {
            energy: self.energy.classify(features.energy),
            brightness: self.brightness.classify(features.brightness),
            mode: features.mode.into(),
            tempo: self.tempo.classify(features.tempo),
            density: self.density.classify(features.density),
            rhythm: self.rhythm.classify(features.rhythmic_activity),
            texture: self.texture.classify(features.flatness),
        }
    }
}

/// One tag per dimension plus the optional texture tag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoodTags {
    pub energy: EnergyTag,
    pub brightness: BrightnessTag,
    pub mode: ModeTag,
    pub tempo: TempoTag,
    pub density: DensityTag,
    pub rhythm: RhythmTag,
    pub texture: Option<TextureTag>,
}

impl MoodTags {
    /// Labels in dimension order: energy, brightness, mode, tempo, density,
    /// rhythm, texture
    pub fn labels(&self) -> Vec<&'static str> {
        let mut labels = vec![
            self.energy.label(),
            self.brightness.label(),
            self.mode.label(),
            self.tempo.label(),
            self.density.label(),
            self.rhythm.label(),
        ];
        labels.extend(self.texture.map(|t| t.label()));
        labels
    }

    pub fn to_strings(&self) -> Vec<String> {
        self.labels().into_iter().map(String::from).collect()
    }
}

impl Serialize for MoodTags {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_seq(self.labels())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn features(
        energy: f64,
        brightness: f64,
        tempo: f64,
        mode: Mode,
        density: f64,
        rhythmic_activity: f64,
        flatness: f64,
    ) -> FeatureVector {
        FeatureVector {
            duration: 60.0,
            tempo,
            key: "A".to_string(),
            mode,
            key_confidence: 0.8,
            energy,
            brightness,
            density,
            flatness,
            percussiveness: 0.05,
            rhythmic_activity,
            dynamics: 0.3,
        }
    }

    #[test]
    fn test_still_dark_scenario() {
        let fv = features(0.1, 0.15, 55.0, Mode::Minor, 0.2, 0.1, 0.005);
        let tags = MoodThresholds::default().classify(&fv);
        assert_eq!(
            tags.labels(),
            vec![
                "still",
                "very dark",
                "melancholy",
                "very slow",
                "sparse",
                "ambient",
                "tonal/pure"
            ]
        );
    }

    #[test]
    fn test_band_edges_are_half_open() {
        let ladders = MoodThresholds::default();
        assert_eq!(ladders.energy.classify(0.15), EnergyTag::Calm);
        assert_eq!(ladders.energy.classify(0.1499), EnergyTag::Still);
        assert_eq!(ladders.energy.classify(0.8), EnergyTag::Intense);
        assert_eq!(ladders.tempo.classify(160.0), TempoTag::VeryFast);
        assert_eq!(ladders.tempo.classify(99.9), TempoTag::Slow);
        assert_eq!(ladders.density.classify(0.6), DensityTag::Dense);
        assert_eq!(ladders.rhythm.classify(0.2), RhythmTag::Gentle);
    }

    #[test]
    fn test_classifier_is_total() {
        let ladders = MoodThresholds::default();
        let values = [
            f64::NEG_INFINITY,
            -5.0,
            0.0,
            0.3,
            0.55,
            1.0,
            90.0,
            250.0,
            f64::INFINITY,
            f64::NAN,
        ];
        for &v in &values {
            for mode in [Mode::Major, Mode::Minor] {
                let fv = features(v, v, v, mode, v, v, v);
                let labels = ladders.classify(&fv).labels();
                assert!(labels.len() == 6 || labels.len() == 7);
            }
        }
    }

    #[test]
    fn test_texture_band_between_thresholds_is_untagged() {
        let texture = TextureThresholds::default();
        assert_eq!(texture.classify(0.2), Some(TextureTag::Noisy));
        assert_eq!(texture.classify(0.05), None);
        assert_eq!(texture.classify(0.1), None);
        assert_eq!(texture.classify(0.01), None);
        assert_eq!(texture.classify(0.009), Some(TextureTag::Tonal));
    }

    #[test]
    fn test_ladder_from_toml() {
        let text = r#"
            rungs = [
                { below = 0.2, tag = "still" },
                { below = 0.5, tag = "calm" },
            ]
            top = "intense"
        "#;
        let ladder: Ladder<EnergyTag> = toml::from_str(text).unwrap();
        assert_eq!(ladder.classify(0.3), EnergyTag::Calm);
        assert_eq!(ladder.classify(0.9), EnergyTag::Intense);
        assert!(ladder.validate("energy").is_ok());
    }

    #[test]
    fn test_descending_ladder_rejected() {
        let ladder = Ladder::new(
            &[(0.5, EnergyTag::Still), (0.2, EnergyTag::Calm)],
            EnergyTag::Intense,
        );
        assert!(matches!(
            ladder.validate("energy"),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_tags_serialize_as_labels() {
        let fv = features(0.9, 0.8, 170.0, Mode::Major, 0.7, 0.6, 0.2);
        let tags = MoodThresholds::default().classify(&fv);
        let json = serde_json::to_value(tags).unwrap();
        assert_eq!(
            json,
            serde_json::json!([
                "intense",
                "very bright",
                "uplifting",
                "very fast",
                "dense",
                "rhythmic",
                "noisy/textural"
            ])
        );
    }
}
