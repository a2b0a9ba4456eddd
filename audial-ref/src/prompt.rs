//! Prompt synthesis and adjustment suggestions
//!
//! Clause order is fixed: mood words, tempo, key, texture, rhythm,
//! character. Each clause contributes at most one fragment and fragments
//! are joined with ", ".

use crate::analysis::features::FeatureVector;
use crate::analysis::mood::{
    BrightnessTag, DensityTag, EnergyTag, ModeTag, MoodTags, RhythmTag, TempoTag, TextureTag,
};
use serde::Serialize;

/// One "what to change" hint derived from a tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Suggestion {
    pub direction: &'static str,
    pub prompt: &'static str,
}

const fn suggestion(direction: &'static str, prompt: &'static str) -> Suggestion {
    Suggestion { direction, prompt }
}

/// Render tags and features into a generation prompt
pub fn synthesize_prompt(features: &FeatureVector, tags: &MoodTags) -> String {
    let mut parts: Vec<String> = Vec::with_capacity(6);

    let mut mood_words: Vec<&str> = Vec::with_capacity(3);
    match tags.brightness {
        BrightnessTag::VeryDark | BrightnessTag::Dark => mood_words.push("dark"),
        BrightnessTag::VeryBright | BrightnessTag::Bright => mood_words.push("bright"),
        BrightnessTag::Neutral => {}
    }
    mood_words.push(tags.mode.label());
    match tags.energy {
        EnergyTag::Still => mood_words.push("still"),
        EnergyTag::Calm => mood_words.push("calm"),
        EnergyTag::Energetic | EnergyTag::Intense => mood_words.push("intense"),
        EnergyTag::Moderate => {}
    }
    if !mood_words.is_empty() {
        parts.push(mood_words.join(", "));
    }

    let bpm = features.tempo.trunc() as i64;
    parts.push(match tags.tempo {
        TempoTag::VerySlow => "very slow tempo".to_string(),
        TempoTag::Slow => format!("slow tempo around {} bpm", bpm),
        TempoTag::Moderate => format!("moderate tempo around {} bpm", bpm),
        TempoTag::Fast => format!("fast tempo around {} bpm", bpm),
        TempoTag::VeryFast => format!("very fast around {} bpm", bpm),
    });

    parts.push(format!("in {}", features.key_label()));

    match tags.density {
        DensityTag::Sparse => parts.push("sparse and minimal".to_string()),
        DensityTag::Dense => parts.push("layered and dense".to_string()),
        DensityTag::Balanced => {}
    }

    parts.push(
        match tags.rhythm {
            RhythmTag::Ambient => "ambient, no clear beat",
            RhythmTag::Gentle => "gentle rhythmic pulse",
            RhythmTag::Rhythmic => "strong rhythmic drive",
        }
        .to_string(),
    );

    match tags.texture {
        Some(TextureTag::Noisy) => parts.push("textural, noise elements".to_string()),
        Some(TextureTag::Tonal) => parts.push("clean tonal sounds".to_string()),
        None => {}
    }

    parts.join(", ")
}

/// Opposing adjustments, at most one per tag family
///
/// Order: brightness, energy, tempo, density, mode.
pub fn suggestions(tags: &MoodTags) -> Vec<Suggestion> {
    let mut out = Vec::with_capacity(5);

    match tags.brightness {
        BrightnessTag::VeryDark | BrightnessTag::Dark => out.push(suggestion(
            "Brighten",
            "make it brighter, raise the frequencies, add shimmer",
        )),
        BrightnessTag::VeryBright | BrightnessTag::Bright => out.push(suggestion(
            "Darken",
            "make it darker, lower frequencies, deeper",
        )),
        BrightnessTag::Neutral => {}
    }

    match tags.energy {
        EnergyTag::Intense | EnergyTag::Energetic => out.push(suggestion(
            "Calm down",
            "softer, less energy, more ambient",
        )),
        EnergyTag::Still | EnergyTag::Calm => out.push(suggestion(
            "Add energy",
            "more movement, add percussion, increase energy",
        )),
        EnergyTag::Moderate => {}
    }

    match tags.tempo {
        TempoTag::VerySlow | TempoTag::Slow => {
            out.push(suggestion("Speed up", "faster tempo, more momentum"))
        }
        TempoTag::Fast | TempoTag::VeryFast => out.push(suggestion(
            "Slow down",
            "slower, more spacious, half tempo",
        )),
        TempoTag::Moderate => {}
    }

    match tags.density {
        DensityTag::Dense => out.push(suggestion(
            "Thin out",
            "strip it down, fewer layers, minimal",
        )),
        DensityTag::Sparse => out.push(suggestion(
            "Fill out",
            "add layers, thicker pads, more texture",
        )),
        DensityTag::Balanced => {}
    }

    out.push(match tags.mode {
        ModeTag::Melancholy => suggestion("Uplift", "major key, brighter mood, more hopeful"),
        ModeTag::Uplifting => suggestion("Darken mood", "minor key, more melancholy, somber"),
    });

    out
}
