//! Natural-language description to [`FilterSpec`]
//!
//! The description is lowercased and scanned for mood keywords (substring
//! match, table order). Each hit adds its mood tags and narrows the energy
//! and brightness ranges. The first tempo hint found sets the tempo range.
//! Words that are neither keywords, tempo words nor filler become free-text
//! terms.

use crate::retrieval::filter::FilterSpec;
use crate::retrieval::range::Range;

/// Mood keyword with its implied ranges and tags
#[derive(Debug, Clone, Copy)]
pub struct MoodKeyword {
    pub word: &'static str,
    pub energy: Option<Range>,
    pub brightness: Option<Range>,
    pub tags: &'static [&'static str],
}

const fn kw(
    word: &'static str,
    energy: Option<(f64, f64)>,
    brightness: Option<(f64, f64)>,
    tags: &'static [&'static str],
) -> MoodKeyword {
    MoodKeyword {
        word,
        energy: match energy {
            Some((lo, hi)) => Some(Range::new(lo, hi)),
            None => None,
        },
        brightness: match brightness {
            Some((lo, hi)) => Some(Range::new(lo, hi)),
            None => None,
        },
        tags,
    }
}

pub const MOOD_KEYWORDS: &[MoodKeyword] = &[
    kw("dark", None, Some((0.0, 0.25)), &["dark"]),
    kw("bright", None, Some((0.5, 1.0)), &["bright"]),
    kw("sacred", None, None, &["sacred", "chant", "religious"]),
    kw("epic", Some((0.7, 1.0)), None, &["epic", "intense"]),
    kw("calm", Some((0.0, 0.35)), None, &["calm", "still", "ambient"]),
    kw("melancholy", Some((0.1, 0.5)), Some((0.0, 0.3)), &["melancholy", "sad"]),
    kw("intense", Some((0.8, 1.0)), None, &["intense", "energetic"]),
    kw("haunting", Some((0.1, 0.5)), Some((0.0, 0.2)), &["haunting", "eerie"]),
    kw("triumphant", Some((0.7, 1.0)), Some((0.4, 1.0)), &["triumphant", "uplifting"]),
    kw("warm", None, Some((0.2, 0.5)), &["warm"]),
    kw("ambient", Some((0.0, 0.3)), None, &["ambient", "still"]),
    kw("driving", Some((0.7, 1.0)), None, &["rhythmic", "energetic"]),
    kw("gentle", Some((0.0, 0.3)), None, &["calm", "gentle"]),
    kw("sparse", Some((0.0, 0.3)), None, &["sparse"]),
    kw("dense", Some((0.6, 1.0)), None, &["dense"]),
    kw("ancient", None, None, &["ancient", "medieval", "sacred"]),
    kw("medieval", None, None, &["medieval"]),
    kw("battle", Some((0.8, 1.0)), None, &["intense", "epic", "battle"]),
    kw("slow", None, None, &[]),
    kw("fast", None, None, &[]),
    kw("moderate", None, None, &[]),
];

/// Tempo phrases in priority order; the first one found wins
pub const TEMPO_HINTS: &[(&str, Range)] = &[
    ("very slow", Range::new(40.0, 70.0)),
    ("slow", Range::new(50.0, 90.0)),
    ("moderate", Range::new(80.0, 120.0)),
    ("fast", Range::new(120.0, 170.0)),
    ("driving", Range::new(110.0, 160.0)),
];

pub const FILLER_WORDS: &[&str] = &[
    "for", "a", "an", "the", "and", "or", "of", "in", "with", "like", "music", "track", "tracks",
    "song", "songs", "vibe", "vibes", "feel", "feeling", "something", "need", "want", "find",
    "pick", "recommend", "painting", "art", "project", "scene", "soundtrack", "background",
];

/// Tempo range for a tempo word or phrase ("slow", "very slow", ...)
pub fn tempo_hint(text: &str) -> Option<Range> {
    let lower = text.to_lowercase();
    TEMPO_HINTS
        .iter()
        .find(|(hint, _)| lower.contains(hint))
        .map(|&(_, range)| range)
}

fn narrow(current: Option<Range>, range: Option<Range>) -> Option<Range> {
    match (current, range) {
        (Some(current), Some(range)) => Some(current.intersect(&range)),
        (None, range) => range,
        (current, None) => current,
    }
}

fn is_reserved_word(word: &str) -> bool {
    FILLER_WORDS.contains(&word)
        || MOOD_KEYWORDS.iter().any(|k| k.word == word)
        || TEMPO_HINTS
            .iter()
            .any(|(hint, _)| hint.split_whitespace().any(|w| w == word))
}

/// Parse a free-form description
pub fn parse_description(description: &str) -> FilterSpec {
    let lower = description.to_lowercase();
    let mut spec = FilterSpec::default();

    for keyword in MOOD_KEYWORDS.iter().filter(|k| lower.contains(k.word)) {
        spec.mood_tags
            .extend(keyword.tags.iter().map(|t| t.to_string()));
        spec.energy = narrow(spec.energy, keyword.energy);
        spec.brightness = narrow(spec.brightness, keyword.brightness);
    }

    spec.tempo = tempo_hint(&lower);

    spec.text_terms = lower
        .split_whitespace()
        .filter(|w| !is_reserved_word(w))
        .map(str::to_string)
        .collect();

    tracing::debug!(?spec, "Parsed description");
    spec
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dark_sacred_slow() {
        let spec = parse_description("dark sacred slow");
        assert_eq!(
            spec.mood_tags,
            vec!["dark", "sacred", "chant", "religious"]
        );
        assert_eq!(spec.brightness, Some(Range::new(0.0, 0.25)));
        assert_eq!(spec.energy, None);
        assert_eq!(spec.tempo, Some(Range::new(50.0, 90.0)));
        assert!(spec.text_terms.is_empty());
    }

    #[test]
    fn test_ranges_intersect() {
        let spec = parse_description("melancholy haunting");
        assert_eq!(spec.energy, Some(Range::new(0.1, 0.5)));
        assert_eq!(spec.brightness, Some(Range::new(0.0, 0.2)));
    }

    #[test]
    fn test_contradiction_passes_through_empty() {
        let spec = parse_description("calm battle");
        let energy = spec.energy.unwrap();
        assert_eq!(energy, Range::new(0.8, 0.35));
        assert!(energy.is_empty());
    }

    #[test]
    fn test_first_tempo_hint_wins() {
        assert_eq!(
            parse_description("very slow dirge").tempo,
            Some(Range::new(40.0, 70.0))
        );
        assert_eq!(
            parse_description("fast and driving").tempo,
            Some(Range::new(120.0, 170.0))
        );
        assert_eq!(
            parse_description("driving").tempo,
            Some(Range::new(110.0, 160.0))
        );
        assert_eq!(parse_description("dark").tempo, None);
    }

    #[test]
    fn test_remaining_words_become_terms() {
        let spec = parse_description("Dark sacred slow for Byzantine painting");
        assert_eq!(spec.text_terms, vec!["byzantine"]);
    }

    #[test]
    fn test_keyword_substrings_match_inside_words() {
        // "darker" still hits the "dark" keyword but stays a text term
        let spec = parse_description("darker");
        assert_eq!(spec.mood_tags, vec!["dark"]);
        assert_eq!(spec.text_terms, vec!["darker"]);
    }

    #[test]
    fn test_tempo_hint_word() {
        assert_eq!(tempo_hint("Moderate"), Some(Range::new(80.0, 120.0)));
        assert_eq!(tempo_hint("glacial"), None);
    }
}
