//! Structured catalog filters and explicit search
//!
//! Explicit search is boolean: a track is kept only if it passes every
//! filter that is set. A range filter never matches a track whose value is
//! unknown.

use crate::retrieval::range::Range;
use audial_common::{Catalog, TrackRecord};
use serde::Serialize;

/// Structured query over the catalog
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FilterSpec {
    /// Free-text terms, substring-matched against every searchable field
    pub text_terms: Vec<String>,
    /// Mood words, matched against tags and prompt
    pub mood_tags: Vec<String>,
    /// Effective BPM
    pub tempo: Option<Range>,
    pub energy: Option<Range>,
    pub brightness: Option<Range>,
    pub density: Option<Range>,
    pub category: Option<String>,
    pub game: Option<String>,
    /// Substring of `"{key} {mode}"`
    pub key: Option<String>,
}

impl FilterSpec {
    pub fn is_empty(&self) -> bool {
        *self == FilterSpec::default()
    }

    /// Category, game and key filters
    pub fn matches_categorical(&self, track: &TrackRecord) -> bool {
        if let Some(category) = &self.category {
            if !contains_ci(track.category.as_deref().unwrap_or(""), category) {
                return false;
            }
        }
        if let Some(game) = &self.game {
            if !contains_ci(track.game.as_deref().unwrap_or(""), game) {
                return false;
            }
        }
        if let Some(key) = &self.key {
            if !matches_key(track, key) {
                return false;
            }
        }
        true
    }

    /// Explicit-search predicate: every set filter must pass
    pub fn matches(&self, track: &TrackRecord) -> bool {
        self.text_terms.iter().all(|t| matches_text(track, t))
            && self.mood_tags.iter().all(|m| matches_mood(track, m))
            && in_optional_range(track.effective_bpm(), self.tempo)
            && in_optional_range(track.energy, self.energy)
            && in_optional_range(track.brightness, self.brightness)
            && in_optional_range(track.density, self.density)
            && self.matches_categorical(track)
    }
}

/// Case-insensitive substring test
pub fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Query found in any searchable field
pub fn matches_text(track: &TrackRecord, query: &str) -> bool {
    let q = query.to_lowercase();
    track
        .searchable_fields()
        .iter()
        .any(|field| field.to_lowercase().contains(&q))
}

/// Mood word found in a tag, the prompt or the title
pub fn matches_mood(track: &TrackRecord, mood: &str) -> bool {
    let m = mood.to_lowercase();
    track.tags.iter().any(|t| t.to_lowercase().contains(&m))
        || track
            .audial_prompt
            .as_deref()
            .is_some_and(|p| p.to_lowercase().contains(&m))
        || track.title.to_lowercase().contains(&m)
}

/// Query found in `"{key} {mode}"`, e.g. "minor" or "d minor"
pub fn matches_key(track: &TrackRecord, query: &str) -> bool {
    track
        .key_label()
        .is_some_and(|label| contains_ci(&label, query))
}

fn in_optional_range(value: Option<f64>, range: Option<Range>) -> bool {
    match range {
        None => true,
        Some(range) => value.is_some_and(|v| range.contains(v)),
    }
}

/// Result ordering for explicit search
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum SortKey {
    Energy,
    Brightness,
    Density,
    Bpm,
    Title,
    Game,
    Key,
}

/// Stable sort: numeric keys descending (unknown as 0), text keys ascending
pub fn sort_tracks(tracks: &mut [&TrackRecord], key: SortKey) {
    let numeric = |t: &TrackRecord| -> f64 {
        match key {
            SortKey::Energy => t.energy,
            SortKey::Brightness => t.brightness,
            SortKey::Density => t.density,
            SortKey::Bpm => t.effective_bpm(),
            _ => None,
        }
        .unwrap_or(0.0)
    };
    let text = |t: &TrackRecord| -> String {
        match key {
            SortKey::Title => t.title.to_lowercase(),
            SortKey::Game => t.game.as_deref().unwrap_or("").to_lowercase(),
            SortKey::Key => t.key.as_deref().unwrap_or("").to_lowercase(),
            _ => String::new(),
        }
    };

    match key {
        SortKey::Title | SortKey::Game | SortKey::Key => {
            tracks.sort_by_cached_key(|t| text(*t));
        }
        _ => tracks.sort_by(|a, b| numeric(*b).total_cmp(&numeric(*a))),
    }
}

/// Filter, sort and truncate the catalog; a limit of 0 means no limit
pub fn search<'a>(
    catalog: &'a Catalog,
    spec: &FilterSpec,
    sort: Option<SortKey>,
    limit: Option<usize>,
) -> Vec<&'a TrackRecord> {
    let mut results: Vec<&TrackRecord> = catalog.iter().filter(|t| spec.matches(t)).collect();
    if let Some(key) = sort {
        sort_tracks(&mut results, key);
    }
    if let Some(limit) = limit.filter(|&n| n > 0) {
        results.truncate(limit);
    }
    tracing::debug!(matched = results.len(), "Explicit search");
    results
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(id: &str, title: &str) -> TrackRecord {
        TrackRecord::new(id, title)
    }

    #[test]
    fn test_unknown_value_never_matches_range() {
        let spec = FilterSpec {
            energy: Some(Range::new(0.0, 1.0)),
            ..Default::default()
        };
        let mut t = track("a", "A");
        assert!(!spec.matches(&t));
        t.energy = Some(0.4);
        assert!(spec.matches(&t));
    }

    #[test]
    fn test_tempo_filter_uses_feel() {
        let spec = FilterSpec {
            tempo: Some(Range::new(60.0, 80.0)),
            ..Default::default()
        };
        let mut t = track("a", "A");
        t.bpm = Some(140.0);
        assert!(!spec.matches(&t));
        t.bpm_feel = Some(70.0);
        assert!(spec.matches(&t));
    }

    #[test]
    fn test_text_searches_aliases_and_tags() {
        let mut t = track("a", "Hymn of the Fayth");
        t.aliases = vec!["Fayth".to_string()];
        t.tags = vec!["sacred".to_string()];
        assert!(matches_text(&t, "fayth"));
        assert!(matches_text(&t, "SACRED"));
        assert!(!matches_text(&t, "battle"));
    }

    #[test]
    fn test_mood_checks_prompt_and_title() {
        let mut t = track("a", "Dark World");
        assert!(matches_mood(&t, "dark"));
        assert!(!matches_mood(&t, "calm"));
        t.audial_prompt = Some("calm, slow tempo around 80 bpm".to_string());
        assert!(matches_mood(&t, "calm"));
    }

    #[test]
    fn test_key_substring() {
        let mut t = track("a", "A");
        assert!(!matches_key(&t, "minor"));
        t.key = Some("D".to_string());
        t.mode = Some("minor".to_string());
        assert!(matches_key(&t, "minor"));
        assert!(matches_key(&t, "d min"));
        assert!(!matches_key(&t, "major"));
    }

    #[test]
    fn test_categorical_requires_field() {
        let spec = FilterSpec {
            category: Some("sacred".to_string()),
            ..Default::default()
        };
        let mut t = track("a", "A");
        assert!(!spec.matches(&t));
        t.category = Some("Sacred Chant".to_string());
        assert!(spec.matches(&t));
    }

    #[test]
    fn test_numeric_sort_descending_unknown_last() {
        let mut a = track("a", "A");
        a.energy = Some(0.2);
        let b = track("b", "B");
        let mut c = track("c", "C");
        c.energy = Some(0.9);
        let mut tracks = vec![&a, &b, &c];
        sort_tracks(&mut tracks, SortKey::Energy);
        let ids: Vec<&str> = tracks.iter().map(|t| t.youtube_id.as_str()).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_title_sort_ascending_case_insensitive() {
        let a = track("a", "zanarkand");
        let b = track("b", "Aerith");
        let c = track("c", "battle");
        let mut tracks = vec![&a, &b, &c];
        sort_tracks(&mut tracks, SortKey::Title);
        let titles: Vec<&str> = tracks.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["Aerith", "battle", "zanarkand"]);
    }

    #[test]
    fn test_empty_spec_matches_everything() {
        let spec = FilterSpec::default();
        assert!(spec.is_empty());
        assert!(spec.matches(&track("a", "")));
    }

    #[test]
    fn test_zero_limit_is_unlimited() {
        let catalog = Catalog {
            tracks: vec![track("a", "A"), track("b", "B"), track("c", "C")],
            ..Default::default()
        };
        let spec = FilterSpec::default();
        assert_eq!(search(&catalog, &spec, None, Some(0)).len(), 3);
        assert_eq!(search(&catalog, &spec, None, Some(2)).len(), 2);
        assert_eq!(search(&catalog, &spec, None, None).len(), 3);
    }
}
