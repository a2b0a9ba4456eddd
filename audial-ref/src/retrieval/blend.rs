//! Blended prompt for a set of recommended tracks

use audial_common::TrackRecord;
use std::collections::HashMap;

/// Fragments this short carry no mood information
const MIN_FRAGMENT_CHARS: usize = 4;

/// Descriptive fragment: not a key clause and not a tempo clause
fn is_descriptive(fragment: &str) -> bool {
    fragment.chars().count() >= MIN_FRAGMENT_CHARS
        && !fragment.starts_with("in ")
        && !fragment.contains("bpm")
}

/// Unique descriptive fragments, shortest first, first-seen order on ties
pub fn collect_fragments<'a, I>(prompts: I, max_fragments: usize) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut fragments: Vec<String> = Vec::new();
    for prompt in prompts {
        for fragment in prompt.split(',').map(str::trim) {
            if is_descriptive(fragment) && !fragments.iter().any(|f| f == fragment) {
                fragments.push(fragment.to_string());
            }
        }
    }
    fragments.sort_by_key(|f| f.chars().count());
    fragments.truncate(max_fragments);
    fragments
}

/// Most frequent `"{key} {mode}"`, first-seen on ties
fn dominant_key(tracks: &[&TrackRecord]) -> Option<String> {
    let labels: Vec<String> = tracks.iter().filter_map(|t| t.key_label()).collect();
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for label in &labels {
        *counts.entry(label.as_str()).or_default() += 1;
    }

    let mut best: Option<(&str, usize)> = None;
    for label in &labels {
        let count = counts.get(label.as_str()).copied().unwrap_or(0);
        if best.map_or(true, |(_, c)| count > c) {
            best = Some((label.as_str(), count));
        }
    }
    best.map(|(label, _)| label.to_string())
}

/// Blend the prompts of the top candidates into one
///
/// Needs at least two tracks. Mean effective tempo and the most frequent
/// key are appended after the descriptive fragments.
pub fn blend_prompt(tracks: &[&TrackRecord], max_fragments: usize) -> Option<String> {
    if tracks.len() < 2 {
        return None;
    }

    let mut parts = collect_fragments(
        tracks.iter().filter_map(|t| t.audial_prompt.as_deref()),
        max_fragments,
    );

    let tempos: Vec<f64> = tracks.iter().filter_map(|t| t.effective_bpm()).collect();
    if !tempos.is_empty() {
        let mean = tempos.iter().sum::<f64>() / tempos.len() as f64;
        parts.push(format!("around {} bpm", mean.round() as i64));
    }

    if let Some(key) = dominant_key(tracks) {
        parts.push(format!("in {}", key));
    }

    if parts.is_empty() {
        return None;
    }
    Some(parts.join(", "))
}
