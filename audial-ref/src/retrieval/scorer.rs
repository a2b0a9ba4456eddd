//! Filter-directed candidate scoring
//!
//! Per candidate:
//! - mood word in a tag: +2, otherwise in the prompt: +1
//! - two-sided range: +2 inside, otherwise minus the distance from the
//!   midpoint (at most 1)
//! - one-sided range: +1 when satisfied
//! - free-text term anywhere: +3
//!
//! Unknown values contribute nothing. Candidates failing a categorical
//! filter, or scoring zero or less, are dropped.

use crate::retrieval::filter::{matches_text, FilterSpec};
use crate::retrieval::range::Range;
use audial_common::TrackRecord;
use serde::Serialize;

const TAG_MATCH: f64 = 2.0;
const PROMPT_MATCH: f64 = 1.0;
const IN_RANGE: f64 = 2.0;
const MAX_RANGE_PENALTY: f64 = 1.0;
const ONE_SIDED_MATCH: f64 = 1.0;
const TEXT_MATCH: f64 = 3.0;

/// A track with its score
#[derive(Debug, Clone, Serialize)]
pub struct ScoredCandidate<'a> {
    pub score: f64,
    #[serde(flatten)]
    pub track: &'a TrackRecord,
}

fn range_score(value: Option<f64>, range: Option<Range>) -> f64 {
    let (Some(v), Some(range)) = (value, range) else {
        return 0.0;
    };
    match (range.has_lo(), range.has_hi()) {
        (true, true) => {
            if range.contains(v) {
                IN_RANGE
            } else {
                -(v - range.midpoint()).abs().min(MAX_RANGE_PENALTY)
            }
        }
        (true, false) if v >= range.lo => ONE_SIDED_MATCH,
        (false, true) if v <= range.hi => ONE_SIDED_MATCH,
        _ => 0.0,
    }
}

/// Score one track, `None` when a categorical filter excludes it
pub fn score_track(track: &TrackRecord, spec: &FilterSpec) -> Option<f64> {
    if !spec.matches_categorical(track) {
        return None;
    }

    let tags: Vec<String> = track.tags.iter().map(|t| t.to_lowercase()).collect();
    let prompt = track
        .audial_prompt
        .as_deref()
        .unwrap_or("")
        .to_lowercase();

    let mut score = 0.0;

    for mood in &spec.mood_tags {
        let m = mood.to_lowercase();
        if tags.iter().any(|t| t.contains(&m)) {
            score += TAG_MATCH;
        } else if prompt.contains(&m) {
            score += PROMPT_MATCH;
        }
    }

    score += range_score(track.energy, spec.energy);
    score += range_score(track.brightness, spec.brightness);
    score += range_score(track.density, spec.density);
    score += range_score(track.effective_bpm(), spec.tempo);

    for term in &spec.text_terms {
        if matches_text(track, term) {
            score += TEXT_MATCH;
        }
    }

    Some(score)
}

/// Positive-scoring tracks, best first, ties in catalog order
pub fn rank<'a, I>(tracks: I, spec: &FilterSpec) -> Vec<ScoredCandidate<'a>>
where
    I: IntoIterator<Item = &'a TrackRecord>,
{
    let mut scored: Vec<ScoredCandidate<'a>> = tracks
        .into_iter()
        .filter_map(|track| {
            let score = score_track(track, spec)?;
            (score > 0.0).then_some(ScoredCandidate { score, track })
        })
        .collect();
    scored.sort_by(|a, b| b.score.total_cmp(&a.score));
    scored
}
