//! Pairwise track similarity
//!
//! Weighted sum of `w * (1 - |a - b|)` over energy, brightness, density and
//! normalized tempo, plus a bonus when both tracks have the same mode.
//! A feature unknown on either side is left out.

use crate::retrieval::scorer::ScoredCandidate;
use audial_common::TrackRecord;
use serde::{Deserialize, Serialize};

/// `[similarity]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimilarityWeights {
    pub energy: f64,
    pub brightness: f64,
    pub density: f64,
    pub tempo: f64,
    pub mode_bonus: f64,
    /// BPM mapped to 0 before comparing tempos
    pub tempo_floor_bpm: f64,
    /// BPM span mapped onto [0, 1]
    pub tempo_span_bpm: f64,
}

impl Default for SimilarityWeights {
    fn default() -> Self {
        Self {
            energy: 2.0,
            brightness: 2.0,
            density: 1.5,
            tempo: 1.0,
            mode_bonus: 1.0,
            tempo_floor_bpm: 40.0,
            tempo_span_bpm: 160.0,
        }
    }
}

impl SimilarityWeights {
    fn normalized_tempo(&self, bpm: f64) -> f64 {
        (bpm - self.tempo_floor_bpm) / self.tempo_span_bpm
    }

    /// Similarity of two tracks; symmetric in `a` and `b`
    pub fn similarity(&self, a: &TrackRecord, b: &TrackRecord) -> f64 {
        let term = |weight: f64, x: Option<f64>, y: Option<f64>| match (x, y) {
            (Some(x), Some(y)) => weight * (1.0 - (x - y).abs()),
            _ => 0.0,
        };

        let mut score = term(self.energy, a.energy, b.energy)
            + term(self.brightness, a.brightness, b.brightness)
            + term(self.density, a.density, b.density)
            + term(
                self.tempo,
                a.effective_bpm().map(|v| self.normalized_tempo(v)),
                b.effective_bpm().map(|v| self.normalized_tempo(v)),
            );

        if let (Some(ma), Some(mb)) = (a.mode.as_deref(), b.mode.as_deref()) {
            if ma.eq_ignore_ascii_case(mb) {
                score += self.mode_bonus;
            }
        }
        score
    }

    /// Every other track ranked by similarity to `reference`, best first
    pub fn rank_similar<'a, I>(&self, reference: &TrackRecord, tracks: I) -> Vec<ScoredCandidate<'a>>
    where
        I: IntoIterator<Item = &'a TrackRecord>,
    {
        let mut scored: Vec<ScoredCandidate<'a>> = tracks
            .into_iter()
            .filter(|t| t.youtube_id != reference.youtube_id)
            .map(|track| ScoredCandidate {
                score: self.similarity(reference, track),
                track,
            })
            .collect();
        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        scored
    }
}
