//! Catalog retrieval: explicit search, similarity ranking, natural-language
//! recommendation and project suggestions
//!
//! Every operation here works on an already-loaded [`Catalog`] snapshot and
//! does no I/O.

pub mod blend;
pub mod describe;
pub mod filter;
pub mod range;
pub mod scorer;
pub mod similarity;

pub use blend::blend_prompt;
pub use describe::parse_description;
pub use filter::{search, FilterSpec, SortKey};
pub use range::{parse_range, Range};
pub use scorer::{rank, ScoredCandidate};
pub use similarity::SimilarityWeights;

use crate::config::RecommendConfig;
use crate::{Error, Result};
use audial_common::project::{Project, TargetMood};
use audial_common::{Catalog, TrackRecord};
use serde::Serialize;
use tracing::{debug, info};

/// Tracks offered by `project suggest`
pub const PROJECT_SUGGESTION_LIMIT: usize = 10;

/// Outcome of a natural-language recommendation
#[derive(Debug, Clone, Serialize)]
pub struct Recommendation<'a> {
    pub query: FilterSpec,
    pub candidates: Vec<ScoredCandidate<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blended_prompt: Option<String>,
}

/// Rank the catalog against a free-form description
///
/// Returns [`Error::EmptyResult`] when no track scores above zero.
pub fn recommend<'a>(
    catalog: &'a Catalog,
    description: &str,
    config: &RecommendConfig,
) -> Result<Recommendation<'a>> {
    let query = parse_description(description);
    let mut candidates = rank(catalog.iter(), &query);
    if candidates.is_empty() {
        return Err(Error::EmptyResult(format!(
            "nothing in the catalog matches '{}'",
            description
        )));
    }
    candidates.truncate(config.top_k);

    let top: Vec<&TrackRecord> = candidates.iter().map(|c| c.track).collect();
    let blended_prompt = blend_prompt(&top, config.max_fragments);

    info!(
        candidates = candidates.len(),
        blended = blended_prompt.is_some(),
        "Recommendation ready"
    );
    Ok(Recommendation {
        query,
        candidates,
        blended_prompt,
    })
}

/// Reference track (first title match) and every other track ranked by
/// similarity to it
///
/// Returns [`Error::NotFound`] when no title contains `title`.
pub fn find_similar<'a>(
    catalog: &'a Catalog,
    title: &str,
    weights: &SimilarityWeights,
    limit: usize,
) -> Result<(&'a TrackRecord, Vec<ScoredCandidate<'a>>)> {
    let reference = catalog
        .find_by_title(title)
        .ok_or_else(|| Error::NotFound(format!("no track title contains '{}'", title)))?;

    let mut ranked = weights.rank_similar(reference, catalog.iter());
    ranked.truncate(limit);
    debug!(reference = %reference.youtube_id, ranked = ranked.len(), "Similarity ranking");
    Ok((reference, ranked))
}

/// Query equivalent of a project's target mood
///
/// Keywords become mood words, energy/brightness use the range grammar and
/// the tempo word goes through the tempo-hint table.
pub fn target_mood_filter(mood: &TargetMood) -> Result<FilterSpec> {
    let energy = mood.energy.as_deref().map(parse_range).transpose()?;
    let brightness = mood.brightness.as_deref().map(parse_range).transpose()?;
    let tempo = mood.tempo.as_deref().and_then(describe::tempo_hint);

    Ok(FilterSpec {
        mood_tags: mood.keywords.clone(),
        energy,
        brightness,
        tempo,
        ..FilterSpec::default()
    })
}

/// Catalog tracks not yet in the project, ranked against its target mood
pub fn suggest_for_project<'a>(
    catalog: &'a Catalog,
    project: &Project,
) -> Result<Vec<ScoredCandidate<'a>>> {
    let spec = target_mood_filter(&project.target_mood)?;
    let mut ranked = rank(
        catalog.iter().filter(|t| !project.contains(&t.youtube_id)),
        &spec,
    );
    ranked.truncate(PROJECT_SUGGESTION_LIMIT);
    Ok(ranked)
}

#[cfg(test)]
mod tests {
    use super::*;
    use audial_common::project::ProjectTrack;

    fn track(id: &str, title: &str, energy: f64, brightness: f64, bpm: f64) -> TrackRecord {
        TrackRecord {
            energy: Some(energy),
            brightness: Some(brightness),
            bpm: Some(bpm),
            ..TrackRecord::new(id, title)
        }
    }

    #[test]
    fn test_target_mood_filter_defaults() {
        let spec = target_mood_filter(&TargetMood::default()).unwrap();
        assert_eq!(spec.energy, Some(Range::new(0.3, 0.7)));
        assert_eq!(spec.brightness, Some(Range::new(0.1, 0.3)));
        assert_eq!(spec.tempo, Some(Range::new(80.0, 120.0)));
        assert!(spec.mood_tags.is_empty());
    }

    #[test]
    fn test_target_mood_with_bad_range_is_rejected() {
        let mood = TargetMood {
            energy: Some("low:high".to_string()),
            ..TargetMood::default()
        };
        assert!(matches!(
            target_mood_filter(&mood),
            Err(Error::MalformedRange(_))
        ));
    }

    #[test]
    fn test_project_suggestions_skip_members() {
        let catalog = Catalog {
            tracks: vec![
                track("a", "Inside", 0.5, 0.2, 100.0),
                track("b", "Outside", 0.5, 0.2, 100.0),
                track("c", "Too Loud", 0.95, 0.9, 170.0),
            ],
            ..Catalog::default()
        };
        let mut project = Project::new("forest");
        project.add_track(ProjectTrack {
            youtube_id: "a".to_string(),
            title: "Inside".to_string(),
            prompt: String::new(),
            role: None,
        });

        let suggested = suggest_for_project(&catalog, &project).unwrap();
        assert_eq!(suggested.len(), 1);
        assert_eq!(suggested[0].track.youtube_id, "b");
        assert_eq!(suggested[0].score, 6.0);
    }

    #[test]
    fn test_similar_unknown_title_is_not_found() {
        let catalog = Catalog::default();
        let result = find_similar(&catalog, "nothing", &SimilarityWeights::default(), 10);
        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[test]
    fn test_recommend_nothing_matching_is_empty_result() {
        let catalog = Catalog {
            tracks: vec![track("a", "Battle Theme", 0.9, 0.8, 160.0)],
            ..Catalog::default()
        };
        let result = recommend(&catalog, "quiet lullaby", &RecommendConfig::default());
        assert!(matches!(result, Err(Error::EmptyResult(_))));
    }
}
