//! Track catalog persistence
//!
//! The catalog is a JSON document `{ "tracks": [ ... ] }` holding one
//! [`TrackRecord`] per external id. Records are kept in file order, which is
//! also the tie-break order for every ranking built on top of the catalog.
//!
//! Numeric fields are optional: an absent value means "unknown" and callers
//! must exclude it from matching rather than read it as zero. Keys this
//! module does not know about are carried through load/save untouched.

use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::io::Write;
use std::path::Path;
use tracing::{debug, info, warn};

/// Read an explicit `null` as the field's default
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// One analyzed reference track
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrackRecord {
    /// External id (YouTube video id) or a synthetic `local-…` id; empty
    /// when a hand-edited record lacks one
    #[serde(default, deserialize_with = "null_as_default")]
    pub youtube_id: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,

    /// Game, film or artist the track comes from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub game: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub aliases: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    /// Seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,

    /// Analyzed tempo in BPM
    #[serde(default, alias = "tempo", skip_serializing_if = "Option::is_none")]
    pub bpm: Option<f64>,

    /// Hand-entered perceived tempo, overrides `bpm` for retrieval
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bpm_feel: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_confidence: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub energy: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brightness: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub density: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rhythmic_activity: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flatness: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percussiveness: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dynamics: Option<f64>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audial_prompt: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analyzed_at: Option<DateTime<Utc>>,

    /// Fields written by other tools
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TrackRecord {
    /// Create an empty record for an id
    pub fn new(youtube_id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            youtube_id: youtube_id.into(),
            title: title.into(),
            ..Default::default()
        }
    }

    /// Tempo used for retrieval: curated feel first, analyzed BPM second
    pub fn effective_bpm(&self) -> Option<f64> {
        self.bpm_feel.or(self.bpm)
    }

    /// `"{key} {mode}"`, or `None` when the key is unknown
    pub fn key_label(&self) -> Option<String> {
        let key = self.key.as_deref()?.trim();
        if key.is_empty() {
            return None;
        }
        match self.mode.as_deref().map(str::trim) {
            Some(mode) if !mode.is_empty() => Some(format!("{} {}", key, mode)),
            _ => Some(key.to_string()),
        }
    }

    /// Every free-text field a text query may hit
    pub fn searchable_fields(&self) -> Vec<&str> {
        let mut fields: Vec<&str> = vec![self.title.as_str(), self.youtube_id.as_str()];
        fields.extend(self.game.as_deref());
        fields.extend(self.category.as_deref());
        fields.extend(self.audial_prompt.as_deref());
        fields.extend(self.notes.as_deref());
        fields.extend(self.aliases.iter().map(String::as_str));
        fields.extend(self.tags.iter().map(String::as_str));
        fields
    }

    /// Apply a fresh analysis of the same track
    ///
    /// Audio-derived fields are replaced. Curated metadata (category,
    /// aliases, notes, `bpm_feel`, foreign keys) is kept; title and game are
    /// only filled in when the stored record lacks them.
    pub fn merge_analysis(&mut self, fresh: TrackRecord) {
        if self.title.trim().is_empty() {
            self.title = fresh.title;
        }
        if self.game.is_none() {
            self.game = fresh.game;
        }

        self.duration = fresh.duration;
        self.bpm = fresh.bpm;
        self.key = fresh.key;
        self.mode = fresh.mode;
        self.key_confidence = fresh.key_confidence;
        self.energy = fresh.energy;
        self.brightness = fresh.brightness;
        self.density = fresh.density;
        self.rhythmic_activity = fresh.rhythmic_activity;
        self.flatness = fresh.flatness;
        self.percussiveness = fresh.percussiveness;
        self.dynamics = fresh.dynamics;
        self.tags = fresh.tags;
        self.audial_prompt = fresh.audial_prompt;
        self.analyzed_at = fresh.analyzed_at;
    }
}

/// Result of [`Catalog::upsert`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted,
    Updated,
}

/// In-memory catalog snapshot
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub tracks: Vec<TrackRecord>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Catalog {
    /// Load the catalog, failing with [`Error::MissingCatalog`] if absent
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::MissingCatalog(path.to_path_buf()));
        }
        let text = std::fs::read_to_string(path)?;
        let catalog = Self::from_json_str(&text)?;
        debug!(path = %path.display(), tracks = catalog.len(), "Catalog loaded");
        Ok(catalog)
    }

    /// Load the catalog, starting empty if the file does not exist yet
    pub fn load_or_default(path: &Path) -> Result<Self> {
        match Self::load(path) {
            Err(Error::MissingCatalog(_)) => {
                info!("No catalog at {}, starting a new one", path.display());
                Ok(Self::default())
            }
            other => other,
        }
    }

    /// Parse and validate catalog JSON
    pub fn from_json_str(text: &str) -> Result<Self> {
        let catalog: Catalog = serde_json::from_str(text)?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Check the one-record-per-id invariant
    ///
    /// Records without an id cannot collide with anything; they stay in the
    /// catalog for searching and are only logged.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for track in &self.tracks {
            if track.youtube_id.trim().is_empty() {
                warn!(title = %track.title, "Catalog record has no youtube_id");
                continue;
            }
            if !seen.insert(track.youtube_id.as_str()) {
                return Err(Error::DuplicateTrack(track.youtube_id.clone()));
            }
        }
        Ok(())
    }

    /// Write the catalog atomically (temp file in the same directory, then rename)
    pub fn save(&self, path: &Path) -> Result<()> {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir)?;

        let mut json = serde_json::to_string_pretty(self)?;
        json.push('\n');

        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        tmp.write_all(json.as_bytes())?;
        tmp.flush()?;
        tmp.persist(path).map_err(|e| Error::Io(e.error))?;

        info!(path = %path.display(), tracks = self.len(), "Catalog saved");
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TrackRecord> {
        self.tracks.iter()
    }

    /// Look up a record by external id
    pub fn get(&self, youtube_id: &str) -> Option<&TrackRecord> {
        self.tracks.iter().find(|t| t.youtube_id == youtube_id)
    }

    pub fn get_mut(&mut self, youtube_id: &str) -> Option<&mut TrackRecord> {
        self.tracks.iter_mut().find(|t| t.youtube_id == youtube_id)
    }

    /// First record whose title contains `query` (case-insensitive)
    pub fn find_by_title(&self, query: &str) -> Option<&TrackRecord> {
        let q = query.to_lowercase();
        self.tracks
            .iter()
            .find(|t| t.title.to_lowercase().contains(&q))
    }

    /// Insert a new record or merge a re-analysis into the existing one
    pub fn upsert(&mut self, record: TrackRecord) -> UpsertOutcome {
        match self
            .tracks
            .iter_mut()
            .find(|t| t.youtube_id == record.youtube_id)
        {
            Some(existing) => {
                existing.merge_analysis(record);
                UpsertOutcome::Updated
            }
            None => {
                self.tracks.push(record);
                UpsertOutcome::Inserted
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effective_bpm_prefers_feel() {
        let mut track = TrackRecord::new("abc", "Theme");
        track.bpm = Some(140.0);
        assert_eq!(track.effective_bpm(), Some(140.0));
        track.bpm_feel = Some(70.0);
        assert_eq!(track.effective_bpm(), Some(70.0));
    }

    #[test]
    fn test_key_label() {
        let mut track = TrackRecord::new("abc", "Theme");
        assert_eq!(track.key_label(), None);
        track.key = Some("D".to_string());
        assert_eq!(track.key_label(), Some("D".to_string()));
        track.mode = Some("minor".to_string());
        assert_eq!(track.key_label(), Some("D minor".to_string()));
    }

    #[test]
    fn test_absent_numbers_stay_unknown() {
        let catalog =
            Catalog::from_json_str(r#"{"tracks":[{"youtube_id":"x","title":"Silence"}]}"#)
                .unwrap();
        let track = &catalog.tracks[0];
        assert!(track.energy.is_none());
        assert!(track.bpm.is_none());
        assert!(track.tags.is_empty());
    }

    #[test]
    fn test_tempo_alias_reads_into_bpm() {
        let catalog =
            Catalog::from_json_str(r#"{"tracks":[{"youtube_id":"x","tempo":96.5}]}"#).unwrap();
        assert_eq!(catalog.tracks[0].bpm, Some(96.5));
    }

    #[test]
    fn test_null_lists_and_title_read_as_empty() {
        let catalog = Catalog::from_json_str(
            r#"{"tracks":[{"youtube_id":"a","title":null,"tags":null,"aliases":null,"energy":0.4}]}"#,
        )
        .unwrap();
        let track = &catalog.tracks[0];
        assert_eq!(track.title, "");
        assert!(track.tags.is_empty());
        assert!(track.aliases.is_empty());
        assert_eq!(track.energy, Some(0.4));
    }

    #[test]
    fn test_records_without_id_do_not_collide() {
        let catalog = Catalog::from_json_str(
            r#"{"tracks":[{"title":"Untitled","energy":0.5},{"youtube_id":null,"title":"Other"}]}"#,
        )
        .unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.tracks[0].youtube_id, "");
        assert_eq!(catalog.tracks[0].energy, Some(0.5));
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let result = Catalog::from_json_str(
            r#"{"tracks":[{"youtube_id":"x"},{"youtube_id":"x"}]}"#,
        );
        assert!(matches!(result, Err(Error::DuplicateTrack(id)) if id == "x"));
    }

    #[test]
    fn test_unknown_fields_survive_round_trip() {
        let text = r#"{"version":"2","tracks":[{"youtube_id":"x","source_url":"https://example.com"}]}"#;
        let catalog = Catalog::from_json_str(text).unwrap();
        let json = serde_json::to_value(&catalog).unwrap();
        assert_eq!(json["version"], "2");
        assert_eq!(json["tracks"][0]["source_url"], "https://example.com");
    }

    #[test]
    fn test_searchable_fields_cover_metadata() {
        let mut track = TrackRecord::new("id1", "To Zanarkand");
        track.game = Some("FFX".to_string());
        track.aliases = vec!["zanarkand".to_string()];
        track.tags = vec!["melancholy".to_string()];
        let fields = track.searchable_fields();
        assert!(fields.contains(&"FFX"));
        assert!(fields.contains(&"zanarkand"));
        assert!(fields.contains(&"melancholy"));
        assert!(fields.contains(&"id1"));
    }
}
