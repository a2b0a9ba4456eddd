//! Mood-board project persistence
//!
//! A project is a TOML file `<projects_dir>/<slug>.toml` collecting
//! reference tracks and hand-written prompts for one creative piece,
//! together with the target mood used to suggest more tracks.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

const PROJECT_EXTENSION: &str = "toml";

/// Target mood of a project
///
/// Ranges use the `lo:hi` range grammar of the search command. `tempo` is a
/// tempo word such as "slow" or "moderate".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetMood {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub energy: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brightness: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tempo: Option<String>,

    #[serde(default)]
    pub keywords: Vec<String>,
}

impl Default for TargetMood {
    fn default() -> Self {
        Self {
            energy: Some("0.3:0.7".to_string()),
            brightness: Some("0.1:0.3".to_string()),
            tempo: Some("moderate".to_string()),
            keywords: Vec::new(),
        }
    }
}

/// Track reference inside a project, with a snapshot of its prompt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectTrack {
    pub youtube_id: String,

    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub prompt: String,

    /// What the track is for ("opening", "climax", ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomPrompt {
    pub name: String,
    pub prompt: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub name: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub target_mood: TargetMood,

    #[serde(default)]
    pub tracks: Vec<ProjectTrack>,

    #[serde(default)]
    pub custom_prompts: Vec<CustomPrompt>,
}

impl Project {
    /// New project with a display name derived from the slug
    pub fn new(slug: &str) -> Self {
        Self {
            name: display_name(slug),
            description: String::new(),
            target_mood: TargetMood::default(),
            tracks: Vec::new(),
            custom_prompts: Vec::new(),
        }
    }

    pub fn contains(&self, youtube_id: &str) -> bool {
        self.tracks.iter().any(|t| t.youtube_id == youtube_id)
    }

    /// Append a track; returns false if the id is already present
    pub fn add_track(&mut self, track: ProjectTrack) -> bool {
        if self.contains(&track.youtube_id) {
            return false;
        }
        self.tracks.push(track);
        true
    }

    /// Remove a track; returns false if the id was not present
    pub fn remove_track(&mut self, youtube_id: &str) -> bool {
        let before = self.tracks.len();
        self.tracks.retain(|t| t.youtube_id != youtube_id);
        self.tracks.len() != before
    }
}

/// "dark-forest_ritual" -> "Dark Forest Ritual"
fn display_name(slug: &str) -> String {
    slug.split(|c| c == '-' || c == '_' || c == ' ')
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Directory of project files
#[derive(Debug, Clone)]
pub struct ProjectStore {
    dir: PathBuf,
}

impl ProjectStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File path for a project slug
    pub fn path_for(&self, slug: &str) -> Result<PathBuf> {
        let valid = !slug.is_empty()
            && slug != "."
            && slug != ".."
            && !slug.contains(['/', '\\']);
        if !valid {
            return Err(Error::InvalidInput(format!(
                "Invalid project name: '{}'",
                slug
            )));
        }
        Ok(self.dir.join(format!("{}.{}", slug, PROJECT_EXTENSION)))
    }

    pub fn exists(&self, slug: &str) -> Result<bool> {
        Ok(self.path_for(slug)?.exists())
    }

    /// Slugs of every project in the directory, sorted
    pub fn list(&self) -> Result<Vec<String>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }
        let mut slugs = Vec::new();
        for entry in std::fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(PROJECT_EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                slugs.push(stem.to_string());
            }
        }
        slugs.sort();
        Ok(slugs)
    }

    pub fn load(&self, slug: &str) -> Result<Project> {
        let path = self.path_for(slug)?;
        if !path.exists() {
            return Err(Error::NotFound(format!("Project not found: {}", slug)));
        }
        let text = std::fs::read_to_string(&path)?;
        let project = toml::from_str(&text)?;
        debug!("Loaded project {} from {}", slug, path.display());
        Ok(project)
    }

    pub fn save(&self, slug: &str, project: &Project) -> Result<()> {
        let path = self.path_for(slug)?;
        std::fs::create_dir_all(&self.dir)?;
        let text = toml::to_string_pretty(project)?;

        let mut tmp = tempfile::NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(text.as_bytes())?;
        tmp.flush()?;
        tmp.persist(&path).map_err(|e| Error::Io(e.error))?;
        debug!("Saved project {} to {}", slug, path.display());
        Ok(())
    }

    /// Create and save an empty project, failing if it already exists
    pub fn create(&self, slug: &str) -> Result<Project> {
        if self.exists(slug)? {
            return Err(Error::InvalidInput(format!(
                "Project already exists: {}",
                slug
            )));
        }
        let project = Project::new(slug);
        self.save(slug, &project)?;
        Ok(project)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(id: &str) -> ProjectTrack {
        ProjectTrack {
            youtube_id: id.to_string(),
            title: format!("Track {}", id),
            prompt: String::new(),
            role: None,
        }
    }

    #[test]
    fn test_display_name() {
        assert_eq!(display_name("dark-forest_ritual"), "Dark Forest Ritual");
        assert_eq!(display_name("ICE"), "Ice");
    }

    #[test]
    fn test_add_is_idempotent() {
        let mut project = Project::new("test");
        assert!(project.add_track(track("a")));
        assert!(!project.add_track(track("a")));
        assert_eq!(project.tracks.len(), 1);
    }

    #[test]
    fn test_remove_reports_absence() {
        let mut project = Project::new("test");
        project.add_track(track("a"));
        assert!(!project.remove_track("b"));
        assert!(project.remove_track("a"));
        assert!(project.tracks.is_empty());
    }

    #[test]
    fn test_slug_with_separator_rejected() {
        let store = ProjectStore::new("/tmp/projects");
        assert!(matches!(
            store.path_for("../escape"),
            Err(Error::InvalidInput(_))
        ));
        assert!(store.path_for("forest").is_ok());
    }

    #[test]
    fn test_store_create_load_list() {
        let dir = tempfile::tempdir().unwrap();
        let store = ProjectStore::new(dir.path().join("projects"));

        assert!(store.list().unwrap().is_empty());

        let mut project = store.create("winter-shrine").unwrap();
        assert_eq!(project.name, "Winter Shrine");
        assert!(matches!(
            store.create("winter-shrine"),
            Err(Error::InvalidInput(_))
        ));

        project.add_track(ProjectTrack {
            role: Some("opening".to_string()),
            ..track("abc")
        });
        project.custom_prompts.push(CustomPrompt {
            name: "intro".to_string(),
            prompt: "dark, slow tempo around 60 bpm".to_string(),
        });
        store.save("winter-shrine", &project).unwrap();

        let loaded = store.load("winter-shrine").unwrap();
        assert_eq!(loaded, project);
        assert_eq!(store.list().unwrap(), vec!["winter-shrine".to_string()]);
    }

    #[test]
    fn test_load_missing_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = ProjectStore::new(dir.path());
        assert!(matches!(store.load("nope"), Err(Error::NotFound(_))));
    }
}
