//! Command-line arguments
//!
//! Kept in the library so argument handling can be tested without spawning
//! the binary.

use crate::retrieval::{parse_range, FilterSpec, Range, SortKey};
use crate::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Tracks shown by `search --similar` without `--limit`
pub const DEFAULT_SIMILAR_LIMIT: usize = 10;

#[derive(Parser, Debug)]
#[command(name = "audial-ref")]
#[command(about = "Mood analysis and retrieval for reference tracks")]
#[command(version)]
pub struct Cli {
    /// Config file (overrides AUDIAL_CONFIG)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Track catalog JSON (overrides AUDIAL_CATALOG and the config file)
    #[arg(long, global = true, value_name = "FILE")]
    pub catalog: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Analyze an audio file and store it in the catalog
    Analyze(AnalyzeArgs),

    /// Search, compare or get recommendations from the catalog
    Search(SearchArgs),

    /// Manage mood-board projects
    #[command(subcommand)]
    Project(ProjectCommand),
}

#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Audio file (wav, flac, mp3, ogg, ...)
    pub file: PathBuf,

    /// External id; defaults to a content hash of the file
    #[arg(long)]
    pub id: Option<String>,

    /// Track title; defaults to the file name
    #[arg(long)]
    pub title: Option<String>,

    #[arg(long)]
    pub game: Option<String>,

    #[arg(long)]
    pub category: Option<String>,

    /// Print the analysis as JSON
    #[arg(long)]
    pub json: bool,

    /// Do not write the result to the catalog
    #[arg(long)]
    pub no_save: bool,
}

#[derive(Args, Debug, Default)]
pub struct SearchArgs {
    /// Free text matched against title, game, category, tags, prompt and notes
    pub terms: Vec<String>,

    /// Mood word matched against tags, prompt and title
    #[arg(long)]
    pub mood: Option<String>,

    /// Key and/or mode, e.g. "minor" or "D minor"
    #[arg(long)]
    pub key: Option<String>,

    #[arg(long)]
    pub category: Option<String>,

    #[arg(long)]
    pub game: Option<String>,

    /// Tempo range: lo:hi, lo:, :hi or a single value
    #[arg(long, value_name = "RANGE")]
    pub bpm: Option<String>,

    #[arg(long, value_name = "RANGE")]
    pub energy: Option<String>,

    #[arg(long, value_name = "RANGE")]
    pub brightness: Option<String>,

    #[arg(long, value_name = "RANGE")]
    pub density: Option<String>,

    /// Rank tracks by similarity to the first title containing this text
    #[arg(long, value_name = "TITLE", conflicts_with = "recommend")]
    pub similar: Option<String>,

    /// Recommend tracks for a free-form description
    #[arg(long, value_name = "DESCRIPTION")]
    pub recommend: Option<String>,

    #[arg(long, value_enum)]
    pub sort: Option<SortKey>,

    /// Maximum results (at least 1)
    #[arg(long, value_parser = parse_limit)]
    pub limit: Option<usize>,

    /// Print results as JSON
    #[arg(long)]
    pub json: bool,

    /// Omit id, prompt and notes lines
    #[arg(long)]
    pub compact: bool,
}

fn parse_limit(value: &str) -> std::result::Result<usize, String> {
    match value.parse::<usize>() {
        Ok(0) => Err("limit must be at least 1".to_string()),
        Ok(n) => Ok(n),
        Err(e) => Err(e.to_string()),
    }
}

/// Which retrieval a search invocation asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchMode<'a> {
    Similar(&'a str),
    Recommend(&'a str),
    Filter,
}

impl SearchArgs {
    pub fn mode(&self) -> SearchMode<'_> {
        if let Some(title) = &self.similar {
            SearchMode::Similar(title)
        } else if let Some(description) = &self.recommend {
            SearchMode::Recommend(description)
        } else {
            SearchMode::Filter
        }
    }

    /// Explicit-mode filters; any malformed range aborts the query
    pub fn filter_spec(&self) -> Result<FilterSpec> {
        let range = |arg: &Option<String>| -> Result<Option<Range>> {
            arg.as_deref().map(parse_range).transpose()
        };

        let phrase = self.terms.join(" ");
        Ok(FilterSpec {
            text_terms: if phrase.trim().is_empty() {
                Vec::new()
            } else {
                vec![phrase]
            },
            mood_tags: self.mood.iter().cloned().collect(),
            tempo: range(&self.bpm)?,
            energy: range(&self.energy)?,
            brightness: range(&self.brightness)?,
            density: range(&self.density)?,
            category: self.category.clone(),
            game: self.game.clone(),
            key: self.key.clone(),
        })
    }
}

#[derive(Subcommand, Debug)]
pub enum ProjectCommand {
    /// List all projects
    List,

    /// Show a project with its tracks and prompts
    Show { name: String },

    /// Create an empty project
    Create {
        name: String,
        #[arg(long)]
        description: Option<String>,
    },

    /// Add a catalog track to a project
    Add {
        name: String,
        youtube_id: String,
        /// What the track is for ("opening", "climax", ...)
        #[arg(long)]
        role: Option<String>,
    },

    /// Remove a track from a project
    Remove { name: String, youtube_id: String },

    /// Suggest catalog tracks matching the project's target mood
    Suggest {
        name: String,
        #[arg(long)]
        json: bool,
    },
}
