//! Plain-text reports printed by the CLI
//!
//! Every function returns the finished text; printing is left to `main`.

use crate::analysis::pipeline::TrackAnalysis;
use crate::retrieval::{FilterSpec, Recommendation, ScoredCandidate};
use audial_common::project::Project;
use audial_common::{Catalog, TrackRecord};
use std::fmt::Display;

const RULE_WIDTH: usize = 58;
const PROMPT_PREVIEW_CHARS: usize = 100;

#[derive(Default)]
struct Report {
    text: String,
}

impl Report {
    fn line(&mut self, line: impl Display) {
        self.text.push_str(&line.to_string());
        self.text.push('\n');
    }

    fn blank(&mut self) {
        self.text.push('\n');
    }

    fn rule(&mut self, c: char) {
        self.line(format!("  {}", c.to_string().repeat(RULE_WIDTH)));
    }

    fn finish(self) -> String {
        self.text
    }
}

/// `#` cells for the value, `-` for the rest; blank when unknown
pub fn bar(value: Option<f64>, width: usize) -> String {
    match value {
        Some(v) => {
            let filled = ((v.clamp(0.0, 1.0) * width as f64) as usize).min(width);
            format!("{}{}", "#".repeat(filled), "-".repeat(width - filled))
        }
        None => " ".repeat(width),
    }
}

fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        format!("{}...", text.chars().take(max).collect::<String>())
    }
}

fn bpm_label(track: &TrackRecord) -> String {
    track
        .effective_bpm()
        .map(|b| format!("{}", b))
        .unwrap_or_else(|| "?".to_string())
}

fn heading(track: &TrackRecord) -> String {
    match track.game.as_deref() {
        Some(game) if !game.is_empty() => format!("{} ({})", track.title, game),
        _ => track.title.clone(),
    }
}

/// Full report for one analyzed file
pub fn analysis_report(file_name: &str, title: Option<&str>, analysis: &TrackAnalysis) -> String {
    let f = &analysis.features;
    let mut r = Report::default();

    r.blank();
    r.line("=".repeat(60));
    r.line("  REFERENCE TRACK ANALYSIS");
    r.line("=".repeat(60));
    if let Some(title) = title {
        r.line(format!("  Track:     {}", title));
    }
    r.line(format!("  File:      {}", file_name));
    r.line(format!("  Duration:  {}s", f.duration));
    r.line(format!("  Tempo:     {} BPM", f.tempo));
    r.line(format!(
        "  Key:       {} (confidence: {})",
        f.key_label(),
        f.key_confidence
    ));
    r.blank();

    for (label, value) in [
        ("Energy", f.energy),
        ("Brightness", f.brightness),
        ("Density", f.density),
        ("Rhythm", f.rhythmic_activity),
    ] {
        r.line(format!("  {:<12} [{}] {:.2}", label, bar(Some(value), 20), value));
    }

    r.blank();
    r.line(format!("  Mood tags:  {}", analysis.tags.labels().join(", ")));

    if !analysis.suggestions.is_empty() {
        r.blank();
        r.line("  To adjust:");
        for s in &analysis.suggestions {
            r.line(format!("    {:<14} -> \"{}\"", s.direction, s.prompt));
        }
    }

    if let Some(sections) = analysis.timeline.as_ref().filter(|s| s.len() > 1) {
        r.blank();
        r.line("  Track evolution:");
        for s in sections {
            match s.features() {
                Some(f) => {
                    let energy = "#".repeat((f.energy * 10.0) as usize);
                    let brightness = "#".repeat((f.brightness * 10.0) as usize);
                    r.line(format!(
                        "    {:5.0}s-{:5.0}s  E[{:<10}] B[{:<10}] {}",
                        s.start,
                        s.end,
                        energy,
                        brightness,
                        f.key_label()
                    ));
                }
                None => r.line(format!(
                    "    {:5.0}s-{:5.0}s  ({})",
                    s.start,
                    s.end,
                    s.error().unwrap_or("not analyzed")
                )),
            }
        }
    }

    r.blank();
    r.rule('=');
    r.line("  PROMPT:");
    r.rule('=');
    r.blank();
    r.line(format!("  {}", analysis.audial_prompt));
    r.blank();
    r.line("=".repeat(60));
    r.finish()
}

fn push_track(r: &mut Report, track: &TrackRecord, verbose: bool) {
    r.line(format!("  {}", heading(track)));
    r.line(format!(
        "    Key: {} | BPM: {} | E:{} B:{} D:{}",
        track.key_label().unwrap_or_else(|| "?".to_string()),
        bpm_label(track),
        bar(track.energy, 10),
        bar(track.brightness, 10),
        bar(track.density, 10)
    ));
    if verbose {
        r.line(format!("    ID: {}", track.youtube_id));
        if let Some(prompt) = track.audial_prompt.as_deref().filter(|p| !p.is_empty()) {
            r.line(format!("    Prompt: {}", prompt));
        }
        if let Some(notes) = track.notes.as_deref().filter(|n| !n.is_empty()) {
            r.line(format!("    Notes: {}", notes));
        }
    }
    r.blank();
}

/// Two-line summary of a track, plus id/prompt/notes when `verbose`
pub fn track_entry(track: &TrackRecord, verbose: bool) -> String {
    let mut r = Report::default();
    push_track(&mut r, track, verbose);
    r.finish()
}

/// Human summary of the filters in an explicit search
pub fn describe_filters(spec: &FilterSpec) -> String {
    let mut parts = Vec::new();
    if !spec.text_terms.is_empty() {
        parts.push(format!("\"{}\"", spec.text_terms.join(" ")));
    }
    for mood in &spec.mood_tags {
        parts.push(format!("mood={}", mood));
    }
    if let Some(key) = &spec.key {
        parts.push(format!("key={}", key));
    }
    for (name, range) in [
        ("bpm", spec.tempo),
        ("energy", spec.energy),
        ("brightness", spec.brightness),
        ("density", spec.density),
    ] {
        if let Some(range) = range {
            parts.push(format!("{}={}", name, range));
        }
    }
    if let Some(category) = &spec.category {
        parts.push(format!("category={}", category));
    }
    if let Some(game) = &spec.game {
        parts.push(format!("game={}", game));
    }

    if parts.is_empty() {
        "all tracks".to_string()
    } else {
        parts.join(", ")
    }
}

pub fn search_report(spec: &FilterSpec, tracks: &[&TrackRecord], verbose: bool) -> String {
    let mut r = Report::default();
    r.blank();
    r.line(format!("  Search: {}", describe_filters(spec)));
    r.line(format!("  Found: {} tracks", tracks.len()));
    r.rule('=');
    r.blank();
    for track in tracks {
        push_track(&mut r, track, verbose);
    }
    r.finish()
}

pub fn similar_report(
    reference: &TrackRecord,
    ranked: &[ScoredCandidate<'_>],
    verbose: bool,
) -> String {
    let mut r = Report::default();
    r.blank();
    r.line(format!("  Tracks similar to: {}", reference.title));
    r.rule('=');
    r.blank();
    for candidate in ranked {
        push_track(&mut r, candidate.track, verbose);
    }
    r.finish()
}

pub fn recommendation_report(description: &str, rec: &Recommendation<'_>) -> String {
    let mut r = Report::default();
    r.blank();
    r.rule('=');
    r.line(format!("  TOP {} RECOMMENDATIONS", rec.candidates.len()));
    r.line(format!("  Query: \"{}\"", description));
    r.rule('=');
    r.blank();

    for (i, candidate) in rec.candidates.iter().enumerate() {
        let track = candidate.track;
        r.line(format!(
            "  #{}: {}  [score: {:.1}]",
            i + 1,
            heading(track),
            candidate.score
        ));
        r.line(format!(
            "    Key: {} | BPM: {} | E:{} B:{} D:{}",
            track.key_label().unwrap_or_else(|| "?".to_string()),
            bpm_label(track),
            bar(track.energy, 10),
            bar(track.brightness, 10),
            bar(track.density, 10)
        ));
        if let Some(prompt) = track.audial_prompt.as_deref().filter(|p| !p.is_empty()) {
            r.line(format!("    Prompt: {}", prompt));
        }
        r.blank();
    }

    if let Some(blended) = &rec.blended_prompt {
        r.rule('=');
        r.line("  BLENDED PROMPT");
        r.rule('=');
        r.blank();
        r.line(format!("  {}", blended));
        r.blank();
    }
    r.finish()
}

pub fn project_list_report(projects: &[(String, Project)]) -> String {
    let mut r = Report::default();
    if projects.is_empty() {
        r.line("  No projects yet. Create one with: audial-ref project create <name>");
        return r.finish();
    }
    r.blank();
    r.line(format!("  Projects ({}):", projects.len()));
    r.rule('=');
    r.blank();
    for (slug, project) in projects {
        r.line(format!("  {} ({})", project.name, slug));
        if !project.description.is_empty() {
            r.line(format!("    {}", project.description));
        }
        r.line(format!(
            "    {} tracks, {} custom prompts",
            project.tracks.len(),
            project.custom_prompts.len()
        ));
        r.blank();
    }
    r.finish()
}

/// Project details; member tracks are looked up in the catalog for features
pub fn project_report(project: &Project, catalog: &Catalog) -> String {
    let mut r = Report::default();
    r.blank();
    r.line(format!("  Project: {}", project.name));
    if !project.description.is_empty() {
        r.line(format!("  {}", project.description));
    }
    r.rule('=');
    r.blank();

    let mood = &project.target_mood;
    r.line("  Target mood:");
    if let Some(energy) = &mood.energy {
        r.line(format!("    energy: {}", energy));
    }
    if let Some(brightness) = &mood.brightness {
        r.line(format!("    brightness: {}", brightness));
    }
    if let Some(tempo) = &mood.tempo {
        r.line(format!("    tempo: {}", tempo));
    }
    if !mood.keywords.is_empty() {
        r.line(format!("    keywords: {}", mood.keywords.join(", ")));
    }
    r.blank();

    if !project.tracks.is_empty() {
        r.line(format!("  Tracks ({}):", project.tracks.len()));
        r.line(format!("  {}", "-".repeat(40)));
        for member in &project.tracks {
            match catalog.get(&member.youtube_id) {
                Some(track) => {
                    r.line(format!("  {}", track.title));
                    r.line(format!(
                        "    ID: {} | Key: {} | BPM: {} | E:{}",
                        member.youtube_id,
                        track.key_label().unwrap_or_else(|| "?".to_string()),
                        bpm_label(track),
                        bar(track.energy, 10)
                    ));
                }
                None => r.line(format!("  {} ({})", member.title, member.youtube_id)),
            }
            if let Some(role) = &member.role {
                r.line(format!("    Role: {}", role));
            }
            if !member.prompt.is_empty() {
                r.line(format!(
                    "    Prompt: {}",
                    truncate_chars(&member.prompt, PROMPT_PREVIEW_CHARS)
                ));
            }
            r.blank();
        }
    }

    if !project.custom_prompts.is_empty() {
        r.line(format!("  Custom prompts ({}):", project.custom_prompts.len()));
        r.line(format!("  {}", "-".repeat(40)));
        for p in &project.custom_prompts {
            r.line(format!("  {}:", p.name));
            r.line(format!("    {}", p.prompt));
            r.blank();
        }
    }
    r.finish()
}

pub fn project_suggestions_report(
    slug: &str,
    project: &Project,
    ranked: &[ScoredCandidate<'_>],
) -> String {
    let mut r = Report::default();
    r.blank();
    r.line(format!("  Suggested tracks for: {}", project.name));
    r.rule('=');
    r.blank();
    if ranked.is_empty() {
        r.line("  No catalog tracks match the target mood.");
        return r.finish();
    }
    for candidate in ranked {
        let track = candidate.track;
        r.line(format!("  {}  [score: {:.1}]", heading(track), candidate.score));
        r.line(format!(
            "    Key: {} | BPM: {} | E:{} B:{}",
            track.key_label().unwrap_or_else(|| "?".to_string()),
            bpm_label(track),
            bar(track.energy, 10),
            bar(track.brightness, 10)
        ));
        if let Some(prompt) = track.audial_prompt.as_deref().filter(|p| !p.is_empty()) {
            r.line(format!(
                "    Prompt: {}",
                truncate_chars(prompt, PROMPT_PREVIEW_CHARS)
            ));
        }
        r.line(format!(
            "    Add: audial-ref project add {} {}",
            slug, track.youtube_id
        ));
        r.blank();
    }
    r.finish()
}
