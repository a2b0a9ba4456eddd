//! Catalog persistence and re-analysis merge

use audial_common::{Catalog, Error, TrackRecord, UpsertOutcome};
use chrono::Utc;

fn analyzed(id: &str, title: &str, energy: f64) -> TrackRecord {
    TrackRecord {
        energy: Some(energy),
        bpm: Some(92.0),
        key: Some("A".to_string()),
        mode: Some("minor".to_string()),
        tags: vec!["calm".to_string()],
        audial_prompt: Some("calm, slow tempo around 92 bpm, in A minor".to_string()),
        analyzed_at: Some(Utc::now()),
        ..TrackRecord::new(id, title)
    }
}

#[test]
fn test_load_missing_catalog_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tracks.json");

    match Catalog::load(&path) {
        Err(Error::MissingCatalog(p)) => assert_eq!(p, path),
        other => panic!("expected MissingCatalog, got {:?}", other),
    }
    assert!(Catalog::load_or_default(&path).unwrap().is_empty());
}

#[test]
fn test_save_then_load_preserves_order() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data").join("tracks.json");

    let mut catalog = Catalog::default();
    catalog.upsert(analyzed("b", "Second", 0.4));
    catalog.upsert(analyzed("a", "First", 0.2));
    catalog.save(&path).unwrap();

    let loaded = Catalog::load(&path).unwrap();
    let ids: Vec<&str> = loaded.iter().map(|t| t.youtube_id.as_str()).collect();
    assert_eq!(ids, vec!["b", "a"]);
    assert_eq!(loaded, catalog);
}

#[test]
fn test_reanalysis_preserves_curated_metadata() {
    let mut catalog = Catalog::default();
    let mut curated = analyzed("zan", "To Zanarkand", 0.2);
    curated.game = Some("Final Fantasy X".to_string());
    curated.category = Some("piano".to_string());
    curated.aliases = vec!["zanarkand".to_string()];
    curated.notes = Some("opening theme".to_string());
    curated.bpm_feel = Some(66.0);
    curated
        .extra
        .insert("source_url".to_string(), serde_json::json!("https://example.com"));
    assert_eq!(catalog.upsert(curated), UpsertOutcome::Inserted);

    let mut fresh = analyzed("zan", "", 0.35);
    fresh.bpm = Some(132.0);
    fresh.tags = vec!["moderate energy".to_string()];
    assert_eq!(catalog.upsert(fresh), UpsertOutcome::Updated);

    assert_eq!(catalog.len(), 1);
    let track = catalog.get("zan").unwrap();
    assert_eq!(track.title, "To Zanarkand");
    assert_eq!(track.game.as_deref(), Some("Final Fantasy X"));
    assert_eq!(track.category.as_deref(), Some("piano"));
    assert_eq!(track.aliases, vec!["zanarkand".to_string()]);
    assert_eq!(track.notes.as_deref(), Some("opening theme"));
    assert_eq!(track.bpm_feel, Some(66.0));
    assert!(track.extra.contains_key("source_url"));

    assert_eq!(track.energy, Some(0.35));
    assert_eq!(track.bpm, Some(132.0));
    assert_eq!(track.tags, vec!["moderate energy".to_string()]);
    assert_eq!(track.effective_bpm(), Some(66.0));
}

#[test]
fn test_reanalysis_fills_missing_title_and_game() {
    let mut catalog = Catalog::default();
    catalog.upsert(TrackRecord::new("x", ""));

    let mut fresh = analyzed("x", "Found Title", 0.5);
    fresh.game = Some("Found Game".to_string());
    catalog.upsert(fresh);

    let track = catalog.get("x").unwrap();
    assert_eq!(track.title, "Found Title");
    assert_eq!(track.game.as_deref(), Some("Found Game"));
}

#[test]
fn test_find_by_title_first_case_insensitive_match() {
    let mut catalog = Catalog::default();
    catalog.upsert(analyzed("1", "Dearly Beloved", 0.2));
    catalog.upsert(analyzed("2", "Dearly Beloved (Reprise)", 0.3));

    let found = catalog.find_by_title("dearly").unwrap();
    assert_eq!(found.youtube_id, "1");
    assert!(catalog.find_by_title("zelda").is_none());
}

#[test]
fn test_duplicate_ids_on_disk_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tracks.json");
    std::fs::write(
        &path,
        r#"{"tracks":[{"youtube_id":"dup","title":"A"},{"youtube_id":"dup","title":"B"}]}"#,
    )
    .unwrap();

    assert!(matches!(
        Catalog::load(&path),
        Err(Error::DuplicateTrack(id)) if id == "dup"
    ));
}

#[test]
fn test_one_sloppy_record_keeps_catalog_loadable() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tracks.json");
    std::fs::write(
        &path,
        r#"{"tracks":[
            {"youtube_id":"a","title":"Hymn","tags":null,"energy":0.2},
            {"title":"Hand-entered","energy":0.7},
            {"youtube_id":"b","title":null,"aliases":null,"tags":["dark"]}
        ]}"#,
    )
    .unwrap();

    let catalog = Catalog::load(&path).unwrap();
    assert_eq!(catalog.len(), 3);
    assert_eq!(catalog.find_by_title("hymn").unwrap().youtube_id, "a");
    assert!(catalog.tracks[0].tags.is_empty());
    assert_eq!(catalog.tracks[1].youtube_id, "");
    assert_eq!(catalog.get("b").unwrap().tags, vec!["dark".to_string()]);

    // Saving keeps every record, including the one without an id
    catalog.save(&path).unwrap();
    assert_eq!(Catalog::load(&path).unwrap().len(), 3);
}
