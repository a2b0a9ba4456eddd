//! audial-ref - reference-track analysis and retrieval
//!
//! `analyze` turns an audio file into a catalog record with mood tags and a
//! prompt; `search` runs explicit, similarity and natural-language queries
//! over the catalog; `project` manages mood boards built from it.

use anyhow::{Context, Result};
use audial_common::config::{resolve_catalog_path, resolve_projects_dir, ConfigFile, TomlConfig};
use audial_common::project::{Project, ProjectStore, ProjectTrack};
use audial_common::{Catalog, UpsertOutcome};
use audial_ref::analysis::{Analyzer, CommandProvider};
use audial_ref::cli::{
    AnalyzeArgs, Cli, Command, ProjectCommand, SearchArgs, SearchMode, DEFAULT_SIMILAR_LIMIT,
};
use audial_ref::retrieval::{find_similar, recommend, search, suggest_for_project};
use audial_ref::utils::{load_mono, local_track_id};
use audial_ref::{report, EngineConfig, Error};
use clap::Parser;
use serde::Serialize;
use std::path::Path;
use tracing::info;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_file = ConfigFile::locate(cli.config.as_deref());
    let toml_config: TomlConfig = config_file.parse()?;
    audial_common::logging::init_tracing(&toml_config.logging)
        .context("Failed to initialize logging")?;

    info!(
        "Starting audial-ref v{} ({} built {}, {})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    if let Some(path) = &config_file.path {
        info!("Config: {}", path.display());
    }

    let engine = EngineConfig::load(&config_file).context("Invalid engine configuration")?;
    let catalog_path = resolve_catalog_path(cli.catalog.as_deref(), &toml_config);

    let result = match cli.command {
        Command::Analyze(args) => run_analyze(&args, &engine, &catalog_path),
        Command::Search(args) => run_search(&args, &engine, &catalog_path),
        Command::Project(cmd) => {
            let store = ProjectStore::new(resolve_projects_dir(&toml_config));
            run_project(cmd, &store, &catalog_path)
        }
    };

    match result {
        Err(e) if !e.is_fatal() => {
            println!("  {}", e);
            Ok(())
        }
        other => other.map_err(anyhow::Error::from),
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> audial_ref::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn run_analyze(args: &AnalyzeArgs, engine: &EngineConfig, catalog_path: &Path) -> audial_ref::Result<()> {
    if !args.file.is_file() {
        return Err(Error::InvalidInput(format!(
            "file not found: {}",
            args.file.display()
        )));
    }

    let provider = CommandProvider::from_config(&engine.provider)?;
    let audio = load_mono(&args.file, engine.analysis.sample_rate)?;
    let analysis = Analyzer::new(&provider, engine).analyze_track(&audio.signal())?;

    let file_name = args
        .file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    if args.json {
        print_json(&analysis)?;
    } else {
        print!(
            "{}",
            report::analysis_report(&file_name, args.title.as_deref(), &analysis)
        );
    }

    if args.no_save {
        return Ok(());
    }

    let id = match &args.id {
        Some(id) => id.clone(),
        None => local_track_id(&args.file)?,
    };
    let title = args.title.clone().unwrap_or_else(|| {
        args.file
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| id.clone())
    });

    let mut record = analysis.to_record(id.clone(), title, chrono::Utc::now());
    record.game = args.game.clone();
    record.category = args.category.clone();

    let mut catalog = Catalog::load_or_default(catalog_path)?;
    let outcome = catalog.upsert(record);
    if let Some(stored) = catalog.get_mut(&id) {
        // Explicit flags win over curated values on re-analysis
        if args.game.is_some() {
            stored.game = args.game.clone();
        }
        if args.category.is_some() {
            stored.category = args.category.clone();
        }
    }
    catalog.save(catalog_path)?;

    let verb = match outcome {
        UpsertOutcome::Inserted => "Added",
        UpsertOutcome::Updated => "Updated",
    };
    info!("{} {} in {} ({} tracks)", verb, id, catalog_path.display(), catalog.len());
    Ok(())
}

fn run_search(args: &SearchArgs, engine: &EngineConfig, catalog_path: &Path) -> audial_ref::Result<()> {
    let catalog = Catalog::load(catalog_path)?;
    let verbose = !args.compact;

    match args.mode() {
        SearchMode::Similar(title) => {
            let limit = args.limit.unwrap_or(DEFAULT_SIMILAR_LIMIT);
            let (reference, ranked) = find_similar(&catalog, title, &engine.similarity, limit)?;
            if args.json {
                print_json(&ranked)?;
            } else {
                print!("{}", report::similar_report(reference, &ranked, verbose));
            }
        }
        SearchMode::Recommend(description) => {
            let mut config = engine.recommend.clone();
            if let Some(limit) = args.limit {
                config.top_k = limit;
            }
            let rec = recommend(&catalog, description, &config)?;
            if args.json {
                print_json(&rec)?;
            } else {
                print!("{}", report::recommendation_report(description, &rec));
            }
        }
        SearchMode::Filter => {
            let spec = args.filter_spec()?;
            let results = search(&catalog, &spec, args.sort, args.limit);
            if args.json {
                print_json(&results)?;
            } else {
                print!("{}", report::search_report(&spec, &results, verbose));
            }
        }
    }
    Ok(())
}

fn run_project(cmd: ProjectCommand, store: &ProjectStore, catalog_path: &Path) -> audial_ref::Result<()> {
    match cmd {
        ProjectCommand::List => {
            let mut projects: Vec<(String, Project)> = Vec::new();
            for slug in store.list()? {
                let project = store.load(&slug)?;
                projects.push((slug, project));
            }
            print!("{}", report::project_list_report(&projects));
        }

        ProjectCommand::Show { name } => {
            let project = store.load(&name)?;
            let catalog = Catalog::load_or_default(catalog_path)?;
            print!("{}", report::project_report(&project, &catalog));
        }

        ProjectCommand::Create { name, description } => {
            let mut project = store.create(&name)?;
            if let Some(description) = description {
                project.description = description;
                store.save(&name, &project)?;
            }
            println!("  Created project: {}", project.name);
            println!("  File: {}", store.path_for(&name)?.display());
            println!("  Add tracks: audial-ref project add {} <youtube_id>", name);
        }

        ProjectCommand::Add {
            name,
            youtube_id,
            role,
        } => {
            let mut project = store.load(&name)?;
            let catalog = Catalog::load_or_default(catalog_path)?;

            let entry = match catalog.get(&youtube_id) {
                Some(track) => {
                    println!("  Adding: {}", track.title);
                    ProjectTrack {
                        youtube_id: youtube_id.clone(),
                        title: track.title.clone(),
                        prompt: track.audial_prompt.clone().unwrap_or_default(),
                        role,
                    }
                }
                None => {
                    println!("  Adding: {} (not in catalog, analyze it first)", youtube_id);
                    ProjectTrack {
                        youtube_id: youtube_id.clone(),
                        title: youtube_id.clone(),
                        prompt: String::new(),
                        role,
                    }
                }
            };

            if !project.add_track(entry) {
                println!("  Track already in project: {}", youtube_id);
                return Ok(());
            }
            store.save(&name, &project)?;
            println!("  Added to {}. Total tracks: {}", name, project.tracks.len());
        }

        ProjectCommand::Remove { name, youtube_id } => {
            let mut project = store.load(&name)?;
            if !project.remove_track(&youtube_id) {
                return Err(Error::NotFound(format!(
                    "track {} is not in project {}",
                    youtube_id, name
                )));
            }
            store.save(&name, &project)?;
            println!(
                "  Removed {} from {}. Remaining: {}",
                youtube_id,
                name,
                project.tracks.len()
            );
        }

        ProjectCommand::Suggest { name, json } => {
            let project = store.load(&name)?;
            let catalog = Catalog::load(catalog_path)?;
            let ranked = suggest_for_project(&catalog, &project)?;
            if json {
                print_json(&ranked)?;
            } else {
                print!(
                    "{}",
                    report::project_suggestions_report(&name, &project, &ranked)
                );
            }
        }
    }
    Ok(())
}
