//! CLI commands for the paddock tracker.
//!
//! Every command opens the repository fresh, runs one operation, and
//! prints either plain lines or pretty JSON.

use anyhow::Context;
use chrono::{Duration, Utc};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use crate::config::AppConfig;
use crate::sample::{self, FetchOptions};
use crate::storage::Repository;
use crate::types::{NewHorse, NewRace, RaceResult};

#[derive(Parser)]
#[command(name = "paddock")]
#[command(version, about = "Paddock: race tracking, picks, and stats from the terminal", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Add a race from a JSON file
    AddRace {
        /// Path to race JSON file
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Register a horse
    AddHorse {
        /// Horse name, unique ignoring case
        #[arg(long)]
        name: String,

        /// Jockey name
        #[arg(long)]
        jockey: String,

        /// Carried weight in kg
        #[arg(long)]
        weight: String,

        /// Win odds
        #[arg(long)]
        odds: String,

        /// Saddle number
        #[arg(long, default_value_t = 1)]
        number: u32,
    },

    /// List stored races
    List {
        /// Only races still ahead, soonest first
        #[arg(short, long)]
        upcoming: bool,
    },

    /// List registered horses
    Horses,

    /// Show one race as JSON
    Show {
        #[arg(value_name = "RACE_ID")]
        race_id: String,
    },

    /// Generate and store picks for a race
    Predict {
        #[arg(value_name = "RACE_ID")]
        race_id: String,
    },

    /// Record a race result
    Result {
        #[arg(value_name = "RACE_ID")]
        race_id: String,

        /// Winning horse name
        #[arg(short, long)]
        winner: String,
    },

    /// Show aggregate statistics
    Stats,

    /// Show the recent activity feed
    Activity,

    /// Fetch races from the simulated feed
    Fetch {
        /// Provider name stamped on fetched races
        #[arg(short, long, default_value = "demo-feed")]
        provider: String,

        /// Override the configured race count
        #[arg(short, long)]
        max_races: Option<usize>,

        /// Merge fetched races into the store
        #[arg(short, long)]
        import: bool,
    },

    /// Export both collections as a snapshot
    Export {
        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Import a snapshot file
    Import {
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Delete all stored data
    Clear {
        /// Confirm deletion
        #[arg(long)]
        yes: bool,
    },
}

/// Open the configured repository, repairing corrupt collections first.
fn open_repository() -> anyhow::Result<Repository> {
    let config = AppConfig::load()?;
    let repo = Repository::open(Path::new(&config.storage.path))?;

    for key in repo.check_integrity()? {
        eprintln!("Warning: dropped corrupt {} data", key);
    }
    Ok(repo)
}

/// Add a race described by a JSON file.
pub fn run_add_race(input: PathBuf) -> anyhow::Result<()> {
    let raw = std::fs::read_to_string(&input)
        .with_context(|| format!("Failed to read {}", input.display()))?;
    let new: NewRace = serde_json::from_str(&raw)?;

    let repo = open_repository()?;
    let race = repo.add_race(new)?;
    println!("Added race {} ({})", race.name, race.id);
    Ok(())
}

/// Register a horse from command-line flags.
pub fn run_add_horse(
    name: String,
    jockey: String,
    weight: String,
    odds: String,
    number: u32,
) -> anyhow::Result<()> {
    let repo = open_repository()?;
    let horse = repo.add_horse(NewHorse {
        id: None,
        name,
        jockey,
        weight,
        odds,
        number,
    })?;
    println!("Added horse {} ({})", horse.name, horse.id);
    Ok(())
}

/// List races, optionally only upcoming ones.
pub fn run_list(upcoming: bool) -> anyhow::Result<()> {
    let repo = open_repository()?;
    let races = if upcoming {
        repo.get_upcoming_races()
    } else {
        repo.get_races()
    };

    if races.is_empty() {
        println!("No races stored.");
        return Ok(());
    }

    for race in &races {
        // P = predicted, R = has results
        let mut flags = String::new();
        if race.has_predictions() {
            flags.push('P');
        }
        if race.results.is_some() {
            flags.push('R');
        }

        println!(
            "{:>15}  {}  {:<16} R{:<2} {:<24} {:>2} runners  {}",
            race.id,
            race.date.format("%Y-%m-%d %H:%M"),
            race.track,
            race.race_number,
            race.name,
            race.horses.len(),
            flags
        );
    }
    println!("{} races", races.len());
    Ok(())
}

/// List the horse registry.
pub fn run_horses() -> anyhow::Result<()> {
    let repo = open_repository()?;
    let horses = repo.get_horses();

    if horses.is_empty() {
        println!("No horses registered.");
        return Ok(());
    }

    for horse in &horses {
        println!(
            "{:>15}  #{:<2} {:<20} {:<14} {:>5} kg  odds {:>5}",
            horse.id, horse.number, horse.name, horse.jockey, horse.weight, horse.odds
        );
    }
    println!("{} horses", horses.len());
    Ok(())
}

/// Print one race as pretty JSON.
pub fn run_show(race_id: String) -> anyhow::Result<()> {
    let repo = open_repository()?;
    let race = repo
        .get_race_by_id(&race_id)
        .ok_or_else(|| anyhow::anyhow!("race not found: {}", race_id))?;

    println!("{}", serde_json::to_string_pretty(&race)?);
    Ok(())
}

/// Score a race's entries and store the picks.
pub fn run_predict(race_id: String) -> anyhow::Result<()> {
    let repo = open_repository()?;
    let predictions = repo.make_prediction(&race_id)?;

    println!("Top picks:");
    for (i, p) in predictions.iter().enumerate() {
        println!(
            "  {}. {:<20} {:>5.1}%  (odds {}, weight {})",
            i + 1,
            p.horse,
            p.confidence * 100.0,
            p.factors.odds,
            p.factors.weight
        );
    }
    Ok(())
}

/// Record the winner of a race.
pub fn run_result(race_id: String, winner: String) -> anyhow::Result<()> {
    let repo = open_repository()?;
    let race = repo.add_result(&race_id, RaceResult::new(winner))?;

    println!("Recorded result for {} ({})", race.name, race.id);
    if let (Some(results), Some(top)) = (race.results.as_ref(), race.top_prediction()) {
        if results.winner == top.horse {
            println!("Top pick {} won.", top.horse);
        } else {
            println!("Top pick {} did not win.", top.horse);
        }
    }
    Ok(())
}

/// Print aggregate statistics as pretty JSON.
pub fn run_stats() -> anyhow::Result<()> {
    let repo = open_repository()?;
    println!("{}", serde_json::to_string_pretty(&repo.get_stats())?);
    Ok(())
}

/// Print the recent activity feed.
pub fn run_activity() -> anyhow::Result<()> {
    let repo = open_repository()?;
    let feed = repo.recent_activity();

    if feed.is_empty() {
        println!("No recent activity.");
        return Ok(());
    }

    for activity in &feed {
        println!(
            "{}  {}",
            activity.date.format("%Y-%m-%d %H:%M"),
            activity.description
        );
    }
    Ok(())
}

/// Fetch races from the simulated feed, optionally importing them.
pub async fn run_fetch(
    provider: String,
    max_races: Option<usize>,
    import: bool,
) -> anyhow::Result<()> {
    let config = AppConfig::load()?;
    let options = FetchOptions {
        date_from: None,
        date_to: Some(Utc::now() + Duration::days(config.simulator.horizon_days)),
        max_races: Some(max_races.unwrap_or(config.simulator.max_races)),
    };

    eprintln!("Fetching races from {}...", provider);
    let response = sample::fetch_races_from_api(&provider, options).await;
    let fetched = response.races.len();
    println!("Fetched {} races from {}", fetched, response.provider);

    for race in &response.races {
        println!(
            "  {}  {:<16} {}",
            race.date.format("%Y-%m-%d %H:%M"),
            race.track,
            race.name
        );
    }

    if import {
        let repo = open_repository()?;
        let added = repo.import_races(response.races)?;
        println!(
            "Imported {} new races ({} duplicates skipped)",
            added,
            fetched - added
        );
    } else {
        println!("Re-run with --import to store them.");
    }
    Ok(())
}

/// Export both collections to a file or stdout.
pub fn run_export(output: Option<PathBuf>) -> anyhow::Result<()> {
    let repo = open_repository()?;
    let snapshot = repo.export_data()?;

    match output {
        Some(path) => {
            std::fs::write(&path, &snapshot)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("Exported snapshot to {}", path.display());
        }
        None => println!("{}", snapshot),
    }
    Ok(())
}

/// Replace stored collections from a snapshot file.
pub fn run_import(input: PathBuf) -> anyhow::Result<()> {
    let raw = std::fs::read_to_string(&input)
        .with_context(|| format!("Failed to read {}", input.display()))?;

    let repo = open_repository()?;
    repo.import_data(&raw)?;
    println!(
        "Snapshot imported: {} races, {} horses stored",
        repo.get_races().len(),
        repo.get_horses().len()
    );
    Ok(())
}

/// Delete everything, guarded by an explicit flag.
pub fn run_clear(yes: bool) -> anyhow::Result<()> {
    if !yes {
        anyhow::bail!("this deletes every stored race and horse; pass --yes to confirm");
    }

    let repo = open_repository()?;
    repo.clear_all()?;
    println!("All data cleared.");
    Ok(())
}
