//! Paddock: a horse race tracker with heuristic picks.
//!
//! Races and a horse registry are stored as whole JSON collections
//! behind a pluggable key-value store (SQLite by default). On top of
//! that sit an odds- and weight-informed scoring heuristic, aggregate
//! statistics, a recent-activity feed, snapshot export/import, and a
//! simulated race feed. A clap CLI fronts the same operations.
//!
//! ```
//! use chrono::Utc;
//! use paddock::storage::{MemoryStore, Repository};
//! use paddock::types::NewRace;
//!
//! let repo = Repository::new(Box::new(MemoryStore::new()));
//! let race = repo.add_race(NewRace {
//!     id: None,
//!     name: "Spring Stakes".into(),
//!     track: "Keeneland".into(),
//!     date: Utc::now(),
//!     distance: 1600,
//!     race_number: 4,
//!     prize_money: 25_000.0,
//!     horses: Vec::new(),
//!     source: None,
//! })?;
//!
//! assert!(!race.id.is_empty());
//! assert_eq!(repo.get_races().len(), 1);
//! # Ok::<(), paddock::RepoError>(())
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod predict;
pub mod sample;
pub mod stats;
pub mod storage;
pub mod types;

pub use error::{RepoError, StoreError};
pub use storage::Repository;
pub use types::{Horse, Prediction, Race, RaceEntry};
