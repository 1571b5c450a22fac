//! Typed operations over the stored race and horse collections.
//!
//! Collections are stored whole under fixed keys: every mutation reads the
//! full JSON document, edits it in memory, and writes it back. Read
//! accessors are soft; a missing or corrupt document logs a warning and
//! reads as empty, so bad stored data never wedges the app. Mutations load
//! their collection strictly before rewriting it: a failed load aborts the
//! call with a typed error rather than persisting a fresh collection over
//! whatever the store still holds.

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;
use std::sync::atomic::{AtomicI64, Ordering};
use tracing::{debug, info, warn};

use crate::error::{RepoError, StoreError};
use crate::types::{
    Activity, Horse, NewHorse, NewRace, Prediction, Race, RaceResult, RaceUpdate, Snapshot, Stats,
};
use crate::{predict, stats};

use super::kv::{KeyValueStore, SqliteStore};

/// Storage key for the race collection.
pub const RACES_KEY: &str = "races";
/// Storage key for the horse registry.
pub const HORSES_KEY: &str = "horses";

/// Repository over an injected key-value store.
pub struct Repository {
    store: Box<dyn KeyValueStore>,
    last_id: AtomicI64,
}

impl Repository {
    /// Create a repository over any store backend.
    pub fn new(store: Box<dyn KeyValueStore>) -> Self {
        Self {
            store,
            last_id: AtomicI64::new(0),
        }
    }

    /// Open a repository backed by the SQLite store at `path`.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        Ok(Self::new(Box::new(SqliteStore::open(path)?)))
    }

    /// Issue a unique id from the millisecond clock. Calls faster than the
    /// clock ticks, and clock steps backwards, advance past the last issued
    /// value instead of repeating it.
    fn next_id(&self) -> String {
        let now = Utc::now().timestamp_millis();
        let mut last = self.last_id.load(Ordering::Relaxed);
        loop {
            let id = now.max(last + 1);
            match self
                .last_id
                .compare_exchange(last, id, Ordering::Relaxed, Ordering::Relaxed)
            {
                Ok(_) => return id.to_string(),
                Err(observed) => last = observed,
            }
        }
    }

    fn load_collection<T: DeserializeOwned>(&self, key: &str) -> Result<Vec<T>, RepoError> {
        match self.store.get(key)? {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(Vec::new()),
        }
    }

    fn read_collection<T: DeserializeOwned>(&self, key: &str) -> Vec<T> {
        match self.load_collection(key) {
            Ok(items) => items,
            Err(err) => {
                warn!("Failed to load {} collection, treating as empty: {}", key, err);
                Vec::new()
            }
        }
    }

    fn write_collection<T: Serialize>(&self, key: &str, items: &[T]) -> Result<(), RepoError> {
        let raw = serde_json::to_string(items)?;
        self.store.set(key, &raw)?;
        Ok(())
    }

    // ==================== Race Operations ====================

    /// Store a new race, stamping id and creation time.
    pub fn add_race(&self, new: NewRace) -> Result<Race, RepoError> {
        let mut races: Vec<Race> = self.load_collection(RACES_KEY)?;

        let race = Race {
            id: new.id.unwrap_or_else(|| self.next_id()),
            name: new.name,
            track: new.track,
            date: new.date,
            distance: new.distance,
            race_number: new.race_number,
            prize_money: new.prize_money,
            horses: new.horses,
            source: new.source,
            created_at: Some(Utc::now()),
            predictions: None,
            predicted_at: None,
            results: None,
            completed_at: None,
        };

        races.push(race.clone());
        self.write_collection(RACES_KEY, &races)?;
        info!("Added race {} ({})", race.name, race.id);
        Ok(race)
    }

    /// All stored races in insertion order.
    pub fn get_races(&self) -> Vec<Race> {
        self.read_collection(RACES_KEY)
    }

    pub fn get_race_by_id(&self, id: &str) -> Option<Race> {
        self.get_races().into_iter().find(|r| r.id == id)
    }

    /// Races strictly in the future, soonest first.
    pub fn get_upcoming_races(&self) -> Vec<Race> {
        let now = Utc::now();
        let mut races: Vec<Race> = self
            .get_races()
            .into_iter()
            .filter(|r| r.date > now)
            .collect();
        races.sort_by_key(|r| r.date);
        races
    }

    /// Races that carry a non-empty prediction list.
    pub fn get_predicted_races(&self) -> Vec<Race> {
        self.get_races()
            .into_iter()
            .filter(|r| r.has_predictions())
            .collect()
    }

    /// Shallow-merge `update` into the stored race.
    pub fn update_race(&self, id: &str, update: RaceUpdate) -> Result<Race, RepoError> {
        let mut races: Vec<Race> = self.load_collection(RACES_KEY)?;
        let race = races
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| RepoError::NotFound(id.to_string()))?;

        if let Some(name) = update.name {
            race.name = name;
        }
        if let Some(track) = update.track {
            race.track = track;
        }
        if let Some(date) = update.date {
            race.date = date;
        }
        if let Some(distance) = update.distance {
            race.distance = distance;
        }
        if let Some(race_number) = update.race_number {
            race.race_number = race_number;
        }
        if let Some(prize_money) = update.prize_money {
            race.prize_money = prize_money;
        }
        if let Some(horses) = update.horses {
            race.horses = horses;
        }
        if let Some(source) = update.source {
            race.source = Some(source);
        }

        let updated = race.clone();
        self.write_collection(RACES_KEY, &races)?;
        Ok(updated)
    }

    /// Remove a race. Deleting an unknown id is a no-op, not an error.
    pub fn delete_race(&self, id: &str) -> Result<(), RepoError> {
        let mut races: Vec<Race> = self.load_collection(RACES_KEY)?;
        let before = races.len();
        races.retain(|r| r.id != id);
        if races.len() == before {
            debug!("Delete of unknown race {} ignored", id);
        }
        self.write_collection(RACES_KEY, &races)?;
        Ok(())
    }

    // ==================== Predictions and Results ====================

    /// Attach predictions to a race, stamping the prediction time.
    pub fn add_prediction(
        &self,
        race_id: &str,
        predictions: Vec<Prediction>,
    ) -> Result<Race, RepoError> {
        let mut races: Vec<Race> = self.load_collection(RACES_KEY)?;
        let race = races
            .iter_mut()
            .find(|r| r.id == race_id)
            .ok_or_else(|| RepoError::NotFound(race_id.to_string()))?;

        race.predictions = Some(predictions);
        race.predicted_at = Some(Utc::now());

        let updated = race.clone();
        self.write_collection(RACES_KEY, &races)?;
        Ok(updated)
    }

    /// Record a race outcome, stamping the completion time.
    pub fn add_result(&self, race_id: &str, result: RaceResult) -> Result<Race, RepoError> {
        let mut races: Vec<Race> = self.load_collection(RACES_KEY)?;
        let race = races
            .iter_mut()
            .find(|r| r.id == race_id)
            .ok_or_else(|| RepoError::NotFound(race_id.to_string()))?;

        race.results = Some(result);
        race.completed_at = Some(Utc::now());

        let updated = race.clone();
        self.write_collection(RACES_KEY, &races)?;
        Ok(updated)
    }

    /// Run the scoring heuristic over a race's entries and store the
    /// resulting top picks. A race without entries is a validation error;
    /// nothing is stored.
    pub fn make_prediction(&self, race_id: &str) -> Result<Vec<Prediction>, RepoError> {
        let race = self
            .load_collection::<Race>(RACES_KEY)?
            .into_iter()
            .find(|r| r.id == race_id)
            .ok_or_else(|| RepoError::NotFound(race_id.to_string()))?;

        if race.horses.is_empty() {
            return Err(RepoError::Validation(format!(
                "race {} has no entries to score",
                race_id
            )));
        }

        let predictions = predict::generate_prediction(&race);
        if predictions.is_empty() {
            return Err(RepoError::Validation(format!(
                "no scorable entries in race {}",
                race_id
            )));
        }

        self.add_prediction(race_id, predictions.clone())?;
        Ok(predictions)
    }

    // ==================== Horse Operations ====================

    /// Register a horse. Names are unique ignoring case; a duplicate is
    /// rejected with a validation error.
    pub fn add_horse(&self, new: NewHorse) -> Result<Horse, RepoError> {
        let mut horses: Vec<Horse> = self.load_collection(HORSES_KEY)?;

        let lowered = new.name.to_lowercase();
        if horses.iter().any(|h| h.name.to_lowercase() == lowered) {
            return Err(RepoError::Validation(format!(
                "horse \"{}\" is already registered",
                new.name
            )));
        }

        let horse = Horse {
            id: new.id.unwrap_or_else(|| self.next_id()),
            name: new.name,
            jockey: new.jockey,
            weight: new.weight,
            odds: new.odds,
            number: new.number,
            created_at: Some(Utc::now()),
        };

        horses.push(horse.clone());
        self.write_collection(HORSES_KEY, &horses)?;
        info!("Added horse {} ({})", horse.name, horse.id);
        Ok(horse)
    }

    /// All registered horses in insertion order.
    pub fn get_horses(&self) -> Vec<Horse> {
        self.read_collection(HORSES_KEY)
    }

    pub fn get_horse_by_id(&self, id: &str) -> Option<Horse> {
        self.get_horses().into_iter().find(|h| h.id == id)
    }

    /// Case-insensitive name lookup, for callers that only know the name
    /// a race entry or prediction carries.
    pub fn find_horse_by_name(&self, name: &str) -> Option<Horse> {
        let lowered = name.to_lowercase();
        self.get_horses()
            .into_iter()
            .find(|h| h.name.to_lowercase() == lowered)
    }

    // ==================== Derived Views ====================

    /// Aggregate statistics over both collections.
    pub fn get_stats(&self) -> Stats {
        stats::compute_stats(&self.get_races(), &self.get_horses())
    }

    /// The five most recent additions and predictions, newest first.
    pub fn recent_activity(&self) -> Vec<Activity> {
        stats::recent_activity(&self.get_races(), &self.get_horses())
    }

    // ==================== Snapshots ====================

    /// Serialize both collections into a pretty-printed snapshot document.
    pub fn export_data(&self) -> Result<String, RepoError> {
        let snapshot = Snapshot {
            races: Some(self.get_races()),
            horses: Some(self.get_horses()),
            exported_at: Some(Utc::now()),
        };
        Ok(serde_json::to_string_pretty(&snapshot)?)
    }

    /// Replace stored collections from a snapshot document. Each top-level
    /// key is applied independently; an absent key leaves that collection
    /// untouched. Malformed JSON rejects the whole import.
    pub fn import_data(&self, raw: &str) -> Result<(), RepoError> {
        let snapshot: Snapshot = serde_json::from_str(raw)?;

        if let Some(races) = snapshot.races {
            info!("Importing {} races", races.len());
            self.write_collection(RACES_KEY, &races)?;
        }
        if let Some(horses) = snapshot.horses {
            info!("Importing {} horses", horses.len());
            self.write_collection(HORSES_KEY, &horses)?;
        }
        Ok(())
    }

    /// Merge fetched races into the stored collection, skipping any race
    /// that matches an existing one by name, track, and calendar day.
    /// Returns how many were added.
    pub fn import_races(&self, incoming: Vec<Race>) -> Result<usize, RepoError> {
        let mut races: Vec<Race> = self.load_collection(RACES_KEY)?;
        let mut added = 0;

        for race in incoming {
            let duplicate = races.iter().any(|existing| {
                existing.name == race.name
                    && existing.track == race.track
                    && existing.date.date_naive() == race.date.date_naive()
            });
            if duplicate {
                debug!("Skipping duplicate race {} at {}", race.name, race.track);
                continue;
            }
            races.push(race);
            added += 1;
        }

        self.write_collection(RACES_KEY, &races)?;
        info!("Imported {} fetched races", added);
        Ok(added)
    }

    /// Drop both collections.
    pub fn clear_all(&self) -> Result<(), RepoError> {
        self.store.remove(RACES_KEY)?;
        self.store.remove(HORSES_KEY)?;
        info!("Cleared all stored data");
        Ok(())
    }

    /// Validate both stored collections, dropping any that no longer
    /// parse. Returns the keys that were removed.
    pub fn check_integrity(&self) -> Result<Vec<String>, RepoError> {
        let mut removed = Vec::new();

        for key in [RACES_KEY, HORSES_KEY] {
            let raw = match self.store.get(key)? {
                Some(raw) => raw,
                None => continue,
            };

            let parse = if key == RACES_KEY {
                serde_json::from_str::<Vec<Race>>(&raw).map(|_| ())
            } else {
                serde_json::from_str::<Vec<Horse>>(&raw).map(|_| ())
            };

            if let Err(err) = parse {
                warn!("Dropping corrupt {} collection: {}", key, err);
                self.store.remove(key)?;
                removed.push(key.to_string());
            }
        }

        Ok(removed)
    }
}
