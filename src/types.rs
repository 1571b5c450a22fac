//! Core data model: races, horses, predictions, and derived views.
//!
//! Everything serializes camelCase so stored collections and snapshot
//! files keep the shape the original tracker app wrote (`createdAt`,
//! `raceNumber`, `exportedAt`, ...).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A registered horse in the registry.
///
/// Distinct from [`RaceEntry`]: the registry holds named horses, while a
/// race embeds independent snapshot copies of its runners. Horses are
/// immutable once added; no update or delete operation exists.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Horse {
    pub id: String,
    /// Unique case-insensitively across the registry.
    pub name: String,
    pub jockey: String,
    /// Carried weight in kg, kept as the decimal string the app records.
    pub weight: String,
    /// Win odds, kept as a decimal string.
    pub odds: String,
    pub number: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Input for registering a horse; id is assigned when absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewHorse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub jockey: String,
    pub weight: String,
    pub odds: String,
    pub number: u32,
}

/// A horse entry embedded in a race card.
///
/// An independent copy, never kept in referential sync with the [`Horse`]
/// registry. `number` is the saddle number within the race.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaceEntry {
    pub name: String,
    pub jockey: String,
    pub weight: String,
    pub odds: String,
    pub number: u32,
}

/// A scheduled race with its embedded entries and optional prediction and
/// result state.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Race {
    pub id: String,
    pub name: String,
    pub track: String,
    pub date: DateTime<Utc>,
    pub distance: u32,
    pub race_number: u32,
    #[serde(default)]
    pub prize_money: f64,
    #[serde(default)]
    pub horses: Vec<RaceEntry>,
    /// Feed provider the race was imported from, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    /// Present together with `predicted_at`, sorted descending by
    /// confidence, at most three entries.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub predictions: Option<Vec<Prediction>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub predicted_at: Option<DateTime<Utc>>,
    /// Present together with `completed_at`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub results: Option<RaceResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Race {
    /// Whether the race carries a non-empty prediction list.
    pub fn has_predictions(&self) -> bool {
        self.predictions.as_ref().is_some_and(|p| !p.is_empty())
    }

    /// Highest-confidence prediction, if any.
    pub fn top_prediction(&self) -> Option<&Prediction> {
        self.predictions.as_ref().and_then(|p| p.first())
    }
}

/// Input for creating a race; id is assigned when absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRace {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub track: String,
    pub date: DateTime<Utc>,
    pub distance: u32,
    pub race_number: u32,
    #[serde(default)]
    pub prize_money: f64,
    #[serde(default)]
    pub horses: Vec<RaceEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

/// Shallow-merge patch for `update_race`: only `Some` fields overwrite.
///
/// Predictions and results are excluded on purpose; they go through
/// `add_prediction`/`add_result` so the paired timestamps stay in sync.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RaceUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub track: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub race_number: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prize_money: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub horses: Option<Vec<RaceEntry>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

/// Heuristic win estimate for one embedded entry.
///
/// `horse` is a name reference into the race's entry list, not a registry
/// id; the name match against `RaceResult::winner` is how accuracy is
/// scored later.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prediction {
    pub horse: String,
    /// Clamped to [0.10, 0.95].
    pub confidence: f64,
    pub factors: PredictionFactors,
}

/// Inputs the heuristic saw for one entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionFactors {
    pub odds: String,
    pub weight: String,
    /// Placeholder; no historical form data exists.
    pub form: String,
}

/// Recorded outcome of a race: the winner plus whatever else the caller
/// noted (finishing time, margin, ...).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RaceResult {
    pub winner: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RaceResult {
    pub fn new(winner: impl Into<String>) -> Self {
        Self {
            winner: winner.into(),
            extra: Map::new(),
        }
    }
}

/// Export/import envelope. Import accepts either collection key
/// independently; an absent key leaves that stored collection untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub races: Option<Vec<Race>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub horses: Option<Vec<Horse>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exported_at: Option<DateTime<Utc>>,
}

/// Aggregate statistics over both collections.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub total_races: usize,
    pub total_horses: usize,
    /// Races that carry results.
    pub completed_races: usize,
    /// Share of completed-and-predicted races whose top prediction named
    /// the winner, as a 1-decimal percentage string ("0.0" when none).
    pub prediction_accuracy: String,
    pub total_prize_money: f64,
    pub correct_predictions: usize,
    /// Completed races that also carry a non-empty prediction list.
    pub total_predictions: usize,
}

/// One line of the recent-activity feed.
#[derive(Debug, Clone, Serialize)]
pub struct Activity {
    pub description: String,
    pub date: DateTime<Utc>,
    #[serde(rename = "type")]
    pub kind: ActivityKind,
}

/// Feed entry category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityKind {
    Race,
    Horse,
    Prediction,
}

/// Envelope returned by the simulated feed fetch.
#[derive(Debug, Clone, Serialize)]
pub struct FetchResponse {
    pub success: bool,
    pub races: Vec<Race>,
    pub provider: String,
    pub timestamp: DateTime<Utc>,
}
