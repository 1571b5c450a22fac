//! Aggregate statistics and the recent-activity feed.
//!
//! Both views are pure functions over the loaded collections; the
//! repository wraps them with its own reads.

use crate::types::{Activity, ActivityKind, Horse, Race, Stats};

/// Compute totals and prediction accuracy over both collections.
///
/// Accuracy counts only races that are both completed and predicted: a
/// hit is a top pick whose horse name equals the recorded winner. With
/// no such races the accuracy string is "0.0".
pub fn compute_stats(races: &[Race], horses: &[Horse]) -> Stats {
    let completed: Vec<&Race> = races.iter().filter(|r| r.results.is_some()).collect();

    let mut correct_predictions = 0;
    let mut total_predictions = 0;
    for race in &completed {
        if let (Some(results), Some(top)) = (race.results.as_ref(), race.top_prediction()) {
            total_predictions += 1;
            if results.winner == top.horse {
                correct_predictions += 1;
            }
        }
    }

    let prediction_accuracy = if total_predictions > 0 {
        format!(
            "{:.1}",
            correct_predictions as f64 / total_predictions as f64 * 100.0
        )
    } else {
        "0.0".to_string()
    };

    Stats {
        total_races: races.len(),
        total_horses: horses.len(),
        completed_races: completed.len(),
        prediction_accuracy,
        total_prize_money: races.iter().map(|r| r.prize_money).sum(),
        correct_predictions,
        total_predictions,
    }
}

/// Build the recent-activity feed: the newest three races and two horses
/// by creation time, plus the two most recently predicted races, merged
/// newest first and capped at five lines.
///
/// Only stamped entries qualify; a race or horse missing its timestamp
/// never enters the feed. Stored order plays no part, so collections
/// reshuffled by imports still rank by when things were created.
pub fn recent_activity(races: &[Race], horses: &[Horse]) -> Vec<Activity> {
    let mut activities = Vec::new();

    let mut created: Vec<_> = races
        .iter()
        .filter_map(|r| r.created_at.map(|at| (r, at)))
        .collect();
    created.sort_by(|a, b| b.1.cmp(&a.1));
    for (race, at) in created.into_iter().take(3) {
        activities.push(Activity {
            description: format!("Race \"{}\" added", race.name),
            date: at,
            kind: ActivityKind::Race,
        });
    }

    let mut registered: Vec<_> = horses
        .iter()
        .filter_map(|h| h.created_at.map(|at| (h, at)))
        .collect();
    registered.sort_by(|a, b| b.1.cmp(&a.1));
    for (horse, at) in registered.into_iter().take(2) {
        activities.push(Activity {
            description: format!("Horse \"{}\" added", horse.name),
            date: at,
            kind: ActivityKind::Horse,
        });
    }

    let mut predicted: Vec<_> = races
        .iter()
        .filter(|r| r.predictions.is_some())
        .filter_map(|r| r.predicted_at.map(|at| (r, at)))
        .collect();
    predicted.sort_by(|a, b| b.1.cmp(&a.1));
    for (race, at) in predicted.into_iter().take(2) {
        activities.push(Activity {
            description: format!("Prediction made for \"{}\"", race.name),
            date: at,
            kind: ActivityKind::Prediction,
        });
    }

    activities.sort_by(|a, b| b.date.cmp(&a.date));
    activities.truncate(5);
    activities
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Prediction, PredictionFactors, RaceResult};
    use chrono::{DateTime, Utc};

    fn ts(iso: &str) -> DateTime<Utc> {
        iso.parse().unwrap()
    }

    fn race(name: &str, created: &str) -> Race {
        Race {
            id: name.to_string(),
            name: name.to_string(),
            track: "Keeneland".to_string(),
            date: ts("2025-06-15T14:00:00Z"),
            distance: 1600,
            race_number: 1,
            prize_money: 10_000.0,
            horses: Vec::new(),
            source: None,
            created_at: Some(ts(created)),
            predictions: None,
            predicted_at: None,
            results: None,
            completed_at: None,
        }
    }

    fn horse(name: &str, created: &str) -> Horse {
        Horse {
            id: name.to_string(),
            name: name.to_string(),
            jockey: "T. Rider".to_string(),
            weight: "55.0".to_string(),
            odds: "8.0".to_string(),
            number: 1,
            created_at: Some(ts(created)),
        }
    }

    fn with_prediction(mut race: Race, pick: &str, at: &str) -> Race {
        race.predictions = Some(vec![Prediction {
            horse: pick.to_string(),
            confidence: 0.5,
            factors: PredictionFactors {
                odds: "5.0".to_string(),
                weight: "55.0".to_string(),
                form: "Unknown".to_string(),
            },
        }]);
        race.predicted_at = Some(ts(at));
        race
    }

    fn with_result(mut race: Race, winner: &str, at: &str) -> Race {
        race.results = Some(RaceResult::new(winner));
        race.completed_at = Some(ts(at));
        race
    }

    #[test]
    fn test_empty_collections() {
        let stats = compute_stats(&[], &[]);
        assert_eq!(stats.total_races, 0);
        assert_eq!(stats.total_horses, 0);
        assert_eq!(stats.completed_races, 0);
        assert_eq!(stats.prediction_accuracy, "0.0");
        assert_eq!(stats.total_prize_money, 0.0);
    }

    #[test]
    fn test_accuracy_counts_completed_and_predicted_only() {
        let hit = with_result(
            with_prediction(race("Hit", "2025-06-01T10:00:00Z"), "Alpha", "2025-06-02T10:00:00Z"),
            "Alpha",
            "2025-06-03T10:00:00Z",
        );
        let miss = with_result(
            with_prediction(race("Miss", "2025-06-01T11:00:00Z"), "Bravo", "2025-06-02T11:00:00Z"),
            "Charlie",
            "2025-06-03T11:00:00Z",
        );
        // Predicted but never run: not part of the accuracy base
        let pending = with_prediction(
            race("Pending", "2025-06-01T12:00:00Z"),
            "Delta",
            "2025-06-02T12:00:00Z",
        );
        // Run without a prediction: completed, but outside the base too
        let unpredicted = with_result(
            race("Unpredicted", "2025-06-01T13:00:00Z"),
            "Echo",
            "2025-06-03T13:00:00Z",
        );

        let stats = compute_stats(&[hit, miss, pending, unpredicted], &[]);
        assert_eq!(stats.total_races, 4);
        assert_eq!(stats.completed_races, 3);
        assert_eq!(stats.total_predictions, 2);
        assert_eq!(stats.correct_predictions, 1);
        assert_eq!(stats.prediction_accuracy, "50.0");
        assert_eq!(stats.total_prize_money, 40_000.0);
    }

    #[test]
    fn test_accuracy_formats_one_decimal() {
        let races: Vec<Race> = ["A", "B", "C"]
            .iter()
            .enumerate()
            .map(|(i, name)| {
                let winner = if i == 0 { "Pick" } else { "Other" };
                with_result(
                    with_prediction(race(name, "2025-06-01T10:00:00Z"), "Pick", "2025-06-02T10:00:00Z"),
                    winner,
                    "2025-06-03T10:00:00Z",
                )
            })
            .collect();

        let stats = compute_stats(&races, &[]);
        assert_eq!(stats.prediction_accuracy, "33.3");
    }

    #[test]
    fn test_activity_merges_newest_first_and_caps_at_five() {
        let races = vec![
            race("R1", "2025-06-01T10:00:00Z"),
            race("R2", "2025-06-02T10:00:00Z"),
            race("R3", "2025-06-03T10:00:00Z"),
            race("R4", "2025-06-04T10:00:00Z"),
        ];
        let horses = vec![
            horse("H1", "2025-06-02T12:00:00Z"),
            horse("H2", "2025-06-03T12:00:00Z"),
            horse("H3", "2025-06-04T12:00:00Z"),
        ];

        let feed = recent_activity(&races, &horses);
        assert_eq!(feed.len(), 5);
        assert_eq!(feed[0].description, "Horse \"H3\" added");
        assert_eq!(feed[0].kind, ActivityKind::Horse);
        assert_eq!(feed[1].description, "Race \"R4\" added");

        for pair in feed.windows(2) {
            assert!(pair[0].date >= pair[1].date);
        }
        // R1 and H1 fall outside the last-three and last-two windows
        assert!(!feed.iter().any(|a| a.description.contains("R1")));
        assert!(!feed.iter().any(|a| a.description.contains("H1")));
    }

    #[test]
    fn test_activity_ranks_races_by_created_at_not_stored_order() {
        // Stored order diverges from creation order after an import
        let races = vec![
            race("Newest", "2025-06-10T10:00:00Z"),
            race("Oldest", "2025-06-01T10:00:00Z"),
            race("Mid1", "2025-06-02T10:00:00Z"),
            race("Mid2", "2025-06-03T10:00:00Z"),
        ];

        let feed = recent_activity(&races, &[]);
        let descriptions: Vec<&str> = feed.iter().map(|a| a.description.as_str()).collect();
        assert_eq!(
            descriptions,
            vec![
                "Race \"Newest\" added",
                "Race \"Mid2\" added",
                "Race \"Mid1\" added",
            ]
        );
    }

    #[test]
    fn test_activity_excludes_unstamped_entries() {
        // A snapshot-built race with no createdAt, scheduled far ahead,
        // must not outrank stamped entries or appear at all.
        let mut ghost = race("Ghost", "2025-06-01T10:00:00Z");
        ghost.created_at = None;
        ghost.date = ts("2027-01-01T12:00:00Z");
        let real = race("Real", "2025-06-01T10:00:00Z");

        let mut phantom = horse("Phantom", "2025-06-01T10:00:00Z");
        phantom.created_at = None;

        let feed = recent_activity(&[ghost, real], &[phantom]);
        assert_eq!(feed.len(), 1);
        assert_eq!(feed[0].description, "Race \"Real\" added");
    }

    #[test]
    fn test_activity_includes_prediction_entries() {
        let predicted = with_prediction(
            race("Cup", "2025-06-01T10:00:00Z"),
            "Alpha",
            "2025-06-05T10:00:00Z",
        );

        let feed = recent_activity(&[predicted], &[]);
        let entry = feed
            .iter()
            .find(|a| a.kind == ActivityKind::Prediction)
            .unwrap();
        assert_eq!(entry.description, "Prediction made for \"Cup\"");
        assert_eq!(entry.date, ts("2025-06-05T10:00:00Z"));

        // The feed serializes the category under the `type` key
        let json = serde_json::to_value(entry).unwrap();
        assert_eq!(json["type"], "prediction");
    }
}
