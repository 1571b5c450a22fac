//! Prediction heuristic: odds- and weight-informed random scoring.
//!
//! No trained model and no form history exist, so picks are deliberately
//! noisy. Short odds and light carried weight tilt the scores; the rest
//! is uniform noise.

use rand::Rng;

use crate::types::{Prediction, PredictionFactors, Race, RaceEntry};

/// How many picks a stored prediction keeps.
pub const MAX_PICKS: usize = 3;

/// Confidence floor.
pub const MIN_CONFIDENCE: f64 = 0.10;
/// Confidence ceiling.
pub const MAX_CONFIDENCE: f64 = 0.95;

/// Score a single entry.
///
/// Base score is uniform in [0, 100). Odds under 20 add up to 40 points,
/// carried weight under 60 adds up to 30, and a final jitter term breaks
/// ties. An odds or weight string that does not parse contributes nothing.
fn score_entry(entry: &RaceEntry, rng: &mut impl Rng) -> f64 {
    let mut score: f64 = rng.random_range(0.0..100.0);

    if let Ok(odds) = entry.odds.trim().parse::<f64>() {
        score += (20.0 - odds.min(20.0)) * 2.0;
    }
    if let Ok(weight) = entry.weight.trim().parse::<f64>() {
        score += (60.0 - weight.min(60.0)) * 0.5;
    }

    score + rng.random_range(-10.0..10.0)
}

/// Score every entry of a race and keep the top picks.
///
/// # Arguments
/// * `race` - Race whose embedded entries are scored
/// * `rng` - Randomness source; tests pass a seeded generator
///
/// # Returns
/// At most [`MAX_PICKS`] predictions, sorted by confidence descending,
/// each confidence clamped to [[`MIN_CONFIDENCE`], [`MAX_CONFIDENCE`]].
/// An empty entry list yields an empty vector.
pub fn score_entries(race: &Race, rng: &mut impl Rng) -> Vec<Prediction> {
    let mut predictions: Vec<Prediction> = race
        .horses
        .iter()
        .map(|entry| {
            let score = score_entry(entry, rng);
            Prediction {
                horse: entry.name.clone(),
                confidence: (score / 100.0).clamp(MIN_CONFIDENCE, MAX_CONFIDENCE),
                factors: PredictionFactors {
                    odds: entry.odds.clone(),
                    weight: entry.weight.clone(),
                    form: "Unknown".to_string(),
                },
            }
        })
        .collect();

    // Sort by confidence descending
    predictions.sort_by(|a, b| b.confidence.partial_cmp(&a.confidence).unwrap());
    predictions.truncate(MAX_PICKS);
    predictions
}

/// [`score_entries`] over the thread RNG.
pub fn generate_prediction(race: &Race) -> Vec<Prediction> {
    score_entries(race, &mut rand::rng())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn entry(name: &str, odds: &str, weight: &str, number: u32) -> RaceEntry {
        RaceEntry {
            name: name.to_string(),
            jockey: format!("Jockey {}", number),
            weight: weight.to_string(),
            odds: odds.to_string(),
            number,
        }
    }

    fn race_with(horses: Vec<RaceEntry>) -> Race {
        Race {
            id: "1".to_string(),
            name: "Test Stakes".to_string(),
            track: "Keeneland".to_string(),
            date: Utc::now(),
            distance: 1600,
            race_number: 1,
            prize_money: 10_000.0,
            horses,
            source: None,
            created_at: None,
            predictions: None,
            predicted_at: None,
            results: None,
            completed_at: None,
        }
    }

    fn full_card() -> Race {
        race_with(vec![
            entry("Alpha", "2.5", "53.0", 1),
            entry("Bravo", "6.0", "55.5", 2),
            entry("Charlie", "11.0", "57.0", 3),
            entry("Delta", "15.5", "54.0", 4),
            entry("Echo", "19.0", "58.5", 5),
            entry("Foxtrot", "25.0", "56.0", 6),
        ])
    }

    #[test]
    fn test_predictions_capped_at_three() {
        let mut rng = StdRng::seed_from_u64(7);
        let predictions = score_entries(&full_card(), &mut rng);
        assert_eq!(predictions.len(), MAX_PICKS);
    }

    #[test]
    fn test_confidence_bounded_and_sorted() {
        for seed in 0..50 {
            let mut rng = StdRng::seed_from_u64(seed);
            let predictions = score_entries(&full_card(), &mut rng);

            for p in &predictions {
                assert!(p.confidence >= MIN_CONFIDENCE && p.confidence <= MAX_CONFIDENCE);
                assert_eq!(p.factors.form, "Unknown");
            }
            for pair in predictions.windows(2) {
                assert!(pair[0].confidence >= pair[1].confidence);
            }
        }
    }

    #[test]
    fn test_empty_entry_list_yields_no_predictions() {
        let mut rng = StdRng::seed_from_u64(7);
        assert!(score_entries(&race_with(Vec::new()), &mut rng).is_empty());
    }

    #[test]
    fn test_unparseable_odds_and_weight_still_scored() {
        let mut rng = StdRng::seed_from_u64(7);
        let race = race_with(vec![entry("Mystery", "N/A", "unknown", 1)]);

        let predictions = score_entries(&race, &mut rng);
        assert_eq!(predictions.len(), 1);
        assert!(predictions[0].confidence >= MIN_CONFIDENCE);
        assert_eq!(predictions[0].factors.odds, "N/A");
    }

    #[test]
    fn test_short_odds_favored_on_average() {
        let race = race_with(vec![
            entry("Favorite", "2.0", "55.0", 1),
            entry("Longshot", "20.0", "55.0", 2),
        ]);

        let mut favorite_on_top = 0;
        for seed in 0..200 {
            let mut rng = StdRng::seed_from_u64(seed);
            let predictions = score_entries(&race, &mut rng);
            if predictions[0].horse == "Favorite" {
                favorite_on_top += 1;
            }
        }

        // The odds bonus gives the favorite a 36-point head start, which
        // dominates the noise terms far more often than not.
        assert!(
            favorite_on_top > 120,
            "favorite ranked first only {}/200 times",
            favorite_on_top
        );
    }
}
