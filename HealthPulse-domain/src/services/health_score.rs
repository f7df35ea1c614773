//! Deterministic composite health score.
//!
//! Each valid record in the recent window is run through the threshold table
//! and its tier converted to points. The score is the mean of those points
//! weighted by recency, so the newest reading counts most.

use tracing::debug;

use crate::entities::{HealthScore, MetricRecord, RiskLevel, RiskTier};
use crate::services::classification::ThresholdTable;

/// Records considered by the estimator
pub const SCORE_WINDOW: usize = 10;

/// Weight ratio between consecutive records, newest first
pub const RECENCY_DECAY: f64 = 0.85;

/// Points contributed by a record of the given tier
pub fn tier_points(tier: RiskTier) -> f64 {
    match tier {
        RiskTier::Low => 100.0,
        RiskTier::Medium => 65.0,
        RiskTier::High => 30.0,
    }
}

/// Computes a health score from recent records
#[derive(Debug, Clone)]
pub struct HealthScoreEstimator {
    table: ThresholdTable,
    window: usize,
    decay: f64,
}

impl Default for HealthScoreEstimator {
    fn default() -> Self {
        Self::new(ThresholdTable::standard())
    }
}

impl HealthScoreEstimator {
    pub fn new(table: ThresholdTable) -> Self {
        Self {
            table,
            window: SCORE_WINDOW,
            decay: RECENCY_DECAY,
        }
    }

    pub fn window(&self) -> usize {
        self.window
    }

    /// Score the first `window` records of a time-descending history
    pub fn estimate(&self, recent: &[MetricRecord]) -> HealthScore {
        let mut weighted_sum = 0.0;
        let mut weight_total = 0.0;
        let mut weight = 1.0;
        let mut assessed_count = 0;
        let mut skipped_invalid = 0;

        for record in recent.iter().take(self.window) {
            let value = match record.parsed_value() {
                Ok(value) => value,
                Err(_) => {
                    skipped_invalid += 1;
                    continue;
                }
            };

            let assessment = self.table.assess(&record.metric_type, value);
            weighted_sum += tier_points(assessment.risk_tier) * weight;
            weight_total += weight;
            weight *= self.decay;
            assessed_count += 1;
        }

        if assessed_count == 0 {
            return HealthScore::no_data(skipped_invalid);
        }

        let score = (weighted_sum / weight_total).round().clamp(0.0, 100.0) as u8;
        debug!(
            "Health score {} from {} record(s), {} skipped",
            score, assessed_count, skipped_invalid
        );

        HealthScore {
            score: Some(score),
            risk_level: RiskLevel::from_score(score),
            assessed_count,
            skipped_invalid,
        }
    }
}

/// Score a time-descending history with the standard table
pub fn estimate_health_score(recent: &[MetricRecord]) -> HealthScore {
    HealthScoreEstimator::default().estimate(recent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::metric;

    #[test]
    fn test_empty_history_is_no_data() {
        let score = estimate_health_score(&[]);
        assert_eq!(score, HealthScore::no_data(0));
    }

    #[test]
    fn test_all_invalid_is_no_data() {
        let history = vec![metric("1", "bloodPressure", "?", 0), metric("2", "weight", "heavy", 10)];

        let score = estimate_health_score(&history);
        assert_eq!(score.score, None);
        assert_eq!(score.risk_level, RiskLevel::NoData);
        assert_eq!(score.skipped_invalid, 2);
    }

    #[test]
    fn test_all_low_scores_full_marks() {
        let history: Vec<_> = (0..5)
            .map(|i| metric(&i.to_string(), "bloodPressure", "110", i * 10))
            .collect();

        let score = estimate_health_score(&history);
        assert_eq!(score.score, Some(100));
        assert_eq!(score.risk_level, RiskLevel::Low);
        assert_eq!(score.assessed_count, 5);
    }

    #[test]
    fn test_single_high_reading() {
        let score = estimate_health_score(&[metric("1", "bloodGlucose", "260", 0)]);
        assert_eq!(score.score, Some(30));
        assert_eq!(score.risk_level, RiskLevel::High);
    }

    #[test]
    fn test_recent_records_weigh_more() {
        // high then low: (30 * 1 + 100 * 0.85) / 1.85 = 62.16
        let worsening = vec![
            metric("1", "bloodPressure", "150", 0),
            metric("2", "bloodPressure", "110", 10),
        ];
        // low then high: (100 * 1 + 30 * 0.85) / 1.85 = 67.84
        let improving = vec![
            metric("1", "bloodPressure", "110", 0),
            metric("2", "bloodPressure", "150", 10),
        ];

        assert_eq!(estimate_health_score(&worsening).score, Some(62));
        assert_eq!(estimate_health_score(&improving).score, Some(68));
        assert_eq!(estimate_health_score(&worsening).risk_level, RiskLevel::Medium);
    }

    #[test]
    fn test_only_window_is_considered() {
        let mut history: Vec<_> = (0..SCORE_WINDOW)
            .map(|i| metric(&i.to_string(), "bloodPressure", "110", i as i64 * 10))
            .collect();
        history.push(metric("old", "bloodPressure", "200", 1000));

        let score = estimate_health_score(&history);
        assert_eq!(score.score, Some(100));
        assert_eq!(score.assessed_count, SCORE_WINDOW);
    }

    #[test]
    fn test_score_is_deterministic() {
        let history = vec![
            metric("1", "bloodGlucose", "180", 0),
            metric("2", "heartRate", "70", 10),
            metric("3", "bloodPressure", "not a number", 20),
            metric("4", "bloodPressure", "135", 30),
        ];

        let first = estimate_health_score(&history);
        for _ in 0..10 {
            assert_eq!(estimate_health_score(&history), first);
        }
        assert_eq!(first.skipped_invalid, 1);
        assert!(first.score.is_some_and(|s| s <= 100));
    }
}
