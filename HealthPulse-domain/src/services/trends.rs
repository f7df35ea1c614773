use indexmap::IndexMap;
use tracing::debug;

use crate::entities::{MetricRecord, TrendPoint, TrendReport};

/// Short chart label, e.g. "Mar 05"
pub const TREND_DATE_FORMAT: &str = "%b %d";

/// Group a history into one chart series per metric type.
///
/// Series appear in the order their type is first seen and keep the input
/// order of their points. Records whose value does not parse are left out,
/// so a type with only invalid records gets no series at all.
pub fn aggregate_by_type(history: &[MetricRecord]) -> TrendReport {
    let mut series: IndexMap<String, Vec<TrendPoint>> = IndexMap::new();
    let mut skipped_invalid = 0;

    for record in history {
        let value = match record.parsed_value() {
            Ok(value) => value,
            Err(e) => {
                debug!("Leaving record {} out of trends: {}", record.id, e);
                skipped_invalid += 1;
                continue;
            }
        };

        series
            .entry(record.metric_type.clone())
            .or_default()
            .push(TrendPoint {
                id: record.id.clone(),
                date: record.timestamp.format(TREND_DATE_FORMAT).to_string(),
                timestamp: record.timestamp,
                value,
                unit: record.unit.clone(),
                notes: record.notes.clone(),
            });
    }

    TrendReport {
        series,
        skipped_invalid,
    }
}
