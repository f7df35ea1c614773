//! Rule-based classification of the most recent metric.
//!
//! Each metric type maps to a closed row of inclusive upper bounds. A value is
//! placed in the first band whose bound it does not exceed; values above every
//! bound fall into the row's final tier. Types without a row get the fallback
//! assessment.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use tracing::debug;

use crate::entities::{ClassificationReport, InvalidValue, MetricRecord, Prediction, RiskTier};

/// Outcome of running one value through the threshold table
#[derive(Debug, Clone, PartialEq)]
pub struct Assessment {
    pub risk_tier: RiskTier,
    pub judgment: String,
    pub confidence_percent: u8,
}

impl Assessment {
    pub fn new(risk_tier: RiskTier, judgment: impl Into<String>, confidence_percent: u8) -> Self {
        Self {
            risk_tier,
            judgment: judgment.into(),
            confidence_percent: confidence_percent.min(100),
        }
    }
}

/// Threshold row for one metric type
#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdRule {
    metric_type: String,
    /// Inclusive upper bounds, ascending
    bands: Vec<(f64, Assessment)>,
    above: Assessment,
}

impl ThresholdRule {
    /// Start a row whose values above every band get `above`
    pub fn new(metric_type: impl Into<String>, above: Assessment) -> Self {
        Self {
            metric_type: metric_type.into(),
            bands: Vec::new(),
            above,
        }
    }

    /// Add a band covering values up to and including `upper`
    pub fn up_to(mut self, upper: f64, assessment: Assessment) -> Self {
        self.bands.push((upper, assessment));
        self.bands.sort_by(|a, b| a.0.total_cmp(&b.0));
        self
    }

    pub fn metric_type(&self) -> &str {
        &self.metric_type
    }

    pub fn assess(&self, value: f64) -> &Assessment {
        self.bands
            .iter()
            .find(|(upper, _)| value <= *upper)
            .map(|(_, assessment)| assessment)
            .unwrap_or(&self.above)
    }
}

/// Lookup table from metric type to threshold row
#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdTable {
    rules: HashMap<String, ThresholdRule>,
    fallback: Assessment,
}

impl ThresholdTable {
    /// A table with no rows; every type gets `fallback`
    pub fn empty(fallback: Assessment) -> Self {
        Self {
            rules: HashMap::new(),
            fallback,
        }
    }

    /// Blood pressure and blood glucose rows
    pub fn standard() -> Self {
        let blood_pressure = ThresholdRule::new(
            "bloodPressure",
            Assessment::new(RiskTier::High, "blood pressure requires attention", 90),
        )
        .up_to(120.0, Assessment::new(RiskTier::Low, "blood pressure is normal", 85))
        .up_to(140.0, Assessment::new(RiskTier::Medium, "blood pressure is slightly elevated", 88));

        let blood_glucose = ThresholdRule::new(
            "bloodGlucose",
            Assessment::new(RiskTier::High, "blood glucose requires immediate attention", 90),
        )
        .up_to(140.0, Assessment::new(RiskTier::Low, "blood glucose is normal", 85))
        .up_to(200.0, Assessment::new(RiskTier::Medium, "blood glucose is moderately elevated", 88));

        Self::empty(Assessment::new(RiskTier::Low, "Values are within normal range", 85))
            .with_rule(blood_pressure)
            .with_rule(blood_glucose)
    }

    /// Add or replace the row for a metric type
    pub fn with_rule(mut self, rule: ThresholdRule) -> Self {
        self.rules.insert(rule.metric_type().to_string(), rule);
        self
    }

    pub fn rule_for(&self, metric_type: &str) -> Option<&ThresholdRule> {
        self.rules.get(metric_type)
    }

    pub fn assess(&self, metric_type: &str, value: f64) -> &Assessment {
        match self.rules.get(metric_type) {
            Some(rule) => rule.assess(value),
            None => &self.fallback,
        }
    }
}

impl Default for ThresholdTable {
    fn default() -> Self {
        Self::standard()
    }
}

static STANDARD_ENGINE: Lazy<ClassificationEngine> = Lazy::new(ClassificationEngine::default);

/// Produces predictions from a metric history
#[derive(Debug, Clone, Default)]
pub struct ClassificationEngine {
    table: ThresholdTable,
}

impl ClassificationEngine {
    pub fn new(table: ThresholdTable) -> Self {
        Self { table }
    }

    /// Shared engine over the standard table
    pub fn standard() -> &'static Self {
        &STANDARD_ENGINE
    }

    pub fn table(&self) -> &ThresholdTable {
        &self.table
    }

    /// Assess a single record
    pub fn assess(&self, record: &MetricRecord) -> Result<&Assessment, InvalidValue> {
        let value = record.parsed_value()?;
        Ok(self.table.assess(&record.metric_type, value))
    }

    /// Classify the most recent valid record of a time-descending history.
    ///
    /// Records ahead of it whose value does not parse are counted in
    /// `skipped_invalid`. An empty history, or one with no valid record,
    /// yields no prediction.
    pub fn classify(&self, history: &[MetricRecord]) -> ClassificationReport {
        let mut skipped_invalid = 0;

        for record in history {
            match self.assess(record) {
                Ok(assessment) => {
                    debug!(
                        "Classified record {} as {} after skipping {} invalid record(s)",
                        record.id,
                        assessment.risk_tier.as_str(),
                        skipped_invalid
                    );
                    return ClassificationReport {
                        predictions: vec![Prediction {
                            id: record.id.clone(),
                            title: format!("{} analysis", record.metric_type),
                            metric_type: record.metric_type.clone(),
                            risk_tier: assessment.risk_tier,
                            judgment: assessment.judgment.clone(),
                            confidence_percent: assessment.confidence_percent,
                        }],
                        skipped_invalid,
                    };
                }
                Err(e) => {
                    debug!("Not classifying record {}: {}", record.id, e);
                    skipped_invalid += 1;
                }
            }
        }

        ClassificationReport {
            predictions: Vec::new(),
            skipped_invalid,
        }
    }
}

/// Classify a history with the standard table
pub fn classify(history: &[MetricRecord]) -> ClassificationReport {
    ClassificationEngine::standard().classify(history)
}
