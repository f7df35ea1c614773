//! Metric options offered per chronic condition.
//!
//! The catalog decides which metrics a user is prompted for and which unit
//! they are displayed in. It is independent of the classification thresholds.

use serde::Serialize;

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

use crate::entities::Condition;

/// A metric a user with a given condition can log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct MetricOption {
    pub metric_type: &'static str,
    pub label: &'static str,
    pub unit: &'static str,
}

const fn option(metric_type: &'static str, label: &'static str, unit: &'static str) -> MetricOption {
    MetricOption { metric_type, label, unit }
}

const DIABETES: [MetricOption; 3] = [
    option("bloodGlucose", "blood glucose", "mg/dL"),
    option("hba1c", "HbA1c", "%"),
    option("bloodPressure", "blood pressure", "mmHg"),
];

const HYPERTENSION: [MetricOption; 3] = [
    option("systolic", "systolic pressure", "mmHg"),
    option("diastolic", "diastolic pressure", "mmHg"),
    option("heartRate", "heart rate", "bpm"),
];

const COPD: [MetricOption; 3] = [
    option("oxygenSaturation", "oxygen saturation", "%"),
    option("peakFlow", "peak flow", "L/min"),
    option("respiratoryRate", "respiratory rate", "breaths/min"),
];

const CKD: [MetricOption; 3] = [
    option("creatinine", "creatinine", "mg/dL"),
    option("gfr", "GFR", "mL/min"),
    option("bloodPressure", "blood pressure", "mmHg"),
];

const CHF: [MetricOption; 3] = [
    option("weight", "weight", "kg"),
    option("bloodPressure", "blood pressure", "mmHg"),
    option("heartRate", "heart rate", "bpm"),
];

/// Metric options for a condition
pub fn options_for(condition: Condition) -> &'static [MetricOption] {
    match condition {
        Condition::Diabetes => &DIABETES,
        Condition::Hypertension => &HYPERTENSION,
        Condition::Copd => &COPD,
        Condition::Ckd => &CKD,
        Condition::Chf => &CHF,
    }
}

/// Display unit for a metric type, from the first condition that lists it
pub fn unit_for(metric_type: &str) -> Option<&'static str> {
    Condition::ALL
        .iter()
        .flat_map(|condition| options_for(*condition))
        .find(|option| option.metric_type == metric_type)
        .map(|option| option.unit)
}

/// Catalog entry for one condition
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct ConditionCatalog {
    pub condition: Condition,
    pub name: &'static str,
    pub metrics: Vec<MetricOption>,
}

impl ConditionCatalog {
    pub fn for_condition(condition: Condition) -> Self {
        Self {
            condition,
            name: condition.display_name(),
            metrics: options_for(condition).to_vec(),
        }
    }

    /// The whole catalog, one entry per condition
    pub fn all() -> Vec<Self> {
        Condition::ALL.into_iter().map(Self::for_condition).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_condition_has_three_options() {
        for condition in Condition::ALL {
            assert_eq!(options_for(condition).len(), 3, "{condition}");
        }
    }

    #[test]
    fn test_unit_for_known_types() {
        assert_eq!(unit_for("bloodPressure"), Some("mmHg"));
        assert_eq!(unit_for("bloodGlucose"), Some("mg/dL"));
        assert_eq!(unit_for("peakFlow"), Some("L/min"));
        assert_eq!(unit_for("steps"), None);
    }

    #[test]
    fn test_catalog_all_preserves_condition_order() {
        let catalog = ConditionCatalog::all();
        let conditions: Vec<Condition> = catalog.iter().map(|entry| entry.condition).collect();
        assert_eq!(conditions, Condition::ALL.to_vec());
        assert_eq!(catalog[2].name, "Chronic Obstructive Pulmonary Disease");
    }
}
