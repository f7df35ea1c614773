use chrono::{DateTime, SecondsFormat, Utc};

use crate::entities::metric::{CreateMetricRequest, MetricRecord};
use crate::entities::profile::UserProfile;
use health_pulse_data::models as data;

/// Conversion functions between domain entities and data models.
/// Functions follow the pattern convert_to_[target_layer]_[model_name].

/// Parse a stored RFC 3339 timestamp
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| format!("Invalid timestamp format: {}", raw))
}

/// Render a timestamp the way it is stored.
///
/// Fixed width with a `Z` suffix so that the text sorts in time order.
pub fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Convert a stored metric into a domain record
pub fn convert_to_domain_metric(record: data::MetricRecord) -> Result<MetricRecord, String> {
    let timestamp = parse_timestamp(&record.timestamp)?;

    Ok(MetricRecord {
        id: record.id,
        metric_type: record.metric_type,
        value: record.value,
        unit: record.unit,
        notes: record.notes,
        timestamp,
    })
}

/// Convert a validated create request into the data model.
///
/// `unit` and `timestamp` have already been resolved by the caller.
pub fn convert_to_data_create_request(
    request: &CreateMetricRequest,
    unit: String,
    timestamp: DateTime<Utc>,
) -> data::CreateMetricRequest {
    data::CreateMetricRequest {
        metric_type: request.metric_type.trim().to_string(),
        value: request.value.trim().to_string(),
        unit,
        notes: request.notes.clone(),
        timestamp: format_timestamp(&timestamp),
    }
}

/// Convert a stored profile into the domain entity
pub fn convert_to_domain_profile(profile: data::UserProfile) -> Result<UserProfile, String> {
    let condition = profile.condition.parse().map_err(|e| format!("{}", e))?;
    let created_at = parse_timestamp(&profile.created_at)?;

    Ok(UserProfile {
        user_id: profile.user_id,
        name: profile.name,
        email: profile.email,
        condition,
        created_at,
    })
}

/// Convert a domain profile into the data model
pub fn convert_to_data_profile(profile: &UserProfile) -> data::UserProfile {
    data::UserProfile {
        user_id: profile.user_id.clone(),
        name: profile.name.clone(),
        email: profile.email.clone(),
        condition: profile.condition.to_string(),
        created_at: format_timestamp(&profile.created_at),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::profile::Condition;
    use chrono::TimeZone;

    #[test]
    fn test_format_timestamp_is_fixed_width() {
        let early = Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap();
        let late = Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 1).unwrap();

        assert_eq!(format_timestamp(&early), "2024-03-01T08:00:00.000Z");
        assert!(format_timestamp(&early) < format_timestamp(&late));
    }

    #[test]
    fn test_convert_to_domain_metric() {
        let stored = data::MetricRecord {
            id: "m1".to_string(),
            user_id: "user-1".to_string(),
            metric_type: "bloodPressure".to_string(),
            value: "118".to_string(),
            unit: "mmHg".to_string(),
            notes: None,
            timestamp: "2024-03-01T10:00:00+02:00".to_string(),
        };

        let record = convert_to_domain_metric(stored).unwrap();
        assert_eq!(record.timestamp, Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap());
    }

    #[test]
    fn test_convert_to_domain_metric_rejects_bad_timestamp() {
        let stored = data::MetricRecord {
            id: "m1".to_string(),
            user_id: "user-1".to_string(),
            metric_type: "weight".to_string(),
            value: "80".to_string(),
            unit: "kg".to_string(),
            notes: None,
            timestamp: "yesterday".to_string(),
        };

        assert!(convert_to_domain_metric(stored).is_err());
    }

    #[test]
    fn test_profile_round_trip() {
        let profile = UserProfile {
            user_id: "user-1".to_string(),
            name: "Sam".to_string(),
            email: "sam@example.com".to_string(),
            condition: Condition::Chf,
            created_at: Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap(),
        };

        let stored = convert_to_data_profile(&profile);
        assert_eq!(stored.condition, "chf");
        assert_eq!(convert_to_domain_profile(stored).unwrap(), profile);
    }
}
