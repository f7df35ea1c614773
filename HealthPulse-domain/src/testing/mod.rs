// Fixtures and mock implementations for tests.
// Available to this crate's tests and, with the "mock" feature, to dependents.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};

use health_pulse_data::repository::{MetricRepository, ProfileRepository};

use crate::entities::MetricRecord;
use crate::health::{ComponentStatus, HealthComponent, HealthServiceTrait, SystemHealth};
use crate::services::{MetricService, ProfileService};

/// Reference instant the fixtures count back from
pub fn fixture_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).single().unwrap_or_else(Utc::now)
}

/// A record taken `minutes_ago` minutes before [`fixture_now`]
pub fn metric(id: &str, metric_type: &str, value: &str, minutes_ago: i64) -> MetricRecord {
    MetricRecord {
        id: id.to_string(),
        metric_type: metric_type.to_string(),
        value: value.to_string(),
        unit: String::new(),
        notes: None,
        timestamp: fixture_now() - Duration::minutes(minutes_ago),
    }
}

/// A record at an explicit RFC 3339 instant
pub fn metric_at(id: &str, metric_type: &str, value: &str, timestamp: &str) -> MetricRecord {
    MetricRecord {
        timestamp: DateTime::parse_from_rfc3339(timestamp)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| fixture_now()),
        ..metric(id, metric_type, value, 0)
    }
}

/// Metric service over a fresh in-memory repository
pub fn in_memory_metric_service() -> MetricService<MetricRepository> {
    MetricService::new(Arc::new(MetricRepository::in_memory()))
}

/// Profile service over a fresh in-memory repository
pub fn in_memory_profile_service() -> ProfileService<ProfileRepository> {
    ProfileService::new(Arc::new(ProfileRepository::in_memory()))
}

/// Mock implementation of health services for testing system health
#[derive(Debug)]
pub struct MockHealthService {
    database_status: ComponentStatus,
    components: HashMap<String, HealthComponent>,
}

impl Default for MockHealthService {
    fn default() -> Self {
        Self::new()
    }
}

impl MockHealthService {
    /// Create a mock with every component healthy
    pub fn new() -> Self {
        Self {
            database_status: ComponentStatus::Healthy,
            components: HashMap::new(),
        }
    }

    pub fn with_degraded_database(mut self) -> Self {
        self.database_status = ComponentStatus::Degraded;
        self
    }

    pub fn with_unhealthy_database(mut self) -> Self {
        self.database_status = ComponentStatus::Unhealthy;
        self
    }

    /// Add a custom component with a specific status
    pub fn with_component(mut self, name: &str, status: ComponentStatus, details: Option<String>) -> Self {
        self.components.insert(name.to_string(), HealthComponent { status, details });
        self
    }
}

#[async_trait]
impl HealthServiceTrait for MockHealthService {
    async fn get_system_health(&self) -> SystemHealth {
        let mut components = self.components.clone();
        components.insert(
            "database".to_string(),
            HealthComponent {
                status: self.database_status.clone(),
                details: match self.database_status {
                    ComponentStatus::Healthy => None,
                    ComponentStatus::Degraded => Some("Metrics are held in memory".to_string()),
                    ComponentStatus::Unhealthy => Some("Database connection failed".to_string()),
                },
            },
        );

        SystemHealth::from_components(components)
    }

    async fn check_database_status(&self) -> Result<bool, String> {
        match self.database_status {
            ComponentStatus::Healthy => Ok(true),
            ComponentStatus::Degraded => Ok(false),
            ComponentStatus::Unhealthy => Err("Database connection failed".to_string()),
        }
    }
}

/// Factory function to create a mock health service
pub fn create_mock_health_service() -> impl HealthServiceTrait {
    MockHealthService::new()
}
