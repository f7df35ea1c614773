//! System health checks for the storage layer

use std::collections::HashMap;

use async_trait::async_trait;
use health_pulse_data::database;

/// System health status
#[derive(Debug, Clone, PartialEq)]
pub enum SystemStatus {
    Healthy,
    /// Functional with reduced capability, e.g. metrics kept in memory only
    Degraded,
    Unhealthy,
}

/// Component health status
#[derive(Debug, Clone, PartialEq)]
pub enum ComponentStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

/// A component with its status and optional details
#[derive(Debug, Clone)]
pub struct HealthComponent {
    pub status: ComponentStatus,
    pub details: Option<String>,
}

/// Overall health of the system
#[derive(Debug, Clone)]
pub struct SystemHealth {
    pub status: SystemStatus,
    /// Component name to health
    pub components: HashMap<String, HealthComponent>,
}

impl SystemHealth {
    /// Roll component statuses up into an overall status
    pub fn from_components(components: HashMap<String, HealthComponent>) -> Self {
        let status = if components.values().any(|c| c.status == ComponentStatus::Unhealthy) {
            SystemStatus::Unhealthy
        } else if components.values().any(|c| c.status == ComponentStatus::Degraded) {
            SystemStatus::Degraded
        } else {
            SystemStatus::Healthy
        };

        Self { status, components }
    }
}

/// Trait for health services
#[async_trait]
pub trait HealthServiceTrait: Send + Sync + std::fmt::Debug {
    /// Get the overall system health
    async fn get_system_health(&self) -> SystemHealth;

    /// Check the status of the database.
    /// `Ok(false)` means reachable but not reporting healthy.
    async fn check_database_status(&self) -> Result<bool, String>;
}

/// Check whether the metric database is available.
///
/// An uninitialized pool is an error: repositories are then running on
/// their in-memory fallback and data will not survive a restart.
pub async fn check_database_status() -> Result<bool, String> {
    match database::get_connection_info() {
        Some(info) => Ok(info.ends_with("healthy")),
        None => database::get_db_pool()
            .map(|_| true)
            .map_err(|e| format!("Database connection error: {}", e)),
    }
}

/// Health of the database component
pub async fn database_component() -> HealthComponent {
    match check_database_status().await {
        Ok(true) => HealthComponent {
            status: ComponentStatus::Healthy,
            details: database::get_connection_info(),
        },
        Ok(false) => HealthComponent {
            status: ComponentStatus::Degraded,
            details: database::get_connection_info(),
        },
        Err(e) => HealthComponent {
            status: ComponentStatus::Degraded,
            details: Some(format!("{}; metrics are held in memory", e)),
        },
    }
}

/// Get overall system health
pub async fn get_system_health() -> SystemHealth {
    let components = vec![("database".to_string(), database_component().await)]
        .into_iter()
        .collect();

    SystemHealth::from_components(components)
}
