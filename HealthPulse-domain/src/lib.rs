// HealthPulse Domain
// Classification, trend and scoring engines plus the services built on them

// Domain entities
pub mod entities;

// Threshold-table classification, trends, health score and dashboard composition
pub mod services;

// Condition catalog
pub mod catalog;

// Push delivery of history snapshots
pub mod subscription;

// Authentication
pub mod auth;

// Health checks and system status
pub mod health;

// Re-export the database module from the data crate for convenience
pub use health_pulse_data::database;

// Testing utilities - available to dependents with the mock feature
#[cfg(any(test, feature = "mock"))]
pub mod testing;
