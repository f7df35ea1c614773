// Public entities for the HealthPulse API
// Request and response shapes that exist only at the HTTP boundary

// Error responses
pub mod common;

// Metric query and reset payloads
pub mod metric;
