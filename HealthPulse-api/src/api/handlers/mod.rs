pub mod catalog;
pub mod dashboard;
pub mod health;
pub mod metrics;
pub mod profile;

// Tests module
#[cfg(test)]
pub(crate) mod tests;

// Re-export handlers for easier imports
pub use health::health_check;
