// HealthPulse Data
// This crate owns metric storage, user profiles and the per-user change feed

// Database connection management
pub mod database;

// Repository implementations for data access
pub mod repository;

// Data storage models
pub mod models;
