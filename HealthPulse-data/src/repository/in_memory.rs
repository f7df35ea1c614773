use std::sync::{Arc, Mutex};
use std::collections::HashMap;

use crate::models::{MetricRecord, UserProfile};
use super::errors::RepositoryError;

/// In-memory storage for metrics and profiles, keyed by user
#[derive(Debug, Clone)]
pub struct InMemoryStorage {
    /// Metric records per user, in insertion order
    metrics: Arc<Mutex<HashMap<String, Vec<MetricRecord>>>>,

    /// Profiles per user
    profiles: Arc<Mutex<HashMap<String, UserProfile>>>,
}

impl Default for InMemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStorage {
    /// Create a new in-memory storage
    pub fn new() -> Self {
        Self {
            metrics: Arc::new(Mutex::new(HashMap::new())),
            profiles: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Store a metric record in memory
    pub async fn store_metric(&self, record: &MetricRecord) -> Result<MetricRecord, RepositoryError> {
        let mut store = self.metrics.lock()?;
        store.entry(record.user_id.clone()).or_default().push(record.clone());
        Ok(record.clone())
    }

    /// Get a user's records, newest first, optionally truncated
    pub async fn get_recent(&self, user_id: &str, limit: Option<usize>) -> Result<Vec<MetricRecord>, RepositoryError> {
        let store = self.metrics.lock()?;

        let mut records: Vec<MetricRecord> = store.get(user_id).cloned().unwrap_or_default();
        // Stable sort keeps insertion order for equal timestamps
        records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

        if let Some(limit) = limit {
            records.truncate(limit);
        }

        Ok(records)
    }

    /// Remove every record a user owns, returning how many were removed
    pub async fn delete_all(&self, user_id: &str) -> Result<usize, RepositoryError> {
        let mut store = self.metrics.lock()?;
        Ok(store.remove(user_id).map(|records| records.len()).unwrap_or(0))
    }

    /// Insert or replace a profile
    pub async fn store_profile(&self, profile: &UserProfile) -> Result<UserProfile, RepositoryError> {
        let mut store = self.profiles.lock()?;
        store.insert(profile.user_id.clone(), profile.clone());
        Ok(profile.clone())
    }

    /// Drop a profile, returning whether one was held
    pub async fn remove_profile(&self, user_id: &str) -> Result<bool, RepositoryError> {
        let mut store = self.profiles.lock()?;
        Ok(store.remove(user_id).is_some())
    }

    /// Get a profile by user id
    pub async fn get_profile(&self, user_id: &str) -> Result<Option<UserProfile>, RepositoryError> {
        let store = self.profiles.lock()?;
        Ok(store.get(user_id).cloned())
    }
}
