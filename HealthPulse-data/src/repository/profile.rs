use tracing::{debug, error};
use async_trait::async_trait;

use crate::models::UserProfile;
use crate::database::{get_db_pool, DatabasePool};
use super::errors::RepositoryError;
use super::in_memory::InMemoryStorage;
use super::storage::DatabaseStorage;

/// Repository trait for registration profiles
#[async_trait]
pub trait ProfileRepositoryTrait: Send + Sync {
    /// Insert or replace a profile
    async fn upsert(&self, profile: UserProfile) -> Result<UserProfile, RepositoryError>;

    /// Get a profile by user id
    async fn get(&self, user_id: &str) -> Result<Option<UserProfile>, RepositoryError>;
}

/// Profile repository backed by SQLite with an in-memory fallback
#[derive(Debug, Clone, Default)]
pub struct ProfileRepository {
    pool: Option<DatabasePool>,
    memory_only: bool,
    storage: InMemoryStorage,
}

impl ProfileRepository {
    /// Create a repository using the global database pool
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a repository bound to a dedicated pool
    pub fn with_pool(pool: DatabasePool) -> Self {
        Self { pool: Some(pool), ..Self::default() }
    }

    /// Create a repository that never touches a database
    pub fn in_memory() -> Self {
        Self { memory_only: true, ..Self::default() }
    }

    fn pool(&self) -> Option<DatabasePool> {
        if self.memory_only {
            return None;
        }
        if let Some(pool) = &self.pool {
            return Some(pool.clone());
        }
        match get_db_pool() {
            Ok(pool) => Some(pool),
            Err(e) => {
                debug!("Database not available ({}), using in-memory profile storage", e);
                None
            }
        }
    }
}

#[async_trait]
impl ProfileRepositoryTrait for ProfileRepository {
    async fn upsert(&self, profile: UserProfile) -> Result<UserProfile, RepositoryError> {
        match self.pool() {
            Some(pool) => match DatabaseStorage::store_profile(&pool, &profile).await {
                Ok(_) => {
                    // A copy written during an outage is now stale
                    self.storage.remove_profile(&profile.user_id).await?;
                    Ok(profile)
                },
                Err(e) => {
                    error!("Failed to store profile in database: {}", e);
                    self.storage.store_profile(&profile).await
                }
            },
            None => self.storage.store_profile(&profile).await,
        }
    }

    async fn get(&self, user_id: &str) -> Result<Option<UserProfile>, RepositoryError> {
        match self.pool() {
            Some(pool) => match DatabaseStorage::get_profile(&pool, user_id).await {
                // A fallback copy is newer than the database row
                Ok(stored) => match self.storage.get_profile(user_id).await? {
                    Some(profile) => Ok(Some(profile)),
                    None => Ok(stored),
                },
                Err(e) => {
                    error!("Failed to get profile from database: {}", e);
                    self.storage.get_profile(user_id).await
                }
            },
            None => self.storage.get_profile(user_id).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::create_in_memory_pool;

    fn profile(email: &str) -> UserProfile {
        UserProfile {
            user_id: "u1".to_string(),
            name: "Sam".to_string(),
            email: email.to_string(),
            condition: "copd".to_string(),
            created_at: "2024-03-01T08:00:00.000Z".to_string(),
        }
    }

    fn execute(pool: &DatabasePool, sql: &str) {
        let DatabasePool::SQLite(pool) = pool;
        pool.get().unwrap().execute(sql, []).unwrap();
    }

    #[tokio::test]
    async fn test_upsert_then_get() {
        let repo = ProfileRepository::in_memory();
        let profile = profile("sam@example.com");

        repo.upsert(profile.clone()).await.unwrap();

        assert_eq!(repo.get("u1").await.unwrap(), Some(profile));
        assert_eq!(repo.get("u2").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_profile_written_during_outage_survives_recovery() {
        let pool = create_in_memory_pool().unwrap();
        let repo = ProfileRepository::with_pool(pool.clone());
        repo.upsert(profile("old@example.com")).await.unwrap();

        execute(&pool, "ALTER TABLE user_profiles RENAME TO user_profiles_offline");
        repo.upsert(profile("new@example.com")).await.unwrap();
        execute(&pool, "ALTER TABLE user_profiles_offline RENAME TO user_profiles");

        assert_eq!(repo.get("u1").await.unwrap().unwrap().email, "new@example.com");

        repo.upsert(profile("latest@example.com")).await.unwrap();
        assert_eq!(repo.get("u1").await.unwrap().unwrap().email, "latest@example.com");
    }
}
