use rusqlite::{params, OptionalExtension, Row};
use tracing::debug;

use crate::models::{MetricRecord, UserProfile};
use crate::database::DatabasePool;
use super::errors::RepositoryError;

/// Database storage operations for metrics and profiles
pub struct DatabaseStorage;

fn metric_from_row(row: &Row<'_>) -> rusqlite::Result<MetricRecord> {
    Ok(MetricRecord {
        id: row.get(0)?,
        user_id: row.get(1)?,
        metric_type: row.get(2)?,
        value: row.get(3)?,
        unit: row.get(4)?,
        notes: row.get(5)?,
        timestamp: row.get(6)?,
    })
}

impl DatabaseStorage {
    /// Store a metric record in the database
    pub async fn store_metric(pool: &DatabasePool, record: &MetricRecord) -> Result<(), RepositoryError> {
        debug!("Storing metric in database: id={}", record.id);

        match pool {
            DatabasePool::SQLite(pool) => {
                let conn = pool.get()?;

                conn.execute(
                    "INSERT INTO health_metrics
                     (id, user_id, metric_type, value, unit, notes, timestamp)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                    params![
                        record.id,
                        record.user_id,
                        record.metric_type,
                        record.value,
                        record.unit,
                        record.notes,
                        record.timestamp,
                    ],
                )?;

                Ok(())
            },
        }
    }

    /// Get a user's records, newest first
    pub async fn get_recent(
        pool: &DatabasePool,
        user_id: &str,
        limit: Option<usize>,
    ) -> Result<Vec<MetricRecord>, RepositoryError> {
        debug!("Getting metrics from database: user={}, limit={:?}", user_id, limit);

        match pool {
            DatabasePool::SQLite(pool) => {
                let conn = pool.get()?;

                // SQLite treats a negative LIMIT as "no limit"
                let limit = limit.map(|l| l as i64).unwrap_or(-1);

                let mut stmt = conn.prepare(
                    "SELECT id, user_id, metric_type, value, unit, notes, timestamp
                     FROM health_metrics WHERE user_id = ?1
                     ORDER BY timestamp DESC, rowid ASC LIMIT ?2"
                )?;

                let records = stmt
                    .query_map(params![user_id, limit], metric_from_row)?
                    .collect::<Result<Vec<_>, _>>()?;

                Ok(records)
            },
        }
    }

    /// Delete every record a user owns
    pub async fn delete_all(pool: &DatabasePool, user_id: &str) -> Result<usize, RepositoryError> {
        debug!("Deleting all metrics from database: user={}", user_id);

        match pool {
            DatabasePool::SQLite(pool) => {
                let conn = pool.get()?;
                let deleted = conn.execute(
                    "DELETE FROM health_metrics WHERE user_id = ?1",
                    params![user_id],
                )?;
                Ok(deleted)
            },
        }
    }

    /// Insert or replace a profile
    pub async fn store_profile(pool: &DatabasePool, profile: &UserProfile) -> Result<(), RepositoryError> {
        debug!("Storing profile in database: user={}", profile.user_id);

        match pool {
            DatabasePool::SQLite(pool) => {
                let conn = pool.get()?;
                conn.execute(
                    "INSERT OR REPLACE INTO user_profiles
                     (user_id, name, email, condition, created_at)
                     VALUES (?1, ?2, ?3, ?4, ?5)",
                    params![
                        profile.user_id,
                        profile.name,
                        profile.email,
                        profile.condition,
                        profile.created_at,
                    ],
                )?;
                Ok(())
            },
        }
    }

    /// Get a profile by user id
    pub async fn get_profile(pool: &DatabasePool, user_id: &str) -> Result<Option<UserProfile>, RepositoryError> {
        match pool {
            DatabasePool::SQLite(pool) => {
                let conn = pool.get()?;
                let profile = conn
                    .query_row(
                        "SELECT user_id, name, email, condition, created_at
                         FROM user_profiles WHERE user_id = ?1",
                        params![user_id],
                        |row| {
                            Ok(UserProfile {
                                user_id: row.get(0)?,
                                name: row.get(1)?,
                                email: row.get(2)?,
                                condition: row.get(3)?,
                                created_at: row.get(4)?,
                            })
                        },
                    )
                    .optional()?;
                Ok(profile)
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::create_in_memory_pool;

    fn record(id: &str, user_id: &str, value: &str, timestamp: &str) -> MetricRecord {
        MetricRecord {
            id: id.to_string(),
            user_id: user_id.to_string(),
            metric_type: "bloodPressure".to_string(),
            value: value.to_string(),
            unit: "mmHg".to_string(),
            notes: None,
            timestamp: timestamp.to_string(),
        }
    }

    #[tokio::test]
    async fn test_store_and_read_back_newest_first() {
        let pool = create_in_memory_pool().unwrap();

        DatabaseStorage::store_metric(&pool, &record("a", "u1", "118", "2024-03-01T08:00:00.000Z")).await.unwrap();
        DatabaseStorage::store_metric(&pool, &record("b", "u1", "131", "2024-03-03T08:00:00.000Z")).await.unwrap();
        DatabaseStorage::store_metric(&pool, &record("c", "u2", "150", "2024-03-02T08:00:00.000Z")).await.unwrap();

        let records = DatabaseStorage::get_recent(&pool, "u1", None).await.unwrap();
        let ids: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);

        let limited = DatabaseStorage::get_recent(&pool, "u1", Some(1)).await.unwrap();
        assert_eq!(limited.len(), 1);
        assert_eq!(limited[0].id, "b");
    }

    #[tokio::test]
    async fn test_delete_all_only_touches_one_user() {
        let pool = create_in_memory_pool().unwrap();

        DatabaseStorage::store_metric(&pool, &record("a", "u1", "118", "2024-03-01T08:00:00.000Z")).await.unwrap();
        DatabaseStorage::store_metric(&pool, &record("b", "u2", "131", "2024-03-03T08:00:00.000Z")).await.unwrap();

        let deleted = DatabaseStorage::delete_all(&pool, "u1").await.unwrap();
        assert_eq!(deleted, 1);
        assert!(DatabaseStorage::get_recent(&pool, "u1", None).await.unwrap().is_empty());
        assert_eq!(DatabaseStorage::get_recent(&pool, "u2", None).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_profile_upsert() {
        let pool = create_in_memory_pool().unwrap();
        let mut profile = UserProfile {
            user_id: "u1".to_string(),
            name: "Sam".to_string(),
            email: "sam@example.com".to_string(),
            condition: "diabetes".to_string(),
            created_at: "2024-03-01T08:00:00.000Z".to_string(),
        };

        DatabaseStorage::store_profile(&pool, &profile).await.unwrap();
        profile.condition = "ckd".to_string();
        DatabaseStorage::store_profile(&pool, &profile).await.unwrap();

        let stored = DatabaseStorage::get_profile(&pool, "u1").await.unwrap().unwrap();
        assert_eq!(stored.condition, "ckd");
        assert!(DatabaseStorage::get_profile(&pool, "u2").await.unwrap().is_none());
    }
}
