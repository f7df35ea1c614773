use tokio::sync::watch;
use tracing::{debug, error};
use uuid::Uuid;
use async_trait::async_trait;

use crate::models::{CreateMetricRequest, MetricRecord};
use crate::database::{get_db_pool, DatabasePool};
use super::errors::RepositoryError;
use super::in_memory::InMemoryStorage;
use super::notifier::ChangeNotifier;
use super::storage::DatabaseStorage;

/// Store contract for a user's metric history.
///
/// Records are append-only; the only removal is a bulk wipe of one user's
/// history. Every successful write is published on the user's change feed.
#[async_trait]
pub trait MetricRepositoryTrait: Send + Sync {
    /// Append a metric, assigning it a fresh id
    async fn append(&self, user_id: &str, request: CreateMetricRequest) -> Result<MetricRecord, RepositoryError>;

    /// Get a user's records ordered by timestamp descending
    async fn get_recent(&self, user_id: &str, limit: Option<usize>) -> Result<Vec<MetricRecord>, RepositoryError>;

    /// Irreversibly delete a user's entire history
    async fn delete_all(&self, user_id: &str) -> Result<usize, RepositoryError>;

    /// Subscribe to change notifications for a user's history
    fn watch_changes(&self, user_id: &str) -> watch::Receiver<u64>;
}

/// Where the repository keeps its records
#[derive(Debug, Clone)]
enum Backend {
    /// The process-wide pool, falling back to memory when it is unavailable
    GlobalPool,
    /// A dedicated pool
    Pool(DatabasePool),
    /// Memory only
    Memory,
}

/// Metric repository backed by SQLite with an in-memory fallback.
///
/// A write the database rejects is kept in memory and merged into every
/// later read, so an accepted record never disappears from the history.
#[derive(Debug, Clone)]
pub struct MetricRepository {
    backend: Backend,
    /// In-memory storage for when the database is not available
    storage: InMemoryStorage,
    notifier: ChangeNotifier,
}

impl Default for MetricRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricRepository {
    /// Create a repository using the global database pool
    pub fn new() -> Self {
        Self::with_backend(Backend::GlobalPool)
    }

    /// Create a repository bound to a dedicated pool
    pub fn with_pool(pool: DatabasePool) -> Self {
        Self::with_backend(Backend::Pool(pool))
    }

    /// Create a repository that never touches a database
    pub fn in_memory() -> Self {
        Self::with_backend(Backend::Memory)
    }

    fn with_backend(backend: Backend) -> Self {
        Self {
            backend,
            storage: InMemoryStorage::new(),
            notifier: ChangeNotifier::new(),
        }
    }

    fn pool(&self) -> Option<DatabasePool> {
        match &self.backend {
            Backend::Pool(pool) => Some(pool.clone()),
            Backend::GlobalPool => match get_db_pool() {
                Ok(pool) => Some(pool),
                Err(e) => {
                    debug!("Database not available ({}), using in-memory storage", e);
                    None
                }
            },
            Backend::Memory => None,
        }
    }

    async fn store(&self, record: &MetricRecord) -> Result<MetricRecord, RepositoryError> {
        match self.pool() {
            Some(pool) => {
                match DatabaseStorage::store_metric(&pool, record).await {
                    Ok(_) => Ok(record.clone()),
                    Err(e) => {
                        error!("Failed to store metric in database: {}", e);
                        self.storage.store_metric(record).await
                    }
                }
            },
            None => self.storage.store_metric(record).await,
        }
    }
}

#[async_trait]
impl MetricRepositoryTrait for MetricRepository {
    async fn append(&self, user_id: &str, request: CreateMetricRequest) -> Result<MetricRecord, RepositoryError> {
        let record = MetricRecord::from_request(Uuid::new_v4().to_string(), user_id, request);

        let stored = self.store(&record).await?;
        self.notifier.notify(user_id);
        Ok(stored)
    }

    async fn get_recent(&self, user_id: &str, limit: Option<usize>) -> Result<Vec<MetricRecord>, RepositoryError> {
        let pool = match self.pool() {
            Some(pool) => pool,
            None => return self.storage.get_recent(user_id, limit).await,
        };

        let mut records = match DatabaseStorage::get_recent(&pool, user_id, limit).await {
            Ok(records) => records,
            Err(e) => {
                error!("Failed to get metrics from database: {}", e);
                return self.storage.get_recent(user_id, limit).await;
            }
        };

        // Writes accepted during a database outage live in the fallback store
        let fallback = self.storage.get_recent(user_id, limit).await?;
        if !fallback.is_empty() {
            debug!("Merging {} fallback metric(s) for user {}", fallback.len(), user_id);
            records.extend(fallback);
            records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
            if let Some(limit) = limit {
                records.truncate(limit);
            }
        }

        Ok(records)
    }

    async fn delete_all(&self, user_id: &str) -> Result<usize, RepositoryError> {
        let in_memory = self.storage.delete_all(user_id).await?;

        let in_database = match self.pool() {
            Some(pool) => DatabaseStorage::delete_all(&pool, user_id).await?,
            None => 0,
        };

        self.notifier.notify(user_id);
        Ok(in_memory + in_database)
    }

    fn watch_changes(&self, user_id: &str) -> watch::Receiver<u64> {
        self.notifier.subscribe(user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::create_in_memory_pool;

    fn request(metric_type: &str, value: &str, timestamp: &str) -> CreateMetricRequest {
        CreateMetricRequest {
            metric_type: metric_type.to_string(),
            value: value.to_string(),
            unit: "mmHg".to_string(),
            notes: None,
            timestamp: timestamp.to_string(),
        }
    }

    fn execute(pool: &DatabasePool, sql: &str) {
        let DatabasePool::SQLite(pool) = pool;
        pool.get().unwrap().execute(sql, []).unwrap();
    }

    #[tokio::test]
    async fn test_append_assigns_id_and_owner() {
        let repo = MetricRepository::in_memory();

        let record = repo.append("u1", request("bloodPressure", "118", "2024-03-01T08:00:00.000Z")).await.unwrap();

        assert!(Uuid::parse_str(&record.id).is_ok());
        assert_eq!(record.user_id, "u1");
        assert_eq!(record.value, "118");
    }

    #[tokio::test]
    async fn test_get_recent_orders_and_limits() {
        let repo = MetricRepository::in_memory();
        repo.append("u1", request("bloodPressure", "118", "2024-03-01T08:00:00.000Z")).await.unwrap();
        repo.append("u1", request("heartRate", "71", "2024-03-03T08:00:00.000Z")).await.unwrap();
        repo.append("u1", request("bloodGlucose", "99", "2024-03-02T08:00:00.000Z")).await.unwrap();

        let all = repo.get_recent("u1", None).await.unwrap();
        let types: Vec<&str> = all.iter().map(|r| r.metric_type.as_str()).collect();
        assert_eq!(types, vec!["heartRate", "bloodGlucose", "bloodPressure"]);

        let latest = repo.get_recent("u1", Some(1)).await.unwrap();
        assert_eq!(latest[0].metric_type, "heartRate");
    }

    #[tokio::test]
    async fn test_clones_share_storage() {
        let repo = MetricRepository::in_memory();
        let clone = repo.clone();

        clone.append("u1", request("weight", "70", "2024-03-01T08:00:00.000Z")).await.unwrap();

        assert_eq!(repo.get_recent("u1", None).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_writes_publish_changes() {
        let repo = MetricRepository::in_memory();
        let mut changes = repo.watch_changes("u1");

        repo.append("u1", request("weight", "70", "2024-03-01T08:00:00.000Z")).await.unwrap();
        changes.changed().await.unwrap();
        changes.borrow_and_update();

        repo.delete_all("u1").await.unwrap();
        changes.changed().await.unwrap();
        assert_eq!(*changes.borrow_and_update(), 2);
    }

    #[tokio::test]
    async fn test_delete_all_wipes_history() {
        let repo = MetricRepository::in_memory();
        repo.append("u1", request("weight", "70", "2024-03-01T08:00:00.000Z")).await.unwrap();
        repo.append("u1", request("weight", "71", "2024-03-02T08:00:00.000Z")).await.unwrap();
        repo.append("u2", request("weight", "90", "2024-03-02T08:00:00.000Z")).await.unwrap();

        assert_eq!(repo.delete_all("u1").await.unwrap(), 2);
        assert!(repo.get_recent("u1", None).await.unwrap().is_empty());
        assert_eq!(repo.get_recent("u2", None).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_sqlite_backed_repository() {
        let repo = MetricRepository::with_pool(create_in_memory_pool().unwrap());
        repo.append("u1", request("bloodGlucose", "205", "2024-03-01T08:00:00.000Z")).await.unwrap();

        let records = repo.get_recent("u1", Some(10)).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].value, "205");

        assert_eq!(repo.delete_all("u1").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_writes_during_outage_stay_visible() {
        let pool = create_in_memory_pool().unwrap();
        let repo = MetricRepository::with_pool(pool.clone());
        repo.append("u1", request("weight", "70", "2024-03-01T08:00:00.000Z")).await.unwrap();
        repo.append("u1", request("weight", "72", "2024-03-03T08:00:00.000Z")).await.unwrap();

        execute(&pool, "ALTER TABLE health_metrics RENAME TO health_metrics_offline");
        repo.append("u1", request("weight", "71", "2024-03-02T08:00:00.000Z")).await.unwrap();
        execute(&pool, "ALTER TABLE health_metrics_offline RENAME TO health_metrics");

        let values: Vec<String> = repo.get_recent("u1", None).await.unwrap()
            .into_iter()
            .map(|r| r.value)
            .collect();
        assert_eq!(values, vec!["72", "71", "70"]);

        let latest = repo.get_recent("u1", Some(2)).await.unwrap();
        assert_eq!(latest.len(), 2);
        assert_eq!(latest[1].value, "71");

        assert!(repo.get_recent("u2", None).await.unwrap().is_empty());
        assert_eq!(repo.delete_all("u1").await.unwrap(), 3);
        assert!(repo.get_recent("u1", None).await.unwrap().is_empty());
    }
}
