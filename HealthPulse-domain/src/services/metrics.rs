use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use thiserror::Error;
use tracing::{info, instrument, warn};
use validator::Validate;

use health_pulse_data::repository::{MetricRepository, MetricRepositoryTrait, RepositoryError};

use crate::catalog;
use crate::entities::conversions;
use crate::entities::{ClassificationReport, CreateMetricRequest, HealthScore, MetricRecord, TrendReport};
use crate::services::classification::ClassificationEngine;
use crate::services::dashboard::{DashboardBuilder, DashboardView, RecentMetric, RECENT_METRICS_LIMIT};
use crate::services::health_score::{HealthScoreEstimator, SCORE_WINDOW};
use crate::services::trends::aggregate_by_type;
use crate::subscription::{subscribe_dashboard, SubscriptionHandle};

/// Metric service errors
#[derive(Debug, Error)]
pub enum MetricServiceError {
    /// Validation error
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Not found error
    #[error("Not found: {0}")]
    NotFound(String),

    /// Repository error
    #[error("Repository error: {0}")]
    RepositoryError(String),
}

/// Listener receiving dashboard snapshots
pub type DashboardListener = Box<dyn FnMut(DashboardView) + Send + 'static>;

/// Trait for metric service operations
#[async_trait]
pub trait MetricServiceTrait: Send + Sync {
    /// Validate a create metric request
    fn validate_create_request(&self, request: &CreateMetricRequest) -> Result<(), MetricServiceError>;

    /// Log a new metric for a user
    async fn log_metric(&self, user_id: &str, request: CreateMetricRequest)
        -> Result<MetricRecord, MetricServiceError>;

    /// Get a user's history, newest first
    async fn get_history(&self, user_id: &str, limit: Option<usize>)
        -> Result<Vec<MetricRecord>, MetricServiceError>;

    /// Get the latest records with display dates
    async fn get_recent_metrics(&self, user_id: &str) -> Result<Vec<RecentMetric>, MetricServiceError>;

    /// Classify the user's most recent metric
    async fn get_predictions(&self, user_id: &str) -> ClassificationReport;

    /// Chart series for the user's full history
    async fn get_trends(&self, user_id: &str) -> TrendReport;

    /// Health score over the recent window
    async fn get_health_score(&self, user_id: &str) -> HealthScore;

    /// Dashboard view of the current history
    async fn get_dashboard(&self, user_id: &str) -> DashboardView;

    /// Delete a user's history once the confirmation email matches the account
    async fn reset_history(&self, user_id: &str, confirm_email: &str, account_email: &str)
        -> Result<usize, MetricServiceError>;

    /// Receive a dashboard view now and after every change to the history
    fn subscribe_dashboard(&self, user_id: &str, listener: DashboardListener) -> SubscriptionHandle;
}

/// Load a user's history as domain records.
///
/// Stored rows whose timestamp does not parse are logged and dropped.
pub async fn load_history<R>(repository: &R, user_id: &str, limit: Option<usize>)
    -> Result<Vec<MetricRecord>, RepositoryError>
where
    R: MetricRepositoryTrait + ?Sized,
{
    let records = repository.get_recent(user_id, limit).await?;

    Ok(records
        .into_iter()
        .filter_map(|record| {
            let id = record.id.clone();
            match conversions::convert_to_domain_metric(record) {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!("Dropping stored metric {}: {}", id, e);
                    None
                }
            }
        })
        .collect())
}

/// Metric service for domain logic
pub struct MetricService<R: MetricRepositoryTrait + ?Sized> {
    repository: Arc<R>,
    engine: ClassificationEngine,
    estimator: HealthScoreEstimator,
}

impl<R: MetricRepositoryTrait + ?Sized + 'static> MetricService<R> {
    /// Create a new metric service
    pub fn new(repository: Arc<R>) -> Self {
        Self::with_engine(repository, ClassificationEngine::standard().clone())
    }

    /// Create a service whose predictions and score share the engine's table
    pub fn with_engine(repository: Arc<R>, engine: ClassificationEngine) -> Self {
        let estimator = HealthScoreEstimator::new(engine.table().clone());
        Self {
            repository,
            engine,
            estimator,
        }
    }

    fn dashboard_builder(&self) -> DashboardBuilder {
        DashboardBuilder::new(self.engine.clone(), self.estimator.clone())
    }

    /// Map repository errors to service errors
    fn map_repo_error(&self, err: RepositoryError) -> MetricServiceError {
        match err {
            RepositoryError::NotFound(msg) => MetricServiceError::NotFound(msg),
            RepositoryError::Validation(msg) => MetricServiceError::ValidationError(msg),
            _ => MetricServiceError::RepositoryError(err.to_string()),
        }
    }

    async fn load(&self, user_id: &str, limit: Option<usize>) -> Result<Vec<MetricRecord>, MetricServiceError> {
        load_history(self.repository.as_ref(), user_id, limit)
            .await
            .map_err(|e| self.map_repo_error(e))
    }

    /// Load a snapshot for a derived view, treating failures as an empty history
    async fn load_or_empty(&self, user_id: &str, limit: Option<usize>) -> Vec<MetricRecord> {
        match self.load(user_id, limit).await {
            Ok(records) => records,
            Err(e) => {
                warn!("Failed to load metrics for user {}, using empty history: {}", user_id, e);
                Vec::new()
            }
        }
    }
}

#[async_trait]
impl<R: MetricRepositoryTrait + ?Sized + 'static> MetricServiceTrait for MetricService<R> {
    fn validate_create_request(&self, request: &CreateMetricRequest) -> Result<(), MetricServiceError> {
        if let Err(validation_errors) = request.validate() {
            let error_message = validation_errors
                .field_errors()
                .iter()
                .map(|(field, errors)| {
                    let error_msgs: Vec<String> = errors
                        .iter()
                        .map(|err| match &err.message {
                            Some(msg) => msg.to_string(),
                            None => format!("Invalid {}", field),
                        })
                        .collect();
                    format!("{}: {}", field, error_msgs.join(", "))
                })
                .collect::<Vec<String>>()
                .join("; ");

            return Err(MetricServiceError::ValidationError(error_message));
        }

        if request.metric_type.trim().is_empty() {
            return Err(MetricServiceError::ValidationError(
                "metric_type: Metric type cannot be blank".to_string(),
            ));
        }

        if request.value.trim().is_empty() {
            return Err(MetricServiceError::ValidationError(
                "value: Value cannot be blank".to_string(),
            ));
        }

        Ok(())
    }

    #[instrument(skip(self, request), fields(metric_type = %request.metric_type))]
    async fn log_metric(&self, user_id: &str, request: CreateMetricRequest)
        -> Result<MetricRecord, MetricServiceError>
    {
        self.validate_create_request(&request)?;

        let metric_type = request.metric_type.trim();
        let unit = match request.unit.as_deref().map(str::trim) {
            Some(unit) if !unit.is_empty() => unit.to_string(),
            _ => catalog::unit_for(metric_type).unwrap_or_default().to_string(),
        };
        let timestamp = request.timestamp.unwrap_or_else(Utc::now);

        let data_request = conversions::convert_to_data_create_request(&request, unit, timestamp);

        let stored = self.repository.append(user_id, data_request)
            .await
            .map_err(|e| self.map_repo_error(e))?;

        conversions::convert_to_domain_metric(stored).map_err(MetricServiceError::RepositoryError)
    }

    async fn get_history(&self, user_id: &str, limit: Option<usize>)
        -> Result<Vec<MetricRecord>, MetricServiceError>
    {
        self.load(user_id, limit).await
    }

    async fn get_recent_metrics(&self, user_id: &str) -> Result<Vec<RecentMetric>, MetricServiceError> {
        let records = self.load(user_id, Some(RECENT_METRICS_LIMIT)).await?;
        Ok(records.iter().map(RecentMetric::from).collect())
    }

    async fn get_predictions(&self, user_id: &str) -> ClassificationReport {
        let records = self.load_or_empty(user_id, Some(SCORE_WINDOW)).await;
        self.engine.classify(&records)
    }

    async fn get_trends(&self, user_id: &str) -> TrendReport {
        let records = self.load_or_empty(user_id, None).await;
        aggregate_by_type(&records)
    }

    async fn get_health_score(&self, user_id: &str) -> HealthScore {
        let records = self.load_or_empty(user_id, Some(self.estimator.window())).await;
        self.estimator.estimate(&records)
    }

    async fn get_dashboard(&self, user_id: &str) -> DashboardView {
        let records = self.load_or_empty(user_id, None).await;
        self.dashboard_builder().build(&records)
    }

    #[instrument(skip(self, confirm_email, account_email))]
    async fn reset_history(&self, user_id: &str, confirm_email: &str, account_email: &str)
        -> Result<usize, MetricServiceError>
    {
        let confirmed = !account_email.trim().is_empty()
            && confirm_email.trim().eq_ignore_ascii_case(account_email.trim());
        if !confirmed {
            return Err(MetricServiceError::ValidationError(
                "Confirmation email does not match the account email".to_string(),
            ));
        }

        let deleted = self.repository.delete_all(user_id)
            .await
            .map_err(|e| self.map_repo_error(e))?;

        info!("Deleted {} metric(s) for user {}", deleted, user_id);
        Ok(deleted)
    }

    fn subscribe_dashboard(&self, user_id: &str, listener: DashboardListener) -> SubscriptionHandle {
        subscribe_dashboard(Arc::clone(&self.repository), user_id, self.dashboard_builder(), listener)
    }
}

/// Create a default metric service using the repository from data layer
pub fn create_default_metric_service() -> impl MetricServiceTrait {
    MetricService::new(Arc::new(MetricRepository::new()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use health_pulse_data::models as data;
    use mockall::mock;
    use mockall::predicate::eq;
    use tokio::sync::watch;

    use crate::entities::{RiskLevel, RiskTier};
    use crate::services::classification::{Assessment, ThresholdRule, ThresholdTable};

    mock! {
        pub Repo {}

        #[async_trait]
        impl MetricRepositoryTrait for Repo {
            async fn append(&self, user_id: &str, request: data::CreateMetricRequest)
                -> Result<data::MetricRecord, RepositoryError>;
            async fn get_recent(&self, user_id: &str, limit: Option<usize>)
                -> Result<Vec<data::MetricRecord>, RepositoryError>;
            async fn delete_all(&self, user_id: &str) -> Result<usize, RepositoryError>;
            fn watch_changes(&self, user_id: &str) -> watch::Receiver<u64>;
        }
    }

    fn stored(id: &str, metric_type: &str, value: &str, timestamp: &str) -> data::MetricRecord {
        data::MetricRecord {
            id: id.to_string(),
            user_id: "user-1".to_string(),
            metric_type: metric_type.to_string(),
            value: value.to_string(),
            unit: String::new(),
            notes: None,
            timestamp: timestamp.to_string(),
        }
    }

    fn create_request(metric_type: &str, value: &str) -> CreateMetricRequest {
        CreateMetricRequest {
            metric_type: metric_type.to_string(),
            value: value.to_string(),
            unit: None,
            notes: None,
            timestamp: None,
        }
    }

    fn service(repo: MockRepo) -> MetricService<MockRepo> {
        MetricService::new(Arc::new(repo))
    }

    #[test]
    fn test_validate_create_request_valid() {
        let service = service(MockRepo::new());
        assert!(service.validate_create_request(&create_request("bloodPressure", "120")).is_ok());
    }

    #[test]
    fn test_validate_create_request_blank_type() {
        let service = service(MockRepo::new());

        let result = service.validate_create_request(&create_request("   ", "120"));
        assert!(matches!(result, Err(MetricServiceError::ValidationError(_))));

        let result = service.validate_create_request(&create_request("", "120"));
        assert!(result.unwrap_err().to_string().contains("metric_type"));
    }

    #[test]
    fn test_validate_create_request_long_value() {
        let service = service(MockRepo::new());

        let result = service.validate_create_request(&create_request("weight", &"9".repeat(33)));
        assert!(result.unwrap_err().to_string().contains("value"));
    }

    #[tokio::test]
    async fn test_log_metric_fills_unit_from_catalog() {
        let mut repo = MockRepo::new();
        repo.expect_append()
            .withf(|user_id, request| {
                user_id == "user-1"
                    && request.unit == "mg/dL"
                    && request.metric_type == "bloodGlucose"
                    && request.timestamp.ends_with('Z')
            })
            .times(1)
            .returning(|user_id, request| {
                Ok(data::MetricRecord::from_request("new-id".to_string(), user_id, request))
            });

        let record = service(repo)
            .log_metric("user-1", create_request("bloodGlucose", " 105 "))
            .await
            .unwrap();

        assert_eq!(record.id, "new-id");
        assert_eq!(record.unit, "mg/dL");
        assert_eq!(record.value, "105");
    }

    #[tokio::test]
    async fn test_log_metric_rejects_invalid_request() {
        let mut repo = MockRepo::new();
        repo.expect_append().never();

        let result = service(repo).log_metric("user-1", create_request("", "1")).await;
        assert!(matches!(result, Err(MetricServiceError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_get_history_maps_repository_error() {
        let mut repo = MockRepo::new();
        repo.expect_get_recent()
            .returning(|_, _| Err(RepositoryError::Lock("poisoned".to_string())));

        let result = service(repo).get_history("user-1", None).await;
        assert!(matches!(result, Err(MetricServiceError::RepositoryError(_))));
    }

    #[tokio::test]
    async fn test_get_history_drops_unparseable_timestamps() {
        let mut repo = MockRepo::new();
        repo.expect_get_recent()
            .with(eq("user-1"), eq(Some(3usize)))
            .returning(|_, _| Ok(vec![
                stored("a", "weight", "80", "2024-03-02T08:00:00.000Z"),
                stored("b", "weight", "81", "not a time"),
            ]));

        let history = service(repo).get_history("user-1", Some(3)).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].id, "a");
    }

    #[tokio::test]
    async fn test_get_predictions_uses_latest_window() {
        let mut repo = MockRepo::new();
        repo.expect_get_recent()
            .with(eq("user-1"), eq(Some(SCORE_WINDOW)))
            .returning(|_, _| Ok(vec![
                stored("a", "bloodPressure", "oops", "2024-03-02T08:00:00.000Z"),
                stored("b", "bloodPressure", "145", "2024-03-01T08:00:00.000Z"),
            ]));

        let report = service(repo).get_predictions("user-1").await;
        assert_eq!(report.skipped_invalid, 1);
        assert_eq!(report.predictions[0].id, "b");
        assert_eq!(report.predictions[0].risk_tier, RiskTier::High);
    }

    #[tokio::test]
    async fn test_derived_views_degrade_on_repository_error() {
        let mut repo = MockRepo::new();
        repo.expect_get_recent()
            .returning(|_, _| Err(RepositoryError::Lock("poisoned".to_string())));
        let service = service(repo);

        assert!(service.get_predictions("user-1").await.predictions.is_empty());
        assert!(service.get_trends("user-1").await.series.is_empty());
        assert_eq!(service.get_health_score("user-1").await.risk_level, RiskLevel::NoData);
        assert_eq!(service.get_dashboard("user-1").await, DashboardView::empty());
    }

    #[tokio::test]
    async fn test_reset_history_requires_matching_email() {
        let mut repo = MockRepo::new();
        repo.expect_delete_all().never();

        let result = service(repo)
            .reset_history("user-1", "someone@else.com", "me@example.com")
            .await;
        assert!(matches!(result, Err(MetricServiceError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_reset_history_deletes() {
        let mut repo = MockRepo::new();
        repo.expect_delete_all()
            .with(eq("user-1"))
            .times(1)
            .returning(|_| Ok(4));

        let deleted = service(repo)
            .reset_history("user-1", " Me@Example.com ", "me@example.com")
            .await
            .unwrap();
        assert_eq!(deleted, 4);
    }

    #[tokio::test]
    async fn test_reset_history_rejects_empty_account_email() {
        let mut repo = MockRepo::new();
        repo.expect_delete_all().never();

        let result = service(repo).reset_history("user-1", "", "").await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_extended_table_drives_predictions_and_score() {
        let mut repo = MockRepo::new();
        repo.expect_get_recent()
            .returning(|_, _| Ok(vec![stored("o2", "oxygenSaturation", "86", "2024-03-02T08:00:00.000Z")]));

        let table = ThresholdTable::standard().with_rule(
            ThresholdRule::new("oxygenSaturation", Assessment::new(RiskTier::Low, "oxygen saturation is normal", 85))
                .up_to(89.0, Assessment::new(RiskTier::High, "oxygen saturation is low", 90)),
        );
        let service = MetricService::with_engine(Arc::new(repo), ClassificationEngine::new(table));

        let report = service.get_predictions("user-1").await;
        assert_eq!(report.predictions[0].risk_tier, RiskTier::High);

        let score = service.get_health_score("user-1").await;
        assert_eq!(score.score, Some(30));
        assert_eq!(score.risk_level, RiskLevel::High);
    }
}
