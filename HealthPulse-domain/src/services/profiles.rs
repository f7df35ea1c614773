use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use thiserror::Error;
use tracing::{info, instrument};
use validator::Validate;

use health_pulse_data::repository::{ProfileRepository, ProfileRepositoryTrait, RepositoryError};

use crate::entities::conversions;
use crate::entities::{RegisterProfileRequest, UserProfile};

/// Profile service errors
#[derive(Debug, Error)]
pub enum ProfileServiceError {
    /// Validation error
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Not found error
    #[error("Profile not found: {0}")]
    NotFound(String),

    /// Repository error
    #[error("Repository error: {0}")]
    RepositoryError(String),
}

impl From<RepositoryError> for ProfileServiceError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound(msg) => ProfileServiceError::NotFound(msg),
            RepositoryError::Validation(msg) => ProfileServiceError::ValidationError(msg),
            _ => ProfileServiceError::RepositoryError(err.to_string()),
        }
    }
}

/// Trait for profile service operations
#[async_trait]
pub trait ProfileServiceTrait: Send + Sync {
    /// Register a profile, or update it keeping the original creation time
    async fn register(&self, user_id: &str, request: RegisterProfileRequest)
        -> Result<UserProfile, ProfileServiceError>;

    /// Get a user's profile
    async fn get_profile(&self, user_id: &str) -> Result<UserProfile, ProfileServiceError>;
}

/// Profile service for domain logic
pub struct ProfileService<R: ProfileRepositoryTrait + ?Sized> {
    repository: Arc<R>,
}

impl<R: ProfileRepositoryTrait + ?Sized> ProfileService<R> {
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl<R: ProfileRepositoryTrait + ?Sized> ProfileServiceTrait for ProfileService<R> {
    #[instrument(skip(self, request))]
    async fn register(&self, user_id: &str, request: RegisterProfileRequest)
        -> Result<UserProfile, ProfileServiceError>
    {
        request
            .validate()
            .map_err(|e| ProfileServiceError::ValidationError(e.to_string()))?;

        let created_at = match self.repository.get(user_id).await? {
            Some(existing) => conversions::parse_timestamp(&existing.created_at).unwrap_or_else(|_| Utc::now()),
            None => Utc::now(),
        };

        let profile = UserProfile {
            user_id: user_id.to_string(),
            name: request.name.trim().to_string(),
            email: request.email.trim().to_string(),
            condition: request.condition,
            created_at,
        };

        self.repository.upsert(conversions::convert_to_data_profile(&profile)).await?;
        info!("Registered profile for user {} with condition {}", user_id, profile.condition);

        Ok(profile)
    }

    async fn get_profile(&self, user_id: &str) -> Result<UserProfile, ProfileServiceError> {
        let stored = self.repository.get(user_id)
            .await?
            .ok_or_else(|| ProfileServiceError::NotFound(format!("No profile for user {}", user_id)))?;

        conversions::convert_to_domain_profile(stored).map_err(ProfileServiceError::RepositoryError)
    }
}

/// Create a default profile service using the repository from data layer
pub fn create_default_profile_service() -> impl ProfileServiceTrait {
    ProfileService::new(Arc::new(ProfileRepository::new()))
}
