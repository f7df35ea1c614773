//! Push delivery of history snapshots.
//!
//! A subscription reloads the user's history on registration and after every
//! change published by the store, and hands each snapshot to a listener. The
//! returned [`SubscriptionHandle`] stops delivery synchronously: once
//! `cancel()` returns the listener is never called again.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

use health_pulse_data::repository::MetricRepositoryTrait;

use crate::entities::MetricRecord;
use crate::services::dashboard::{DashboardBuilder, DashboardView};
use crate::services::metrics::load_history;

#[derive(Debug, Default)]
struct DeliveryState {
    cancelled: AtomicBool,
    /// Held for the duration of each listener call
    delivery: Mutex<()>,
}

/// Handle to a live subscription. Dropping it cancels the subscription.
#[derive(Debug)]
pub struct SubscriptionHandle {
    state: Arc<DeliveryState>,
    task: Option<JoinHandle<()>>,
}

impl SubscriptionHandle {
    fn cancelled() -> Self {
        let state = DeliveryState::default();
        state.cancelled.store(true, Ordering::SeqCst);
        Self {
            state: Arc::new(state),
            task: None,
        }
    }

    /// Stop delivery.
    ///
    /// Waits for an in-flight listener call to finish, so it must not be
    /// called from inside the listener itself.
    pub fn cancel(&self) {
        let _guard = self
            .state
            .delivery
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        self.state.cancelled.store(true, Ordering::SeqCst);

        if let Some(task) = &self.task {
            task.abort();
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.state.cancelled.load(Ordering::SeqCst)
    }
}

impl Drop for SubscriptionHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Deliver every snapshot of a user's history to `listener`.
///
/// Snapshots are ordered by timestamp descending and truncated to `limit`
/// when one is given. A snapshot that fails to load is logged and skipped.
/// Must be called from within a Tokio runtime; outside one the returned
/// handle is already cancelled.
pub fn subscribe_metrics<R, F>(
    repository: Arc<R>,
    user_id: &str,
    limit: Option<usize>,
    mut listener: F,
) -> SubscriptionHandle
where
    R: MetricRepositoryTrait + ?Sized + 'static,
    F: FnMut(Vec<MetricRecord>) + Send + 'static,
{
    let runtime = match Handle::try_current() {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Cannot subscribe to metrics outside a runtime: {}", e);
            return SubscriptionHandle::cancelled();
        }
    };

    let state = Arc::new(DeliveryState::default());
    let task_state = Arc::clone(&state);
    let user_id = user_id.to_string();

    // Register for changes before the first load so none are missed
    let mut changes = repository.watch_changes(&user_id);

    let task = runtime.spawn(async move {
        loop {
            match load_history(repository.as_ref(), &user_id, limit).await {
                Ok(snapshot) => {
                    let _guard = task_state
                        .delivery
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner);
                    if task_state.cancelled.load(Ordering::SeqCst) {
                        break;
                    }
                    listener(snapshot);
                }
                Err(e) => warn!("Skipping snapshot for user {}: {}", user_id, e),
            }

            if changes.changed().await.is_err() {
                debug!("Change feed for user {} closed", user_id);
                break;
            }
        }
    });

    SubscriptionHandle {
        state,
        task: Some(task),
    }
}

/// Deliver a [`DashboardView`] computed from every snapshot of a user's history
pub fn subscribe_dashboard<R, F>(
    repository: Arc<R>,
    user_id: &str,
    builder: DashboardBuilder,
    mut listener: F,
) -> SubscriptionHandle
where
    R: MetricRepositoryTrait + ?Sized + 'static,
    F: FnMut(DashboardView) + Send + 'static,
{
    subscribe_metrics(repository, user_id, None, move |snapshot| {
        listener(builder.build(&snapshot));
    })
}
