use std::convert::Infallible;

use axum::{
    extract::{Json, State},
    response::sse::{Event, KeepAlive, Sse},
    Extension,
};
use futures::stream::{self, Stream};
use tokio::sync::watch;
use tracing::{debug, error, instrument};

use health_pulse_domain::auth::AuthenticatedUser;
use health_pulse_domain::services::DashboardView;

use crate::api::routes::AppState;

/// Everything the dashboard renders
#[utoipa::path(
    get,
    path = "/api/v1/dashboard",
    responses(
        (status = 200, description = "Dashboard view", body = DashboardView),
        (status = 401, description = "Missing or invalid bearer token"),
    ),
    security(("bearer" = [])),
    tag = "dashboard"
)]
#[instrument(skip(state), fields(user_id = %user.user_id))]
pub async fn get_dashboard(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Json<DashboardView> {
    Json(state.metrics.get_dashboard(&user.user_id).await)
}

/// Live dashboard updates.
///
/// Sends a `dashboard` event with the current view, then one after every
/// change to the caller's history. The subscription ends when the client
/// disconnects.
#[utoipa::path(
    get,
    path = "/api/v1/dashboard/stream",
    responses(
        (status = 200, description = "Server-sent `dashboard` events carrying a DashboardView", body = String, content_type = "text/event-stream"),
        (status = 401, description = "Missing or invalid bearer token"),
    ),
    security(("bearer" = [])),
    tag = "dashboard"
)]
#[instrument(skip(state), fields(user_id = %user.user_id))]
pub async fn stream_dashboard(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let (tx, rx) = watch::channel(None);

    let handle = state.metrics.subscribe_dashboard(
        &user.user_id,
        Box::new(move |view| {
            tx.send_replace(Some(view));
        }),
    );
    debug!("Dashboard stream opened");

    // The handle travels with the stream so dropping the response cancels it
    let events = latest_view_events(rx, handle);

    Sse::new(events).keep_alive(KeepAlive::default())
}

/// One `dashboard` event per view the client has not seen yet.
///
/// A client that reads slowly skips straight to the newest view. `guard` is
/// held until the stream ends.
pub(crate) fn latest_view_events<G>(
    views: watch::Receiver<Option<DashboardView>>,
    guard: G,
) -> impl Stream<Item = Result<Event, Infallible>>
where
    G: Send + 'static,
{
    stream::unfold((views, guard), |(mut views, guard)| async move {
        loop {
            views.changed().await.ok()?;
            let latest = views.borrow_and_update().clone();
            let Some(view) = latest else { continue };

            let event = match Event::default().event("dashboard").json_data(&view) {
                Ok(event) => event,
                Err(e) => {
                    error!("Failed to encode dashboard event: {}", e);
                    Event::default().event("error").data("encoding failure")
                }
            };
            return Some((Ok(event), (views, guard)));
        }
    })
}
