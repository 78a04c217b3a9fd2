//! MentorLink HTTP API
//!
//! Axum server that serves page view models as JSON.
//!
//! Architecture: each endpoint has a thin axum handler that delegates to an
//! inner function in `routes`. Inner functions take the shared state and plain
//! arguments and return `(StatusCode, serde_json::Value)`, so they can be
//! tested without axum dispatch.
//!
//! The caller is identified by the `x-user-id` header, set by the auth layer
//! in front of this service.

use std::future::Future;
use std::sync::Arc;

use anyhow::Result;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{DefaultBodyLimit, Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use bytes::Bytes;
use mentorlink_core::api;
use mentorlink_core::page::{EmptyState, PageState};
use mentorlink_core::{guarded_load, MentorlinkConfig, MentorlinkError, RecordSource};
use serde::Serialize;
use serde_json::Value;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use crate::routes::{
    calendar, dashboard, forum, interests, matches, mentors, notifications, profile, reviews,
    sessions,
};

pub use mentorlink_core::api::USER_HEADER;

/// Shared state for all HTTP handlers
#[derive(Clone)]
pub struct HttpState {
    pub source: Arc<dyn RecordSource>,
    pub config: MentorlinkConfig,
    /// Cancelled on shutdown; in-flight loads are dropped rather than committed.
    pub cancel: CancellationToken,
}

impl HttpState {
    pub fn new(source: Arc<dyn RecordSource>, config: MentorlinkConfig) -> Self {
        Self {
            source,
            config,
            cancel: CancellationToken::new(),
        }
    }

    /// Run one load under a child of the shutdown token.
    pub async fn load<T, F>(&self, fut: F) -> Result<T, MentorlinkError>
    where
        F: Future<Output = Result<T, MentorlinkError>>,
    {
        let token = self.cancel.child_token();
        guarded_load(&token, fut)
            .await
            .unwrap_or(Err(MentorlinkError::Cancelled))
    }
}

/// Build the Axum router with all endpoints
pub fn build_router(state: Arc<HttpState>) -> Router {
    let upload_limit = state.config.uploads.max_bytes + 64 * 1024;
    Router::new()
        .route("/health", get(health_handler))
        .route("/version", get(version_handler))
        .route("/api/profile/me", get(profile_handler).put(update_profile_handler))
        .route(
            "/api/profile/me/picture",
            post(upload_picture_handler).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/api/profile/views", get(profile_views_handler))
        .route("/api/matches", get(matches_handler))
        .route("/api/sessions", get(sessions_handler))
        .route("/api/sessions/:id", delete(cancel_session_handler))
        .route("/api/notifications", get(notifications_handler))
        .route("/api/notifications/read", post(mark_read_handler))
        .route("/api/reviews", get(reviews_handler))
        .route("/api/dashboard", get(dashboard_handler))
        .route("/api/calendar", get(calendar_handler))
        .route("/api/mentors", get(mentors_handler))
        .route("/api/interests", post(interest_handler))
        .route("/api/forum", get(forum_handler))
        .with_state(state)
}

/// Start the HTTP server on the configured address.
/// Gracefully shuts down when the broadcast shutdown signal fires.
pub async fn start_http_server(
    state: Arc<HttpState>,
    mut shutdown: broadcast::Receiver<()>,
) -> Result<()> {
    let addr = format!("{}:{}", state.config.http.host, state.config.http.port);
    let cancel = state.cancel.clone();

    let app = build_router(state);
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("MentorLink HTTP API listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = shutdown.recv().await;
            cancel.cancel();
            tracing::info!("HTTP server shutting down...");
        })
        .await?;

    Ok(())
}

// ============================================================================
// Response helpers
// ============================================================================

pub fn status_for(error: &MentorlinkError) -> StatusCode {
    match error {
        MentorlinkError::Validation(_) => StatusCode::BAD_REQUEST,
        MentorlinkError::NotFound(_) => StatusCode::NOT_FOUND,
        MentorlinkError::Unauthorized => StatusCode::UNAUTHORIZED,
        MentorlinkError::Cancelled => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Client errors carry their message; server-side load failures become a
/// failed page with a retry action.
pub fn error_response(error: MentorlinkError) -> (StatusCode, Value) {
    let status = status_for(&error);
    if error.is_client_error() || matches!(error, MentorlinkError::Cancelled) {
        tracing::debug!(status = status.as_u16(), error = %error, "request rejected");
        return (status, api::err(error.to_string()));
    }
    let page: PageState<()> = PageState::from_result(Err(error));
    (status, api::page_body("data", &page))
}

/// Settle a loaded list into a page body; `extra` fields (counts, stats) are
/// merged in next to the list or its empty state.
pub fn page_response<T: Serialize>(
    key: &str,
    items: Vec<T>,
    empty: fn() -> EmptyState,
    extra: Value,
) -> (StatusCode, Value) {
    let page = PageState::settle(Ok(items), |items| items.is_empty(), empty);
    let mut body = api::page_body(key, &page);
    if let (Some(target), Value::Object(fields)) = (body.as_object_mut(), extra) {
        target.extend(fields);
    }
    (StatusCode::OK, body)
}

pub fn ok_response(payload: Value) -> (StatusCode, Value) {
    (StatusCode::OK, api::ok(payload))
}

/// The caller's user id, or 401.
pub fn caller_id(headers: &HeaderMap) -> Result<String, MentorlinkError> {
    headers
        .get(USER_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .ok_or(MentorlinkError::Unauthorized)
}

fn reply((status, body): (StatusCode, Value)) -> axum::response::Response {
    (status, Json(body)).into_response()
}

/// Malformed query strings and bodies get the same `{error}` envelope as
/// every other client error.
fn rejected(message: String) -> axum::response::Response {
    reply(error_response(MentorlinkError::validation(message)))
}

/// Resolve the caller, then run `inner` with their id.
async fn with_caller<F, Fut>(headers: &HeaderMap, inner: F) -> axum::response::Response
where
    F: FnOnce(String) -> Fut,
    Fut: Future<Output = (StatusCode, Value)>,
{
    match caller_id(headers) {
        Ok(user_id) => reply(inner(user_id).await),
        Err(e) => reply(error_response(e)),
    }
}

// ============================================================================
// Inner functions for the service endpoints
// ============================================================================

pub async fn health_inner(source: &dyn RecordSource) -> (StatusCode, Value) {
    match source.backend_version().await {
        Ok(backend) => (
            StatusCode::OK,
            serde_json::json!({
                "status": "healthy",
                "version": api::VERSION,
                "backend": backend,
            }),
        ),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            serde_json::json!({
                "status": "unhealthy",
                "error": e.to_string(),
            }),
        ),
    }
}

/// Version info; pure, no IO.
pub fn version_inner() -> Value {
    serde_json::json!({
        "version": api::VERSION,
        "api": "mentorlink/1",
    })
}

// ============================================================================
// Axum handler wrappers (thin, delegate to inner functions)
// ============================================================================

pub async fn health_handler(State(state): State<Arc<HttpState>>) -> impl IntoResponse {
    let (status, body) = health_inner(state.source.as_ref()).await;
    (status, Json(body))
}

pub async fn version_handler() -> impl IntoResponse {
    (StatusCode::OK, Json(version_inner()))
}

pub async fn profile_handler(
    State(state): State<Arc<HttpState>>,
    headers: HeaderMap,
) -> impl IntoResponse {
    with_caller(&headers, |user| async move { profile::profile_inner(&state, &user).await }).await
}

pub async fn update_profile_handler(
    State(state): State<Arc<HttpState>>,
    headers: HeaderMap,
    update: Result<Json<mentorlink_core::models::ProfileUpdate>, JsonRejection>,
) -> impl IntoResponse {
    let update = match update {
        Ok(Json(update)) => update,
        Err(rejection) => return rejected(rejection.body_text()),
    };
    with_caller(&headers, |user| async move {
        profile::update_profile_inner(&state, &user, update).await
    })
    .await
}

pub async fn upload_picture_handler(
    State(state): State<Arc<HttpState>>,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    let content_type = headers
        .get(axum::http::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();
    with_caller(&headers, |user| async move {
        profile::upload_picture_inner(&state, &user, &content_type, body).await
    })
    .await
}

pub async fn profile_views_handler(
    State(state): State<Arc<HttpState>>,
    headers: HeaderMap,
    params: Result<Query<profile::ViewsParams>, QueryRejection>,
) -> impl IntoResponse {
    let params = match params {
        Ok(Query(params)) => params,
        Err(rejection) => return rejected(rejection.body_text()),
    };
    with_caller(&headers, |user| async move {
        profile::profile_views_inner(&state, &user, params).await
    })
    .await
}

pub async fn matches_handler(
    State(state): State<Arc<HttpState>>,
    headers: HeaderMap,
) -> impl IntoResponse {
    with_caller(&headers, |user| async move { matches::matches_inner(&state, &user).await }).await
}

pub async fn sessions_handler(
    State(state): State<Arc<HttpState>>,
    headers: HeaderMap,
    params: Result<Query<sessions::SessionsParams>, QueryRejection>,
) -> impl IntoResponse {
    let params = match params {
        Ok(Query(params)) => params,
        Err(rejection) => return rejected(rejection.body_text()),
    };
    with_caller(&headers, |user| async move {
        sessions::sessions_inner(&state, &user, params).await
    })
    .await
}

pub async fn cancel_session_handler(
    State(state): State<Arc<HttpState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> impl IntoResponse {
    with_caller(&headers, |user| async move {
        sessions::cancel_session_inner(&state, &user, &id).await
    })
    .await
}

pub async fn notifications_handler(
    State(state): State<Arc<HttpState>>,
    headers: HeaderMap,
) -> impl IntoResponse {
    with_caller(&headers, |user| async move {
        notifications::notifications_inner(&state, &user).await
    })
    .await
}

pub async fn mark_read_handler(
    State(state): State<Arc<HttpState>>,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    // An empty body marks everything read.
    let req: notifications::MarkReadRequest = if body.iter().all(u8::is_ascii_whitespace) {
        Default::default()
    } else {
        match serde_json::from_slice(&body) {
            Ok(req) => req,
            Err(e) => return rejected(format!("Invalid request body: {}", e)),
        }
    };
    with_caller(&headers, |user| async move {
        notifications::mark_read_inner(&state, &user, req).await
    })
    .await
}

pub async fn reviews_handler(
    State(state): State<Arc<HttpState>>,
    headers: HeaderMap,
    params: Result<Query<reviews::ReviewsParams>, QueryRejection>,
) -> impl IntoResponse {
    let params = match params {
        Ok(Query(params)) => params,
        Err(rejection) => return rejected(rejection.body_text()),
    };
    with_caller(&headers, |user| async move {
        reviews::reviews_inner(&state, &user, params).await
    })
    .await
}

pub async fn dashboard_handler(
    State(state): State<Arc<HttpState>>,
    headers: HeaderMap,
    params: Result<Query<dashboard::DashboardParams>, QueryRejection>,
) -> impl IntoResponse {
    let params = match params {
        Ok(Query(params)) => params,
        Err(rejection) => return rejected(rejection.body_text()),
    };
    with_caller(&headers, |user| async move {
        dashboard::dashboard_inner(&state, &user, params).await
    })
    .await
}

pub async fn calendar_handler(
    State(state): State<Arc<HttpState>>,
    headers: HeaderMap,
    params: Result<Query<calendar::CalendarParams>, QueryRejection>,
) -> impl IntoResponse {
    let params = match params {
        Ok(Query(params)) => params,
        Err(rejection) => return rejected(rejection.body_text()),
    };
    with_caller(&headers, |user| async move {
        calendar::calendar_inner(&state, &user, params).await
    })
    .await
}

pub async fn mentors_handler(
    State(state): State<Arc<HttpState>>,
    headers: HeaderMap,
    params: Result<Query<mentors::MentorsParams>, QueryRejection>,
) -> impl IntoResponse {
    let params = match params {
        Ok(Query(params)) => params,
        Err(rejection) => return rejected(rejection.body_text()),
    };
    with_caller(&headers, |_user| async move {
        mentors::mentors_inner(&state, params).await
    })
    .await
}

pub async fn interest_handler(
    State(state): State<Arc<HttpState>>,
    headers: HeaderMap,
    req: Result<Json<interests::InterestRequestBody>, JsonRejection>,
) -> impl IntoResponse {
    let req = match req {
        Ok(Json(req)) => req,
        Err(rejection) => return rejected(rejection.body_text()),
    };
    with_caller(&headers, |user| async move {
        interests::create_interest_inner(&state, &user, req).await
    })
    .await
}

pub async fn forum_handler(
    State(state): State<Arc<HttpState>>,
    headers: HeaderMap,
    params: Result<Query<forum::ForumParams>, QueryRejection>,
) -> impl IntoResponse {
    let params = match params {
        Ok(Query(params)) => params,
        Err(rejection) => return rejected(rejection.body_text()),
    };
    with_caller(&headers, |_user| async move { forum::forum_inner(&state, params).await }).await
}

// ============================================================================
// Unit Tests
// ============================================================================
