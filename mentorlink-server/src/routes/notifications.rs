use axum::http::StatusCode;
use chrono::Utc;
use mentorlink_core::page::EmptyState;
use mentorlink_core::views::notification_feed;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::http::{error_response, ok_response, page_response, HttpState};

#[derive(Debug, Default, Deserialize)]
pub struct MarkReadRequest {
    /// Omit to mark everything read.
    pub ids: Option<Vec<String>>,
}

pub async fn notifications_inner(state: &HttpState, user_id: &str) -> (StatusCode, Value) {
    let notifications = match state.load(state.source.notifications(user_id)).await {
        Ok(n) => n,
        Err(e) => return error_response(e),
    };
    let feed = notification_feed(
        &notifications,
        Utc::now(),
        state.config.dashboard.activity_weeks,
    );
    page_response(
        "groups",
        feed.groups,
        EmptyState::no_notifications,
        json!({
            "total": feed.total,
            "unreadCount": feed.unread_count,
            "weeklyActivity": feed.weekly_activity,
        }),
    )
}

pub async fn mark_read_inner(
    state: &HttpState,
    user_id: &str,
    req: MarkReadRequest,
) -> (StatusCode, Value) {
    match state
        .load(state.source.mark_notifications_read(user_id, req.ids.as_deref()))
        .await
    {
        Ok(updated) => {
            tracing::debug!(user_id = %user_id, updated, "notifications marked read");
            ok_response(json!({ "updated": updated }))
        }
        Err(e) => error_response(e),
    }
}
