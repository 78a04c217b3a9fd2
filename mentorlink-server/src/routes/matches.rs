use axum::http::StatusCode;
use chrono::Utc;
use mentorlink_core::page::EmptyState;
use mentorlink_core::views::match_overview;
use serde_json::{json, Value};

use crate::http::{error_response, page_response, HttpState};

pub async fn matches_inner(state: &HttpState, user_id: &str) -> (StatusCode, Value) {
    let rows = match state.load(state.source.matches(user_id)).await {
        Ok(rows) => rows,
        Err(e) => return error_response(e),
    };
    let overview = match_overview(&rows, user_id, Utc::now());
    page_response(
        "matches",
        overview.matches,
        EmptyState::no_matches,
        json!({
            "totalMatches": overview.total_matches,
            "activeMatches": overview.active_matches,
            "pendingMatches": overview.pending_matches,
            "unreadMessages": overview.unread_messages,
        }),
    )
}
