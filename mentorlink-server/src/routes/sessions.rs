use axum::http::StatusCode;
use chrono::Utc;
use mentorlink_core::filter::BrowseState;
use mentorlink_core::models::SessionStatus;
use mentorlink_core::page::EmptyState;
use mentorlink_core::views::{session_card, session_stats, SessionSort, StatusIs};
use mentorlink_core::SessionQuery;
use serde::Deserialize;
use serde_json::{json, Value};

use super::{parse_param, time_range};
use crate::http::{error_response, ok_response, page_response, HttpState};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionsParams {
    pub status: Option<String>,
    pub time_range: Option<String>,
    pub search: Option<String>,
}

/// Sessions page: stats for the range plus the filtered list, newest first.
pub async fn sessions_inner(
    state: &HttpState,
    user_id: &str,
    params: SessionsParams,
) -> (StatusCode, Value) {
    let range = match time_range(
        params.time_range.as_deref(),
        &state.config.dashboard.default_time_range,
    ) {
        Ok(r) => r,
        Err(e) => return error_response(e),
    };
    let status: Option<SessionStatus> = match parse_param(params.status.as_deref()) {
        Ok(s) => s,
        Err(e) => return error_response(e),
    };

    let now = Utc::now();
    let query = SessionQuery {
        since: range.start(now),
        ..Default::default()
    };
    let sessions = match state.load(state.source.sessions(user_id, &query)).await {
        Ok(s) => s,
        Err(e) => return error_response(e),
    };

    let stats = session_stats(&sessions, range, now, state.config.dashboard.activity_weeks);
    let cards: Vec<_> = sessions.iter().map(|s| session_card(s, user_id, now)).collect();

    let mut browse: BrowseState<StatusIs, SessionSort> = BrowseState::new()
        .with_search(params.search.as_deref().unwrap_or(""))
        .sorted_by(SessionSort::Latest);
    if let Some(status) = status {
        browse = browse.with_predicate(StatusIs(status));
    }
    let visible: Vec<_> = browse.apply(&cards).into_iter().cloned().collect();

    tracing::debug!(
        user_id = %user_id,
        range = %range,
        total = cards.len(),
        visible = visible.len(),
        "sessions page"
    );
    page_response(
        "sessions",
        visible,
        EmptyState::no_sessions,
        json!({ "stats": stats, "timeRange": range }),
    )
}

pub async fn cancel_session_inner(
    state: &HttpState,
    user_id: &str,
    session_id: &str,
) -> (StatusCode, Value) {
    match state.load(state.source.cancel_session(user_id, session_id)).await {
        Ok(session) => {
            tracing::info!(user_id = %user_id, session_id = %session_id, "session cancelled");
            ok_response(json!({ "session": session_card(&session, user_id, Utc::now()) }))
        }
        Err(e) => error_response(e),
    }
}
