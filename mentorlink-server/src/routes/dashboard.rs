use axum::http::StatusCode;
use chrono::Utc;
use mentorlink_core::views::{
    match_overview, notification_feed, profile_view_stats, review_summary, session_dashboard,
    DashboardLimits,
};
use mentorlink_core::SessionQuery;
use serde::Deserialize;
use serde_json::{json, Value};

use super::time_range;
use crate::http::{error_response, ok_response, HttpState};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardParams {
    pub time_range: Option<String>,
}

/// Home dashboard. The five independent fetches run concurrently.
pub async fn dashboard_inner(
    state: &HttpState,
    user_id: &str,
    params: DashboardParams,
) -> (StatusCode, Value) {
    let config = &state.config.dashboard;
    let range = match time_range(params.time_range.as_deref(), &config.default_time_range) {
        Ok(r) => r,
        Err(e) => return error_response(e),
    };
    let now = Utc::now();
    let source = &state.source;
    let all_sessions = SessionQuery::default();

    let loaded = state
        .load(async {
            tokio::try_join!(
                source.sessions(user_id, &all_sessions),
                source.matches(user_id),
                source.notifications(user_id),
                source.reviews_received(user_id),
                source.profile_views(user_id, range.previous_start(now)),
            )
        })
        .await;
    let (sessions, matches, notifications, reviews, views) = match loaded {
        Ok(all) => all,
        Err(e) => return error_response(e),
    };

    let limits = DashboardLimits::from(config);
    let sessions = session_dashboard(&sessions, user_id, range, now, &limits);
    let matches = match_overview(&matches, user_id, now);
    let feed = notification_feed(&notifications, now, config.activity_weeks);
    let reviews = review_summary(&reviews, now);
    let views = profile_view_stats(&views, range, now, config.activity_weeks);

    tracing::info!(
        user_id = %user_id,
        range = %range,
        sessions = sessions.stats.total_sessions,
        matches = matches.total_matches,
        "dashboard assembled"
    );
    ok_response(json!({
        "timeRange": range,
        "sessions": sessions,
        "matches": {
            "total": matches.total_matches,
            "active": matches.active_matches,
            "pending": matches.pending_matches,
            "unreadMessages": matches.unread_messages,
        },
        "notifications": {
            "unreadCount": feed.unread_count,
            "weeklyActivity": feed.weekly_activity,
        },
        "reviews": {
            "averageRating": reviews.average_rating,
            "totalReviews": reviews.total_reviews,
        },
        "profileViews": views,
    }))
}
