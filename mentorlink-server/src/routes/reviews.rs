use axum::http::StatusCode;
use chrono::Utc;
use mentorlink_core::page::EmptyState;
use mentorlink_core::views::review_summary;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::http::{error_response, page_response, HttpState};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewsParams {
    /// Whose reviews to show; defaults to the caller.
    pub user_id: Option<String>,
}

pub async fn reviews_inner(
    state: &HttpState,
    user_id: &str,
    params: ReviewsParams,
) -> (StatusCode, Value) {
    let target = params
        .user_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .unwrap_or(user_id);
    let rows = match state.load(state.source.reviews_received(target)).await {
        Ok(rows) => rows,
        Err(e) => return error_response(e),
    };
    let summary = review_summary(&rows, Utc::now());
    page_response(
        "reviews",
        summary.reviews,
        EmptyState::no_reviews,
        json!({
            "averageRating": summary.average_rating,
            "totalReviews": summary.total_reviews,
            "distribution": summary.distribution,
        }),
    )
}
