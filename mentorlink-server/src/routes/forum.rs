use axum::http::StatusCode;
use chrono::Utc;
use mentorlink_core::page::EmptyState;
use mentorlink_core::views::forum_overview;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::http::{error_response, page_response, HttpState};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForumParams {
    pub category_id: Option<String>,
}

pub async fn forum_inner(state: &HttpState, params: ForumParams) -> (StatusCode, Value) {
    let category = params
        .category_id
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty());
    let loaded = state
        .load(async {
            tokio::try_join!(
                state.source.forum_categories(),
                state.source.forum_posts(category)
            )
        })
        .await;
    let (categories, posts) = match loaded {
        Ok(pair) => pair,
        Err(e) => return error_response(e),
    };
    let overview = forum_overview(&categories, &posts, Utc::now());
    page_response(
        "posts",
        overview.posts,
        EmptyState::no_posts,
        json!({
            "categories": overview.categories,
            "totalPosts": overview.total_posts,
        }),
    )
}
