use axum::http::StatusCode;
use mentorlink_core::MentorlinkError;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::http::{error_response, HttpState};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterestRequestBody {
    pub mentor_id: String,
}

/// Express interest in a mentor. 201 on success.
pub async fn create_interest_inner(
    state: &HttpState,
    user_id: &str,
    req: InterestRequestBody,
) -> (StatusCode, Value) {
    let mentor_id = req.mentor_id.trim();
    if mentor_id.is_empty() {
        return error_response(MentorlinkError::validation("mentorId is required"));
    }
    match state.load(state.source.create_interest(user_id, mentor_id)).await {
        Ok(interest) => (
            StatusCode::CREATED,
            mentorlink_core::api::ok(json!({ "interest": interest })),
        ),
        Err(e) => error_response(e),
    }
}
