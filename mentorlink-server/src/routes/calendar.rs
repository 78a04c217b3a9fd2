use axum::http::StatusCode;
use chrono::Utc;
use mentorlink_core::views::{month_calendar, MonthRef};
use mentorlink_core::{MentorlinkError, SessionQuery};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::http::{error_response, ok_response, HttpState};

#[derive(Debug, Default, Deserialize)]
pub struct CalendarParams {
    pub year: Option<i32>,
    pub month: Option<u32>,
}

/// Month grid for the caller. Without parameters, the current month.
pub async fn calendar_inner(
    state: &HttpState,
    user_id: &str,
    params: CalendarParams,
) -> (StatusCode, Value) {
    let now = Utc::now();
    let month = match (params.year, params.month) {
        (None, None) => MonthRef::containing(now),
        (Some(year), Some(month)) => match MonthRef::new(year, month) {
            Ok(m) => m,
            Err(e) => return error_response(e),
        },
        _ => {
            return error_response(MentorlinkError::validation(
                "year and month must be given together",
            ))
        }
    };
    let Some((since, until)) = month.bounds() else {
        return error_response(MentorlinkError::validation(format!(
            "{}-{} is not a valid month",
            month.year, month.month
        )));
    };

    let query = SessionQuery {
        since: Some(since),
        until: Some(until),
        ..Default::default()
    };
    let sessions = match state.load(state.source.sessions(user_id, &query)).await {
        Ok(s) => s,
        Err(e) => return error_response(e),
    };
    ok_response(json!({ "calendar": month_calendar(month, &sessions, user_id, now) }))
}
