use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "InterestStatus", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InterestStatus {
    Pending,
    Accepted,
    Declined,
}

/// A swipe-right on a mentor, waiting for the mentor to accept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
#[sqlx(rename_all = "camelCase")]
pub struct InterestRequest {
    pub id: String,
    pub from_user_id: String,
    pub to_user_id: String,
    pub status: InterestStatus,
    pub created_at: DateTime<Utc>,
}
