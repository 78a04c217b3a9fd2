use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Joined, PersonSummary};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
#[sqlx(rename_all = "camelCase")]
pub struct Review {
    pub id: String,
    pub reviewer_id: String,
    pub reviewed_id: String,
    /// 1..=5
    pub rating: i32,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Review {
    pub fn clamped_rating(&self) -> i32 {
        self.rating.clamp(1, 5)
    }
}

/// A review with its reviewer joined in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewRow {
    #[serde(flatten)]
    pub review: Review,
    pub reviewer: Option<Joined<PersonSummary>>,
}
