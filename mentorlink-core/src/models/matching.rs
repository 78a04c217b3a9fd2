use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Enumerated, Joined, PersonSummary};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "MatchStatus", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchStatus {
    Pending,
    Active,
    Declined,
    Ended,
}

impl Enumerated for MatchStatus {
    const ALL: &'static [Self] = &[Self::Pending, Self::Active, Self::Declined, Self::Ended];
}

impl MatchStatus {
    pub fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Active => "Active",
            Self::Declined => "Declined",
            Self::Ended => "Ended",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
#[sqlx(rename_all = "camelCase")]
pub struct Match {
    pub id: String,
    pub user1_id: String,
    pub user2_id: String,
    pub status: MatchStatus,
    pub matched_at: DateTime<Utc>,
    pub unread_messages: i32,
}

impl Match {
    pub fn partner_of(&self, user_id: &str) -> Option<&str> {
        if self.user1_id == user_id {
            Some(&self.user2_id)
        } else if self.user2_id == user_id {
            Some(&self.user1_id)
        } else {
            None
        }
    }
}

/// A match with the other participant joined in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchRow {
    #[serde(flatten)]
    pub record: Match,
    pub partner: Option<Joined<PersonSummary>>,
}
