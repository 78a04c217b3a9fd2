use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Joined, PersonSummary};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
#[sqlx(rename_all = "camelCase")]
pub struct ForumCategory {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
#[sqlx(rename_all = "camelCase")]
pub struct ForumPost {
    pub id: String,
    pub category_id: String,
    pub author_id: String,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// A post with its author joined and its replies counted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForumPostRow {
    #[serde(flatten)]
    pub post: ForumPost,
    pub author: Option<Joined<PersonSummary>>,
    pub reply_count: i64,
    pub last_reply_at: Option<DateTime<Utc>>,
}

impl ForumPostRow {
    pub fn last_activity(&self) -> DateTime<Utc> {
        self.last_reply_at
            .map_or(self.post.created_at, |r| r.max(self.post.created_at))
    }
}
