use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "NotificationType", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationType {
    Match,
    Message,
    SessionScheduled,
    SessionReminder,
    SessionCancelled,
    Review,
    System,
}

impl NotificationType {
    /// Icon name the front end maps to an asset.
    pub fn icon(self) -> &'static str {
        match self {
            Self::Match => "users",
            Self::Message => "message-circle",
            Self::SessionScheduled | Self::SessionReminder => "calendar",
            Self::SessionCancelled => "calendar-x",
            Self::Review => "star",
            Self::System => "bell",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
#[sqlx(rename_all = "camelCase")]
pub struct Notification {
    pub id: String,
    pub user_id: String,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub kind: NotificationType,
    pub title: String,
    pub message: String,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}
