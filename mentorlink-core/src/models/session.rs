use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Enumerated;
use crate::error::MentorlinkError;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "SessionStatus", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionStatus {
    Scheduled,
    Completed,
    Cancelled,
}

impl Enumerated for SessionStatus {
    const ALL: &'static [Self] = &[Self::Scheduled, Self::Completed, Self::Cancelled];
}

impl SessionStatus {
    pub fn label(self) -> &'static str {
        match self {
            Self::Scheduled => "Scheduled",
            Self::Completed => "Completed",
            Self::Cancelled => "Cancelled",
        }
    }
}

impl std::str::FromStr for SessionStatus {
    type Err = MentorlinkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "SCHEDULED" => Ok(Self::Scheduled),
            "COMPLETED" => Ok(Self::Completed),
            "CANCELLED" => Ok(Self::Cancelled),
            other => Err(MentorlinkError::validation(format!(
                "unknown session status '{}'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
#[sqlx(rename_all = "camelCase")]
pub struct Session {
    pub id: String,
    pub mentor_id: String,
    pub mentee_id: String,
    pub title: String,
    pub scheduled_at: DateTime<Utc>,
    /// Minutes.
    pub duration: i32,
    pub status: SessionStatus,
    pub notes: Option<String>,
}

impl Session {
    pub fn involves(&self, user_id: &str) -> bool {
        self.mentor_id == user_id || self.mentee_id == user_id
    }

    /// Cancellation is the only transition requested from this side.
    pub fn ensure_cancellable_by(&self, user_id: &str) -> Result<(), MentorlinkError> {
        if !self.involves(user_id) {
            return Err(MentorlinkError::not_found(format!("Session {}", self.id)));
        }
        if self.status != SessionStatus::Scheduled {
            return Err(MentorlinkError::validation(format!(
                "Only scheduled sessions can be cancelled (session is {})",
                self.status.label().to_lowercase()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(status: SessionStatus) -> Session {
        Session {
            id: "s1".to_string(),
            mentor_id: "mentor".to_string(),
            mentee_id: "mentee".to_string(),
            title: "Intro call".to_string(),
            scheduled_at: Utc::now(),
            duration: 30,
            status,
            notes: None,
        }
    }

    #[test]
    fn test_status_parses_case_insensitively() {
        assert_eq!("scheduled".parse::<SessionStatus>().unwrap(), SessionStatus::Scheduled);
        assert_eq!("CANCELLED".parse::<SessionStatus>().unwrap(), SessionStatus::Cancelled);
        assert!("pending".parse::<SessionStatus>().is_err());
    }

    #[test]
    fn test_status_serializes_screaming_snake() {
        let json = serde_json::to_string(&SessionStatus::Completed).unwrap();
        assert_eq!(json, "\"COMPLETED\"");
    }

    #[test]
    fn test_only_scheduled_sessions_are_cancellable() {
        assert!(session(SessionStatus::Scheduled).ensure_cancellable_by("mentee").is_ok());
        let err = session(SessionStatus::Completed)
            .ensure_cancellable_by("mentee")
            .unwrap_err();
        assert!(matches!(err, MentorlinkError::Validation(_)));
    }

    #[test]
    fn test_outsider_cannot_cancel() {
        let err = session(SessionStatus::Scheduled)
            .ensure_cancellable_by("stranger")
            .unwrap_err();
        assert!(matches!(err, MentorlinkError::NotFound(_)));
    }
}
