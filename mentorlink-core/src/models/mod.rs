pub mod forum;
pub mod interest;
pub mod matching;
pub mod notification;
pub mod profile;
pub mod review;
pub mod session;

pub use forum::{ForumCategory, ForumPost, ForumPostRow};
pub use interest::{InterestRequest, InterestStatus};
pub use matching::{Match, MatchRow, MatchStatus};
pub use notification::{Notification, NotificationType};
pub use profile::{
    ExperienceLevel, MentorRow, Profile, ProfileUpdate, ProfileView, User, UserRole,
};
pub use review::{Review, ReviewRow};
pub use session::{Session, SessionStatus};

use serde::{Deserialize, Serialize};

/// Closed enums whose every variant should appear in a status breakdown.
pub trait Enumerated: Copy + Ord + 'static {
    const ALL: &'static [Self];
}

/// A joined relation as the backend returns it: a list for to-many joins,
/// a single object for to-one joins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Joined<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> Joined<T> {
    pub fn first(&self) -> Option<&T> {
        match self {
            Joined::Many(items) => items.first(),
            Joined::One(item) => Some(item),
        }
    }
}

/// The slice of a user + profile that cards display about another person.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonSummary {
    pub id: String,
    pub name: Option<String>,
    pub profile_picture: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub title: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_joined_object_normalizes_to_value() {
        let joined: Joined<PersonSummary> =
            serde_json::from_str(r#"{"id":"u1","name":"Ada"}"#).unwrap();
        assert_eq!(joined.first().unwrap().name.as_deref(), Some("Ada"));
    }

    #[test]
    fn test_joined_array_normalizes_to_first_element() {
        let joined: Joined<PersonSummary> =
            serde_json::from_str(r#"[{"id":"u1","name":"Ada"},{"id":"u2","name":"Grace"}]"#)
                .unwrap();
        assert_eq!(joined.first().unwrap().id, "u1");
    }

    #[test]
    fn test_joined_empty_array_has_no_first() {
        let joined: Joined<PersonSummary> = serde_json::from_str("[]").unwrap();
        assert!(joined.first().is_none());
    }
}
