//! Record fetching boundary.
//!
//! `RecordSource` is the only way pages reach stored rows. `PgSource` (in
//! `db`) talks to the backend tables; `MemorySource` keeps rows in memory for
//! tests and local runs.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::error::MentorlinkError;
use crate::models::{
    ForumCategory, ForumPost, ForumPostRow, InterestRequest, InterestStatus, Joined, Match,
    MatchRow, MentorRow, Notification, PersonSummary, Profile, ProfileUpdate, ProfileView, Review,
    ReviewRow, Session, SessionStatus, User, UserRole,
};

/// Time bounds pushed down to the sessions query. Status filtering stays
/// with the caller, since page stats count every status in the window.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionQuery {
    /// Inclusive lower bound on `scheduledAt`.
    pub since: Option<DateTime<Utc>>,
    /// Exclusive upper bound on `scheduledAt`.
    pub until: Option<DateTime<Utc>>,
}

impl SessionQuery {
    pub fn matches(&self, session: &Session) -> bool {
        self.since.map_or(true, |t| session.scheduled_at >= t)
            && self.until.map_or(true, |t| session.scheduled_at < t)
    }
}

#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Short description of the backend, for health checks.
    async fn backend_version(&self) -> Result<String, MentorlinkError>;

    async fn user(&self, user_id: &str) -> Result<Option<User>, MentorlinkError>;

    async fn profile(&self, user_id: &str) -> Result<Option<Profile>, MentorlinkError>;

    /// Apply a validated edit, creating the profile row if it does not exist.
    async fn update_profile(
        &self,
        user_id: &str,
        update: &ProfileUpdate,
    ) -> Result<Profile, MentorlinkError>;

    async fn set_profile_picture(
        &self,
        user_id: &str,
        url: &str,
    ) -> Result<Profile, MentorlinkError>;

    /// Sessions where the user is mentor or mentee.
    async fn sessions(
        &self,
        user_id: &str,
        query: &SessionQuery,
    ) -> Result<Vec<Session>, MentorlinkError>;

    async fn cancel_session(
        &self,
        user_id: &str,
        session_id: &str,
    ) -> Result<Session, MentorlinkError>;

    async fn reviews_received(&self, user_id: &str) -> Result<Vec<ReviewRow>, MentorlinkError>;

    async fn matches(&self, user_id: &str) -> Result<Vec<MatchRow>, MentorlinkError>;

    async fn notifications(&self, user_id: &str) -> Result<Vec<Notification>, MentorlinkError>;

    /// Mark the given notifications read, or all of the user's when `ids` is
    /// `None`. Returns how many changed.
    async fn mark_notifications_read(
        &self,
        user_id: &str,
        ids: Option<&[String]>,
    ) -> Result<u64, MentorlinkError>;

    async fn profile_views(
        &self,
        user_id: &str,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<ProfileView>, MentorlinkError>;

    async fn mentors(&self) -> Result<Vec<MentorRow>, MentorlinkError>;

    async fn create_interest(
        &self,
        from_user_id: &str,
        to_user_id: &str,
    ) -> Result<InterestRequest, MentorlinkError>;

    async fn forum_categories(&self) -> Result<Vec<ForumCategory>, MentorlinkError>;

    async fn forum_posts(
        &self,
        category_id: Option<&str>,
    ) -> Result<Vec<ForumPostRow>, MentorlinkError>;
}

/// Rows held by a `MemorySource`.
#[derive(Debug, Clone, Default)]
pub struct MemoryData {
    pub users: Vec<User>,
    pub profiles: Vec<Profile>,
    pub sessions: Vec<Session>,
    pub reviews: Vec<Review>,
    pub matches: Vec<Match>,
    pub notifications: Vec<Notification>,
    pub profile_views: Vec<ProfileView>,
    pub interests: Vec<InterestRequest>,
    pub forum_categories: Vec<ForumCategory>,
    pub forum_posts: Vec<ForumPost>,
    /// (post id, reply time)
    pub forum_replies: Vec<(String, DateTime<Utc>)>,
}

impl MemoryData {
    fn person(&self, user_id: &str) -> Option<PersonSummary> {
        let user = self.users.iter().find(|u| u.id == user_id)?;
        let profile = self.profiles.iter().find(|p| p.user_id == user_id);
        Some(PersonSummary {
            id: user.id.clone(),
            name: user.name.clone(),
            profile_picture: profile.and_then(|p| p.profile_picture.clone()),
            city: profile.and_then(|p| p.city.clone()),
            country: profile.and_then(|p| p.country.clone()),
            title: profile.and_then(|p| p.title.clone()),
        })
    }

    fn profile_mut(&mut self, user_id: &str) -> &mut Profile {
        let index = match self.profiles.iter().position(|p| p.user_id == user_id) {
            Some(i) => i,
            None => {
                self.profiles.push(Profile::empty(user_id));
                self.profiles.len() - 1
            }
        };
        &mut self.profiles[index]
    }
}

/// In-memory `RecordSource`. `set_failing(true)` makes every call fail, to
/// exercise error pages.
#[derive(Debug, Default)]
pub struct MemorySource {
    data: RwLock<MemoryData>,
    failing: AtomicBool,
}

impl MemorySource {
    pub fn new(data: MemoryData) -> Self {
        Self {
            data: RwLock::new(data),
            failing: AtomicBool::new(false),
        }
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub async fn snapshot(&self) -> MemoryData {
        self.data.read().await.clone()
    }

    fn check(&self) -> Result<(), MentorlinkError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(MentorlinkError::Other("record source unavailable".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl RecordSource for MemorySource {
    async fn backend_version(&self) -> Result<String, MentorlinkError> {
        self.check()?;
        Ok("in-memory".to_string())
    }

    async fn user(&self, user_id: &str) -> Result<Option<User>, MentorlinkError> {
        self.check()?;
        let data = self.data.read().await;
        Ok(data.users.iter().find(|u| u.id == user_id).cloned())
    }

    async fn profile(&self, user_id: &str) -> Result<Option<Profile>, MentorlinkError> {
        self.check()?;
        let data = self.data.read().await;
        Ok(data.profiles.iter().find(|p| p.user_id == user_id).cloned())
    }

    async fn update_profile(
        &self,
        user_id: &str,
        update: &ProfileUpdate,
    ) -> Result<Profile, MentorlinkError> {
        self.check()?;
        update.validate()?;
        let mut data = self.data.write().await;
        let profile = data.profile_mut(user_id);
        profile.apply(update);
        Ok(profile.clone())
    }

    async fn set_profile_picture(
        &self,
        user_id: &str,
        url: &str,
    ) -> Result<Profile, MentorlinkError> {
        self.check()?;
        let mut data = self.data.write().await;
        let profile = data.profile_mut(user_id);
        profile.profile_picture = Some(url.to_string());
        Ok(profile.clone())
    }

    async fn sessions(
        &self,
        user_id: &str,
        query: &SessionQuery,
    ) -> Result<Vec<Session>, MentorlinkError> {
        self.check()?;
        let data = self.data.read().await;
        let mut sessions: Vec<Session> = data
            .sessions
            .iter()
            .filter(|s| s.involves(user_id) && query.matches(s))
            .cloned()
            .collect();
        sessions.sort_by(|a, b| b.scheduled_at.cmp(&a.scheduled_at));
        Ok(sessions)
    }

    async fn cancel_session(
        &self,
        user_id: &str,
        session_id: &str,
    ) -> Result<Session, MentorlinkError> {
        self.check()?;
        let mut data = self.data.write().await;
        let session = data
            .sessions
            .iter_mut()
            .find(|s| s.id == session_id)
            .ok_or_else(|| MentorlinkError::not_found(format!("Session {}", session_id)))?;
        session.ensure_cancellable_by(user_id)?;
        session.status = SessionStatus::Cancelled;
        Ok(session.clone())
    }

    async fn reviews_received(&self, user_id: &str) -> Result<Vec<ReviewRow>, MentorlinkError> {
        self.check()?;
        let data = self.data.read().await;
        Ok(data
            .reviews
            .iter()
            .filter(|r| r.reviewed_id == user_id)
            .map(|r| ReviewRow {
                review: r.clone(),
                reviewer: data.person(&r.reviewer_id).map(Joined::One),
            })
            .collect())
    }

    async fn matches(&self, user_id: &str) -> Result<Vec<MatchRow>, MentorlinkError> {
        self.check()?;
        let data = self.data.read().await;
        Ok(data
            .matches
            .iter()
            .filter_map(|m| {
                let partner = m.partner_of(user_id)?;
                Some(MatchRow {
                    record: m.clone(),
                    partner: data.person(partner).map(|p| Joined::Many(vec![p])),
                })
            })
            .collect())
    }

    async fn notifications(&self, user_id: &str) -> Result<Vec<Notification>, MentorlinkError> {
        self.check()?;
        let data = self.data.read().await;
        let mut notifications: Vec<Notification> = data
            .notifications
            .iter()
            .filter(|n| n.user_id == user_id)
            .cloned()
            .collect();
        notifications.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(notifications)
    }

    async fn mark_notifications_read(
        &self,
        user_id: &str,
        ids: Option<&[String]>,
    ) -> Result<u64, MentorlinkError> {
        self.check()?;
        let mut data = self.data.write().await;
        let mut changed = 0;
        for n in data.notifications.iter_mut() {
            let selected = ids.map_or(true, |ids| ids.contains(&n.id));
            if n.user_id == user_id && selected && !n.read {
                n.read = true;
                changed += 1;
            }
        }
        Ok(changed)
    }

    async fn profile_views(
        &self,
        user_id: &str,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<ProfileView>, MentorlinkError> {
        self.check()?;
        let data = self.data.read().await;
        Ok(data
            .profile_views
            .iter()
            .filter(|v| v.viewed_id == user_id && since.map_or(true, |t| v.viewed_at >= t))
            .cloned()
            .collect())
    }

    async fn mentors(&self) -> Result<Vec<MentorRow>, MentorlinkError> {
        self.check()?;
        let data = self.data.read().await;
        Ok(data
            .users
            .iter()
            .filter(|u| u.role == UserRole::Mentor)
            .map(|u| MentorRow {
                profile: data
                    .profiles
                    .iter()
                    .find(|p| p.user_id == u.id)
                    .cloned()
                    .unwrap_or_else(|| Profile::empty(u.id.clone())),
                name: u.name.clone(),
                ratings: data
                    .reviews
                    .iter()
                    .filter(|r| r.reviewed_id == u.id)
                    .map(|r| r.rating)
                    .collect(),
            })
            .collect())
    }

    async fn create_interest(
        &self,
        from_user_id: &str,
        to_user_id: &str,
    ) -> Result<InterestRequest, MentorlinkError> {
        self.check()?;
        if from_user_id == to_user_id {
            return Err(MentorlinkError::validation(
                "You cannot express interest in yourself",
            ));
        }
        let mut data = self.data.write().await;
        let is_mentor = data
            .users
            .iter()
            .any(|u| u.id == to_user_id && u.role == UserRole::Mentor);
        if !is_mentor {
            return Err(MentorlinkError::not_found(format!("Mentor {}", to_user_id)));
        }
        let pending = data.interests.iter().any(|i| {
            i.from_user_id == from_user_id
                && i.to_user_id == to_user_id
                && i.status == InterestStatus::Pending
        });
        if pending {
            return Err(MentorlinkError::validation(
                "Interest already sent to this mentor",
            ));
        }
        let request = InterestRequest {
            id: uuid::Uuid::new_v4().to_string(),
            from_user_id: from_user_id.to_string(),
            to_user_id: to_user_id.to_string(),
            status: InterestStatus::Pending,
            created_at: Utc::now(),
        };
        data.interests.push(request.clone());
        Ok(request)
    }

    async fn forum_categories(&self) -> Result<Vec<ForumCategory>, MentorlinkError> {
        self.check()?;
        Ok(self.data.read().await.forum_categories.clone())
    }

    async fn forum_posts(
        &self,
        category_id: Option<&str>,
    ) -> Result<Vec<ForumPostRow>, MentorlinkError> {
        self.check()?;
        let data = self.data.read().await;
        Ok(data
            .forum_posts
            .iter()
            .filter(|p| category_id.map_or(true, |c| p.category_id == c))
            .map(|p| {
                let replies: Vec<DateTime<Utc>> = data
                    .forum_replies
                    .iter()
                    .filter(|(post_id, _)| *post_id == p.id)
                    .map(|(_, at)| *at)
                    .collect();
                ForumPostRow {
                    post: p.clone(),
                    author: data.person(&p.author_id).map(Joined::One),
                    reply_count: replies.len() as i64,
                    last_reply_at: replies.into_iter().max(),
                }
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NotificationType;
    use chrono::Duration;

    fn user(id: &str, role: UserRole) -> User {
        User {
            id: id.to_string(),
            name: Some(id.to_uppercase()),
            email: format!("{}@example.com", id),
            role,
        }
    }

    fn session(id: &str, days_ago: i64, status: SessionStatus) -> Session {
        Session {
            id: id.to_string(),
            mentor_id: "mentor".to_string(),
            mentee_id: "mentee".to_string(),
            title: "Check-in".to_string(),
            scheduled_at: Utc::now() - Duration::days(days_ago),
            duration: 45,
            status,
            notes: None,
        }
    }

    fn source() -> MemorySource {
        MemorySource::new(MemoryData {
            users: vec![user("mentor", UserRole::Mentor), user("mentee", UserRole::Mentee)],
            sessions: vec![
                session("s1", 2, SessionStatus::Completed),
                session("s2", -3, SessionStatus::Scheduled),
                session("s3", 40, SessionStatus::Cancelled),
            ],
            notifications: vec![
                Notification {
                    id: "n1".to_string(),
                    user_id: "mentee".to_string(),
                    kind: NotificationType::Match,
                    title: "New match".to_string(),
                    message: "You matched".to_string(),
                    read: false,
                    created_at: Utc::now(),
                },
                Notification {
                    id: "n2".to_string(),
                    user_id: "mentee".to_string(),
                    kind: NotificationType::System,
                    title: "Welcome".to_string(),
                    message: "Hi".to_string(),
                    read: false,
                    created_at: Utc::now() - Duration::days(1),
                },
            ],
            ..Default::default()
        })
    }

    #[tokio::test]
    async fn test_session_query_filters() {
        let src = source();
        let all = src.sessions("mentee", &SessionQuery::default()).await.unwrap();
        assert_eq!(all.len(), 3);

        let recent = src
            .sessions(
                "mentor",
                &SessionQuery {
                    since: Some(Utc::now() - Duration::days(7)),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(recent.len(), 2);

        let none = src.sessions("stranger", &SessionQuery::default()).await.unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn test_cancel_rules() {
        let src = source();
        let cancelled = src.cancel_session("mentee", "s2").await.unwrap();
        assert_eq!(cancelled.status, SessionStatus::Cancelled);

        let again = src.cancel_session("mentee", "s2").await.unwrap_err();
        assert!(matches!(again, MentorlinkError::Validation(_)));

        let outsider = src.cancel_session("stranger", "s1").await.unwrap_err();
        assert!(matches!(outsider, MentorlinkError::NotFound(_)));

        let missing = src.cancel_session("mentee", "nope").await.unwrap_err();
        assert!(matches!(missing, MentorlinkError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_mark_read_selected_then_all() {
        let src = source();
        let ids = vec!["n1".to_string()];
        assert_eq!(src.mark_notifications_read("mentee", Some(&ids)).await.unwrap(), 1);
        assert_eq!(src.mark_notifications_read("mentee", None).await.unwrap(), 1);
        assert_eq!(src.mark_notifications_read("mentee", None).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_interest_rules() {
        let src = source();
        let req = src.create_interest("mentee", "mentor").await.unwrap();
        assert_eq!(req.status, InterestStatus::Pending);

        let dup = src.create_interest("mentee", "mentor").await.unwrap_err();
        assert!(matches!(dup, MentorlinkError::Validation(_)));

        let not_mentor = src.create_interest("mentor", "mentee").await.unwrap_err();
        assert!(matches!(not_mentor, MentorlinkError::NotFound(_)));

        let own = src.create_interest("mentor", "mentor").await.unwrap_err();
        assert!(matches!(own, MentorlinkError::Validation(_)));
    }

    #[tokio::test]
    async fn test_update_profile_creates_row() {
        let src = source();
        assert!(src.profile("mentee").await.unwrap().is_none());
        let profile = src
            .update_profile(
                "mentee",
                &ProfileUpdate {
                    city: Some("Nairobi".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(profile.city.as_deref(), Some("Nairobi"));
        assert!(src.profile("mentee").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_failing_source_errors() {
        let src = source();
        src.set_failing(true);
        assert!(src.mentors().await.is_err());
        src.set_failing(false);
        assert_eq!(src.mentors().await.unwrap().len(), 1);
    }
}
