//! Session dashboards: stats for a time range, upcoming and recent cards.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::format::{date_label, duration_label, time_label};
use crate::filter::{Predicate, Searchable, SortKey};
use crate::metrics::{
    bucket_by_week_offset, count_by_status, percentage, relative_time_label, round1, TimeRange,
};
use crate::models::{Session, SessionStatus};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStats {
    pub time_range: TimeRange,
    pub total_sessions: usize,
    pub completed_sessions: usize,
    pub scheduled_sessions: usize,
    pub cancelled_sessions: usize,
    /// Completed as a percentage of completed + cancelled.
    pub completion_rate: u32,
    pub hours_mentored: f64,
    /// Sessions per week, oldest week first.
    pub weekly_activity: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionCard {
    pub id: String,
    pub title: String,
    /// Role of the other participant relative to the viewer.
    pub with_role: &'static str,
    pub with_user_id: String,
    pub starts_at: DateTime<Utc>,
    pub date: String,
    pub time: String,
    pub duration: String,
    pub status: SessionStatus,
    pub status_label: &'static str,
    pub when: String,
    pub notes: String,
    pub can_cancel: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionDashboard {
    pub stats: SessionStats,
    pub upcoming: Vec<SessionCard>,
    pub recent: Vec<SessionCard>,
}

/// Stats over the sessions whose `scheduled_at` falls inside `range`.
pub fn session_stats(
    sessions: &[Session],
    range: TimeRange,
    now: DateTime<Utc>,
    activity_weeks: usize,
) -> SessionStats {
    let in_range: Vec<Session> = range
        .filter_in_range(sessions, |s| s.scheduled_at, now)
        .into_iter()
        .cloned()
        .collect();

    let counts = count_by_status(&in_range, |s| s.status);
    let completed = counts[&SessionStatus::Completed];
    let cancelled = counts[&SessionStatus::Cancelled];

    let completed_minutes: i64 = in_range
        .iter()
        .filter(|s| s.status == SessionStatus::Completed)
        .map(|s| i64::from(s.duration.max(0)))
        .sum();

    SessionStats {
        time_range: range,
        total_sessions: in_range.len(),
        completed_sessions: completed,
        scheduled_sessions: counts[&SessionStatus::Scheduled],
        cancelled_sessions: cancelled,
        completion_rate: percentage(completed, completed + cancelled),
        hours_mentored: round1(completed_minutes as f64 / 60.0),
        weekly_activity: bucket_by_week_offset(&in_range, |s| s.scheduled_at, now, activity_weeks),
    }
}

pub fn session_card(session: &Session, viewer_id: &str, now: DateTime<Utc>) -> SessionCard {
    let (with_role, with_user_id) = if session.mentor_id == viewer_id {
        ("Mentee", session.mentee_id.clone())
    } else {
        ("Mentor", session.mentor_id.clone())
    };
    let when = if session.scheduled_at > now {
        upcoming_label(session.scheduled_at, now)
    } else {
        relative_time_label(session.scheduled_at, now)
    };
    SessionCard {
        id: session.id.clone(),
        title: session.title.clone(),
        with_role,
        with_user_id,
        starts_at: session.scheduled_at,
        date: date_label(session.scheduled_at),
        time: time_label(session.scheduled_at),
        duration: duration_label(session.duration),
        status: session.status,
        status_label: session.status.label(),
        when,
        notes: session
            .notes
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or("No notes")
            .to_string(),
        can_cancel: session.status == SessionStatus::Scheduled && session.scheduled_at > now,
    }
}

/// "Today", "Tomorrow", "In 3 days".
fn upcoming_label(at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    match (at.date_naive() - now.date_naive()).num_days() {
        d if d <= 0 => "Today".to_string(),
        1 => "Tomorrow".to_string(),
        d => format!("In {} days", d),
    }
}

/// Scheduled sessions still ahead of `now`, soonest first.
pub fn upcoming_sessions(
    sessions: &[Session],
    viewer_id: &str,
    now: DateTime<Utc>,
    limit: usize,
) -> Vec<SessionCard> {
    let mut upcoming: Vec<&Session> = sessions
        .iter()
        .filter(|s| s.status == SessionStatus::Scheduled && s.scheduled_at >= now)
        .collect();
    upcoming.sort_by_key(|s| s.scheduled_at);
    upcoming
        .into_iter()
        .take(limit)
        .map(|s| session_card(s, viewer_id, now))
        .collect()
}

/// Sessions already in the past (any status), most recent first.
pub fn recent_sessions(
    sessions: &[Session],
    viewer_id: &str,
    now: DateTime<Utc>,
    limit: usize,
) -> Vec<SessionCard> {
    let mut past: Vec<&Session> = sessions.iter().filter(|s| s.scheduled_at < now).collect();
    past.sort_by(|a, b| b.scheduled_at.cmp(&a.scheduled_at));
    past.into_iter()
        .take(limit)
        .map(|s| session_card(s, viewer_id, now))
        .collect()
}

pub struct DashboardLimits {
    pub activity_weeks: usize,
    pub upcoming: usize,
    pub recent: usize,
}

impl From<&crate::config::DashboardConfig> for DashboardLimits {
    fn from(config: &crate::config::DashboardConfig) -> Self {
        Self {
            activity_weeks: config.activity_weeks,
            upcoming: config.upcoming_limit,
            recent: config.recent_limit,
        }
    }
}

pub fn session_dashboard(
    sessions: &[Session],
    viewer_id: &str,
    range: TimeRange,
    now: DateTime<Utc>,
    limits: &DashboardLimits,
) -> SessionDashboard {
    SessionDashboard {
        stats: session_stats(sessions, range, now, limits.activity_weeks),
        upcoming: upcoming_sessions(sessions, viewer_id, now, limits.upcoming),
        recent: recent_sessions(sessions, viewer_id, now, limits.recent),
    }
}

// List filtering for the sessions page.

impl Searchable for SessionCard {
    fn search_text(&self) -> String {
        format!("{} {}", self.title, self.notes)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatusIs(pub SessionStatus);

impl Predicate<SessionCard> for StatusIs {
    fn matches(&self, card: &SessionCard) -> bool {
        card.status == self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionSort {
    Soonest,
    Latest,
}

impl SortKey<SessionCard> for SessionSort {
    fn compare(&self, a: &SessionCard, b: &SessionCard) -> Ordering {
        match self {
            Self::Soonest => a.starts_at.cmp(&b.starts_at),
            Self::Latest => b.starts_at.cmp(&a.starts_at),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 15, 12, 0, 0).unwrap()
    }

    fn session(id: &str, days_ago: i64, status: SessionStatus) -> Session {
        Session {
            id: id.to_string(),
            mentor_id: "mentor".to_string(),
            mentee_id: "mentee".to_string(),
            title: format!("Session {}", id),
            scheduled_at: now() - Duration::days(days_ago),
            duration: 60,
            status,
            notes: None,
        }
    }

    #[test]
    fn test_week_range_only_counts_recent_sessions() {
        // 4 sessions inside the last 7 days, 6 older ones
        let mut sessions = vec![
            session("a", 1, SessionStatus::Completed),
            session("b", 2, SessionStatus::Completed),
            session("c", 5, SessionStatus::Cancelled),
            session("d", 6, SessionStatus::Completed),
        ];
        for (i, days) in [10, 15, 20, 25, 40, 60].iter().enumerate() {
            sessions.push(session(&format!("old{}", i), *days, SessionStatus::Completed));
        }

        let stats = session_stats(&sessions, TimeRange::Week, now(), 4);
        assert_eq!(stats.total_sessions, 4);
        assert_eq!(stats.completed_sessions, 3);
        assert_eq!(stats.cancelled_sessions, 1);
        assert_eq!(stats.completion_rate, 75);
        assert_eq!(stats.hours_mentored, 3.0);

        let all = session_stats(&sessions, TimeRange::All, now(), 4);
        assert_eq!(all.total_sessions, 10);
        assert_eq!(all.completed_sessions, 9);
    }

    #[test]
    fn test_upcoming_sessions_stay_out_of_windowed_stats() {
        let sessions = vec![
            session("done", 2, SessionStatus::Completed),
            session("next", -2, SessionStatus::Scheduled),
        ];
        let week = session_stats(&sessions, TimeRange::Week, now(), 4);
        assert_eq!(week.total_sessions, 1);
        assert_eq!(week.scheduled_sessions, 0);

        let all = session_stats(&sessions, TimeRange::All, now(), 4);
        assert_eq!(all.total_sessions, 2);
        assert_eq!(all.scheduled_sessions, 1);
    }

    #[test]
    fn test_stats_on_empty_input() {
        let stats = session_stats(&[], TimeRange::Month, now(), 4);
        assert_eq!(stats.total_sessions, 0);
        assert_eq!(stats.completion_rate, 0);
        assert_eq!(stats.hours_mentored, 0.0);
        assert_eq!(stats.weekly_activity, vec![0, 0, 0, 0]);
    }

    #[test]
    fn test_card_from_mentor_perspective() {
        let mut s = session("a", -2, SessionStatus::Scheduled);
        s.duration = 90;
        s.notes = Some("  ".to_string());
        let card = session_card(&s, "mentor", now());
        assert_eq!(card.with_role, "Mentee");
        assert_eq!(card.with_user_id, "mentee");
        assert_eq!(card.duration, "1h 30m");
        assert_eq!(card.notes, "No notes");
        assert_eq!(card.when, "In 2 days");
        assert!(card.can_cancel);
    }

    #[test]
    fn test_past_card_uses_relative_label() {
        let card = session_card(&session("a", 3, SessionStatus::Completed), "mentee", now());
        assert_eq!(card.with_role, "Mentor");
        assert_eq!(card.when, "3 days ago");
        assert!(!card.can_cancel);
    }

    #[test]
    fn test_upcoming_sorted_and_limited() {
        let sessions = vec![
            session("later", -5, SessionStatus::Scheduled),
            session("soon", -1, SessionStatus::Scheduled),
            session("cancelled", -2, SessionStatus::Cancelled),
            session("past", 1, SessionStatus::Scheduled),
        ];
        let cards = upcoming_sessions(&sessions, "mentee", now(), 1);
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].id, "soon");
        assert_eq!(cards[0].when, "Tomorrow");
    }

    #[test]
    fn test_recent_most_recent_first() {
        let sessions = vec![
            session("older", 9, SessionStatus::Completed),
            session("newer", 2, SessionStatus::Cancelled),
            session("future", -1, SessionStatus::Scheduled),
        ];
        let cards = recent_sessions(&sessions, "mentee", now(), 5);
        let ids: Vec<&str> = cards.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["newer", "older"]);
    }
}
