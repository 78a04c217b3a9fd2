//! View-model assemblers
//!
//! Each submodule turns fetched rows plus reducer output into the exact
//! structure one page renders. Assemblers never return backend-shaped fields
//! or nulls where a placeholder string belongs ("Anonymous", "Remote").

pub mod calendar;
pub mod format;
pub mod forum;
pub mod matches;
pub mod mentors;
pub mod notifications;
pub mod profile_views;
pub mod reviews;
pub mod sessions;

pub use calendar::{month_calendar, MonthCalendar, MonthRef};
pub use forum::{forum_overview, ForumOverview};
pub use matches::{match_overview, MatchOverview};
pub use mentors::{mentor_card, MentorCard, MentorFilter, MentorSort};
pub use notifications::{notification_feed, NotificationFeed};
pub use profile_views::{profile_view_stats, ProfileViewStats};
pub use reviews::{review_summary, ReviewSummary};
pub use sessions::{
    session_card, session_dashboard, session_stats, DashboardLimits, SessionCard,
    SessionDashboard, SessionSort, SessionStats, StatusIs,
};
