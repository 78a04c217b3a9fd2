use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::metrics::{bucket_by_week_offset, percent_change, TimeRange};
use crate::models::ProfileView;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileViewStats {
    pub period: TimeRange,
    pub total_views: usize,
    /// Distinct signed-in viewers; anonymous views are not counted here.
    pub unique_viewers: usize,
    pub previous_period_views: usize,
    /// Percent change against the previous period of the same length.
    pub change_percent: i64,
    pub weekly_views: Vec<usize>,
}

/// `views` may reach back into the previous period; those rows only feed
/// `previous_period_views`.
pub fn profile_view_stats(
    views: &[ProfileView],
    period: TimeRange,
    now: DateTime<Utc>,
    activity_weeks: usize,
) -> ProfileViewStats {
    let current: Vec<ProfileView> = period
        .filter_in_range(views, |v| v.viewed_at, now)
        .into_iter()
        .cloned()
        .collect();

    let previous = match (period.previous_start(now), period.start(now)) {
        (Some(prev_start), Some(start)) => views
            .iter()
            .filter(|v| v.viewed_at >= prev_start && v.viewed_at < start)
            .count(),
        _ => 0,
    };

    let unique: HashSet<&str> = current
        .iter()
        .filter_map(|v| v.viewer_id.as_deref())
        .collect();

    ProfileViewStats {
        period,
        total_views: current.len(),
        unique_viewers: unique.len(),
        previous_period_views: previous,
        change_percent: percent_change(previous, current.len()),
        weekly_views: bucket_by_week_offset(&current, |v| v.viewed_at, now, activity_weeks),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 15, 12, 0, 0).unwrap()
    }

    fn view(viewer: Option<&str>, days_ago: i64) -> ProfileView {
        ProfileView {
            id: format!("v-{}-{}", viewer.unwrap_or("anon"), days_ago),
            viewer_id: viewer.map(str::to_string),
            viewed_id: "me".to_string(),
            viewed_at: now() - Duration::days(days_ago),
        }
    }

    #[test]
    fn test_week_period_with_previous_comparison() {
        let views = vec![
            view(Some("a"), 1),
            view(Some("a"), 2),
            view(Some("b"), 3),
            view(None, 4),
            view(Some("c"), 9),
            view(Some("d"), 12),
        ];
        let stats = profile_view_stats(&views, TimeRange::Week, now(), 4);
        assert_eq!(stats.total_views, 4);
        assert_eq!(stats.unique_viewers, 2);
        assert_eq!(stats.previous_period_views, 2);
        assert_eq!(stats.change_percent, 100);
        assert_eq!(stats.weekly_views, vec![0, 0, 0, 4]);
    }

    #[test]
    fn test_all_time_has_no_previous_period() {
        let views = vec![view(Some("a"), 100)];
        let stats = profile_view_stats(&views, TimeRange::All, now(), 4);
        assert_eq!(stats.total_views, 1);
        assert_eq!(stats.previous_period_views, 0);
        assert_eq!(stats.change_percent, 100);
    }
}
