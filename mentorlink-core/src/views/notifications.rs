use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::metrics::{bucket_by_week_offset, relative_time_label, week_offset};
use crate::models::{Notification, NotificationType};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationItem {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: NotificationType,
    pub icon: &'static str,
    pub title: String,
    pub message: String,
    pub read: bool,
    pub time_ago: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationGroup {
    pub label: String,
    pub items: Vec<NotificationItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationFeed {
    pub total: usize,
    pub unread_count: usize,
    pub groups: Vec<NotificationGroup>,
    pub weekly_activity: Vec<usize>,
}

fn group_label(offset: i64) -> String {
    match offset {
        o if o <= 0 => "This week".to_string(),
        1 => "Last week".to_string(),
        o if o < 4 => format!("{} weeks ago", o),
        _ => "Older".to_string(),
    }
}

pub fn notification_item(n: &Notification, now: DateTime<Utc>) -> NotificationItem {
    NotificationItem {
        id: n.id.clone(),
        kind: n.kind,
        icon: n.kind.icon(),
        title: n.title.clone(),
        message: n.message.clone(),
        read: n.read,
        time_ago: relative_time_label(n.created_at, now),
    }
}

/// Newest first, grouped by week distance from `now`.
pub fn notification_feed(
    notifications: &[Notification],
    now: DateTime<Utc>,
    activity_weeks: usize,
) -> NotificationFeed {
    let mut sorted: Vec<&Notification> = notifications.iter().collect();
    sorted.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    let mut groups: Vec<NotificationGroup> = Vec::new();
    for n in sorted {
        let label = group_label(week_offset(n.created_at, now));
        match groups.last_mut() {
            Some(group) if group.label == label => group.items.push(notification_item(n, now)),
            _ => groups.push(NotificationGroup {
                label,
                items: vec![notification_item(n, now)],
            }),
        }
    }

    NotificationFeed {
        total: notifications.len(),
        unread_count: notifications.iter().filter(|n| !n.read).count(),
        groups,
        weekly_activity: bucket_by_week_offset(
            notifications,
            |n| n.created_at,
            now,
            activity_weeks,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 15, 12, 0, 0).unwrap()
    }

    fn notification(id: &str, days_ago: i64, read: bool) -> Notification {
        Notification {
            id: id.to_string(),
            user_id: "u1".to_string(),
            kind: NotificationType::Message,
            title: "New message".to_string(),
            message: "You have a new message".to_string(),
            read,
            created_at: now() - Duration::days(days_ago),
        }
    }

    #[test]
    fn test_feed_groups_by_week() {
        let items = vec![
            notification("old", 40, true),
            notification("a", 0, false),
            notification("b", 3, true),
            notification("c", 9, false),
            notification("d", 16, true),
        ];
        let feed = notification_feed(&items, now(), 4);
        let labels: Vec<&str> = feed.groups.iter().map(|g| g.label.as_str()).collect();
        assert_eq!(labels, vec!["This week", "Last week", "2 weeks ago", "Older"]);
        assert_eq!(feed.groups[0].items.len(), 2);
        assert_eq!(feed.groups[0].items[0].id, "a");
        assert_eq!(feed.unread_count, 2);
        assert_eq!(feed.total, 5);
        assert_eq!(feed.weekly_activity, vec![0, 1, 1, 2]);
    }

    #[test]
    fn test_item_carries_icon_and_relative_time() {
        let item = notification_item(&notification("a", 1, false), now());
        assert_eq!(item.icon, "message-circle");
        assert_eq!(item.time_ago, "1 day ago");
    }

    #[test]
    fn test_empty_feed() {
        let feed = notification_feed(&[], now(), 4);
        assert!(feed.groups.is_empty());
        assert_eq!(feed.unread_count, 0);
    }
}
