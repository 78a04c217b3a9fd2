use chrono::{DateTime, Utc};
use serde::Serialize;

use super::format::{display_name, excerpt};
use crate::metrics::relative_time_label;
use crate::models::{ForumCategory, ForumPostRow};

pub const EXCERPT_CHARS: usize = 140;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorySummary {
    pub id: String,
    pub name: String,
    pub description: String,
    pub post_count: usize,
    pub reply_count: i64,
    pub last_activity: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ForumPostCard {
    pub id: String,
    pub title: String,
    pub excerpt: String,
    pub author_name: String,
    pub author_avatar: Option<String>,
    pub category_id: String,
    pub category_name: String,
    pub reply_count: i64,
    pub posted: String,
    pub last_activity: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ForumOverview {
    pub categories: Vec<CategorySummary>,
    pub posts: Vec<ForumPostCard>,
    pub total_posts: usize,
}

pub fn forum_post_card(
    row: &ForumPostRow,
    categories: &[ForumCategory],
    now: DateTime<Utc>,
) -> ForumPostCard {
    let author = row.author.as_ref().and_then(|j| j.first());
    ForumPostCard {
        id: row.post.id.clone(),
        title: row.post.title.clone(),
        excerpt: excerpt(&row.post.content, EXCERPT_CHARS),
        author_name: display_name(author.and_then(|a| a.name.as_deref())),
        author_avatar: author.and_then(|a| a.profile_picture.clone()),
        category_id: row.post.category_id.clone(),
        category_name: categories
            .iter()
            .find(|c| c.id == row.post.category_id)
            .map_or_else(|| "General".to_string(), |c| c.name.clone()),
        reply_count: row.reply_count.max(0),
        posted: relative_time_label(row.post.created_at, now),
        last_activity: relative_time_label(row.last_activity(), now),
    }
}

/// Categories in the given order; posts by most recent activity.
pub fn forum_overview(
    categories: &[ForumCategory],
    posts: &[ForumPostRow],
    now: DateTime<Utc>,
) -> ForumOverview {
    let summaries = categories
        .iter()
        .map(|c| {
            let in_category: Vec<&ForumPostRow> =
                posts.iter().filter(|p| p.post.category_id == c.id).collect();
            CategorySummary {
                id: c.id.clone(),
                name: c.name.clone(),
                description: c.description.clone().unwrap_or_default(),
                post_count: in_category.len(),
                reply_count: in_category.iter().map(|p| p.reply_count.max(0)).sum(),
                last_activity: in_category
                    .iter()
                    .map(|p| p.last_activity())
                    .max()
                    .map(|at| relative_time_label(at, now)),
            }
        })
        .collect();

    let mut sorted: Vec<&ForumPostRow> = posts.iter().collect();
    sorted.sort_by(|a, b| b.last_activity().cmp(&a.last_activity()));

    ForumOverview {
        categories: summaries,
        posts: sorted
            .into_iter()
            .map(|p| forum_post_card(p, categories, now))
            .collect(),
        total_posts: posts.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ForumPost, Joined, PersonSummary};
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 15, 12, 0, 0).unwrap()
    }

    fn category(id: &str, name: &str) -> ForumCategory {
        ForumCategory {
            id: id.to_string(),
            name: name.to_string(),
            description: None,
        }
    }

    fn post(
        id: &str,
        category_id: &str,
        days_ago: i64,
        replies: i64,
        reply_days_ago: Option<i64>,
    ) -> ForumPostRow {
        ForumPostRow {
            post: ForumPost {
                id: id.to_string(),
                category_id: category_id.to_string(),
                author_id: "a".to_string(),
                title: format!("Post {}", id),
                content: "How do I prepare for a system design interview?".to_string(),
                created_at: now() - Duration::days(days_ago),
            },
            author: Some(Joined::Many(vec![PersonSummary {
                id: "a".to_string(),
                name: Some("Barbara".to_string()),
                ..Default::default()
            }])),
            reply_count: replies,
            last_reply_at: reply_days_ago.map(|d| now() - Duration::days(d)),
        }
    }

    #[test]
    fn test_overview_counts_per_category() {
        let categories = vec![category("career", "Career"), category("tech", "Tech")];
        let posts = vec![
            post("p1", "career", 10, 2, Some(1)),
            post("p2", "career", 3, 0, None),
            post("p3", "other", 0, 0, None),
        ];
        let overview = forum_overview(&categories, &posts, now());
        assert_eq!(overview.categories[0].post_count, 2);
        assert_eq!(overview.categories[0].reply_count, 2);
        assert_eq!(overview.categories[0].last_activity.as_deref(), Some("1 day ago"));
        assert_eq!(overview.categories[1].post_count, 0);
        assert_eq!(overview.categories[1].last_activity, None);
        assert_eq!(overview.total_posts, 3);

        let ids: Vec<&str> = overview.posts.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["p3", "p1", "p2"]);
        assert_eq!(overview.posts[0].category_name, "General");
        assert_eq!(overview.posts[1].author_name, "Barbara");
        assert_eq!(overview.posts[1].posted, "1 week ago");
        assert_eq!(overview.posts[1].last_activity, "1 day ago");
    }
}
