use chrono::{DateTime, Utc};
use serde::Serialize;

use super::format::{display_name, stars};
use crate::metrics::{average, relative_time_label};
use crate::models::ReviewRow;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewCard {
    pub id: String,
    pub reviewer_name: String,
    pub reviewer_avatar: Option<String>,
    pub rating: i32,
    pub stars: String,
    pub comment: String,
    pub posted: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingBucket {
    pub stars: i32,
    pub count: usize,
    pub percent: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewSummary {
    pub average_rating: f64,
    pub total_reviews: usize,
    /// 5 stars first.
    pub distribution: Vec<RatingBucket>,
    pub reviews: Vec<ReviewCard>,
}

pub fn review_card(row: &ReviewRow, now: DateTime<Utc>) -> ReviewCard {
    let reviewer = row.reviewer.as_ref().and_then(|j| j.first());
    ReviewCard {
        id: row.review.id.clone(),
        reviewer_name: display_name(reviewer.and_then(|p| p.name.as_deref())),
        reviewer_avatar: reviewer.and_then(|p| p.profile_picture.clone()),
        rating: row.review.clamped_rating(),
        stars: stars(row.review.clamped_rating()),
        comment: row
            .review
            .comment
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or("No comment")
            .to_string(),
        posted: relative_time_label(row.review.created_at, now),
    }
}

/// Average, 5→1 distribution and newest-first cards.
pub fn review_summary(rows: &[ReviewRow], now: DateTime<Utc>) -> ReviewSummary {
    let total = rows.len();
    let distribution = (1..=5)
        .rev()
        .map(|star| {
            let count = rows
                .iter()
                .filter(|r| r.review.clamped_rating() == star)
                .count();
            RatingBucket {
                stars: star,
                count,
                percent: crate::metrics::percentage(count, total),
            }
        })
        .collect();

    let mut sorted: Vec<&ReviewRow> = rows.iter().collect();
    sorted.sort_by(|a, b| b.review.created_at.cmp(&a.review.created_at));

    ReviewSummary {
        average_rating: average(rows, |r| f64::from(r.review.clamped_rating())),
        total_reviews: total,
        distribution,
        reviews: sorted.into_iter().map(|r| review_card(r, now)).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Joined, PersonSummary, Review};
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 15, 12, 0, 0).unwrap()
    }

    fn row(
        id: &str,
        rating: i32,
        days_ago: i64,
        reviewer: Option<Joined<PersonSummary>>,
    ) -> ReviewRow {
        ReviewRow {
            review: Review {
                id: id.to_string(),
                reviewer_id: "r".to_string(),
                reviewed_id: "mentor".to_string(),
                rating,
                comment: Some("Great session".to_string()),
                created_at: now() - Duration::days(days_ago),
            },
            reviewer,
        }
    }

    fn person(name: &str) -> PersonSummary {
        PersonSummary {
            id: "p".to_string(),
            name: Some(name.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_summary_average_and_distribution() {
        let rows = vec![row("a", 5, 1, None), row("b", 4, 2, None), row("c", 5, 3, None)];
        let summary = review_summary(&rows, now());
        assert_eq!(summary.average_rating, 4.7);
        assert_eq!(summary.total_reviews, 3);
        assert_eq!(summary.distribution[0].stars, 5);
        assert_eq!(summary.distribution[0].count, 2);
        assert_eq!(summary.distribution[0].percent, 67);
        assert_eq!(summary.distribution[1].count, 1);
        assert_eq!(summary.distribution[4].count, 0);
    }

    #[test]
    fn test_empty_summary() {
        let summary = review_summary(&[], now());
        assert_eq!(summary.average_rating, 0.0);
        assert!(summary.reviews.is_empty());
        assert!(summary.distribution.iter().all(|b| b.count == 0 && b.percent == 0));
    }

    #[test]
    fn test_reviewer_joined_as_array_or_object() {
        let as_array = row("a", 4, 0, Some(Joined::Many(vec![person("Grace")])));
        let as_object = row("b", 4, 0, Some(Joined::One(person("Linus"))));
        let missing = row("c", 4, 0, None);
        assert_eq!(review_card(&as_array, now()).reviewer_name, "Grace");
        assert_eq!(review_card(&as_object, now()).reviewer_name, "Linus");
        assert_eq!(review_card(&missing, now()).reviewer_name, "Anonymous");
    }

    #[test]
    fn test_out_of_range_rating_is_clamped() {
        let card = review_card(&row("a", 9, 0, None), now());
        assert_eq!(card.rating, 5);
        assert_eq!(card.stars, "★★★★★");
    }

    #[test]
    fn test_cards_newest_first() {
        let rows = vec![row("old", 3, 20, None), row("new", 5, 0, None)];
        let summary = review_summary(&rows, now());
        assert_eq!(summary.reviews[0].id, "new");
        assert_eq!(summary.reviews[0].posted, "Today");
        assert_eq!(summary.reviews[1].posted, "2 weeks ago");
    }
}
