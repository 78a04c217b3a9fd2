use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use super::format::{display_name, excerpt, initials, location_label};
use crate::filter::{Predicate, Searchable, SortKey};
use crate::metrics::average;
use crate::models::{ExperienceLevel, MentorRow};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MentorCard {
    pub user_id: String,
    pub name: String,
    pub initials: String,
    pub title: String,
    pub company: String,
    pub bio: String,
    pub location: String,
    #[serde(skip)]
    pub country: Option<String>,
    pub experience: Option<ExperienceLevel>,
    pub experience_label: String,
    pub helps_with: Vec<String>,
    pub avatar: Option<String>,
    pub average_rating: f64,
    pub review_count: usize,
    /// "4.7" or "New" when unrated.
    pub rating_label: String,
}

pub fn mentor_card(row: &MentorRow) -> MentorCard {
    let p = &row.profile;
    let name = display_name(row.name.as_deref());
    let ratings: Vec<i32> = row.ratings.iter().map(|r| (*r).clamp(1, 5)).collect();
    let average_rating = average(&ratings, |r| f64::from(*r));
    MentorCard {
        user_id: p.user_id.clone(),
        initials: initials(&name),
        name,
        title: p.title.clone().unwrap_or_default(),
        company: p.company.clone().unwrap_or_default(),
        bio: p.bio.as_deref().map(|b| excerpt(b, 200)).unwrap_or_default(),
        location: location_label(p.city.as_deref(), p.country.as_deref()),
        country: p.country.clone(),
        experience: p.years_of_experience,
        experience_label: p
            .years_of_experience
            .map_or("Not specified", |e| e.label())
            .to_string(),
        helps_with: p.helps_with.clone(),
        avatar: p.profile_picture.clone(),
        average_rating,
        review_count: ratings.len(),
        rating_label: if ratings.is_empty() {
            "New".to_string()
        } else {
            format!("{:.1}", average_rating)
        },
    }
}

impl Searchable for MentorCard {
    fn search_text(&self) -> String {
        format!("{} {} {}", self.name, self.title, self.company)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MentorFilter {
    /// Case-insensitive match against one of the mentor's topics.
    HelpsWith(String),
    Experience(ExperienceLevel),
    Country(String),
    MinRating(f64),
}

impl Predicate<MentorCard> for MentorFilter {
    fn matches(&self, card: &MentorCard) -> bool {
        match self {
            Self::HelpsWith(topic) => card
                .helps_with
                .iter()
                .any(|t| t.eq_ignore_ascii_case(topic.trim())),
            Self::Experience(level) => card.experience == Some(*level),
            Self::Country(country) => card
                .country
                .as_deref()
                .is_some_and(|c| c.trim().eq_ignore_ascii_case(country.trim())),
            Self::MinRating(min) => card.review_count > 0 && card.average_rating >= *min,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MentorSort {
    /// Highest rated first; unrated mentors last.
    Rating,
    /// Most experienced first; unspecified last.
    Experience,
    Name,
    MostReviewed,
}

impl std::str::FromStr for MentorSort {
    type Err = crate::error::MentorlinkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rating" => Ok(Self::Rating),
            "experience" => Ok(Self::Experience),
            "name" => Ok(Self::Name),
            "reviews" | "most_reviewed" => Ok(Self::MostReviewed),
            other => Err(crate::error::MentorlinkError::validation(format!(
                "unknown sort '{}'",
                other
            ))),
        }
    }
}

impl SortKey<MentorCard> for MentorSort {
    fn compare(&self, a: &MentorCard, b: &MentorCard) -> Ordering {
        match self {
            Self::Rating => (b.review_count > 0)
                .cmp(&(a.review_count > 0))
                .then(b.average_rating.total_cmp(&a.average_rating))
                .then(b.review_count.cmp(&a.review_count)),
            Self::Experience => match (a.experience, b.experience) {
                (Some(x), Some(y)) => y.cmp(&x),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            },
            Self::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
            Self::MostReviewed => b.review_count.cmp(&a.review_count),
        }
    }
}
