use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::MentorlinkError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "UserRole", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    Mentor,
    Mentee,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
#[sqlx(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: Option<String>,
    pub email: String,
    pub role: UserRole,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "ExperienceLevel", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExperienceLevel {
    LessThanOne,
    OneToThree,
    ThreeToFive,
    FiveToTen,
    TenPlus,
}

impl ExperienceLevel {
    pub fn label(self) -> &'static str {
        match self {
            Self::LessThanOne => "Less than 1 year",
            Self::OneToThree => "1-3 years",
            Self::ThreeToFive => "3-5 years",
            Self::FiveToTen => "5-10 years",
            Self::TenPlus => "10+ years",
        }
    }
}

impl std::str::FromStr for ExperienceLevel {
    type Err = MentorlinkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().replace('-', "_").as_str() {
            "LESS_THAN_ONE" => Ok(Self::LessThanOne),
            "ONE_TO_THREE" => Ok(Self::OneToThree),
            "THREE_TO_FIVE" => Ok(Self::ThreeToFive),
            "FIVE_TO_TEN" => Ok(Self::FiveToTen),
            "TEN_PLUS" => Ok(Self::TenPlus),
            other => Err(MentorlinkError::validation(format!(
                "unknown experience level '{}'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
#[sqlx(rename_all = "camelCase")]
pub struct Profile {
    pub user_id: String,
    pub title: Option<String>,
    pub company: Option<String>,
    pub bio: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub years_of_experience: Option<ExperienceLevel>,
    #[serde(default)]
    pub helps_with: Vec<String>,
    pub profile_picture: Option<String>,
}

impl Profile {
    pub fn empty(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            title: None,
            company: None,
            bio: None,
            city: None,
            country: None,
            years_of_experience: None,
            helps_with: Vec::new(),
            profile_picture: None,
        }
    }

    pub fn apply(&mut self, update: &ProfileUpdate) {
        if let Some(title) = &update.title {
            self.title = non_blank(title);
        }
        if let Some(company) = &update.company {
            self.company = non_blank(company);
        }
        if let Some(bio) = &update.bio {
            self.bio = non_blank(bio);
        }
        if let Some(city) = &update.city {
            self.city = non_blank(city);
        }
        if let Some(country) = &update.country {
            self.country = non_blank(country);
        }
        if let Some(level) = update.years_of_experience {
            self.years_of_experience = Some(level);
        }
        if let Some(helps_with) = &update.helps_with {
            self.helps_with = normalize_topics(helps_with);
        }
    }
}

/// Partial edit from the edit-profile page. `None` leaves a field unchanged;
/// a blank string clears it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    pub title: Option<String>,
    pub company: Option<String>,
    pub bio: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub years_of_experience: Option<ExperienceLevel>,
    pub helps_with: Option<Vec<String>>,
}

pub const MAX_BIO_CHARS: usize = 1000;
pub const MAX_TOPICS: usize = 10;

impl ProfileUpdate {
    pub fn validate(&self) -> Result<(), MentorlinkError> {
        if let Some(bio) = &self.bio {
            if bio.chars().count() > MAX_BIO_CHARS {
                return Err(MentorlinkError::validation(format!(
                    "Bio must be at most {} characters",
                    MAX_BIO_CHARS
                )));
            }
        }
        if let Some(topics) = &self.helps_with {
            if normalize_topics(topics).len() > MAX_TOPICS {
                return Err(MentorlinkError::validation(format!(
                    "Choose at most {} topics",
                    MAX_TOPICS
                )));
            }
        }
        Ok(())
    }
}

fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Trim, drop blanks and case-insensitive duplicates, keep first spelling.
fn normalize_topics(topics: &[String]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    topics
        .iter()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .filter(|t| seen.insert(t.to_lowercase()))
        .map(str::to_string)
        .collect()
}

/// Image upload accepted for a profile picture: the stored file extension.
pub fn validate_upload(
    content_type: &str,
    size: usize,
    allowed_types: &[String],
    max_bytes: usize,
) -> Result<&'static str, MentorlinkError> {
    let content_type = content_type.trim().to_ascii_lowercase();
    if !allowed_types.iter().any(|t| t.eq_ignore_ascii_case(&content_type)) {
        return Err(MentorlinkError::validation(format!(
            "Unsupported file type '{}'. Please upload a JPEG, PNG, WebP or GIF image.",
            content_type
        )));
    }
    if size == 0 {
        return Err(MentorlinkError::validation("Uploaded file is empty"));
    }
    if size > max_bytes {
        return Err(MentorlinkError::validation(format!(
            "File is too large ({} bytes, limit {} bytes)",
            size, max_bytes
        )));
    }
    let ext = match content_type.as_str() {
        "image/jpeg" | "image/jpg" => "jpg",
        "image/png" => "png",
        "image/webp" => "webp",
        "image/gif" => "gif",
        _ => "bin",
    };
    Ok(ext)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
#[sqlx(rename_all = "camelCase")]
pub struct ProfileView {
    pub id: String,
    pub viewer_id: Option<String>,
    pub viewed_id: String,
    pub viewed_at: DateTime<Utc>,
}

/// A mentor as the browse page lists them: profile, display name and the
/// ratings they have received.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MentorRow {
    pub profile: Profile,
    pub name: Option<String>,
    #[serde(default)]
    pub ratings: Vec<i32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn allowed() -> Vec<String> {
        crate::config::UploadConfig::default().allowed_types
    }

    #[test]
    fn test_apply_update_trims_and_clears() {
        let mut profile = Profile::empty("u1");
        profile.city = Some("Lagos".to_string());
        profile.apply(&ProfileUpdate {
            bio: Some("  Staff engineer  ".to_string()),
            city: Some("   ".to_string()),
            helps_with: Some(vec![
                "Rust".to_string(),
                " rust ".to_string(),
                "".to_string(),
                "Career growth".to_string(),
            ]),
            ..Default::default()
        });
        assert_eq!(profile.bio.as_deref(), Some("Staff engineer"));
        assert_eq!(profile.city, None);
        assert_eq!(profile.helps_with, vec!["Rust", "Career growth"]);
    }

    #[test]
    fn test_update_rejects_long_bio() {
        let update = ProfileUpdate {
            bio: Some("x".repeat(MAX_BIO_CHARS + 1)),
            ..Default::default()
        };
        assert!(update.validate().is_err());
    }

    #[test]
    fn test_validate_upload_rejects_unsupported_type() {
        let err = validate_upload("application/pdf", 10, &allowed(), 1024).unwrap_err();
        assert!(err.to_string().contains("Unsupported file type"));
    }

    #[test]
    fn test_validate_upload_rejects_oversized_file() {
        assert!(validate_upload("image/png", 2048, &allowed(), 1024).is_err());
    }

    #[test]
    fn test_validate_upload_accepts_png() {
        assert_eq!(validate_upload("IMAGE/PNG", 512, &allowed(), 1024).unwrap(), "png");
    }

    #[test]
    fn test_experience_level_parse() {
        assert_eq!(
            "ten-plus".parse::<ExperienceLevel>().unwrap(),
            ExperienceLevel::TenPlus
        );
        assert!("forever".parse::<ExperienceLevel>().is_err());
    }
}
