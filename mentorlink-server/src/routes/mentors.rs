use axum::http::StatusCode;
use mentorlink_core::filter::BrowseState;
use mentorlink_core::models::ExperienceLevel;
use mentorlink_core::page::EmptyState;
use mentorlink_core::views::{mentor_card, MentorCard, MentorFilter, MentorSort};
use mentorlink_core::MentorlinkError;
use serde::Deserialize;
use serde_json::{json, Value};

use super::parse_param;
use crate::http::{error_response, page_response, HttpState};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MentorsParams {
    pub search: Option<String>,
    pub helps_with: Option<String>,
    pub experience: Option<String>,
    pub country: Option<String>,
    pub min_rating: Option<f64>,
    pub sort: Option<String>,
}

impl MentorsParams {
    /// Translate query parameters into a browse state.
    pub fn browse_state(&self) -> Result<BrowseState<MentorFilter, MentorSort>, MentorlinkError> {
        let mut state = BrowseState::new().with_search(self.search.as_deref().unwrap_or(""));

        if let Some(topic) = self.helps_with.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            state = state.with_predicate(MentorFilter::HelpsWith(topic.to_string()));
        }
        if let Some(level) = parse_param::<ExperienceLevel>(self.experience.as_deref())? {
            state = state.with_predicate(MentorFilter::Experience(level));
        }
        if let Some(country) = self.country.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
            state = state.with_predicate(MentorFilter::Country(country.to_string()));
        }
        if let Some(min) = self.min_rating {
            if !(0.0..=5.0).contains(&min) {
                return Err(MentorlinkError::validation(
                    "minRating must be between 0 and 5",
                ));
            }
            state = state.with_predicate(MentorFilter::MinRating(min));
        }
        if let Some(sort) = parse_param::<MentorSort>(self.sort.as_deref())? {
            state = state.sorted_by(sort);
        }
        Ok(state)
    }
}

pub async fn mentors_inner(state: &HttpState, params: MentorsParams) -> (StatusCode, Value) {
    let browse = match params.browse_state() {
        Ok(b) => b,
        Err(e) => return error_response(e),
    };
    let rows = match state.load(state.source.mentors()).await {
        Ok(rows) => rows,
        Err(e) => return error_response(e),
    };
    let cards: Vec<MentorCard> = rows.iter().map(mentor_card).collect();
    let visible: Vec<MentorCard> = browse.apply(&cards).into_iter().cloned().collect();

    page_response(
        "mentors",
        visible,
        EmptyState::no_mentors,
        json!({
            "total": cards.len(),
            "phase": browse.phase(),
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use mentorlink_core::filter::BrowsePhase;

    #[test]
    fn test_params_build_filters_and_sort() {
        let params = MentorsParams {
            helps_with: Some("Rust".to_string()),
            experience: Some("five-to-ten".to_string()),
            sort: Some("rating".to_string()),
            ..Default::default()
        };
        let browse = params.browse_state().unwrap();
        assert_eq!(browse.predicates().len(), 2);
        assert_eq!(browse.sort(), Some(&MentorSort::Rating));
        assert_eq!(browse.phase(), BrowsePhase::Sorted);
    }

    #[test]
    fn test_params_reject_bad_values() {
        let bad_sort = MentorsParams {
            sort: Some("height".to_string()),
            ..Default::default()
        };
        assert!(bad_sort.browse_state().is_err());

        let bad_rating = MentorsParams {
            min_rating: Some(7.0),
            ..Default::default()
        };
        assert!(bad_rating.browse_state().is_err());
    }

    #[test]
    fn test_blank_params_leave_state_idle() {
        let params = MentorsParams {
            search: Some("  ".to_string()),
            country: Some("".to_string()),
            ..Default::default()
        };
        assert_eq!(params.browse_state().unwrap().phase(), BrowsePhase::Idle);
    }
}
