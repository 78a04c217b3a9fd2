//! Inner functions behind each HTTP endpoint, grouped by page.

pub mod calendar;
pub mod dashboard;
pub mod forum;
pub mod interests;
pub mod matches;
pub mod mentors;
pub mod notifications;
pub mod profile;
pub mod reviews;
pub mod sessions;

use std::str::FromStr;

use mentorlink_core::{MentorlinkError, TimeRange};

/// Parse an optional query parameter; blank counts as absent.
pub(crate) fn parse_param<T>(value: Option<&str>) -> Result<Option<T>, MentorlinkError>
where
    T: FromStr<Err = MentorlinkError>,
{
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(v) => v.parse().map(Some),
        None => Ok(None),
    }
}

/// The requested range, or the configured default.
pub(crate) fn time_range(value: Option<&str>, default: &str) -> Result<TimeRange, MentorlinkError> {
    match parse_param(value)? {
        Some(range) => Ok(range),
        None => default.parse(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_range_falls_back_to_default() {
        assert_eq!(time_range(None, "30d").unwrap(), TimeRange::Month);
        assert_eq!(time_range(Some(" "), "7d").unwrap(), TimeRange::Week);
        assert_eq!(time_range(Some("1y"), "7d").unwrap(), TimeRange::Year);
        assert!(time_range(Some("2w"), "7d").is_err());
    }
}
