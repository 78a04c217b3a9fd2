//! Metric reducers
//!
//! Pure folds over already-fetched rows: status breakdowns, averages,
//! percentage rates, per-week activity buckets and relative time labels.
//! Nothing here touches I/O or mutates its input.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::MentorlinkError;
use crate::models::Enumerated;

const SECONDS_PER_DAY: i64 = 86_400;
const SECONDS_PER_WEEK: i64 = 7 * SECONDS_PER_DAY;

// ============================================================================
// Counting and averaging
// ============================================================================

/// Count records per status. Every status of `S` is present in the result,
/// so an empty input yields an all-zero map.
pub fn count_by_status<T, S: Enumerated>(
    records: &[T],
    status_of: impl Fn(&T) -> S,
) -> BTreeMap<S, usize> {
    let mut counts: BTreeMap<S, usize> = S::ALL.iter().map(|s| (*s, 0)).collect();
    for record in records {
        *counts.entry(status_of(record)).or_insert(0) += 1;
    }
    counts
}

/// Mean of `value_of` over the records, rounded to one decimal place.
/// Returns 0 for an empty slice.
pub fn average<T>(records: &[T], value_of: impl Fn(&T) -> f64) -> f64 {
    if records.is_empty() {
        return 0.0;
    }
    let sum: f64 = records.iter().map(value_of).sum();
    round1(sum / records.len() as f64)
}

pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// `part` as a rounded percentage of `whole`; 0 when `whole` is 0.
pub fn percentage(part: usize, whole: usize) -> u32 {
    if whole == 0 {
        return 0;
    }
    ((part as f64 / whole as f64) * 100.0).round() as u32
}

/// Signed percent change from `previous` to `current`. Growth from zero is
/// reported as 100.
pub fn percent_change(previous: usize, current: usize) -> i64 {
    if previous == 0 {
        return if current == 0 { 0 } else { 100 };
    }
    (((current as f64 - previous as f64) / previous as f64) * 100.0).round() as i64
}

// ============================================================================
// Time bucketing
// ============================================================================

/// Whole weeks between `date` and `now`, floored. Negative for future dates.
pub fn week_offset(date: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (now - date).num_seconds().div_euclid(SECONDS_PER_WEEK)
}

/// Per-week counts over the last `window_weeks` weeks, oldest week first.
///
/// A record lands in bucket `window_weeks - 1 - offset` where `offset` is its
/// floored week distance from `now`. Future records and records `window_weeks`
/// or more weeks old are dropped.
pub fn bucket_by_week_offset<T>(
    records: &[T],
    date_of: impl Fn(&T) -> DateTime<Utc>,
    now: DateTime<Utc>,
    window_weeks: usize,
) -> Vec<usize> {
    let mut buckets = vec![0usize; window_weeks];
    let window = window_weeks as i64;
    for record in records {
        let offset = week_offset(date_of(record), now);
        if offset >= 0 && offset < window {
            buckets[(window - 1 - offset) as usize] += 1;
        }
    }
    buckets
}

/// Whole days elapsed since `past`; future dates count as 0.
pub fn days_between(past: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (now - past).num_seconds().div_euclid(SECONDS_PER_DAY).max(0)
}

/// Human-readable elapsed time: "Today", "3 days ago", "2 weeks ago", ...
pub fn relative_time_label(past: DateTime<Utc>, now: DateTime<Utc>) -> String {
    relative_days_label(days_between(past, now))
}

pub fn relative_days_label(days: i64) -> String {
    match days {
        d if d <= 0 => "Today".to_string(),
        1 => "1 day ago".to_string(),
        d if d < 7 => format!("{} days ago", d),
        d if d < 14 => "1 week ago".to_string(),
        d if d < 30 => format!("{} weeks ago", d / 7),
        d => {
            let months = d / 30;
            if months == 1 {
                "1 month ago".to_string()
            } else {
                format!("{} months ago", months)
            }
        }
    }
}

// ============================================================================
// Time ranges
// ============================================================================

/// Time-range selector used by dashboards and analytics pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeRange {
    #[serde(rename = "7d")]
    Week,
    #[serde(rename = "30d")]
    Month,
    #[serde(rename = "90d")]
    Quarter,
    #[serde(rename = "1y")]
    Year,
    #[serde(rename = "all")]
    All,
}

impl TimeRange {
    pub fn days(self) -> Option<i64> {
        match self {
            Self::Week => Some(7),
            Self::Month => Some(30),
            Self::Quarter => Some(90),
            Self::Year => Some(365),
            Self::All => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Week => "7d",
            Self::Month => "30d",
            Self::Quarter => "90d",
            Self::Year => "1y",
            Self::All => "all",
        }
    }

    /// Inclusive start of the window, `None` for `All`.
    pub fn start(self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.days().map(|d| now - Duration::days(d))
    }

    /// Start of the equally long window immediately before this one.
    pub fn previous_start(self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.days().map(|d| now - Duration::days(2 * d))
    }

    /// A windowed range covers `[start, now]`; upcoming dates fall outside it.
    /// `All` has no bounds.
    pub fn contains(self, date: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        self.start(now).map_or(true, |start| date >= start && date <= now)
    }

    /// Records whose date falls inside the window.
    pub fn filter_in_range<'a, T>(
        self,
        records: &'a [T],
        date_of: impl Fn(&T) -> DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Vec<&'a T> {
        records
            .iter()
            .filter(|r| self.contains(date_of(*r), now))
            .collect()
    }
}

impl Default for TimeRange {
    fn default() -> Self {
        Self::Month
    }
}

impl std::str::FromStr for TimeRange {
    type Err = MentorlinkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "7d" | "week" => Ok(Self::Week),
            "30d" | "month" => Ok(Self::Month),
            "90d" | "quarter" => Ok(Self::Quarter),
            "1y" | "365d" | "year" => Ok(Self::Year),
            "all" => Ok(Self::All),
            other => Err(MentorlinkError::validation(format!(
                "unknown time range '{}' (expected 7d, 30d, 90d, 1y or all)",
                other
            ))),
        }
    }
}

impl std::fmt::Display for TimeRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// TESTS
// ============================================================================
