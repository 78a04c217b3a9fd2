use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::sessions::{session_card, SessionCard};
use crate::error::MentorlinkError;
use crate::models::Session;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthRef {
    pub year: i32,
    pub month: u32,
}

impl MonthRef {
    pub fn new(year: i32, month: u32) -> Result<Self, MentorlinkError> {
        if !(1..=12).contains(&month) {
            return Err(MentorlinkError::validation(format!(
                "month must be between 1 and 12, got {}",
                month
            )));
        }
        Ok(Self { year, month })
    }

    pub fn containing(at: DateTime<Utc>) -> Self {
        Self {
            year: at.year(),
            month: at.month(),
        }
    }

    pub fn previous(self) -> Self {
        if self.month == 1 {
            Self { year: self.year - 1, month: 12 }
        } else {
            Self { year: self.year, month: self.month - 1 }
        }
    }

    pub fn next(self) -> Self {
        if self.month == 12 {
            Self { year: self.year + 1, month: 1 }
        } else {
            Self { year: self.year, month: self.month + 1 }
        }
    }

    pub fn first_day(self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }

    pub fn days_in_month(self) -> u32 {
        let next = self.next();
        match (self.first_day(), next.first_day()) {
            (Some(first), Some(following)) => (following - first).num_days() as u32,
            _ => 0,
        }
    }

    /// Half-open UTC bounds `[start, end)` for range queries.
    pub fn bounds(self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        let start = self.first_day()?.and_hms_opt(0, 0, 0)?.and_utc();
        let end = self.next().first_day()?.and_hms_opt(0, 0, 0)?.and_utc();
        Some((start, end))
    }

    pub fn label(self) -> String {
        self.first_day()
            .map(|d| d.format("%B %Y").to_string())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub day: u32,
    pub is_today: bool,
    pub sessions: Vec<SessionCard>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthCalendar {
    pub month: MonthRef,
    pub label: String,
    /// Empty cells before day 1 in a Sunday-first grid.
    pub leading_blank_days: u32,
    pub days: Vec<CalendarDay>,
    pub session_count: usize,
    pub previous: MonthRef,
    pub next: MonthRef,
}

/// One cell per day; sessions outside the month are ignored.
pub fn month_calendar(
    month: MonthRef,
    sessions: &[Session],
    viewer_id: &str,
    now: DateTime<Utc>,
) -> MonthCalendar {
    let today = now.date_naive();
    let mut sorted: Vec<&Session> = sessions.iter().collect();
    sorted.sort_by_key(|s| s.scheduled_at);

    let days: Vec<CalendarDay> = (1..=month.days_in_month())
        .filter_map(|day| NaiveDate::from_ymd_opt(month.year, month.month, day))
        .map(|date| CalendarDay {
            date,
            day: date.day(),
            is_today: date == today,
            sessions: sorted
                .iter()
                .filter(|s| s.scheduled_at.date_naive() == date)
                .map(|s| session_card(s, viewer_id, now))
                .collect(),
        })
        .collect();

    MonthCalendar {
        month,
        label: month.label(),
        leading_blank_days: month
            .first_day()
            .map_or(0, |d| d.weekday().num_days_from_sunday()),
        session_count: days.iter().map(|d| d.sessions.len()).sum(),
        days,
        previous: month.previous(),
        next: month.next(),
    }
}
