use chrono::{DateTime, Utc};
use serde::Serialize;

use super::format::{display_name, initials, location_label};
use crate::metrics::{count_by_status, relative_time_label};
use crate::models::{MatchRow, MatchStatus};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchCard {
    pub id: String,
    pub partner_id: String,
    pub partner_name: String,
    pub partner_initials: String,
    pub partner_title: String,
    pub partner_avatar: Option<String>,
    pub location: String,
    pub status: MatchStatus,
    pub status_label: &'static str,
    pub matched: String,
    pub unread_messages: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchOverview {
    pub total_matches: usize,
    pub active_matches: usize,
    pub pending_matches: usize,
    pub unread_messages: u32,
    pub matches: Vec<MatchCard>,
}

/// `None` when the viewer is not one of the two participants.
pub fn match_card(row: &MatchRow, viewer_id: &str, now: DateTime<Utc>) -> Option<MatchCard> {
    let partner_id = row.record.partner_of(viewer_id)?.to_string();
    let partner = row.partner.as_ref().and_then(|j| j.first());
    let name = display_name(partner.and_then(|p| p.name.as_deref()));
    Some(MatchCard {
        id: row.record.id.clone(),
        partner_id,
        partner_initials: initials(&name),
        partner_name: name,
        partner_title: partner
            .and_then(|p| p.title.clone())
            .unwrap_or_default(),
        partner_avatar: partner.and_then(|p| p.profile_picture.clone()),
        location: location_label(
            partner.and_then(|p| p.city.as_deref()),
            partner.and_then(|p| p.country.as_deref()),
        ),
        status: row.record.status,
        status_label: row.record.status.label(),
        matched: relative_time_label(row.record.matched_at, now),
        unread_messages: row.record.unread_messages.max(0) as u32,
    })
}

/// Active matches first, then by unread messages, then newest.
pub fn match_overview(rows: &[MatchRow], viewer_id: &str, now: DateTime<Utc>) -> MatchOverview {
    let mine: Vec<&MatchRow> = rows
        .iter()
        .filter(|r| r.record.partner_of(viewer_id).is_some())
        .collect();
    let statuses: Vec<MatchStatus> = mine.iter().map(|r| r.record.status).collect();
    let counts = count_by_status(&statuses, |s| *s);

    let mut ordered = mine.clone();
    ordered.sort_by(|a, b| {
        let active = |r: &MatchRow| r.record.status == MatchStatus::Active;
        active(b)
            .cmp(&active(a))
            .then(b.record.unread_messages.cmp(&a.record.unread_messages))
            .then(b.record.matched_at.cmp(&a.record.matched_at))
    });

    let matches: Vec<MatchCard> = ordered
        .into_iter()
        .filter_map(|r| match_card(r, viewer_id, now))
        .collect();

    MatchOverview {
        total_matches: mine.len(),
        active_matches: counts[&MatchStatus::Active],
        pending_matches: counts[&MatchStatus::Pending],
        unread_messages: matches.iter().map(|m| m.unread_messages).sum(),
        matches,
    }
}
