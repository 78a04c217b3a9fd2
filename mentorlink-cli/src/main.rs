//! mentorlink-cli: terminal client for the MentorLink HTTP API
//!
//! Prints the same view models the web pages render, so a mentor or mentee can
//! check their week without a browser.
//!
//! # Subcommands
//! - `status`: show server health
//! - `dashboard [--range 30d]`: sessions, matches, notifications and reviews at a glance
//! - `sessions [--status S] [--range R] [--search Q] [--json]`: the sessions page
//! - `cancel <session-id>`: cancel a scheduled session
//! - `notifications [--mark-read]`: grouped notification feed
//! - `mentors [--search Q] [--helps-with T] [--country C] [--min-rating N] [--sort S] [--json]`

use anyhow::{anyhow, Context};
use clap::{Parser, Subcommand};
use mentorlink_core::api::{Envelope, USER_HEADER};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Map, Value};

const DEFAULT_SERVER: &str = "http://127.0.0.1:8787";

// ============================================================================
// CLI Definition
// ============================================================================

#[derive(Debug, Parser)]
#[command(name = "mentorlink-cli", version, about = "MentorLink terminal client")]
struct Cli {
    /// MentorLink HTTP server URL (overrides MENTORLINK_HTTP_URL env var)
    #[arg(long, env = "MENTORLINK_HTTP_URL", default_value = DEFAULT_SERVER)]
    server: String,

    /// User id to act as
    #[arg(long, env = "MENTORLINK_USER_ID")]
    user: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Show MentorLink server status
    Status,

    /// Show the home dashboard
    Dashboard {
        /// Time range: 7d, 30d, 90d or all
        #[arg(long)]
        range: Option<String>,

        /// Print the raw JSON payload
        #[arg(long)]
        json: bool,
    },

    /// List sessions with stats for the range
    Sessions {
        /// SCHEDULED, COMPLETED or CANCELLED
        #[arg(long)]
        status: Option<String>,

        /// Time range: 7d, 30d, 90d or all
        #[arg(long)]
        range: Option<String>,

        /// Match against title and notes
        #[arg(long)]
        search: Option<String>,

        #[arg(long)]
        json: bool,
    },

    /// Cancel a scheduled session
    Cancel {
        /// Session id
        id: String,
    },

    /// Show notifications grouped by week
    Notifications {
        /// Mark every notification as read afterwards
        #[arg(long)]
        mark_read: bool,
    },

    /// Browse the mentor directory
    Mentors {
        #[arg(long)]
        search: Option<String>,

        #[arg(long)]
        helps_with: Option<String>,

        #[arg(long)]
        country: Option<String>,

        #[arg(long)]
        min_rating: Option<f64>,

        /// rating, experience, name or reviews
        #[arg(long)]
        sort: Option<String>,

        #[arg(long)]
        json: bool,
    },
}

// ============================================================================
// API Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionLine {
    pub id: String,
    pub title: String,
    pub with_role: String,
    pub date: String,
    pub time: String,
    pub duration: String,
    pub status_label: String,
    pub when: String,
    #[serde(default)]
    pub can_cancel: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStatsLine {
    pub total_sessions: usize,
    pub completed_sessions: usize,
    pub scheduled_sessions: usize,
    pub cancelled_sessions: usize,
    pub completion_rate: u32,
    pub hours_mentored: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MentorLine {
    pub user_id: String,
    pub name: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub company: String,
    pub location: String,
    pub rating_label: String,
    pub review_count: usize,
    #[serde(default)]
    pub helps_with: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationLine {
    pub title: String,
    pub message: String,
    pub read: bool,
    pub time_ago: String,
}

#[derive(Debug, Deserialize)]
pub struct NotificationGroupLine {
    pub label: String,
    pub items: Vec<NotificationLine>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmptyStateLine {
    pub title: String,
    pub message: String,
    pub call_to_action: Option<String>,
}

/// Decode one payload field, treating a missing key as `null`.
fn field<T: DeserializeOwned>(payload: &Map<String, Value>, key: &str) -> anyhow::Result<T> {
    let value = payload.get(key).cloned().unwrap_or(Value::Null);
    serde_json::from_value(value).with_context(|| format!("unexpected '{}' in response", key))
}

fn empty_state(payload: &Map<String, Value>) -> anyhow::Result<Option<EmptyStateLine>> {
    field(payload, "emptyState")
}

// ============================================================================
// Formatting
// ============================================================================

pub fn format_session(s: &SessionLine) -> String {
    let marker = if s.can_cancel { "*" } else { " " };
    format!(
        "{} {} {}  {:<32} {:>6}  with {:<6}  {:<9}  {}  [{}]",
        marker, s.date, s.time, s.title, s.duration, s.with_role, s.status_label, s.when, s.id
    )
}

pub fn format_stats(stats: &SessionStatsLine) -> String {
    format!(
        "{} sessions: {} completed, {} scheduled, {} cancelled | {}% completion | {:.1}h mentored",
        stats.total_sessions,
        stats.completed_sessions,
        stats.scheduled_sessions,
        stats.cancelled_sessions,
        stats.completion_rate,
        stats.hours_mentored
    )
}

pub fn format_mentor(m: &MentorLine) -> String {
    let role = match (m.title.is_empty(), m.company.is_empty()) {
        (false, false) => format!("{} at {}", m.title, m.company),
        (false, true) => m.title.clone(),
        (true, false) => m.company.clone(),
        (true, true) => String::new(),
    };
    let reviews = match m.review_count {
        0 => String::new(),
        1 => " (1 review)".to_string(),
        n => format!(" ({} reviews)", n),
    };
    let mut line = format!("{}  {}{}  {}", m.name, m.rating_label, reviews, m.location);
    if !role.is_empty() {
        line.push_str(&format!("\n    {}", role));
    }
    if !m.helps_with.is_empty() {
        line.push_str(&format!("\n    Helps with: {}", m.helps_with.join(", ")));
    }
    line.push_str(&format!("\n    id: {}", m.user_id));
    line
}

pub fn format_notification(n: &NotificationLine) -> String {
    let marker = if n.read { " " } else { "•" };
    format!("{} {}  ({})\n    {}", marker, n.title, n.time_ago, n.message)
}

pub fn format_empty(e: &EmptyStateLine) -> String {
    match &e.call_to_action {
        Some(action) => format!("{}\n{}\n→ {}", e.title, e.message, action),
        None => format!("{}\n{}", e.title, e.message),
    }
}

/// Sparkline-ish weekly counts, oldest first: "2 0 5 1".
pub fn format_weekly(counts: &[usize]) -> String {
    counts
        .iter()
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn render_dashboard(payload: &Map<String, Value>) -> anyhow::Result<Vec<String>> {
    let range: String = field(payload, "timeRange")?;
    let sessions: Value = field(payload, "sessions")?;
    let stats: SessionStatsLine = serde_json::from_value(sessions["stats"].clone())
        .context("unexpected session stats in response")?;
    let upcoming: Vec<SessionLine> = serde_json::from_value(sessions["upcoming"].clone())
        .context("unexpected upcoming sessions in response")?;
    let matches: Value = field(payload, "matches")?;
    let notifications: Value = field(payload, "notifications")?;
    let reviews: Value = field(payload, "reviews")?;
    let views: Value = field(payload, "profileViews")?;

    let mut lines = vec![
        format!("Dashboard ({})", range),
        format!("  Sessions       {}", format_stats(&stats)),
        format!(
            "  Matches        {} total, {} active, {} pending, {} unread messages",
            matches["total"], matches["active"], matches["pending"], matches["unreadMessages"]
        ),
        format!(
            "  Notifications  {} unread",
            notifications["unreadCount"]
        ),
        format!(
            "  Reviews        {} average from {} reviews",
            reviews["averageRating"], reviews["totalReviews"]
        ),
        format!(
            "  Profile views  {} ({}% vs previous period)",
            views["totalViews"], views["changePercent"]
        ),
    ];
    if upcoming.is_empty() {
        lines.push("  No upcoming sessions".to_string());
    } else {
        lines.push("  Upcoming:".to_string());
        lines.extend(upcoming.iter().map(|s| format!("  {}", format_session(s))));
    }
    Ok(lines)
}

// ============================================================================
// HTTP Client Calls
// ============================================================================

struct ApiClient {
    server: String,
    user: Option<String>,
    client: reqwest::blocking::Client,
}

impl ApiClient {
    fn new(server: &str, user: Option<String>) -> anyhow::Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()?;
        Ok(Self {
            server: server.trim_end_matches('/').to_string(),
            user,
            client,
        })
    }

    /// Send a request and unwrap the `{success, ...}` envelope into its payload.
    fn call(
        &self,
        method: reqwest::Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<Value>,
    ) -> anyhow::Result<Map<String, Value>> {
        let user = self
            .user
            .as_deref()
            .ok_or_else(|| anyhow!("no user id; pass --user or set MENTORLINK_USER_ID"))?;
        let url = format!("{}{}", self.server, path);

        let mut req = self
            .client
            .request(method, &url)
            .header(USER_HEADER, user)
            .query(query);
        if let Some(body) = body {
            req = req.json(&body);
        }

        let resp = req
            .send()
            .with_context(|| format!("connection failed to {}", url))?;
        let status = resp.status();
        let envelope: Envelope = resp
            .json()
            .with_context(|| format!("failed to parse response from {} (HTTP {})", url, status))?;
        envelope
            .into_result()
            .map_err(|e| anyhow!("server returned {}: {}", status, e))
    }

    fn get(&self, path: &str, query: &[(&str, String)]) -> anyhow::Result<Map<String, Value>> {
        self.call(reqwest::Method::GET, path, query, None)
    }
}

/// Query pairs for the options that were actually given.
fn query_of(pairs: &[(&'static str, Option<String>)]) -> Vec<(&'static str, String)> {
    pairs
        .iter()
        .filter_map(|(k, v)| v.as_ref().map(|v| (*k, v.clone())))
        .collect()
}

fn print_json(payload: &Map<String, Value>) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(payload)?);
    Ok(())
}

/// Show the server status by calling GET /health.
fn do_status(server: &str) -> anyhow::Result<()> {
    let client = reqwest::blocking::Client::builder()
        .timeout(std::time::Duration::from_secs(10))
        .build()?;

    let url = format!("{}/health", server.trim_end_matches('/'));
    let resp = client
        .get(&url)
        .send()
        .with_context(|| format!("cannot reach {}", url))?;

    let status = resp.status();
    if !status.is_success() {
        return Err(anyhow!("server unhealthy (HTTP {})", status));
    }
    let body: Value = resp.json().unwrap_or_default();
    println!("MentorLink server: {}", body["status"].as_str().unwrap_or("unknown"));
    println!("Version:           {}", body["version"].as_str().unwrap_or("?"));
    println!("Backend:           {}", body["backend"].as_str().unwrap_or("?"));
    Ok(())
}

fn do_dashboard(api: &ApiClient, range: Option<String>, json_output: bool) -> anyhow::Result<()> {
    let payload = api.get("/api/dashboard", &query_of(&[("timeRange", range)]))?;
    if json_output {
        return print_json(&payload);
    }
    for line in render_dashboard(&payload)? {
        println!("{}", line);
    }
    Ok(())
}

fn do_sessions(
    api: &ApiClient,
    status: Option<String>,
    range: Option<String>,
    search: Option<String>,
    json_output: bool,
) -> anyhow::Result<()> {
    let query = query_of(&[("status", status), ("timeRange", range), ("search", search)]);
    let payload = api.get("/api/sessions", &query)?;
    if json_output {
        return print_json(&payload);
    }

    let stats: SessionStatsLine = field(&payload, "stats")?;
    println!("{}\n", format_stats(&stats));
    if let Some(empty) = empty_state(&payload)? {
        println!("{}", format_empty(&empty));
        return Ok(());
    }
    let sessions: Vec<SessionLine> = field(&payload, "sessions")?;
    for s in &sessions {
        println!("{}", format_session(s));
    }
    if sessions.iter().any(|s| s.can_cancel) {
        println!("\n* can be cancelled with `mentorlink-cli cancel <id>`");
    }
    Ok(())
}

fn do_cancel(api: &ApiClient, id: &str) -> anyhow::Result<()> {
    let path = format!("/api/sessions/{}", id);
    let payload = api.call(reqwest::Method::DELETE, &path, &[], None)?;
    let session: SessionLine = field(&payload, "session")?;
    println!("Cancelled: {}", format_session(&session).trim_start());
    Ok(())
}

fn do_notifications(api: &ApiClient, mark_read: bool) -> anyhow::Result<()> {
    let payload = api.get("/api/notifications", &[])?;
    if let Some(empty) = empty_state(&payload)? {
        println!("{}", format_empty(&empty));
        return Ok(());
    }

    let unread: usize = field(&payload, "unreadCount")?;
    let weekly: Vec<usize> = field(&payload, "weeklyActivity")?;
    println!("{} unread | weekly: {}\n", unread, format_weekly(&weekly));
    let groups: Vec<NotificationGroupLine> = field(&payload, "groups")?;
    for group in &groups {
        println!("{}", group.label);
        for n in &group.items {
            println!("  {}", format_notification(n));
        }
    }

    if mark_read && unread > 0 {
        let result = api.call(
            reqwest::Method::POST,
            "/api/notifications/read",
            &[],
            Some(json!({})),
        )?;
        let updated: u64 = field(&result, "updated")?;
        println!("\nMarked {} notifications as read", updated);
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn do_mentors(
    api: &ApiClient,
    search: Option<String>,
    helps_with: Option<String>,
    country: Option<String>,
    min_rating: Option<f64>,
    sort: Option<String>,
    json_output: bool,
) -> anyhow::Result<()> {
    let query = query_of(&[
        ("search", search),
        ("helpsWith", helps_with),
        ("country", country),
        ("minRating", min_rating.map(|r| r.to_string())),
        ("sort", sort),
    ]);
    let payload = api.get("/api/mentors", &query)?;
    if json_output {
        return print_json(&payload);
    }
    if let Some(empty) = empty_state(&payload)? {
        println!("{}", format_empty(&empty));
        return Ok(());
    }

    let total: usize = field(&payload, "total")?;
    let mentors: Vec<MentorLine> = field(&payload, "mentors")?;
    println!("Showing {} of {} mentors\n", mentors.len(), total);
    for m in &mentors {
        println!("{}\n", format_mentor(m));
    }
    Ok(())
}

// ============================================================================
// Main
// ============================================================================

fn run(cli: Cli) -> anyhow::Result<()> {
    if let Commands::Status = cli.command {
        return do_status(&cli.server);
    }

    let api = ApiClient::new(&cli.server, cli.user)?;
    match cli.command {
        Commands::Status => Ok(()),
        Commands::Dashboard { range, json } => do_dashboard(&api, range, json),
        Commands::Sessions { status, range, search, json } => {
            do_sessions(&api, status, range, search, json)
        }
        Commands::Cancel { id } => do_cancel(&api, &id),
        Commands::Notifications { mark_read } => do_notifications(&api, mark_read),
        Commands::Mentors { search, helps_with, country, min_rating, sort, json } => {
            do_mentors(&api, search, helps_with, country, min_rating, sort, json)
        }
    }
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("mentorlink-cli: {:#}", e);
        std::process::exit(1);
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn session_json(can_cancel: bool) -> Value {
        json!({
            "id": "s1",
            "title": "Career check-in",
            "withRole": "Mentor",
            "withUserId": "kofi",
            "startsAt": "2026-03-16T15:00:00Z",
            "date": "Mon, Mar 16",
            "time": "3:00 PM",
            "duration": "1h",
            "status": "SCHEDULED",
            "statusLabel": "Scheduled",
            "when": "Tomorrow",
            "notes": "No notes",
            "canCancel": can_cancel,
        })
    }

    fn payload(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("payload must be an object"),
        }
    }

    #[test]
    fn test_session_line_ignores_extra_fields() {
        let line: SessionLine = serde_json::from_value(session_json(true)).unwrap();
        assert_eq!(line.with_role, "Mentor");
        assert!(line.can_cancel);
    }

    #[test]
    fn test_format_session_marks_cancellable() {
        let line: SessionLine = serde_json::from_value(session_json(true)).unwrap();
        let text = format_session(&line);
        assert!(text.starts_with('*'));
        assert!(text.contains("Career check-in"));
        assert!(text.ends_with("[s1]"));

        let line: SessionLine = serde_json::from_value(session_json(false)).unwrap();
        assert!(format_session(&line).starts_with(' '));
    }

    #[test]
    fn test_format_stats() {
        let stats = SessionStatsLine {
            total_sessions: 4,
            completed_sessions: 3,
            scheduled_sessions: 0,
            cancelled_sessions: 1,
            completion_rate: 75,
            hours_mentored: 3.0,
        };
        assert_eq!(
            format_stats(&stats),
            "4 sessions: 3 completed, 0 scheduled, 1 cancelled | 75% completion | 3.0h mentored"
        );
    }

    #[test]
    fn test_format_mentor_layout() {
        let mentor = MentorLine {
            user_id: "kofi".to_string(),
            name: "Kofi Mensah".to_string(),
            title: "Staff Engineer".to_string(),
            company: "Paystack".to_string(),
            location: "Accra, Ghana".to_string(),
            rating_label: "4.7".to_string(),
            review_count: 3,
            helps_with: vec!["Rust".to_string(), "System design".to_string()],
        };
        let text = format_mentor(&mentor);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Kofi Mensah  4.7 (3 reviews)  Accra, Ghana");
        assert_eq!(lines[1], "    Staff Engineer at Paystack");
        assert_eq!(lines[2], "    Helps with: Rust, System design");
        assert_eq!(lines[3], "    id: kofi");
    }

    #[test]
    fn test_format_new_mentor_without_role() {
        let mentor = MentorLine {
            user_id: "raj".to_string(),
            name: "Raj Patel".to_string(),
            title: String::new(),
            company: String::new(),
            location: "Remote".to_string(),
            rating_label: "New".to_string(),
            review_count: 0,
            helps_with: vec![],
        };
        assert_eq!(format_mentor(&mentor), "Raj Patel  New  Remote\n    id: raj");
    }

    #[test]
    fn test_format_notification_unread_marker() {
        let n = NotificationLine {
            title: "New match".to_string(),
            message: "You matched with Lena".to_string(),
            read: false,
            time_ago: "Today".to_string(),
        };
        assert!(format_notification(&n).starts_with('•'));
    }

    #[test]
    fn test_empty_state_is_optional() {
        let with_empty = payload(json!({
            "sessions": [],
            "emptyState": {"title": "No sessions yet", "message": "Book one", "callToAction": "Find a mentor"}
        }));
        let empty = empty_state(&with_empty).unwrap().unwrap();
        assert_eq!(format_empty(&empty), "No sessions yet\nBook one\n→ Find a mentor");

        let without = payload(json!({"sessions": []}));
        assert!(empty_state(&without).unwrap().is_none());
    }

    #[test]
    fn test_query_of_skips_missing_options() {
        let query = query_of(&[
            ("status", None),
            ("timeRange", Some("7d".to_string())),
        ]);
        assert_eq!(query, vec![("timeRange", "7d".to_string())]);
    }

    #[test]
    fn test_format_weekly() {
        assert_eq!(format_weekly(&[2, 0, 5, 1]), "2 0 5 1");
        assert_eq!(format_weekly(&[]), "");
    }

    #[test]
    fn test_render_dashboard() {
        let body = payload(json!({
            "timeRange": "7d",
            "sessions": {
                "stats": {
                    "timeRange": "7d",
                    "totalSessions": 4,
                    "completedSessions": 3,
                    "scheduledSessions": 0,
                    "cancelledSessions": 1,
                    "completionRate": 75,
                    "hoursMentored": 3.0,
                    "weeklyActivity": [0, 0, 0, 4]
                },
                "upcoming": [session_json(true)],
                "recent": []
            },
            "matches": {"total": 2, "active": 1, "pending": 1, "unreadMessages": 2},
            "notifications": {"unreadCount": 2, "weeklyActivity": [0, 0, 1, 1]},
            "reviews": {"averageRating": 4.7, "totalReviews": 3},
            "profileViews": {"totalViews": 5, "changePercent": 25}
        }));
        let lines = render_dashboard(&body).unwrap();
        assert_eq!(lines[0], "Dashboard (7d)");
        assert!(lines[2].contains("2 total, 1 active, 1 pending, 2 unread messages"));
        assert!(lines[4].contains("4.7 average from 3 reviews"));
        assert_eq!(lines[6], "  Upcoming:");
        assert!(lines[7].contains("Career check-in"));
    }

    #[test]
    fn test_render_dashboard_rejects_malformed_stats() {
        let body = payload(json!({"timeRange": "7d", "sessions": {"stats": 3}}));
        assert!(render_dashboard(&body).is_err());
    }
}
