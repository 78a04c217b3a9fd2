//! Display strings shared by the view models.

use chrono::{DateTime, Utc};

pub const ANONYMOUS: &str = "Anonymous";
pub const REMOTE: &str = "Remote";

/// "45 min", "1h", "1h 30m". Non-positive durations render as "0 min".
pub fn duration_label(minutes: i32) -> String {
    if minutes <= 0 {
        return "0 min".to_string();
    }
    let (hours, mins) = (minutes / 60, minutes % 60);
    match (hours, mins) {
        (0, m) => format!("{} min", m),
        (h, 0) => format!("{}h", h),
        (h, m) => format!("{}h {}m", h, m),
    }
}

/// Dollar amount with thousands separators: "$1,250.00", "-$3.50".
pub fn currency_label(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let cents = cents.unsigned_abs();
    let dollars = (cents / 100).to_string();
    let mut grouped = String::with_capacity(dollars.len() + dollars.len() / 3);
    for (i, ch) in dollars.chars().enumerate() {
        if i > 0 && (dollars.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("{}${}.{:02}", sign, grouped, cents % 100)
}

/// "Mar 5, 2026"
pub fn date_label(at: DateTime<Utc>) -> String {
    at.format("%b %-d, %Y").to_string()
}

/// "2:30 PM"
pub fn time_label(at: DateTime<Utc>) -> String {
    at.format("%-I:%M %p").to_string()
}

/// "★★★★☆" for a 1..=5 rating.
pub fn stars(rating: i32) -> String {
    let filled = rating.clamp(0, 5) as usize;
    format!("{}{}", "★".repeat(filled), "☆".repeat(5 - filled))
}

/// First `max_chars` characters of `text`, with an ellipsis when cut.
pub fn excerpt(text: &str, max_chars: usize) -> String {
    let trimmed = text.trim();
    if trimmed.chars().count() <= max_chars {
        return trimmed.to_string();
    }
    let cut: String = trimmed.chars().take(max_chars).collect();
    format!("{}…", cut.trim_end())
}

/// Name to show for a person, "Anonymous" when missing or blank.
pub fn display_name(name: Option<&str>) -> String {
    match name.map(str::trim) {
        Some(n) if !n.is_empty() => n.to_string(),
        _ => ANONYMOUS.to_string(),
    }
}

/// "City, Country", whichever half exists, or "Remote".
pub fn location_label(city: Option<&str>, country: Option<&str>) -> String {
    let parts: Vec<&str> = [city, country]
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect();
    if parts.is_empty() {
        REMOTE.to_string()
    } else {
        parts.join(", ")
    }
}

/// Up to two uppercase initials for avatar placeholders.
pub fn initials(name: &str) -> String {
    name.split_whitespace()
        .filter_map(|w| w.chars().next())
        .take(2)
        .flat_map(char::to_uppercase)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_duration_label() {
        assert_eq!(duration_label(45), "45 min");
        assert_eq!(duration_label(60), "1h");
        assert_eq!(duration_label(90), "1h 30m");
        assert_eq!(duration_label(0), "0 min");
    }

    #[test]
    fn test_currency_label() {
        assert_eq!(currency_label(125_000), "$1,250.00");
        assert_eq!(currency_label(5), "$0.05");
        assert_eq!(currency_label(-350), "-$3.50");
        assert_eq!(currency_label(123_456_789), "$1,234,567.89");
    }

    #[test]
    fn test_date_and_time_labels() {
        let at = Utc.with_ymd_and_hms(2026, 3, 5, 14, 30, 0).unwrap();
        assert_eq!(date_label(at), "Mar 5, 2026");
        assert_eq!(time_label(at), "2:30 PM");
    }

    #[test]
    fn test_stars() {
        assert_eq!(stars(4), "★★★★☆");
        assert_eq!(stars(9), "★★★★★");
    }

    #[test]
    fn test_excerpt_cuts_on_char_boundary() {
        assert_eq!(excerpt("short", 10), "short");
        assert_eq!(excerpt("héllo wörld", 5), "héllo…");
    }

    #[test]
    fn test_placeholders() {
        assert_eq!(display_name(None), "Anonymous");
        assert_eq!(display_name(Some("  ")), "Anonymous");
        assert_eq!(location_label(None, None), "Remote");
        assert_eq!(location_label(Some("Nairobi"), None), "Nairobi");
        assert_eq!(location_label(Some("Nairobi"), Some("Kenya")), "Nairobi, Kenya");
    }

    #[test]
    fn test_initials() {
        assert_eq!(initials("ada lovelace byron"), "AL");
        assert_eq!(initials(""), "");
    }
}
