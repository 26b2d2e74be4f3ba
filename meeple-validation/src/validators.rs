// Primitive format checks shared by the constraint interpreter

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;

// Common regex patterns
static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$").unwrap()
});

static URL_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^https?://[^\s/$.?#].[^\s]*$").unwrap());

static UUID_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}$")
        .unwrap()
});

pub(crate) fn is_email(value: &str) -> bool {
    EMAIL_REGEX.is_match(value)
}

pub(crate) fn is_url(value: &str) -> bool {
    URL_REGEX.is_match(value)
}

pub(crate) fn is_uuid(value: &str) -> bool {
    UUID_REGEX.is_match(value)
}

/// Accepts full RFC 3339 timestamps, `YYYY-MM-DDTHH:MM:SS`, and plain dates.
pub(crate) fn is_iso8601(value: &str) -> bool {
    DateTime::parse_from_rfc3339(value).is_ok()
        || NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S").is_ok()
        || NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok()
}

/// Parse an ISO 8601 string into a canonical UTC timestamp string.
///
/// Date-only input is pinned to midnight UTC.
pub(crate) fn parse_iso8601_utc(value: &str) -> Option<String> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.to_utc().to_rfc3339());
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S") {
        return Some(naive.and_utc().to_rfc3339());
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc().to_rfc3339());
    }
    None
}

/// Replace characters with HTML-significant meaning by their entities.
pub(crate) fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            '/' => escaped.push_str("&#x2F;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_email() {
        assert!(is_email("test@example.com"));
        assert!(is_email("user+tag@example.co.uk"));
        assert!(!is_email("invalid"));
        assert!(!is_email("@example.com"));
        assert!(!is_email("user@"));
    }

    #[test]
    fn test_is_url() {
        assert!(is_url("https://example.com"));
        assert!(is_url("http://localhost:8080/path"));
        assert!(!is_url("not a url"));
        assert!(!is_url("//example.com"));
    }

    #[test]
    fn test_is_uuid() {
        assert!(is_uuid("550e8400-e29b-41d4-a716-446655440000"));
        assert!(is_uuid("550E8400-E29B-41D4-A716-446655440000"));
        assert!(!is_uuid("550e8400e29b41d4a716446655440000"));
        assert!(!is_uuid("not-a-uuid"));
    }

    #[test]
    fn test_is_iso8601() {
        assert!(is_iso8601("2026-08-23T19:30:00Z"));
        assert!(is_iso8601("2026-08-23T19:30:00+02:00"));
        assert!(is_iso8601("2026-08-23T19:30:00"));
        assert!(is_iso8601("2026-08-23"));
        assert!(!is_iso8601("23/08/2026"));
        assert!(!is_iso8601("2026-13-40"));
    }

    #[test]
    fn test_parse_iso8601_utc() {
        assert_eq!(
            parse_iso8601_utc("2026-08-23").as_deref(),
            Some("2026-08-23T00:00:00+00:00")
        );
        assert_eq!(
            parse_iso8601_utc("2026-08-23T19:30:00+02:00").as_deref(),
            Some("2026-08-23T17:30:00+00:00")
        );
        assert!(parse_iso8601_utc("next tuesday").is_none());
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<script>alert("hi")</script>"#),
            "&lt;script&gt;alert(&quot;hi&quot;)&lt;&#x2F;script&gt;"
        );
        assert_eq!(escape_html("plain text"), "plain text");
        assert_eq!(escape_html("Tom & Jerry's"), "Tom &amp; Jerry&#x27;s");
    }
}
