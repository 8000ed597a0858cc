use std::time::Duration;

use chrono::NaiveDate;

use crate::error::PlaybackError;

/// Parse a display duration ("M:SS", "MM:SS" or "H:MM:SS") into whole seconds.
///
/// Components after the first must stay below 60; the leading component is
/// unbounded so multi-hour recordings parse. Anything else is an error rather
/// than a guess.
pub fn parse_duration(value: &str) -> Result<Duration, PlaybackError> {
    let invalid = || PlaybackError::InvalidDuration {
        value: value.to_string(),
    };

    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(invalid());
    }

    let parts: Vec<&str> = trimmed.split(':').collect();
    if parts.len() < 2 || parts.len() > 3 {
        return Err(invalid());
    }

    let mut total: u64 = 0;
    for (i, part) in parts.iter().enumerate() {
        let component: u64 = part.parse().map_err(|_| invalid())?;
        if i > 0 && component >= 60 {
            return Err(invalid());
        }
        total = total * 60 + component;
    }

    Ok(Duration::from_secs(total))
}

/// Render a duration as "MM:SS", or "H:MM:SS" from one hour up
pub fn format_duration(duration: Duration) -> String {
    let total_seconds = duration.as_secs();
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{:02}:{:02}", minutes, seconds)
    }
}

/// Compact a view count the way the video platform renders it ("1.2K", "3.4M")
pub fn format_view_count(count: u64) -> String {
    if count >= 1_000_000 {
        trim_decimal(count as f64 / 1_000_000.0, "M")
    } else if count >= 1_000 {
        trim_decimal(count as f64 / 1_000.0, "K")
    } else {
        count.to_string()
    }
}

fn trim_decimal(value: f64, suffix: &str) -> String {
    let rendered = format!("{:.1}", value);
    let rendered = rendered.strip_suffix(".0").unwrap_or(&rendered);
    format!("{}{}", rendered, suffix)
}

/// Render an event date for display, e.g. "September 12, 2026"
pub fn format_event_date(date: NaiveDate) -> String {
    date.format("%B %-d, %Y").to_string()
}

/// Render a whole-unit currency amount with thousands separators
pub fn format_currency(amount: u32) -> String {
    let digits = amount.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    out.push('$');
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Render an article reading time, e.g. "5 min read"
pub fn format_read_time(minutes: u32) -> String {
    format!("{} min read", minutes)
}
