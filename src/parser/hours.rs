use std::sync::LazyLock;

use chrono::{NaiveTime, TimeDelta};
use regex::Regex;
use tracing::debug;

use crate::error::TimeParseError;

/// Pacific → Eastern.
pub const DEFAULT_OFFSET_HOURS: i64 = 3;

const SEPARATOR: &str = " \u{2013} ";

static ZONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\s*\b(PST|PDT|PT)\s*$").unwrap());
static DASH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*[-\u{2013}\u{2014}]\s*").unwrap());

/// Shift a listed time range such as `"9:00 AM – 5:00 PM PST"` by
/// `offset_hours` and render it as `"12:00PM – 20:00PM"`.
///
/// The output keeps 24-hour digits followed by the meridiem of the shifted
/// time. Shifts past midnight wrap. Text that does not parse comes back
/// trimmed but otherwise untouched.
pub fn normalize(text: &str, offset_hours: i64) -> String {
    match try_normalize(text, offset_hours) {
        Ok(range) => range,
        Err(e) => {
            debug!(error = %e, "time range left as listed");
            text.trim().to_string()
        }
    }
}

pub fn try_normalize(text: &str, offset_hours: i64) -> Result<String, TimeParseError> {
    let without_zone = ZONE_RE.replace(text.trim(), "");
    let unified = DASH_RE.replace_all(&without_zone, SEPARATOR);

    let parts: Vec<&str> = unified.split(SEPARATOR).map(str::trim).collect();
    let [start, end] = parts.as_slice() else {
        return Err(TimeParseError::Separator(text.trim().to_string()));
    };

    let shift =
        TimeDelta::try_hours(offset_hours).ok_or(TimeParseError::Offset(offset_hours))?;
    let start = parse_clock(start)? + shift;
    let end = parse_clock(end)? + shift;

    Ok(format!("{}{}{}", render(start), SEPARATOR, render(end)))
}

fn parse_clock(s: &str) -> Result<NaiveTime, TimeParseError> {
    NaiveTime::parse_from_str(s, "%I:%M %p").map_err(|source| TimeParseError::Clock {
        input: s.to_string(),
        source,
    })
}

fn render(t: NaiveTime) -> String {
    format!("{}{}", t.format("%H:%M"), t.format("%p"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pacific_to_eastern() {
        assert_eq!(normalize("9:00 AM – 5:00 PM PST", 3), "12:00PM – 20:00PM");
    }

    #[test]
    fn dash_variants_agree() {
        let expected = "12:00PM – 20:00PM";
        assert_eq!(normalize("9:00 AM - 5:00 PM PDT", 3), expected);
        assert_eq!(normalize("9:00 AM – 5:00 PM PDT", 3), expected);
        assert_eq!(normalize("9:00 AM — 5:00 PM PDT", 3), expected);
        assert_eq!(normalize("9:00 AM-5:00 PM", 3), expected);
    }

    #[test]
    fn zone_label_is_case_insensitive() {
        assert_eq!(normalize("8:30 am - 4:30 pm pt", 3), "11:30AM – 19:30PM");
    }

    #[test]
    fn wraps_past_midnight() {
        assert_eq!(normalize("8:00 PM - 11:00 PM PST", 3), "23:00PM – 02:00AM");
    }

    #[test]
    fn garbage_falls_back_to_input() {
        assert_eq!(normalize("garbage input", 3), "garbage input");
        assert_eq!(normalize("  By appointment  ", 3), "By appointment");
    }

    #[test]
    fn unparseable_time_falls_back() {
        assert_eq!(normalize("9 AM - noon", 3), "9 AM - noon");
        assert!(matches!(
            try_normalize("9 AM - noon", 3),
            Err(TimeParseError::Clock { .. })
        ));
    }

    #[test]
    fn out_of_range_offset_falls_back() {
        assert!(matches!(
            try_normalize("9:00 AM - 5:00 PM", i64::MAX),
            Err(TimeParseError::Offset(i64::MAX))
        ));
        assert_eq!(normalize("9:00 AM - 5:00 PM", i64::MAX), "9:00 AM - 5:00 PM");
    }

    #[test]
    fn three_times_is_a_separator_error() {
        assert!(matches!(
            try_normalize("9:00 AM - 1:00 PM - 5:00 PM", 3),
            Err(TimeParseError::Separator(_))
        ));
    }
}
