use scraper::ElementRef;
use tracing::debug;

use super::contact::NEXT_STEPS;
use super::Field;
use crate::parser::dom::{self, Lookup};
use crate::parser::hours;
use crate::record::{DayHours, Schedule, WEEKDAYS};

const HOURS_DROPDOWN: Lookup = Lookup::tag("div").class("office-hours-schedule see-hours-dropdown");
const SPAN: Lookup = Lookup::tag("span");
const GEO_HOURS: Lookup = Lookup::tag("span").class("result-geo-hours");

/// Hours for one listing.
///
/// A day-by-day block must decompose into (label, value) span pairs; an odd
/// span count is `Malformed` and no day is recorded. Without that block, a
/// "24 hours" indicator sets the flag. Nothing found is `Absent`.
pub fn extract(listing: ElementRef, offset_hours: i64) -> Field<Schedule> {
    let Some(steps) = dom::find(listing, &NEXT_STEPS) else {
        return Field::Absent;
    };

    if let Some(block) = dom::find(steps, &HOURS_DROPDOWN) {
        return day_by_day(block, offset_hours);
    }

    let Some(indicator) = dom::find(steps, &GEO_HOURS) else {
        return Field::Absent;
    };
    let text = dom::stripped_text(indicator);
    if text.contains("24") || text.to_lowercase().contains("24-hour") {
        Field::Present(Schedule::twenty_four_hour())
    } else {
        debug!(%text, "hours indicator does not say 24 hours");
        Field::Absent
    }
}

fn day_by_day(block: ElementRef, offset_hours: i64) -> Field<Schedule> {
    let spans = dom::find_all(block, &SPAN);
    if spans.len() % 2 != 0 {
        return Field::Malformed(format!(
            "unexpected hours format: {} day/value spans, expected pairs",
            spans.len()
        ));
    }

    let mut schedule = Schedule::default();
    for pair in spans.chunks_exact(2) {
        let label_text = dom::text(pair[0]);
        let label = drop_last_char(&label_text);
        let Some(&(_, day)) = WEEKDAYS.iter().find(|(name, _)| *name == label) else {
            debug!(%label, "ignoring unknown day label");
            continue;
        };
        let value = dom::text(pair[1]);
        let hours = if value.contains("Closed") {
            DayHours::Closed
        } else {
            DayHours::Open(hours::normalize(&value, offset_hours))
        };
        schedule.set(day, hours);
    }
    Field::Present(schedule)
}

/// Day labels are listed as `"Monday:"`.
fn drop_last_char(s: &str) -> &str {
    let mut chars = s.chars();
    chars.next_back();
    chars.as_str().trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Weekday;
    use scraper::Html;

    fn steps(inner: &str) -> Html {
        Html::parse_fragment(&format!(r#"<div class="next-steps-module">{}</div>"#, inner))
    }

    #[test]
    fn paired_days() {
        let html = steps(
            r#"<div class="office-hours-schedule see-hours-dropdown">
                <span>Monday:</span><span>9:00 AM - 5:00 PM PST</span>
                <span>Saturday:</span><span>Closed</span>
                <span>Holiday:</span><span>Closed</span>
            </div>"#,
        );
        let Field::Present(s) = extract(html.root_element(), 3) else {
            panic!("expected schedule");
        };
        assert_eq!(s.day(Weekday::Mon), Some(&DayHours::Open("12:00PM – 20:00PM".to_string())));
        assert_eq!(s.day(Weekday::Sat), Some(&DayHours::Closed));
        assert_eq!(s.day(Weekday::Tue), None);
        assert!(!s.is_24_hour);
    }

    #[test]
    fn odd_span_count_records_nothing() {
        let html = steps(
            r#"<div class="office-hours-schedule see-hours-dropdown">
                <span>Monday:</span><span>9:00 AM - 5:00 PM</span><span>Tuesday:</span>
            </div>"#,
        );
        assert!(matches!(extract(html.root_element(), 3), Field::Malformed(_)));
    }

    #[test]
    fn unparsed_hours_kept_as_listed() {
        let html = steps(
            r#"<div class="office-hours-schedule see-hours-dropdown">
                <span>Friday:</span><span> By appointment </span>
            </div>"#,
        );
        let Field::Present(s) = extract(html.root_element(), 3) else {
            panic!("expected schedule");
        };
        assert_eq!(s.day(Weekday::Fri), Some(&DayHours::Open("By appointment".to_string())));
    }

    #[test]
    fn twenty_four_hour_indicator() {
        let html = steps(r#"<span class="result-geo-hours"> Open <b>24 hours</b></span>"#);
        let Field::Present(s) = extract(html.root_element(), 3) else {
            panic!("expected schedule");
        };
        assert!(s.is_24_hour);
        assert_eq!(s.day(Weekday::Mon), None);
    }

    #[test]
    fn indicator_without_24_is_unknown() {
        let html = steps(r#"<span class="result-geo-hours">Call for hours</span>"#);
        assert_eq!(extract(html.root_element(), 3), Field::Absent);
        assert_eq!(extract(steps("").root_element(), 3), Field::Absent);
    }

    #[test]
    fn label_colon_removed() {
        assert_eq!(drop_last_char("Wednesday:"), "Wednesday");
        assert_eq!(drop_last_char(""), "");
    }
}
