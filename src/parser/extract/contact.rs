use std::sync::LazyLock;

use regex::Regex;
use scraper::ElementRef;

use super::Field;
use crate::parser::dom::{self, Lookup};

pub(crate) const NEXT_STEPS: Lookup = Lookup::tag("div").class("next-steps-module");
const STEP_ITEM: Lookup = Lookup::tag("span").class("result-next-step-item");
const ANY_LINK: Lookup = Lookup::tag("a").has_attr("href");
const MAP_LINK: Lookup =
    Lookup::tag("a").class("activity-log ph-flyout-click cwdc-flyout-click map-link with-address");

static PHONE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[\d-]+").unwrap());

pub struct Contact {
    pub phone: Field<String>,
    pub address: Field<String>,
    pub map_url: Field<String>,
}

pub fn extract(listing: ElementRef) -> Contact {
    let Some(steps) = dom::find(listing, &NEXT_STEPS) else {
        return Contact {
            phone: Field::Absent,
            address: Field::Absent,
            map_url: Field::Absent,
        };
    };

    let map_link = dom::find(steps, &MAP_LINK);

    Contact {
        phone: Field::from_option(find_phone(steps)),
        address: Field::from_option(map_link.map(|a| dom::collapse_whitespace(&dom::text(a)))),
        map_url: Field::from_option(map_link.and_then(|a| dom::attr(a, "href"))),
    }
}

/// Digits and hyphens from the first contact span that has any, falling
/// back to the first `tel:` link.
fn find_phone(steps: ElementRef) -> Option<String> {
    dom::find_all(steps, &STEP_ITEM)
        .into_iter()
        .find_map(|span| digit_runs(&dom::text(span)))
        .or_else(|| {
            dom::find_all(steps, &ANY_LINK)
                .into_iter()
                .filter_map(|a| a.value().attr("href"))
                .filter(|href| href.contains("tel:"))
                .find_map(digit_runs)
        })
}

fn digit_runs(text: &str) -> Option<String> {
    let joined: String = PHONE_RE.find_iter(text).map(|m| m.as_str()).collect();
    if joined.is_empty() {
        None
    } else {
        Some(joined)
    }
}
