use std::sync::LazyLock;

use regex::Regex;
use scraper::ElementRef;

use super::details;
use super::Field;
use crate::parser::dom::{self, Lookup};

const ADDRESS_BLOCK: Lookup =
    Lookup::tag("div").class("office-hours-address _js_address address notranslate");

static ZIP_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b\d{5}\b").unwrap());

pub struct Location {
    pub latitude: Field<String>,
    pub longitude: Field<String>,
    pub zipcode: Field<String>,
}

pub fn extract(listing: ElementRef) -> Location {
    let block = details::panel(listing).and_then(|panel| dom::find(panel, &ADDRESS_BLOCK));
    let Some(block) = block else {
        return Location {
            latitude: Field::Absent,
            longitude: Field::Absent,
            zipcode: Field::Absent,
        };
    };

    Location {
        latitude: Field::from_option(dom::attr(block, "data-latitude")),
        longitude: Field::from_option(dom::attr(block, "data-longitude")),
        zipcode: Field::from_option(last_zipcode(&dom::joined_text(block, " "))),
    }
}

/// Last standalone five-digit token in the text. Not necessarily the postal
/// code when a street number also has five digits.
pub fn last_zipcode(text: &str) -> Option<String> {
    ZIP_RE.find_iter(text).last().map(|m| m.as_str().to_string())
}
