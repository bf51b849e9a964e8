use scraper::ElementRef;

use super::{labeled, labeled_text, section_items, Field};
use crate::parser::dom::{self, Lookup};

pub(crate) const MORE_INFO: Lookup = Lookup::tag("div").class("panel-wrapper more-info-panel");
const ELIGIBILITY: Lookup = Lookup::tag("div").class("eligibility-rules");
const VALUE_CELL: Lookup = Lookup::tag("div").class("col-md-10");

const AVAILABILITY: Lookup = Lookup::tag("strong").attr("data-translate", "Availability");
const DESCRIPTION: Lookup = Lookup::tag("strong").attr("data-translate", "Description");
const LANGUAGES: Lookup = Lookup::tag("strong").attr("data-translate", "Languages");
const COST: Lookup = Lookup::tag("strong").label("Cost:");
const COVERAGE: Lookup = Lookup::tag("strong").attr("data-translate", "Coverage Area");

const WEBSITE: Lookup = Lookup::tag("div").attr("data-translation", "Website");
const WEBSITE_LINK: Lookup = Lookup::tag("a").class("activity-log descriptionProgramWebsite");
const FACEBOOK: Lookup = Lookup::tag("strong").attr("data-translate", "Facebook");
const FACEBOOK_LINK: Lookup = Lookup::tag("a").class("activity-log descriptionProgramFacebook");
const TWITTER: Lookup = Lookup::tag("strong").attr("data-translate", "Twitter");
const TWITTER_LINK: Lookup = Lookup::tag("a").class("activity-log descriptionProgramTwitter");

/// Fields from the "more info" panel of a listing.
pub struct Details {
    pub eligibility: Field<Vec<String>>,
    pub availability: Field<String>,
    pub description: Field<String>,
    pub languages: Field<Vec<String>>,
    pub cost: Field<String>,
    pub website: Field<String>,
    pub facebook: Field<String>,
    pub twitter: Field<String>,
    pub coverage: Field<String>,
}

pub fn panel<'a>(listing: ElementRef<'a>) -> Option<ElementRef<'a>> {
    dom::find(listing, &MORE_INFO)
}

pub fn extract(listing: ElementRef) -> Details {
    let Some(panel) = panel(listing) else {
        return Details {
            eligibility: Field::Absent,
            availability: Field::Absent,
            description: Field::Absent,
            languages: Field::Absent,
            cost: Field::Absent,
            website: Field::Absent,
            facebook: Field::Absent,
            twitter: Field::Absent,
            coverage: Field::Absent,
        };
    };

    Details {
        eligibility: Field::from_option(dom::find(panel, &ELIGIBILITY)).map(section_items),
        availability: labeled_text(panel, &AVAILABILITY, &VALUE_CELL),
        description: labeled_text(panel, &DESCRIPTION, &VALUE_CELL).and_then(non_empty),
        languages: labeled_text(panel, &LANGUAGES, &VALUE_CELL).map(|text| split_languages(&text)),
        cost: labeled_text(panel, &COST, &VALUE_CELL),
        website: link_target(panel, &WEBSITE, &WEBSITE_LINK),
        facebook: link_target(panel, &FACEBOOK, &FACEBOOK_LINK),
        twitter: link_target(panel, &TWITTER, &TWITTER_LINK),
        coverage: labeled_text(panel, &COVERAGE, &VALUE_CELL),
    }
}

fn link_target(panel: ElementRef, label: &Lookup, link: &Lookup) -> Field<String> {
    labeled(panel, label, link).and_then(|a| match dom::attr(a, "href") {
        Some(href) => Field::Present(href),
        None => Field::Malformed("link without href".into()),
    })
}

fn non_empty(text: String) -> Field<String> {
    if text.is_empty() {
        Field::Malformed("empty text".into())
    } else {
        Field::Present(text)
    }
}

fn split_languages(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}
