use scraper::ElementRef;

use super::{anchor_items, section_items, Field};
use crate::parser::dom::{self, Lookup};

const PROGRAM_TAGS: Lookup = Lookup::tag("div").class("program-tags");
const TAG_LIST: Lookup = Lookup::tag("ul").class("list-inline");
const SECONDARY: Lookup = Lookup::tag("div").class("secondary-tags");
const ATTRIBUTES: Lookup = Lookup::tag("div").class("attribute-tags");
const ITEM_LIST: Lookup = Lookup::tag("ul");
const TAG_LINK: Lookup = Lookup::tag("a").class("loading-on-click activity-log");

pub struct Tags {
    pub main_services: Field<Vec<String>>,
    pub other_services: Field<Vec<String>>,
    pub serving: Field<Vec<String>>,
}

pub fn extract(listing: ElementRef) -> Tags {
    let Some(tags) = dom::find(listing, &PROGRAM_TAGS) else {
        return Tags {
            main_services: Field::Absent,
            other_services: Field::Absent,
            serving: Field::Absent,
        };
    };

    // The first inline list under the tags block is the primary one.
    let main_services = Field::Present(match dom::find(tags, &TAG_LIST) {
        Some(list) => anchor_items(list, &TAG_LINK),
        None => primary_text(tags),
    });

    let other_services = Field::from_option(dom::find(tags, &SECONDARY)).map(list_or_text);
    let serving = Field::from_option(dom::find(tags, &ATTRIBUTES)).map(list_or_text);

    Tags {
        main_services,
        other_services,
        serving,
    }
}

/// Linked tags when the section holds a list, else its text as one entry.
fn list_or_text(section: ElementRef) -> Vec<String> {
    if dom::find(section, &ITEM_LIST).is_some() {
        anchor_items(section, &TAG_LINK)
    } else {
        section_items(section)
    }
}

/// Text of the tags block outside the secondary and attribute sections.
fn primary_text(tags: ElementRef) -> Vec<String> {
    let mut parts = Vec::new();
    for child in tags.children() {
        match ElementRef::wrap(child) {
            Some(el) if SECONDARY.matches(el) || ATTRIBUTES.matches(el) => {}
            Some(el) => parts.push(dom::text(el)),
            None => {
                if let Some(text) = child.value().as_text() {
                    parts.push(text.trim().to_string());
                }
            }
        }
    }
    let text = dom::collapse_whitespace(&parts.join(" "));
    if text.is_empty() {
        Vec::new()
    } else {
        vec![text]
    }
}
