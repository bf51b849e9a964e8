pub mod contact;
pub mod details;
pub mod heading;
pub mod location;
pub mod schedule;
pub mod tags;

use scraper::ElementRef;
use tracing::debug;

use super::dom::{self, Lookup};
use crate::error::{ExtractionError, ListingContext};

/// Outcome of one extraction rule. Sections that are simply not there are
/// `Absent`; sections that are there but unusable are `Malformed`.
#[derive(Debug, Clone, PartialEq)]
pub enum Field<T> {
    Present(T),
    Absent,
    Malformed(String),
}

impl<T> Field<T> {
    pub fn from_option(value: Option<T>) -> Self {
        value.map_or(Field::Absent, Field::Present)
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Field<U> {
        match self {
            Field::Present(v) => Field::Present(f(v)),
            Field::Absent => Field::Absent,
            Field::Malformed(reason) => Field::Malformed(reason),
        }
    }

    pub fn and_then<U>(self, f: impl FnOnce(T) -> Field<U>) -> Field<U> {
        match self {
            Field::Present(v) => f(v),
            Field::Absent => Field::Absent,
            Field::Malformed(reason) => Field::Malformed(reason),
        }
    }

    /// The value, or `None` for both absent and malformed.
    pub fn present(self, name: &'static str) -> Option<T> {
        match self {
            Field::Present(v) => Some(v),
            Field::Absent => None,
            Field::Malformed(reason) => {
                debug!(field = name, %reason, "ignoring malformed field");
                None
            }
        }
    }

    pub fn value_or(self, name: &'static str, default: T) -> T {
        self.present(name).unwrap_or(default)
    }

    /// Absence or malformation becomes an error for the whole listing.
    pub fn required(
        self,
        name: &'static str,
        context: &ListingContext,
    ) -> Result<T, ExtractionError> {
        match self {
            Field::Present(v) => Ok(v),
            Field::Absent => Err(ExtractionError::MissingField {
                field: name,
                context: context.clone(),
            }),
            Field::Malformed(detail) => Err(ExtractionError::MalformedField {
                field: name,
                detail,
                context: context.clone(),
            }),
        }
    }
}

const LIST: Lookup = Lookup::tag("ul");
const ITEM: Lookup = Lookup::tag("li");

/// Value element that follows a label element, e.g. the `col-md-10` cell
/// after `<strong data-translate="Cost">`.
pub(crate) fn labeled<'a>(
    scope: ElementRef<'a>,
    label: &Lookup,
    value: &Lookup,
) -> Field<ElementRef<'a>> {
    match dom::find(scope, label) {
        None => Field::Absent,
        Some(anchor) => match dom::find_next(scope, anchor, value) {
            Some(el) => Field::Present(el),
            None => Field::Malformed("label without a value element".into()),
        },
    }
}

pub(crate) fn labeled_text(scope: ElementRef, label: &Lookup, value: &Lookup) -> Field<String> {
    labeled(scope, label, value).map(dom::text)
}

/// Entries of a section: one per `<li>` when it holds a list, otherwise the
/// section's text as a single entry.
pub(crate) fn section_items(section: ElementRef) -> Vec<String> {
    match dom::find(section, &LIST) {
        Some(list) => dom::find_all(list, &ITEM).into_iter().map(dom::text).collect(),
        None => {
            let block = dom::text(section);
            if block.is_empty() {
                Vec::new()
            } else {
                vec![block]
            }
        }
    }
}

/// Anchor text of each `<li>` in `list`; items without the anchor are skipped.
pub(crate) fn anchor_items(list: ElementRef, anchor: &Lookup) -> Vec<String> {
    dom::find_all(list, &ITEM)
        .into_iter()
        .filter_map(|item| dom::find(item, anchor))
        .map(dom::text)
        .collect()
}
