pub mod assemble;
pub mod dom;
pub mod extract;
pub mod hours;

use scraper::Html;
use serde::Serialize;
use tracing::{debug, warn};
use url::Url;

use crate::error::{ExtractionError, ListingContext};
use crate::record::Record;
use dom::Lookup;

const LISTING_CONTAINER: Lookup = Lookup::tag("ul").class("best-programs");
const LISTING: Lookup = Lookup::tag("li").class("search-result card card-v3 program-info");

/// Per-batch constants every listing is extracted with.
#[derive(Debug, Clone)]
pub struct ExtractContext {
    pub offset_hours: i64,
    pub service_type: String,
    pub base_url: Url,
}

impl ExtractContext {
    pub fn new(
        offset_hours: i64,
        service_type: &str,
        base_url: &str,
    ) -> Result<Self, url::ParseError> {
        Ok(Self {
            offset_hours,
            service_type: service_type.to_string(),
            base_url: Url::parse(base_url)?,
        })
    }
}

/// Records and skipped listings from one document, in document order.
#[derive(Debug, Default)]
pub struct DocumentOutcome {
    pub source: String,
    pub listings: usize,
    pub records: Vec<Record>,
    pub skipped: Vec<ExtractionError>,
}

/// Listing → record pipeline for one directory page. A listing that fails
/// assembly is logged and skipped; it never aborts the document.
pub fn extract_document(source: &str, html: &str, ctx: &ExtractContext) -> DocumentOutcome {
    let document = Html::parse_document(html);
    let mut outcome = DocumentOutcome {
        source: source.to_string(),
        ..Default::default()
    };

    let Some(container) = dom::find(document.root_element(), &LISTING_CONTAINER) else {
        warn!(source, "no listing container in document");
        return outcome;
    };

    let listings = dom::find_all(container, &LISTING);
    outcome.listings = listings.len();
    for (index, listing) in listings.into_iter().enumerate() {
        let context = ListingContext {
            source: source.to_string(),
            index,
            ..Default::default()
        };
        match assemble::assemble(listing, ctx, context) {
            Ok(record) => {
                debug!(source, index, name = %record.name, "extracted listing");
                outcome.records.push(record);
            }
            Err(e) => {
                warn!("Skipping listing: {}", e);
                outcome.skipped.push(e);
            }
        }
    }

    outcome
}

/// Diagnostic entry for a listing that produced no record.
#[derive(Debug, Clone, Serialize)]
pub struct SkippedListing {
    #[serde(flatten)]
    pub context: ListingContext,
    pub field: &'static str,
    pub reason: String,
}

impl From<ExtractionError> for SkippedListing {
    fn from(e: ExtractionError) -> Self {
        Self {
            context: e.context().clone(),
            field: e.field(),
            reason: e.to_string(),
        }
    }
}

/// Accumulates document outcomes for a whole batch, in the order absorbed.
#[derive(Debug, Default)]
pub struct RecordBatch {
    pub documents: usize,
    pub listings: usize,
    pub records: Vec<Record>,
    pub skipped: Vec<SkippedListing>,
}

impl RecordBatch {
    pub fn absorb(&mut self, outcome: DocumentOutcome) {
        debug!(
            source = %outcome.source,
            listings = outcome.listings,
            records = outcome.records.len(),
            skipped = outcome.skipped.len(),
            "absorbed document"
        );
        self.documents += 1;
        self.listings += outcome.listings;
        self.records.extend(outcome.records);
        self.skipped
            .extend(outcome.skipped.into_iter().map(SkippedListing::from));
    }
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{DayHours, NOT_SPECIFIED};
    use chrono::Weekday;

    fn ctx() -> ExtractContext {
        ExtractContext::new(3, "Mental Health", "https://www.auntbertha.com/").unwrap()
    }

    fn run(fixture: &str) -> DocumentOutcome {
        let html = std::fs::read_to_string(format!("tests/fixtures/{}.html", fixture)).unwrap();
        extract_document(fixture, &html, &ctx())
    }

    #[test]
    fn irvine_listings_in_document_order() {
        let out = run("irvine_mental_health");
        assert_eq!(out.listings, 4);
        assert_eq!(out.records.len(), 3);
        let names: Vec<&str> = out.records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "Outpatient Counseling (Irvine Family Resource Center)",
                "Crisis Stabilization (Be Well OC)",
                "Peer Support Groups (NAMI Orange County)",
            ]
        );
    }

    #[test]
    fn irvine_skipped_listing_is_reported() {
        let out = run("irvine_mental_health");
        assert_eq!(out.skipped.len(), 1);
        let e = &out.skipped[0];
        assert_eq!(e.field(), "description");
        assert_eq!(e.context().index, 2);
        assert_eq!(e.context().source, "irvine_mental_health");
    }

    #[test]
    fn irvine_full_record() {
        let out = run("irvine_mental_health");
        let r = &out.records[0];
        assert_eq!(
            r.url,
            "https://www.auntbertha.com/irvine-ca/outpatient-counseling/5512"
        );
        assert_eq!(r.main_services, vec!["counseling", "mental health care"]);
        assert_eq!(r.other_services, Some(vec!["support groups".to_string()]));
        assert_eq!(r.serving, vec!["adults", "teens"]);
        assert_eq!(r.phone.as_deref(), Some("949-555-0142"));
        assert_eq!(r.website.as_deref(), Some("https://ifrc.example.org"));
        assert_eq!(
            r.address.as_deref(),
            Some("2 Civic Center Plaza, Irvine, CA 92606")
        );
        assert_eq!(r.map_url.as_deref(), Some("https://maps.google.com/?q=92606"));
        assert_eq!(r.eligibility, vec!["Irvine residents", "ages 13+"]);
        assert_eq!(r.availability, "Accepting new clients");
        assert_eq!(r.description, "Individual and family counseling on a sliding scale.");
        assert_eq!(r.languages, vec!["English", "Spanish", "Farsi"]);
        assert_eq!(r.cost, "Sliding scale");
        assert!(r.is_reviewed);
        assert_eq!(r.review_date.as_deref(), Some("01/22/2025"));
        assert_eq!(r.facebook_url.as_deref(), Some("https://facebook.com/ifrc"));
        assert_eq!(r.twitter_url, None);
        assert_eq!(r.coverage_area, "City of Irvine");
        assert_eq!(r.latitude.as_deref(), Some("33.6857"));
        assert_eq!(r.longitude.as_deref(), Some("-117.8250"));
        assert_eq!(r.zipcode, "92606");
        assert!(!r.schedule.is_24_hour);
        assert_eq!(
            r.schedule.day(Weekday::Mon),
            Some(&DayHours::Open("12:00PM – 20:00PM".to_string()))
        );
        assert_eq!(
            r.schedule.day(Weekday::Fri),
            Some(&DayHours::Open("11:30AM – 17:00PM".to_string()))
        );
        assert_eq!(r.schedule.day(Weekday::Sun), Some(&DayHours::Closed));
        assert_eq!(r.service_type, "Mental Health");
    }

    #[test]
    fn irvine_twenty_four_hour_listing() {
        let out = run("irvine_mental_health");
        let r = &out.records[1];
        assert!(r.schedule.is_24_hour);
        assert_eq!(r.schedule.day(Weekday::Mon), None);
        assert_eq!(r.phone.as_deref(), Some("1-877-727-4747"));
        assert_eq!(r.other_services, None);
        assert_eq!(r.cost, NOT_SPECIFIED);
        assert!(!r.is_reviewed);
        assert_eq!(r.review_date, None);
    }

    #[test]
    fn irvine_odd_schedule_and_no_location() {
        let out = run("irvine_mental_health");
        let r = &out.records[2];
        assert!(r.schedule.is_unknown());
        assert!(!r.has_location());
        assert_eq!(r.zipcode, "");
        assert_eq!(r.eligibility, vec!["Anyone affected by mental illness."]);
        assert_eq!(r.other_services, Some(Vec::new()));
    }

    #[test]
    fn document_without_container() {
        let out = extract_document("empty", "<html><body><p>No results</p></body></html>", &ctx());
        assert_eq!(out.listings, 0);
        assert!(out.records.is_empty());
        assert!(out.skipped.is_empty());
    }

    #[test]
    fn batch_accumulates_in_order() {
        let mut batch = RecordBatch::default();
        batch.absorb(run("irvine_mental_health"));
        batch.absorb(run("la_food_pantry"));
        assert_eq!(batch.documents, 2);
        assert_eq!(batch.records.len(), 5);
        assert_eq!(batch.skipped.len(), 1);
        assert_eq!(batch.skipped[0].field, "description");
        assert_eq!(
            batch.records[3].name,
            "Weekly Grocery Distribution (LA Regional Food Bank)"
        );
    }
}
