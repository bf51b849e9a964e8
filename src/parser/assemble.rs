use scraper::ElementRef;
use tracing::{debug, warn};

use super::extract::{contact, details, heading, location, schedule, tags, Field};
use super::ExtractContext;
use crate::error::{ExtractionError, ListingContext};
use crate::record::{Record, Schedule, NOT_SPECIFIED};

/// Build one record from one listing node. Fails when the name, url or
/// description cannot be read; every other field has a default.
pub fn assemble(
    listing: ElementRef,
    ctx: &ExtractContext,
    mut context: ListingContext,
) -> Result<Record, ExtractionError> {
    let heading = heading::extract(listing, &ctx.base_url);
    // Keep whatever identity we have for the error trail before failing.
    if let Field::Present(name) = &heading.name {
        context.name = Some(name.clone());
    }
    if let Field::Present(url) = &heading.url {
        context.url = Some(url.clone());
    }
    let name = heading.name.required("name", &context)?;
    let url = heading.url.required("url", &context)?;
    let review_date = heading.review_date.present("review_date");

    let details = details::extract(listing);
    let description = details.description.required("description", &context)?;

    let tags = tags::extract(listing);
    let contact = contact::extract(listing);
    let location = location::extract(listing);

    let schedule = match schedule::extract(listing, ctx.offset_hours) {
        Field::Present(s) => s,
        Field::Absent => Schedule::default(),
        Field::Malformed(reason) => {
            warn!(listing = %context, "{}", reason);
            Schedule::default()
        }
    };
    if schedule.is_unknown() {
        debug!(listing = %context, "no hours listed");
    }

    Ok(Record {
        name,
        url,
        main_services: tags.main_services.value_or("main_services", Vec::new()),
        other_services: tags.other_services.present("other_services"),
        serving: tags.serving.value_or("serving", Vec::new()),
        phone: contact.phone.present("phone"),
        website: details.website.present("website"),
        address: contact.address.present("address"),
        map_url: contact.map_url.present("map_url"),
        eligibility: details.eligibility.value_or("eligibility", Vec::new()),
        availability: details.availability.value_or("availability", NOT_SPECIFIED.to_string()),
        description,
        languages: details
            .languages
            .value_or("languages", vec![NOT_SPECIFIED.to_string()]),
        cost: details.cost.value_or("cost", NOT_SPECIFIED.to_string()),
        is_reviewed: review_date.is_some(),
        review_date,
        facebook_url: details.facebook.present("facebook_url"),
        twitter_url: details.twitter.present("twitter_url"),
        coverage_area: details.coverage.value_or("coverage_area", NOT_SPECIFIED.to_string()),
        latitude: location.latitude.present("latitude"),
        longitude: location.longitude.present("longitude"),
        zipcode: location.zipcode.value_or("zipcode", String::new()),
        schedule,
        rating: None,
        service_type: ctx.service_type.clone(),
    })
}
