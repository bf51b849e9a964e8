use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use scraper::ElementRef;
use url::Url;

use super::Field;
use crate::parser::dom::{self, Lookup};

const CARD_HEADING: Lookup = Lookup::tag("div").class("card-heading");
const PROGRAM_LINK: Lookup =
    Lookup::tag("a").class("activity-log ph-flyout-click cwdc-flyout-click click-cookie");
const ORG_LINK: Lookup = Lookup::tag("a").class("activity-log click-cookie");
const LAST_REVIEWED: Lookup = Lookup::tag("div").class("last-reviewed");

static REVIEW_DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{2}/\d{2}/\d{4}").unwrap());

pub struct Heading {
    pub name: Field<String>,
    pub url: Field<String>,
    pub review_date: Field<String>,
}

pub fn extract(listing: ElementRef, base_url: &Url) -> Heading {
    let Some(heading) = dom::find(listing, &CARD_HEADING) else {
        return Heading {
            name: Field::Absent,
            url: Field::Absent,
            review_date: Field::Absent,
        };
    };

    let program = dom::find(heading, &PROGRAM_LINK);
    let org = dom::find(heading, &ORG_LINK);

    let name = match (program, org) {
        (Some(p), Some(o)) => Field::Present(compose_name(&dom::text(p), &dom::text(o))),
        _ => Field::Absent,
    };

    let url = Field::from_option(program.and_then(|p| dom::attr(p, "href")))
        .and_then(|href| match base_url.join(&href) {
            Ok(u) => Field::Present(u.to_string()),
            Err(e) => Field::Malformed(format!("href '{}': {}", href, e)),
        });

    let review_date = Field::from_option(dom::find(heading, &LAST_REVIEWED))
        .and_then(|el| parse_review_date(&dom::text(el)));

    Heading {
        name,
        url,
        review_date,
    }
}

/// `"Program (Organization)"` with whitespace collapsed and no padding
/// inside the parentheses.
pub fn compose_name(program: &str, org: &str) -> String {
    dom::collapse_whitespace(&format!("{} ({})", program, org))
        .replace("( ", "(")
        .replace(" )", ")")
}

/// First `MM/DD/YYYY` in the "last reviewed" text, kept as listed.
fn parse_review_date(text: &str) -> Field<String> {
    let Some(m) = REVIEW_DATE_RE.find(text) else {
        return Field::Absent;
    };
    match NaiveDate::parse_from_str(m.as_str(), "%m/%d/%Y") {
        Ok(_) => Field::Present(m.as_str().to_string()),
        Err(e) => Field::Malformed(format!("review date '{}': {}", m.as_str(), e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    fn base() -> Url {
        Url::parse("https://www.auntbertha.com/").unwrap()
    }

    #[test]
    fn composes_name_and_absolute_url() {
        let html = Html::parse_fragment(
            r#"<div class="card-heading">
                <a class="activity-log ph-flyout-click cwdc-flyout-click click-cookie"
                   href="/irvine-ca/emergency-shelter/123">
                   Emergency   Shelter
                </a>
                <a class="activity-log click-cookie" href="/org/9"> Families Forward </a>
                <div class="last-reviewed">Last reviewed on 03/14/2024</div>
            </div>"#,
        );
        let h = extract(html.root_element(), &base());
        assert_eq!(
            h.name,
            Field::Present("Emergency Shelter (Families Forward)".to_string())
        );
        assert_eq!(
            h.url,
            Field::Present("https://www.auntbertha.com/irvine-ca/emergency-shelter/123".to_string())
        );
        assert_eq!(h.review_date, Field::Present("03/14/2024".to_string()));
    }

    #[test]
    fn missing_org_means_no_name() {
        let html = Html::parse_fragment(
            r#"<div class="card-heading">
                <a class="activity-log ph-flyout-click cwdc-flyout-click click-cookie" href="/p">P</a>
            </div>"#,
        );
        let h = extract(html.root_element(), &base());
        assert_eq!(h.name, Field::Absent);
        assert!(matches!(h.url, Field::Present(_)));
        assert_eq!(h.review_date, Field::Absent);
    }

    #[test]
    fn no_heading_block() {
        let html = Html::parse_fragment("<div class='program-tags'></div>");
        let h = extract(html.root_element(), &base());
        assert_eq!(h.name, Field::Absent);
        assert_eq!(h.url, Field::Absent);
    }

    #[test]
    fn review_date_must_be_a_real_date() {
        assert!(matches!(
            parse_review_date("reviewed 02/30/2024"),
            Field::Malformed(_)
        ));
        assert_eq!(parse_review_date("not reviewed yet"), Field::Absent);
    }

    #[test]
    fn name_padding_is_trimmed() {
        assert_eq!(compose_name(" Food Pantry ", " St. Anne "), "Food Pantry (St. Anne)");
    }
}
