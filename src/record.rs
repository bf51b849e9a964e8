use std::fmt;

use chrono::Weekday;
use serde::Serialize;

/// Column order the tabular output must follow.
pub const HEADER: [&str; 31] = [
    "Service_name",
    "Service_url",
    "Main_Services",
    "Other_Services",
    "Serving",
    "Phone_Number",
    "Website",
    "Location_Address",
    "Location_URL_Map",
    "Eligibility",
    "Availability",
    "Description",
    "Languages",
    "Cost",
    "Google_Review",
    "Facebook_URL",
    "Twitter_URL",
    "Coverage",
    "Latitude",
    "Longitude",
    "Zipcode",
    "24hour",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
    "Google_Reviews",
    "Service_Type",
];

pub const NOT_SPECIFIED: &str = "Not specified";

/// Day labels as they appear in schedule blocks, Monday first.
pub const WEEKDAYS: [(&str, Weekday); 7] = [
    ("Monday", Weekday::Mon),
    ("Tuesday", Weekday::Tue),
    ("Wednesday", Weekday::Wed),
    ("Thursday", Weekday::Thu),
    ("Friday", Weekday::Fri),
    ("Saturday", Weekday::Sat),
    ("Sunday", Weekday::Sun),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum DayHours {
    Closed,
    /// Normalized range, or the raw text when it could not be normalized.
    Open(String),
}

impl fmt::Display for DayHours {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DayHours::Closed => f.write_str("Closed"),
            DayHours::Open(range) => f.write_str(range),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Schedule {
    pub is_24_hour: bool,
    days: [Option<DayHours>; 7],
}

impl Schedule {
    /// Open around the clock, no per-day hours.
    pub fn twenty_four_hour() -> Self {
        Self {
            is_24_hour: true,
            ..Default::default()
        }
    }

    pub fn day(&self, day: Weekday) -> Option<&DayHours> {
        self.days[day.num_days_from_monday() as usize].as_ref()
    }

    pub fn set(&mut self, day: Weekday, hours: DayHours) {
        self.days[day.num_days_from_monday() as usize] = Some(hours);
    }

    /// True when no day has been recorded and the 24-hour flag is unset.
    pub fn is_unknown(&self) -> bool {
        !self.is_24_hour && self.days.iter().all(Option::is_none)
    }
}

/// One extracted listing in the fixed output schema.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Record {
    pub name: String,
    pub url: String,
    pub main_services: Vec<String>,
    /// `None` when the listing has no "Other Services" section at all.
    pub other_services: Option<Vec<String>>,
    pub serving: Vec<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub address: Option<String>,
    pub map_url: Option<String>,
    pub eligibility: Vec<String>,
    pub availability: String,
    pub description: String,
    pub languages: Vec<String>,
    pub cost: String,
    pub is_reviewed: bool,
    pub review_date: Option<String>,
    pub facebook_url: Option<String>,
    pub twitter_url: Option<String>,
    pub coverage_area: String,
    pub latitude: Option<String>,
    pub longitude: Option<String>,
    pub zipcode: String,
    pub schedule: Schedule,
    /// Filled by a later rating stage; always `None` out of extraction.
    pub rating: Option<String>,
    pub service_type: String,
}

impl Record {
    /// Whether the listing carried any location data at all.
    pub fn has_location(&self) -> bool {
        [&self.address, &self.latitude, &self.longitude]
            .iter()
            .any(|v| v.as_deref().is_some_and(|s| !s.trim().is_empty()))
    }

    pub fn zipcode_number(&self) -> Option<u32> {
        self.zipcode.trim().parse().ok()
    }
}
