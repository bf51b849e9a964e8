use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::info;

use crate::error::TripleError;
use crate::table;

/// Column → relationship label used when turning records into graph facts.
pub const RELATIONSHIPS: &[(&str, &str)] = &[
    ("Main_Services", "main_services_are"),
    ("Other_Services", "other_services_are"),
    ("Phone_Number", "phone_number_is"),
    ("Website", "website_is"),
    ("Location_Address", "is_located_at"),
    ("Location_URL_Map", "url_is_located_at"),
    ("Eligibility", "eligibility_is"),
    ("Availability", "has_an_availability_status_of"),
    ("Description", "description_is"),
    ("Languages", "speaks"),
    ("Cost", "costs"),
    ("Google_Review", "has_Google_Reviews"),
    ("Facebook_URL", "facebook_is"),
    ("Twitter_URL", "twitter_is"),
    ("Serving", "serves"),
    ("Coverage", "covers"),
    ("Latitude", "latitude_is"),
    ("Longitude", "longitude_is"),
    ("Zipcode", "zipcode_is"),
    ("24hour", "24hours_status_is"),
    ("Monday", "Monday's_time_open"),
    ("Tuesday", "Tuesday's_time_open"),
    ("Wednesday", "Wednesday's_time_open"),
    ("Thursday", "Thursday's_time_open"),
    ("Friday", "Friday's_time_open"),
    ("Saturday", "Saturday's_time_open"),
    ("Sunday", "Sunday's_time_open"),
    ("Google_Rating", "has_a_Google_Rating_of"),
    ("Service_Type", "offers"),
];

/// Columns holding list text, split into one triple per element.
pub const MULTI_VALUE_COLUMNS: &[&str] = &[
    "Other_Services",
    "Main_Services",
    "Serving",
    "Eligibility",
    "Languages",
];

pub const TRIPLES_HEADER: [&str; 3] = ["Subject", "Relationship", "Object"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Triple {
    pub subject: String,
    pub relationship: String,
    pub object: String,
}

pub struct TripleBuilder {
    relationships: HashMap<String, String>,
    multi_value: HashSet<String>,
}

impl Default for TripleBuilder {
    fn default() -> Self {
        Self::new(RELATIONSHIPS, MULTI_VALUE_COLUMNS)
    }
}

impl TripleBuilder {
    pub fn new(relationships: &[(&str, &str)], multi_value: &[&str]) -> Self {
        Self {
            relationships: relationships
                .iter()
                .map(|(c, r)| (c.to_string(), r.to_string()))
                .collect(),
            multi_value: multi_value.iter().map(|c| c.to_string()).collect(),
        }
    }

    /// Triples for one table. The first column is the subject; unmapped
    /// columns and empty cells produce nothing.
    pub fn from_rows(&self, headers: &[String], rows: &[Vec<String>]) -> Vec<Triple> {
        let mut triples = Vec::new();
        for row in rows {
            let Some(subject) = row.first().map(|s| s.trim()) else {
                continue;
            };
            for (column, cell) in headers.iter().zip(row.iter()).skip(1) {
                let column = column.trim();
                let Some(relationship) = self.relationships.get(column) else {
                    continue;
                };
                let value = cell.trim();
                if value.is_empty() {
                    continue;
                }
                let objects = if self.multi_value.contains(column) {
                    split_values(value)
                } else {
                    vec![value.to_string()]
                };
                triples.extend(objects.into_iter().filter(|o| !o.is_empty()).map(|object| {
                    Triple {
                        subject: subject.to_string(),
                        relationship: relationship.clone(),
                        object,
                    }
                }));
            }
        }
        triples
    }

    pub fn from_file(&self, path: &Path) -> Result<Vec<Triple>> {
        let (headers, rows) = table::read_rows(path)?;
        if headers.is_empty() {
            return Err(TripleError::MissingHeader {
                path: path.to_path_buf(),
            }
            .into());
        }
        Ok(self.from_rows(&headers, &rows))
    }

    /// Triples from every file, concatenated in the order given.
    pub fn from_files(&self, paths: &[PathBuf]) -> Result<Vec<Triple>> {
        let mut all = Vec::new();
        for path in paths {
            let triples = self
                .from_file(path)
                .with_context(|| format!("Failed to build triples from {}", path.display()))?;
            info!("Added {} triples from {}", triples.len(), path.display());
            all.extend(triples);
        }
        Ok(all)
    }
}

/// List text → elements: a list literal, else comma-separated, else one value.
pub fn split_values(value: &str) -> Vec<String> {
    let value = value.trim();
    if let Some(items) = table::parse_list(value) {
        return items.iter().map(|i| i.trim().to_string()).collect();
    }
    if value.contains(',') {
        return value.split(',').map(|i| i.trim().to_string()).collect();
    }
    vec![value.to_string()]
}

pub fn write_triples(path: &Path, triples: &[Triple]) -> Result<()> {
    let mut out = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    out.write_record(TRIPLES_HEADER)?;
    for t in triples {
        out.write_record([&t.subject, &t.relationship, &t.object])?;
    }
    out.flush()?;
    Ok(())
}

/// Read a `Subject,Relationship,Object` file; anything but three columns is
/// rejected.
pub fn read_triples(path: &Path) -> Result<Vec<Triple>> {
    let (headers, rows) = table::read_rows(path)?;
    if headers.len() != 3 {
        return Err(TripleError::WrongColumnCount {
            path: path.to_path_buf(),
            found: headers.len(),
        }
        .into());
    }
    rows.into_iter()
        .map(|row| match row.as_slice() {
            [s, r, o] => Ok(Triple {
                subject: s.trim().to_string(),
                relationship: r.trim().to_string(),
                object: o.trim().to_string(),
            }),
            other => Err(anyhow::Error::new(TripleError::WrongColumnCount {
                path: path.to_path_buf(),
                found: other.len(),
            })),
        })
        .collect()
}
