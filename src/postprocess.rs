use std::collections::HashSet;
use std::path::Path;

use tracing::info;

use crate::error::ConfigurationError;
use crate::record::Record;

/// Keep records inside the allow-list (or with no location at all) and drop
/// later duplicates of the same `(website, name)` pair. Order is preserved
/// and fields are never touched.
pub fn process(
    records: Vec<Record>,
    allowed: &HashSet<u32>,
) -> Result<Vec<Record>, ConfigurationError> {
    if allowed.is_empty() {
        return Err(ConfigurationError::EmptyAllowList {
            column: "<in-memory>".into(),
        });
    }

    let total = records.len();
    let mut seen: HashSet<(Option<String>, String)> = HashSet::new();
    let mut out_of_area = 0usize;
    let mut duplicates = 0usize;

    let kept: Vec<Record> = records
        .into_iter()
        .filter(|r| {
            let keep = in_area(r, allowed);
            if !keep {
                out_of_area += 1;
            }
            keep
        })
        .filter(|r| {
            let fresh = seen.insert((r.website.clone(), r.name.clone()));
            if !fresh {
                duplicates += 1;
            }
            fresh
        })
        .collect();

    info!(
        total,
        kept = kept.len(),
        out_of_area,
        duplicates,
        "Post-processed records"
    );
    Ok(kept)
}

fn in_area(record: &Record, allowed: &HashSet<u32>) -> bool {
    if !record.has_location() {
        return true;
    }
    record
        .zipcode_number()
        .is_some_and(|zip| allowed.contains(&zip))
}

/// Zipcodes from one named column of a places CSV. Blank cells are
/// skipped; `"90001.0"` reads as 90001.
pub fn load_allow_list(path: &Path, column: &str) -> Result<HashSet<u32>, ConfigurationError> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_path(path)?;
    let idx = reader
        .headers()?
        .iter()
        .position(|h| h.trim() == column)
        .ok_or_else(|| ConfigurationError::MissingColumn {
            column: column.to_string(),
            path: path.to_path_buf(),
        })?;

    let mut zips = HashSet::new();
    for row in reader.records() {
        let row = row?;
        let Some(cell) = row.get(idx).map(str::trim).filter(|c| !c.is_empty()) else {
            continue;
        };
        let zip = parse_zip(cell).ok_or_else(|| ConfigurationError::InvalidZipcode {
            column: column.to_string(),
            value: cell.to_string(),
        })?;
        zips.insert(zip);
    }

    if zips.is_empty() {
        return Err(ConfigurationError::EmptyAllowList {
            column: column.to_string(),
        });
    }
    info!(column, count = zips.len(), "Loaded zipcode allow-list");
    Ok(zips)
}

fn parse_zip(cell: &str) -> Option<u32> {
    if let Ok(n) = cell.parse::<u32>() {
        return Some(n);
    }
    let f = cell.parse::<f64>().ok()?;
    if f.fract() == 0.0 && f >= 0.0 && f <= u32::MAX as f64 {
        Some(f as u32)
    } else {
        None
    }
}
