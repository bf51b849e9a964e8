use std::io;
use std::path::Path;

use anyhow::{Context, Result};

use crate::record::{Record, HEADER, WEEKDAYS};

/// Write records as CSV with the fixed header.
pub fn write_records<W: io::Write>(writer: W, records: &[Record]) -> Result<()> {
    let mut out = csv::Writer::from_writer(writer);
    out.write_record(HEADER)?;
    for record in records {
        out.write_record(record_row(record))?;
    }
    out.flush()?;
    Ok(())
}

pub fn write_records_to_path(path: &Path, records: &[Record]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    write_records(file, records)
}

/// Header plus rows of a CSV file. Rows may be ragged.
pub fn read_rows(path: &Path) -> Result<(Vec<String>, Vec<Vec<String>>)> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;
    let headers = reader.headers()?.iter().map(str::to_string).collect();
    let rows = reader
        .records()
        .map(|r| r.map(|row| row.iter().map(str::to_string).collect()))
        .collect::<Result<Vec<Vec<String>>, _>>()?;
    Ok((headers, rows))
}

/// One CSV row in `HEADER` order. Nulls are empty cells.
pub fn record_row(r: &Record) -> Vec<String> {
    let opt = |v: &Option<String>| v.clone().unwrap_or_default();

    let mut row = vec![
        r.name.clone(),
        r.url.clone(),
        format_list(&r.main_services),
        r.other_services.as_deref().map(format_list).unwrap_or_default(),
        format_list(&r.serving),
        opt(&r.phone),
        opt(&r.website),
        opt(&r.address),
        opt(&r.map_url),
        format_list(&r.eligibility),
        r.availability.clone(),
        r.description.clone(),
        format_list(&r.languages),
        r.cost.clone(),
        format_bool(r.is_reviewed),
        opt(&r.facebook_url),
        opt(&r.twitter_url),
        r.coverage_area.clone(),
        opt(&r.latitude),
        opt(&r.longitude),
        r.zipcode.clone(),
        format_bool(r.schedule.is_24_hour),
    ];
    row.extend(
        WEEKDAYS
            .iter()
            .map(|(_, day)| r.schedule.day(*day).map(|h| h.to_string()).unwrap_or_default()),
    );
    row.push(opt(&r.rating));
    row.push(r.service_type.clone());
    row
}

/// Files written by the earlier tooling spell booleans this way.
fn format_bool(b: bool) -> String {
    let text = if b { "True" } else { "False" };
    text.to_string()
}

/// List-literal text: `['a', "b's"]`.
pub fn format_list(items: &[String]) -> String {
    let quoted: Vec<String> = items.iter().map(|s| quote(s)).collect();
    format!("[{}]", quoted.join(", "))
}

fn quote(s: &str) -> String {
    let q = if s.contains('\'') && !s.contains('"') { '"' } else { '\'' };
    let mut out = String::with_capacity(s.len() + 2);
    out.push(q);
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == q => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
    out.push(q);
    out
}

/// Parse list-literal text produced by `format_list`. `None` when the text
/// is not a bracketed list of quoted strings.
pub fn parse_list(value: &str) -> Option<Vec<String>> {
    let inner = value.trim().strip_prefix('[')?.strip_suffix(']')?;
    let mut chars = inner.chars().peekable();
    let mut items = Vec::new();

    loop {
        while chars.next_if(|c| c.is_whitespace()).is_some() {}
        let q = match chars.next() {
            None => break,
            Some(c @ ('\'' | '"')) => c,
            Some(_) => return None,
        };

        let mut item = String::new();
        loop {
            match chars.next()? {
                '\\' => match chars.next()? {
                    'n' => item.push('\n'),
                    'r' => item.push('\r'),
                    't' => item.push('\t'),
                    c @ ('\\' | '\'' | '"') => item.push(c),
                    c => {
                        item.push('\\');
                        item.push(c);
                    }
                },
                c if c == q => break,
                c => item.push(c),
            }
        }
        items.push(item);

        while chars.next_if(|c| c.is_whitespace()).is_some() {}
        match chars.next() {
            None => break,
            Some(',') => continue,
            Some(_) => return None,
        }
    }

    Some(items)
}
