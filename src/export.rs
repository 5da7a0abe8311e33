//! CSV output
//!
//! Column order and titles are fixed; downstream sheets key on them.

use std::fs::File;
use std::io::{self, BufWriter};
use std::path::Path;

use tracing::info;

use crate::error::{HarvestError, Result};
use crate::magnitude::normalize_count;
use crate::models::PostRecord;

pub const HEADERS: [&str; 7] = [
    "Reel URL",
    "View Count",
    "Likes",
    "Comments",
    "Username",
    "Reel ID",
    "Full Instagram URL",
];

pub const DEFAULT_BASE_URL: &str = "https://www.instagram.com";

/// The link itself when already absolute, otherwise `base_url` + link.
pub fn full_url(link: &str, base_url: &str) -> String {
    if link.starts_with("http") {
        link.to_string()
    } else {
        format!("{base_url}{link}")
    }
}

pub fn export_row(record: &PostRecord, base_url: &str) -> [String; 7] {
    [
        record.link.clone(),
        normalize_count(&record.views),
        normalize_count(&record.likes),
        normalize_count(&record.comments),
        record.author.clone().unwrap_or_default(),
        record.post_id.clone().unwrap_or_default(),
        full_url(&record.link, base_url),
    ]
}

pub fn write_records<W: io::Write>(writer: W, records: &[PostRecord], base_url: &str) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(HEADERS)?;
    for record in records {
        wtr.write_record(export_row(record, base_url))?;
    }
    wtr.flush().map_err(csv::Error::from)?;
    Ok(())
}

pub fn write_csv_file(path: &Path, records: &[PostRecord], base_url: &str) -> Result<()> {
    let file = File::create(path).map_err(|e| HarvestError::io(path, e))?;
    write_records(BufWriter::new(file), records, base_url)?;
    info!(path = %path.display(), rows = records.len(), "wrote CSV");
    Ok(())
}
