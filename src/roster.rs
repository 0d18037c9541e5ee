//! User roster (CSV) reading
//!
//! The roster is a spreadsheet export with a header row. Columns are
//! positional: timestamp, external id, login, email, role. Only the last three
//! are used.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, Trim};

use crate::error::Result;

const MIN_COLUMNS: usize = 5;

/// One identity to provision
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterEntry {
    pub login: String,
    pub email: String,
    pub role: String,
}

/// Parse roster rows, skipping the header and rows with too few columns.
pub fn parse_roster<R: Read>(input: R) -> Result<Vec<RosterEntry>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(input);

    let mut entries = Vec::new();
    for (index, record) in reader.records().enumerate() {
        let record = record?;
        if index == 0 || record.len() < MIN_COLUMNS {
            continue;
        }
        let login = &record[2];
        if login.is_empty() {
            continue;
        }
        entries.push(RosterEntry {
            login: login.to_string(),
            email: record[3].to_string(),
            role: record[4].to_string(),
        });
    }
    Ok(entries)
}

/// Read and parse a roster file.
pub fn read_roster(path: &Path) -> Result<Vec<RosterEntry>> {
    let file = File::open(path)?;
    let entries = parse_roster(file)?;
    log::info!(
        "Loaded {} roster entries from {}",
        entries.len(),
        path.display()
    );
    Ok(entries)
}
