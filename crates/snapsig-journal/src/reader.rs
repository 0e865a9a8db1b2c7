use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use snapsig_models::AnalysisRecord;
use tracing::warn;

use crate::error::JournalError;

/// Read every record in the journal. Lines that are not valid records
/// (foreign content, a torn final line) are skipped with a warning.
/// A missing journal reads as empty.
pub fn read_records(path: impl AsRef<Path>) -> Result<Vec<AnalysisRecord>, JournalError> {
    let path = path.as_ref();
    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    let mut records = Vec::new();
    for (idx, line) in BufReader::new(file).lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<AnalysisRecord>(&line) {
            Ok(record) => records.push(record),
            Err(e) => {
                warn!(path = %path.display(), line = idx + 1, error = %e, "Skipping malformed journal line");
            }
        }
    }
    Ok(records)
}

/// The last `n` records, oldest first.
pub fn tail_records(path: impl AsRef<Path>, n: usize) -> Result<Vec<AnalysisRecord>, JournalError> {
    let mut records = read_records(path)?;
    let skip = records.len().saturating_sub(n);
    Ok(records.split_off(skip))
}
