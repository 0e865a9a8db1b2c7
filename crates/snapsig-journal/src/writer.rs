use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use snapsig_models::AnalysisRecord;
use tracing::debug;

use crate::error::JournalError;

/// Appends one JSON object per line to the journal file.
///
/// Each record is serialized in full before the file lock is taken and goes
/// out in a single `write_all` on an `O_APPEND` handle, so concurrent appenders
/// never interleave partial lines. Every append is synced to disk before it
/// returns.
pub struct JournalWriter {
    path: PathBuf,
    file: Mutex<File>,
}

impl JournalWriter {
    /// Open (or create) the journal, creating parent directories as needed.
    /// Existing content is never truncated.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, JournalError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    pub fn append(&self, record: &AnalysisRecord) -> Result<(), JournalError> {
        let mut line = serde_json::to_vec(record)?;
        line.push(b'\n');

        let mut file = self.file.lock().map_err(|_| JournalError::Poisoned)?;
        file.write_all(&line)?;
        file.sync_data()?;

        debug!(path = %self.path.display(), signal = %record.signal, "Journal record appended");
        Ok(())
    }
}
