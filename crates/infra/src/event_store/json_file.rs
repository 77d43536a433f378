use std::ffi::OsString;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::ser::PrettyFormatter;

use stockbook_core::ExpectedVersion;
use stockbook_ledger::{LedgerEvent, LogEntry};

use super::r#trait::{EventLog, EventStoreError, check_version};

/// Log persisted as one pretty-printed JSON array.
///
/// Every append rewrites the whole document, so write cost grows with the log.
/// Writes go to a sibling `*.tmp` file that is then renamed over the target.
#[derive(Debug, Clone)]
pub struct JsonFileEventLog {
    path: PathBuf,
}

impl JsonFileEventLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = OsString::from(self.path.as_os_str());
        name.push(".tmp");
        PathBuf::from(name)
    }

    fn io_error(&self, source: io::Error) -> EventStoreError {
        EventStoreError::Io {
            path: self.path.clone(),
            source,
        }
    }

    fn encode(entries: &[LogEntry]) -> Result<Vec<u8>, EventStoreError> {
        let mut buf = Vec::new();
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
        entries.serialize(&mut ser)?;
        Ok(buf)
    }

    /// Write `entries` and return them as a later [`load`](EventLog::load) will
    /// see them.
    fn persist(&self, entries: &[LogEntry]) -> Result<Vec<LogEntry>, EventStoreError> {
        let data = Self::encode(entries)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }

        let temp_path = self.temp_path();
        let written = fs::File::create(&temp_path).and_then(|mut file| {
            file.write_all(&data)?;
            file.sync_all()
        });
        if let Err(e) = written.and_then(|()| fs::rename(&temp_path, &self.path)) {
            let _ = fs::remove_file(&temp_path);
            return Err(self.io_error(e));
        }

        Ok(serde_json::from_slice(&data)?)
    }
}

impl EventLog for JsonFileEventLog {
    fn load(&self) -> Vec<LogEntry> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "no log yet; starting empty");
                return Vec::new();
            }
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "log unreadable; starting empty");
                return Vec::new();
            }
        };

        match serde_json::from_slice::<Vec<LogEntry>>(&bytes) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "log corrupt; starting empty");
                Vec::new()
            }
        }
    }

    fn append(
        &self,
        event: &LedgerEvent,
        expected: ExpectedVersion,
    ) -> Result<Vec<LogEntry>, EventStoreError> {
        // Re-read right before writing so a change by another process since the
        // caller's load shows up as a version mismatch.
        let mut entries = self.load();
        check_version(expected, entries.len())?;

        entries.push(LogEntry::Event(event.clone()));
        self.persist(&entries)
    }
}
