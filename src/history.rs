//! Flat-file history persistence.
//!
//! One entry per line, no header. Loading is best effort: a missing or
//! unreadable file yields no entries. Saving overwrites the file.

use std::fs;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::PathBuf;

use tracing::{debug, warn};

/// History file bound to one interactive session.
#[derive(Debug, Clone)]
pub struct HistoryFile {
    path: PathBuf,
}

impl HistoryFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[cfg(test)]
    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    /// Read all stored entries, or none if the file cannot be read.
    pub fn load(&self) -> Vec<String> {
        let file = match fs::File::open(&self.path) {
            Ok(file) => file,
            Err(e) => {
                debug!(path = %self.path.display(), error = %e, "No history loaded");
                return Vec::new();
            }
        };

        let entries: Vec<String> = BufReader::new(file)
            .lines()
            .map_while(|line| line.ok())
            .filter(|line| !line.is_empty())
            .collect();

        debug!(path = %self.path.display(), entries = entries.len(), "Loaded history");
        entries
    }

    /// Overwrite the file with `entries`, creating its directory if needed.
    ///
    /// Failures are logged as warnings and otherwise ignored.
    pub fn save<S: AsRef<str>>(&self, entries: &[S]) {
        if let Some(dir) = self.path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            if let Err(e) = fs::create_dir_all(dir) {
                warn!(dir = %dir.display(), error = %e, "Cannot create history directory");
                return;
            }
        }

        match self.write_entries(entries) {
            Ok(()) => {
                debug!(path = %self.path.display(), entries = entries.len(), "Saved history")
            }
            Err(e) => warn!(path = %self.path.display(), error = %e, "Cannot save history"),
        }
    }

    fn write_entries<S: AsRef<str>>(&self, entries: &[S]) -> io::Result<()> {
        let mut out = BufWriter::new(fs::File::create(&self.path)?);
        for entry in entries {
            writeln!(out, "{}", entry.as_ref())?;
        }
        out.flush()
    }
}
