// LogWarden - platform/fs.rs
//
// File-backed log source. The monitored log is only ever read, never
// written or locked; concurrent appends by the web server are tolerated.

use crate::app::check::LogSource;
use crate::util::error::SourceError;
use std::io;
use std::path::{Path, PathBuf};

/// Read the full content of a file as a string.
///
/// For files with invalid UTF-8, uses lossy conversion.
pub fn read_file_lossy(path: &Path) -> io::Result<String> {
    let bytes = std::fs::read(path)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Access log on the local filesystem, re-read in full on every tick.
#[derive(Debug, Clone)]
pub struct FileLogSource {
    path: PathBuf,
}

impl FileLogSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LogSource for FileLogSource {
    fn read_lines(&self) -> Result<Vec<String>, SourceError> {
        let content = read_file_lossy(&self.path).map_err(|source| SourceError::Io {
            path: self.path.clone(),
            source,
        })?;

        let lines: Vec<String> = content.lines().map(str::to_owned).collect();
        tracing::debug!(
            path = %self.path.display(),
            bytes = content.len(),
            lines = lines.len(),
            "Log source read"
        );
        Ok(lines)
    }
}
