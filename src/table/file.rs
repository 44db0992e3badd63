//! File-backed process table.
//!
//! Saves write the encoded table into a temporary file in the same directory
//! and then rename it over the target path. Rename within a directory is
//! atomic on the platforms we support, so readers see either the previous
//! table or the new one, never a mix.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use super::format::{decode_table, encode_table};
use super::ProcessTable;
use crate::error::PersistError;
use crate::process::ProcessRecord;

/// Default table location used by the CLI.
pub const DEFAULT_TABLE_PATH: &str = "process_table.txt";

/// Process table stored as a text file at `path`.
#[derive(Clone, Debug)]
pub struct FileTable {
    path: PathBuf,
}

impl FileTable {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn dir(&self) -> &Path {
        match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        }
    }
}

impl ProcessTable for FileTable {
    fn save(&self, snapshot: &[ProcessRecord]) -> Result<(), PersistError> {
        let text = encode_table(snapshot);
        let mut tmp = NamedTempFile::new_in(self.dir())?;
        tmp.write_all(text.as_bytes())?;
        tmp.flush()?;
        tmp.persist(&self.path).map_err(|e| PersistError::Io(e.error))?;
        Ok(())
    }

    fn load_all(&self) -> Result<Vec<ProcessRecord>, PersistError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };
        decode_table(&text)
    }
}
