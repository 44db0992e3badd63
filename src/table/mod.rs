//! Persisted process table contract and backends.
//!
//! The simulator writes the full table after every mutation and reads a
//! single row before every dispatch. Backends must replace the table in one
//! step so that a concurrent reader never observes rows from two snapshots.
//!
//! # Contract
//! - `save` overwrites the whole table; it is not an append log.
//! - `load` is lenient: a missing table, a missing row, or a table that
//!   fails to parse all yield `None` ("no data yet").
//! - `load_all` is strict and reports parse failures to the caller; a
//!   missing table yields an empty snapshot.

pub mod file;
pub mod format;
pub mod memory;

pub use file::FileTable;
pub use format::{decode_table, encode_table, TABLE_HEADER};
pub use memory::InMemoryTable;

use crate::error::PersistError;
use crate::process::{Pid, ProcessRecord};

/// Durable, pid-keyed process table.
pub trait ProcessTable {
    /// Replace the stored table with `snapshot`.
    fn save(&self, snapshot: &[ProcessRecord]) -> Result<(), PersistError>;

    /// Every stored row in ascending pid order.
    fn load_all(&self) -> Result<Vec<ProcessRecord>, PersistError>;

    /// Last saved row for `pid`, if any.
    fn load(&self, pid: Pid) -> Option<ProcessRecord> {
        match self.load_all() {
            Ok(rows) => rows.into_iter().find(|r| r.pid == pid),
            Err(err) => {
                log::debug!("process table unreadable while loading pid {pid}: {err}");
                None
            }
        }
    }
}

impl<T: ProcessTable + ?Sized> ProcessTable for &T {
    fn save(&self, snapshot: &[ProcessRecord]) -> Result<(), PersistError> {
        (**self).save(snapshot)
    }

    fn load_all(&self) -> Result<Vec<ProcessRecord>, PersistError> {
        (**self).load_all()
    }

    fn load(&self, pid: Pid) -> Option<ProcessRecord> {
        (**self).load(pid)
    }
}
