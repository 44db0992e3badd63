//! In-memory process table for tests and diagnostics.
//!
//! The table records every committed snapshot for later inspection and uses
//! `RefCell` for interior mutability; it is not thread-safe.

use std::cell::{Cell, RefCell};

use super::ProcessTable;
use crate::error::PersistError;
use crate::process::ProcessRecord;

#[derive(Debug, Default)]
pub struct InMemoryTable {
    current: RefCell<Option<Vec<ProcessRecord>>>,
    /// Every successful save, oldest first.
    history: RefCell<Vec<Vec<ProcessRecord>>>,
    fail_saves: Cell<u32>,
    failed: Cell<u64>,
}

impl InMemoryTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Table pre-populated with `rows`, as if written by another process.
    pub fn with_rows(rows: Vec<ProcessRecord>) -> Self {
        let table = Self::default();
        table.overwrite(rows);
        table
    }

    /// Replace the stored rows without recording history.
    pub fn overwrite(&self, mut rows: Vec<ProcessRecord>) {
        rows.sort_by_key(|r| r.pid);
        *self.current.borrow_mut() = Some(rows);
    }

    /// Make the next `n` saves fail with a backend error.
    pub fn fail_next_saves(&self, n: u32) {
        self.fail_saves.set(n);
    }

    /// Number of saves rejected by fault injection.
    pub fn failed_saves(&self) -> u64 {
        self.failed.get()
    }

    /// Number of successful saves.
    pub fn save_count(&self) -> usize {
        self.history.borrow().len()
    }

    /// Clone of every successful snapshot.
    pub fn history(&self) -> Vec<Vec<ProcessRecord>> {
        self.history.borrow().clone()
    }

    /// Latest stored rows, if any save happened.
    pub fn current(&self) -> Option<Vec<ProcessRecord>> {
        self.current.borrow().clone()
    }
}

impl ProcessTable for InMemoryTable {
    fn save(&self, snapshot: &[ProcessRecord]) -> Result<(), PersistError> {
        let pending = self.fail_saves.get();
        if pending > 0 {
            self.fail_saves.set(pending - 1);
            self.failed.set(self.failed.get() + 1);
            return Err(PersistError::backend("injected save failure"));
        }
        let mut rows = snapshot.to_vec();
        rows.sort_by_key(|r| r.pid);
        self.history.borrow_mut().push(rows.clone());
        *self.current.borrow_mut() = Some(rows);
        Ok(())
    }

    fn load_all(&self) -> Result<Vec<ProcessRecord>, PersistError> {
        Ok(self.current.borrow().clone().unwrap_or_default())
    }
}
