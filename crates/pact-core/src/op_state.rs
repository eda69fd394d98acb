//! Per-row operation state for edit/delete actions.
//!
//! A row can have at most one pending operation. Used by the table view to
//! disable a row's buttons while its request is in flight.

use std::collections::HashMap;

/// Operation pending on a single row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowOp {
    Editing,
    Deleting,
}

/// Pending operations keyed by row id.
#[derive(Debug, Clone, Default)]
pub struct PendingOps {
    rows: HashMap<String, RowOp>,
}

impl PendingOps {
    pub fn new() -> Self {
        Self::default()
    }

    /// True if a new operation can be started on the given row.
    pub fn can_start(&self, id: &str) -> bool {
        !self.rows.contains_key(id)
    }

    /// Mark an operation as started. Returns false if the row is busy.
    pub fn start(&mut self, id: &str, op: RowOp) -> bool {
        if !self.can_start(id) {
            return false;
        }
        self.rows.insert(id.to_string(), op);
        true
    }

    /// Clear the row after its operation finished, whatever the outcome.
    pub fn finish(&mut self, id: &str) -> Option<RowOp> {
        self.rows.remove(id)
    }

    pub fn get(&self, id: &str) -> Option<RowOp> {
        self.rows.get(id).copied()
    }

    pub fn is_editing(&self, id: &str) -> bool {
        self.get(id) == Some(RowOp::Editing)
    }

    pub fn is_deleting(&self, id: &str) -> bool {
        self.get(id) == Some(RowOp::Deleting)
    }
}
