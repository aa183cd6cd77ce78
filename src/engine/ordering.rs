//! Restoring input order for results that complete out of order.

use super::ExecResult;
use std::collections::BTreeMap;

/// Buffers results until every earlier sequence number has been released.
#[derive(Debug, Default)]
pub struct Resequencer {
    next: usize,
    pending: BTreeMap<usize, ExecResult>,
}

impl Resequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept a completed result and return every result now deliverable.
    pub fn push(&mut self, result: ExecResult) -> Vec<ExecResult> {
        self.pending.insert(result.seq(), result);

        let mut ready = Vec::new();
        while let Some(result) = self.pending.remove(&self.next) {
            ready.push(result);
            self.next += 1;
        }
        ready
    }

    /// Number of results held back waiting for an earlier one.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Release everything still held, in sequence order.
    ///
    /// Used once no more results can arrive; after a cancellation some
    /// sequence numbers never complete, so gaps are skipped.
    pub fn drain(self) -> impl Iterator<Item = ExecResult> {
        self.pending.into_values()
    }
}
