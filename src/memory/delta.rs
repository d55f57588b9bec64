//! Change marking for stores that do not track changes themselves.
//!
//! The engine keeps no state between fetches. A view that wants changed
//! bytes highlighted keeps a [`ContentSnapshot`] of the rows it showed at the
//! last suspend and passes it to the next fetch.

use crate::core::address::Address;
use crate::core::line::LineSegment;
use std::collections::HashMap;
use tracing::trace;

/// Rows captured at a suspend, keyed by row address.
#[derive(Debug, Clone, Default)]
pub struct ContentSnapshot {
    lines: HashMap<Address, LineSegment>,
}

impl ContentSnapshot {
    pub fn capture(lines: &[LineSegment]) -> Self {
        Self {
            lines: lines
                .iter()
                .map(|l| (l.address.clone(), l.clone()))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn get(&self, address: &Address) -> Option<&LineSegment> {
        self.lines.get(address)
    }

    /// Mark changed bytes in `lines` against the snapshot.
    ///
    /// Rows found in the snapshot become monitored with every byte's change
    /// state known; rows not found are unmonitored.
    pub fn mark_deltas(&self, lines: &mut [LineSegment]) {
        let mut changed = 0usize;
        for line in lines.iter_mut() {
            match self.lines.get(&line.address) {
                Some(old) if old.len() == line.len() => {
                    line.monitored = true;
                    for (new, prev) in line.bytes.iter_mut().zip(&old.bytes) {
                        let differs =
                            new.value != prev.value || new.is_readable() != prev.is_readable();
                        new.set_history_known(true);
                        new.set_changed(differs);
                        changed += usize::from(differs);
                    }
                }
                _ => {
                    line.monitored = false;
                    for b in line.bytes.iter_mut() {
                        b.set_history_known(false);
                        b.set_changed(false);
                    }
                }
            }
        }
        trace!(rows = lines.len(), changed, "Marked deltas");
    }
}

/// For stores that track changes: a row is monitored when every byte's
/// change state is known.
pub fn mark_store_monitored(lines: &mut [LineSegment]) {
    for line in lines.iter_mut() {
        line.monitored = line.bytes.iter().all(|b| b.is_history_known());
    }
}

/// Clear change marks, e.g. after the user acknowledged them.
pub fn reset_deltas(lines: &mut [LineSegment]) {
    for line in lines.iter_mut() {
        for b in line.bytes.iter_mut() {
            b.set_changed(false);
        }
    }
}
