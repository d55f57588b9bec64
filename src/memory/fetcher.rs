//! Buffer retrieval for a planned window.
//!
//! The fetcher always returns exactly `plan.required_bytes()` bytes. Short
//! reads are padded silently; a failed query yields a full placeholder
//! buffer and a non-fatal [`EngineError::Fetch`].

use crate::core::memory_byte::{placeholders, MemoryByte};
use crate::error::{EngineError, Rendered};
use crate::memory::block::{BlockError, ExtendedMemoryBlock, MemoryBlockHandle, SimpleMemoryBlock};
use crate::memory::planner::WindowPlan;
use std::panic::{catch_unwind, AssertUnwindSafe};
use tracing::{debug, warn};

/// Fetch the bytes for `plan` from `block`.
pub fn fetch_window(plan: &WindowPlan, block: &MemoryBlockHandle) -> Rendered<Vec<MemoryByte>> {
    match block {
        MemoryBlockHandle::Extended(ext) => fetch_extended(plan, ext.as_ref()),
        MemoryBlockHandle::Simple(simple) => fetch_simple(plan, simple.as_ref()),
    }
}

/// Run a store query, turning a panicking store into a protocol fault.
fn guarded<T>(query: impl FnOnce() -> Result<T, BlockError>) -> Result<T, BlockError> {
    catch_unwind(AssertUnwindSafe(query))
        .unwrap_or_else(|_| Err(BlockError::Protocol("backing store panicked".to_string())))
}

fn degraded(plan: &WindowPlan, err: BlockError) -> Rendered<Vec<MemoryByte>> {
    warn!(
        start = %plan.buffer_start,
        lines = plan.number_of_lines,
        error = %err,
        "Fetch failed; rendering placeholders"
    );
    Rendered::degraded(placeholders(plan.required_bytes()), EngineError::Fetch(err))
}

/// Cut to `len`, padding a short buffer with placeholders.
fn fit(mut bytes: Vec<MemoryByte>, len: usize) -> Vec<MemoryByte> {
    if bytes.len() < len {
        debug!(
            returned = bytes.len(),
            requested = len,
            "Short read; padding"
        );
    }
    bytes.resize(len, MemoryByte::placeholder());
    bytes
}

fn fetch_extended(plan: &WindowPlan, block: &dyn ExtendedMemoryBlock) -> Rendered<Vec<MemoryByte>> {
    let units = plan.required_units();
    match guarded(|| block.get_bytes_from_address(&plan.buffer_start, units)) {
        Ok(bytes) => {
            let bytes = if block.supports_change_management() {
                bytes
            } else {
                bytes.into_iter().map(MemoryByte::without_history).collect()
            };
            Rendered::ok(fit(bytes, plan.required_bytes()))
        }
        Err(err) => degraded(plan, err),
    }
}

fn fetch_simple(plan: &WindowPlan, block: &dyn SimpleMemoryBlock) -> Rendered<Vec<MemoryByte>> {
    match guarded(|| block.get_bytes()) {
        Ok(data) => {
            let len = plan.required_bytes();
            let mut bytes = placeholders(plan.leading_bytes.min(len));
            let room = len - bytes.len();
            bytes.extend(data.iter().take(room).map(|&b| MemoryByte::readable(b)));
            Rendered::ok(fit(bytes, len))
        }
        Err(err) => degraded(plan, err),
    }
}
