//! Lazy partitioning of large indexed values.
//!
//! A value with more elements than the preferred partition size is shown as
//! a list of [`Partition`] placeholders, each covering a contiguous index
//! range. Partition sizes are powers of the preferred size, so the fan-out
//! at every level stays near the preferred size however large the value is.

use crate::error::{EngineError, Rendered};
use crate::variables::value::{guarded, IndexedValue, ValueRef, Variable};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

pub const DEFAULT_PARTITION_SIZE: u64 = 100;

/// Size of each partition when splitting `size` elements with fan-out
/// `preferred`: the smallest power of `preferred` that keeps the partition
/// count at or below `preferred + 1`.
pub fn partition_size(size: u64, preferred: u64) -> u64 {
    let preferred = preferred.max(2);
    let mut remainder = size % preferred;
    let mut length = size / preferred;
    let mut depth = 0u32;
    while length > 0 {
        if remainder == 0 && length == 1 {
            break;
        }
        depth += 1;
        remainder = length % preferred;
        length /= preferred;
    }
    preferred.checked_pow(depth).unwrap_or(u64::MAX)
}

/// Children of an expanded node.
#[derive(Debug, Clone)]
pub enum Children {
    Elements(Vec<Variable>),
    Partitions(Vec<Partition>),
}

impl Children {
    pub fn empty() -> Self {
        Children::Elements(Vec::new())
    }

    pub fn len(&self) -> usize {
        match self {
            Children::Elements(v) => v.len(),
            Children::Partitions(p) => p.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn elements(&self) -> Option<&[Variable]> {
        match self {
            Children::Elements(v) => Some(v),
            Children::Partitions(_) => None,
        }
    }

    pub fn partitions(&self) -> Option<&[Partition]> {
        match self {
            Children::Partitions(p) => Some(p),
            Children::Elements(_) => None,
        }
    }
}

/// Placeholder for the index range `[offset, offset + length)` of a value.
#[derive(Clone)]
pub struct Partition {
    value: ValueRef,
    offset: u64,
    length: u64,
}

impl Partition {
    pub fn new(value: ValueRef, offset: u64, length: u64) -> Self {
        Self {
            value,
            offset,
            length,
        }
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn length(&self) -> u64 {
        self.length
    }

    /// Exclusive end index.
    pub fn end(&self) -> u64 {
        self.offset + self.length
    }

    /// The value this partition belongs to.
    pub fn value(&self) -> &ValueRef {
        &self.value
    }

    /// Label such as `[100..199]`.
    pub fn name(&self) -> String {
        format!("[{}..{}]", self.offset, self.end().saturating_sub(1))
    }

    /// Expand into elements, or into sub-partitions if still too large.
    pub fn expand(&self, preferred: u64) -> Rendered<Children> {
        match self.value.as_indexed() {
            Some(indexed) => {
                split_range(&self.value, indexed, self.offset, self.length, preferred)
            }
            None => Rendered::ok(Children::empty()),
        }
    }
}

impl PartialEq for Partition {
    fn eq(&self, other: &Self) -> bool {
        self.offset == other.offset
            && self.length == other.length
            && Arc::ptr_eq(&self.value, &other.value)
    }
}

impl fmt::Debug for Partition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Partition")
            .field("offset", &self.offset)
            .field("length", &self.length)
            .finish()
    }
}

/// Element count of `value`, or `None` when it has no indexed view.
pub fn query_size(value: &ValueRef) -> Result<Option<u64>, EngineError> {
    let Some(indexed) = value.as_indexed() else {
        return Ok(None);
    };
    match guarded(|| indexed.size()) {
        Ok(size) => Ok(Some(size)),
        Err(err) => {
            warn!(
                type_name = value.type_name(),
                error = %err,
                "Size query failed; treating value as leaf"
            );
            Err(EngineError::SizeQuery(err))
        }
    }
}

/// Children for the outcome of [`query_size`].
///
/// A failed size query makes the value a leaf; the failure rides along in
/// the result instead of failing the expansion.
pub fn split_children(
    value: &ValueRef,
    size: Result<Option<u64>, EngineError>,
    preferred: u64,
) -> Rendered<Children> {
    match (size, value.as_indexed()) {
        (Ok(Some(size)), Some(indexed)) => {
            split_range(value, indexed, indexed.initial_offset(), size, preferred)
        }
        (Err(err), _) => Rendered::degraded(Children::empty(), err),
        _ => Rendered::ok(Children::empty()),
    }
}

/// Children of an indexed value: direct elements when it is small enough,
/// partitions otherwise.
pub fn partition_children(value: &ValueRef, preferred: u64) -> Rendered<Children> {
    split_children(value, query_size(value), preferred)
}

fn split_range(
    value: &ValueRef,
    indexed: &dyn IndexedValue,
    offset: u64,
    length: u64,
    preferred: u64,
) -> Rendered<Children> {
    let preferred = preferred.max(2);
    if length <= preferred {
        return match guarded(|| indexed.variables(offset, length)) {
            Ok(vars) => Rendered::ok(Children::Elements(vars)),
            Err(source) => {
                warn!(offset, length, error = %source, "Element query failed");
                Rendered::degraded(
                    Children::empty(),
                    EngineError::ElementQuery {
                        offset,
                        end: offset + length,
                        source,
                    },
                )
            }
        };
    }

    let size = partition_size(length, preferred);
    let end = offset + length;
    let mut partitions = Vec::with_capacity((length / size + 1) as usize);
    let mut start = offset;
    while start < end {
        let len = size.min(end - start);
        partitions.push(Partition::new(Arc::clone(value), start, len));
        start += len;
    }
    debug!(
        offset,
        length,
        partition_size = size,
        partitions = partitions.len(),
        "Partitioned indexed value"
    );
    Rendered::ok(Children::Partitions(partitions))
}
