//! Backing-store abstraction for memory renderings.
//!
//! A store is either *Simple* (one flat buffer, no independent addressing)
//! or *Extended* (an addressable range queried by address and unit count).
//! Each variant exposes only the capability it supports, so callers match on
//! [`MemoryBlockHandle`] instead of probing at runtime.

use crate::core::address::Address;
use crate::core::memory_byte::MemoryByte;
use bytes::Bytes;
use num_bigint::BigUint;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Failures reported by a backing store.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BlockError {
    #[error("target disconnected")]
    Disconnected,
    #[error("request timed out")]
    Timeout,
    #[error("protocol fault: {0}")]
    Protocol(String),
    #[error("content unavailable")]
    Unavailable,
}

/// Half-open address range `[start, end)` covered by an Extended block.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockBounds {
    pub start: Address,
    pub end: Address,
}

impl BlockBounds {
    pub fn new(start: impl Into<Address>, end: impl Into<Address>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }

    /// Size of the range in addressable units.
    pub fn span(&self) -> BigUint {
        self.end.saturating_sub(&self.start)
    }

    /// Whether `address` may anchor a viewport; both ends are accepted.
    pub fn admits(&self, address: &Address) -> bool {
        *address >= self.start && *address <= self.end
    }
}

impl fmt::Display for BlockBounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

/// Flat buffer store with no independent addressing.
pub trait SimpleMemoryBlock: Send + Sync {
    /// Address of the first byte; rows are aligned relative to it.
    fn start_address(&self) -> u64 {
        0
    }

    /// Length of the buffer in bytes.
    fn length(&self) -> u64;

    /// The whole buffer. May be shorter than [`length`](Self::length).
    fn get_bytes(&self) -> Result<Bytes, BlockError>;
}

/// Addressable store queried by range.
pub trait ExtendedMemoryBlock: Send + Sync {
    /// Address the block was created at.
    fn base_address(&self) -> Address;

    fn bounds(&self) -> BlockBounds;

    /// Address width in bytes, if the target reports one.
    fn address_size(&self) -> Option<usize> {
        None
    }

    /// Whether the store computes change flags across suspends itself.
    fn supports_change_management(&self) -> bool {
        false
    }

    /// Fetch `units` addressable units starting at `address`. Returns one
    /// [`MemoryByte`] per byte; short results are allowed near the edges.
    fn get_bytes_from_address(
        &self,
        address: &Address,
        units: u64,
    ) -> Result<Vec<MemoryByte>, BlockError>;
}

/// A backing store handed to the engine by the view.
pub enum MemoryBlockHandle {
    Simple(Box<dyn SimpleMemoryBlock>),
    Extended(Box<dyn ExtendedMemoryBlock>),
}

impl MemoryBlockHandle {
    pub fn simple(block: impl SimpleMemoryBlock + 'static) -> Self {
        Self::Simple(Box::new(block))
    }

    pub fn extended(block: impl ExtendedMemoryBlock + 'static) -> Self {
        Self::Extended(Box::new(block))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Simple(_) => "simple",
            Self::Extended(_) => "extended",
        }
    }

    /// Bounds of an Extended block; Simple blocks have none.
    pub fn bounds(&self) -> Option<BlockBounds> {
        match self {
            Self::Simple(_) => None,
            Self::Extended(block) => Some(block.bounds()),
        }
    }

    /// Whether change flags from the store should be trusted.
    pub fn manages_changes(&self) -> bool {
        match self {
            Self::Simple(_) => false,
            Self::Extended(block) => block.supports_change_management(),
        }
    }

    /// Address width used for row labels.
    pub fn address_size(&self, sample: &Address) -> usize {
        match self {
            Self::Extended(block) => block
                .address_size()
                .filter(|size| *size > 0)
                .unwrap_or_else(|| sample.inferred_size()),
            Self::Simple(_) => sample.inferred_size(),
        }
    }
}

impl fmt::Debug for MemoryBlockHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Simple(block) => f
                .debug_struct("Simple")
                .field("start", &block.start_address())
                .field("length", &block.length())
                .finish(),
            Self::Extended(block) => f
                .debug_struct("Extended")
                .field("bounds", &block.bounds())
                .finish(),
        }
    }
}
