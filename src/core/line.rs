//! A fixed-width row of fetched memory.

use crate::core::address::Address;
use crate::core::memory_byte::MemoryByte;
use serde::{Deserialize, Serialize};

/// An address plus exactly `bytes_per_line` bytes.
///
/// Rows carry no identity across refreshes beyond their address, which is
/// what delta computation keys on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineSegment {
    pub address: Address,
    pub bytes: Vec<MemoryByte>,
    /// Whether change information for this row is meaningful
    pub monitored: bool,
}

impl LineSegment {
    pub fn new(address: Address, bytes: Vec<MemoryByte>) -> Self {
        Self {
            address,
            bytes,
            monitored: false,
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Row address as upper-case hex padded for `address_size` bytes.
    pub fn address_label(&self, address_size: usize) -> String {
        self.address.padded_hex(address_size)
    }

    /// Whether any byte is readable.
    pub fn has_readable(&self) -> bool {
        self.bytes.iter().any(MemoryByte::is_readable)
    }

    /// Whether any value or readability differs from `other`.
    pub fn differs_from(&self, other: &LineSegment) -> bool {
        self.bytes.len() != other.bytes.len()
            || self.bytes.iter().zip(&other.bytes).any(|(a, b)| {
                a.value != b.value || a.is_readable() != b.is_readable()
            })
    }

    /// Render each byte as two hex digits, substituting `padded` for
    /// unreadable bytes.
    pub fn hex_cells(&self, padded: &str) -> Vec<String> {
        self.bytes
            .iter()
            .map(|b| {
                if b.is_readable() {
                    format!("{:02X}", b.value)
                } else {
                    padded.to_string()
                }
            })
            .collect()
    }
}
