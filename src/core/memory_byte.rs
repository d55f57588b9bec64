//! One fetched unit of remote memory plus its state flags.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// State bits attached to a fetched byte.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct ByteFlags: u8 {
        const READABLE = 0x01;
        const WRITABLE = 0x02;
        /// Value differs from the previous suspend
        const CHANGED = 0x04;
        /// Change state is known for this byte
        const HISTORY_KNOWN = 0x08;
        const BIG_ENDIAN = 0x10;
        const ENDIANESS_KNOWN = 0x20;
    }
}

impl Default for ByteFlags {
    fn default() -> Self {
        Self::empty()
    }
}

/// A single byte of remote memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct MemoryByte {
    pub value: u8,
    pub flags: ByteFlags,
}

impl MemoryByte {
    pub fn new(value: u8, flags: ByteFlags) -> Self {
        Self { value, flags }
    }

    /// A byte read successfully from a store without change tracking.
    pub fn readable(value: u8) -> Self {
        Self::new(value, ByteFlags::READABLE | ByteFlags::WRITABLE)
    }

    /// Stand-in for a byte that could not be read: unreadable, unwritable,
    /// change state unknown.
    pub fn placeholder() -> Self {
        Self::default()
    }

    pub fn is_readable(&self) -> bool {
        self.flags.contains(ByteFlags::READABLE)
    }

    pub fn is_writable(&self) -> bool {
        self.flags.contains(ByteFlags::WRITABLE)
    }

    pub fn is_changed(&self) -> bool {
        self.flags.contains(ByteFlags::CHANGED)
    }

    pub fn is_history_known(&self) -> bool {
        self.flags.contains(ByteFlags::HISTORY_KNOWN)
    }

    pub fn set_changed(&mut self, changed: bool) {
        self.flags.set(ByteFlags::CHANGED, changed);
    }

    pub fn set_history_known(&mut self, known: bool) {
        self.flags.set(ByteFlags::HISTORY_KNOWN, known);
    }

    /// Drop change information reported by the store.
    pub fn without_history(mut self) -> Self {
        self.flags.remove(ByteFlags::CHANGED | ByteFlags::HISTORY_KNOWN);
        self
    }
}

/// `count` placeholder bytes.
pub fn placeholders(count: usize) -> Vec<MemoryByte> {
    vec![MemoryByte::placeholder(); count]
}
