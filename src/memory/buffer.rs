//! In-process memory blocks over owned buffers.
//!
//! Useful for core dumps, snapshots and tests: [`BufferMemoryBlock`] is an
//! Extended block over a byte vector mapped at a base address, and
//! [`FlatMemoryBlock`] is a Simple block over a fixed buffer. Both can be
//! marked disconnected to emulate a terminated target.

use crate::core::address::Address;
use crate::core::memory_byte::{ByteFlags, MemoryByte};
use crate::memory::block::{BlockBounds, BlockError, ExtendedMemoryBlock, SimpleMemoryBlock};
use bytes::Bytes;
use num_traits::ToPrimitive;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;
use tracing::trace;

/// Extended block over a byte vector starting at `base`.
pub struct BufferMemoryBlock {
    base: Address,
    data: RwLock<Vec<u8>>,
    /// Contents at the last suspend, when the block tracks changes itself
    snapshot: RwLock<Option<Vec<u8>>>,
    addressable_size: usize,
    address_size: Option<usize>,
    change_management: bool,
    connected: AtomicBool,
}

impl BufferMemoryBlock {
    pub fn new(base: Address, data: Vec<u8>) -> Self {
        Self {
            base,
            data: RwLock::new(data),
            snapshot: RwLock::new(None),
            addressable_size: 1,
            address_size: None,
            change_management: false,
            connected: AtomicBool::new(true),
        }
    }

    pub fn with_addressable_size(mut self, size: usize) -> Self {
        self.addressable_size = size.max(1);
        self
    }

    pub fn with_address_size(mut self, size: usize) -> Self {
        self.address_size = Some(size);
        self
    }

    pub fn with_change_management(mut self, enabled: bool) -> Self {
        self.change_management = enabled;
        self
    }

    pub fn set_connected(&self, connected: bool) {
        self.connected.store(connected, Ordering::SeqCst);
    }

    /// Overwrite bytes at `offset` (relative to the base).
    pub fn write(&self, offset: usize, bytes: &[u8]) -> Result<(), BlockError> {
        let mut data = self.data.write().map_err(|_| poisoned())?;
        let end = offset
            .checked_add(bytes.len())
            .filter(|end| *end <= data.len())
            .ok_or(BlockError::Unavailable)?;
        data[offset..end].copy_from_slice(bytes);
        Ok(())
    }

    /// Record the current contents as the reference for change flags.
    pub fn suspend(&self) -> Result<(), BlockError> {
        let data = self.data.read().map_err(|_| poisoned())?;
        *self.snapshot.write().map_err(|_| poisoned())? = Some(data.clone());
        Ok(())
    }

    fn unit_count(len: usize, unit: usize) -> u64 {
        (len / unit) as u64
    }
}

fn poisoned() -> BlockError {
    BlockError::Protocol("buffer lock poisoned".to_string())
}

impl ExtendedMemoryBlock for BufferMemoryBlock {
    fn base_address(&self) -> Address {
        self.base.clone()
    }

    fn bounds(&self) -> BlockBounds {
        let len = self.data.read().map(|d| d.len()).unwrap_or(0);
        let end = self
            .base
            .add_units(Self::unit_count(len, self.addressable_size));
        BlockBounds {
            start: self.base.clone(),
            end,
        }
    }

    fn address_size(&self) -> Option<usize> {
        self.address_size
    }

    fn supports_change_management(&self) -> bool {
        self.change_management
    }

    fn get_bytes_from_address(
        &self,
        address: &Address,
        units: u64,
    ) -> Result<Vec<MemoryByte>, BlockError> {
        if !self.connected.load(Ordering::SeqCst) {
            return Err(BlockError::Disconnected);
        }
        let data = self.data.read().map_err(|_| poisoned())?;
        let snapshot = self.snapshot.read().map_err(|_| poisoned())?;
        let unit = self.addressable_size;
        let wanted = usize::try_from(units)
            .ok()
            .and_then(|u| u.checked_mul(unit))
            .ok_or_else(|| BlockError::Protocol(format!("request of {} units too large", units)))?;

        let mut out = Vec::with_capacity(wanted);

        // Units below the base are outside the block.
        let lead_units = self.base.saturating_sub(address);
        let lead = lead_units
            .to_usize()
            .and_then(|u| u.checked_mul(unit))
            .unwrap_or(usize::MAX)
            .min(wanted);
        out.resize(lead, MemoryByte::placeholder());

        let first = address
            .saturating_sub(&self.base)
            .to_usize()
            .and_then(|u| u.checked_mul(unit))
            .unwrap_or(usize::MAX);
        let mut offset = first;
        while out.len() < wanted && offset < data.len() {
            let value = data[offset];
            let mut flags = ByteFlags::READABLE | ByteFlags::WRITABLE;
            if self.change_management {
                if let Some(previous) = snapshot.as_ref() {
                    flags |= ByteFlags::HISTORY_KNOWN;
                    if previous.get(offset) != Some(&value) {
                        flags |= ByteFlags::CHANGED;
                    }
                }
            }
            out.push(MemoryByte::new(value, flags));
            offset += 1;
        }

        trace!(
            address = %address,
            units,
            returned = out.len(),
            "Buffer block read"
        );
        Ok(out)
    }
}

/// Simple block over a fixed buffer.
pub struct FlatMemoryBlock {
    start: u64,
    data: Bytes,
    length: u64,
    connected: AtomicBool,
}

impl FlatMemoryBlock {
    pub fn new(data: impl Into<Bytes>) -> Self {
        let data = data.into();
        Self {
            start: 0,
            length: data.len() as u64,
            data,
            connected: AtomicBool::new(true),
        }
    }

    pub fn with_start(mut self, start: u64) -> Self {
        self.start = start;
        self
    }

    /// Declare a length larger than the data actually served.
    pub fn with_declared_length(mut self, length: u64) -> Self {
        self.length = length;
        self
    }

    pub fn set_connected(&self, connected: bool) {
        self.connected.store(connected, Ordering::SeqCst);
    }
}

impl SimpleMemoryBlock for FlatMemoryBlock {
    fn start_address(&self) -> u64 {
        self.start
    }

    fn length(&self) -> u64 {
        self.length
    }

    fn get_bytes(&self) -> Result<Bytes, BlockError> {
        if !self.connected.load(Ordering::SeqCst) {
            return Err(BlockError::Disconnected);
        }
        Ok(self.data.clone())
    }
}
