//! Common test fixtures: backing stores, values and structure types.
//!
//! Each integration test binary only uses part of this module.
#![allow(dead_code)]

use memscope::core::{Address, MemoryByte};
use memscope::memory::{BlockBounds, BlockError, BufferMemoryBlock, ExtendedMemoryBlock};
use memscope::variables::{
    ArrayValue, DebugValue, IndexedValue, LogicalStructureType, ScalarValue, StructureProvider,
    StructureRef, StructureRegistry, ValueError, ValueRef, Variable,
};
use memscope::{CancelToken, MemoryBlockHandle};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Extended block over `[base, base + len)` whose byte at offset `i` is `i as u8`.
pub fn counting_block(base: u64, len: usize) -> BufferMemoryBlock {
    let data = (0..len).map(|i| i as u8).collect();
    BufferMemoryBlock::new(Address::from(base), data)
}

pub fn extended(base: u64, len: usize) -> MemoryBlockHandle {
    MemoryBlockHandle::extended(counting_block(base, len))
}

/// Lets a test keep a handle on a store after giving it to the engine.
pub struct SharedBlock<T>(pub Arc<T>);

impl<T: ExtendedMemoryBlock> ExtendedMemoryBlock for SharedBlock<T> {
    fn base_address(&self) -> Address {
        self.0.base_address()
    }

    fn bounds(&self) -> BlockBounds {
        self.0.bounds()
    }

    fn address_size(&self) -> Option<usize> {
        self.0.address_size()
    }

    fn supports_change_management(&self) -> bool {
        self.0.supports_change_management()
    }

    fn get_bytes_from_address(
        &self,
        address: &Address,
        units: u64,
    ) -> Result<Vec<MemoryByte>, BlockError> {
        self.0.get_bytes_from_address(address, units)
    }
}

/// Extended block whose every query fails with `error`.
pub struct FailingBlock {
    pub bounds: BlockBounds,
    pub error: BlockError,
    pub queries: AtomicUsize,
}

impl FailingBlock {
    pub fn new(start: u64, end: u64, error: BlockError) -> Self {
        Self {
            bounds: BlockBounds::new(start, end),
            error,
            queries: AtomicUsize::new(0),
        }
    }
}

impl ExtendedMemoryBlock for FailingBlock {
    fn base_address(&self) -> Address {
        self.bounds.start.clone()
    }

    fn bounds(&self) -> BlockBounds {
        self.bounds.clone()
    }

    fn get_bytes_from_address(&self, _: &Address, _: u64) -> Result<Vec<MemoryByte>, BlockError> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        Err(self.error.clone())
    }
}

/// Extended block that sleeps before answering, like a target behind a
/// slow link.
pub struct SlowBlock {
    pub inner: BufferMemoryBlock,
    pub delay: Duration,
    pub queries: Arc<AtomicUsize>,
}

impl SlowBlock {
    pub fn new(len: usize, delay: Duration) -> Self {
        Self {
            inner: counting_block(0, len),
            delay,
            queries: Arc::new(AtomicUsize::new(0)),
        }
    }
}

impl ExtendedMemoryBlock for SlowBlock {
    fn base_address(&self) -> Address {
        self.inner.base_address()
    }

    fn bounds(&self) -> BlockBounds {
        self.inner.bounds()
    }

    fn get_bytes_from_address(
        &self,
        address: &Address,
        units: u64,
    ) -> Result<Vec<MemoryByte>, BlockError> {
        std::thread::sleep(self.delay);
        self.queries.fetch_add(1, Ordering::SeqCst);
        self.inner.get_bytes_from_address(address, units)
    }
}

/// Indexed value whose queries fail.
#[derive(Debug)]
pub struct BrokenIndexed {
    pub size: Option<u64>,
}

impl DebugValue for BrokenIndexed {
    fn type_name(&self) -> &str {
        "broken[]"
    }

    fn as_indexed(&self) -> Option<&dyn IndexedValue> {
        Some(self)
    }
}

impl IndexedValue for BrokenIndexed {
    fn size(&self) -> Result<u64, ValueError> {
        self.size
            .ok_or_else(|| ValueError::Query("size unavailable".to_string()))
    }

    fn variable(&self, _: u64) -> Result<Variable, ValueError> {
        Err(ValueError::Disconnected)
    }
}

/// Indexed value whose size query cancels `token`, like a user scrolling
/// away while the target answers.
#[derive(Debug)]
pub struct CancelOnSize {
    pub token: CancelToken,
    pub size: u64,
    pub element_queries: AtomicUsize,
}

impl CancelOnSize {
    pub fn new(token: CancelToken, size: u64) -> Self {
        Self {
            token,
            size,
            element_queries: AtomicUsize::new(0),
        }
    }
}

impl DebugValue for CancelOnSize {
    fn type_name(&self) -> &str {
        "int[]"
    }

    fn as_indexed(&self) -> Option<&dyn IndexedValue> {
        Some(self)
    }
}

impl IndexedValue for CancelOnSize {
    fn size(&self) -> Result<u64, ValueError> {
        self.token.cancel();
        Ok(self.size)
    }

    fn variable(&self, index: u64) -> Result<Variable, ValueError> {
        self.element_queries.fetch_add(1, Ordering::SeqCst);
        Ok(Variable::indexed(index, ScalarValue::shared("int", "0")))
    }
}

pub fn ints(count: u64) -> ValueRef {
    ArrayValue::of_ints("int[]", count).into_ref()
}

/// Maps values of type `from` to an int array of `to` with `len` elements.
pub struct Retype {
    pub id: String,
    pub from: String,
    pub to: String,
    pub len: u64,
}

impl LogicalStructureType for Retype {
    fn id(&self) -> &str {
        &self.id
    }

    fn provides_for(&self, value: &dyn DebugValue) -> bool {
        value.type_name() == self.from
    }

    fn logical_value(&self, _: &ValueRef) -> Result<ValueRef, ValueError> {
        Ok(ArrayValue::of_ints(self.to.clone(), self.len).into_ref())
    }
}

pub fn retype(id: &str, from: &str, to: &str, len: u64) -> StructureRef {
    Arc::new(Retype {
        id: id.to_string(),
        from: from.to_string(),
        to: to.to_string(),
        len,
    })
}

/// Structure type whose transform always fails.
pub struct FailingStructure {
    pub id: String,
    pub from: String,
}

impl LogicalStructureType for FailingStructure {
    fn id(&self) -> &str {
        &self.id
    }

    fn provides_for(&self, value: &dyn DebugValue) -> bool {
        value.type_name() == self.from
    }

    fn logical_value(&self, _: &ValueRef) -> Result<ValueRef, ValueError> {
        Err(ValueError::Query("target busy".to_string()))
    }
}

/// Provider that counts lookups, to bound the resolver's step count.
pub struct CountingProvider {
    pub registry: StructureRegistry,
    pub lookups: AtomicUsize,
}

impl CountingProvider {
    pub fn new(registry: StructureRegistry) -> Self {
        Self {
            registry,
            lookups: AtomicUsize::new(0),
        }
    }

    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

impl StructureProvider for CountingProvider {
    fn applicable_types(&self, value: &ValueRef) -> Vec<StructureRef> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.registry.applicable_types(value)
    }

    fn default_of(&self, types: &[StructureRef]) -> Option<StructureRef> {
        self.registry.default_of(types)
    }
}
