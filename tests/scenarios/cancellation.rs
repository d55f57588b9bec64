use crate::common::{ints, CancelOnSize, SharedBlock, SlowBlock};
use memscope::{
    plan_and_fetch_memory, resolve_and_partition, Address, CancelToken, ContentDescriptor,
    EngineError, MemoryBlockHandle, StructureRegistry,
};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

#[test]
fn test_cancel_before_query_skips_store() {
    let slow = Arc::new(SlowBlock::new(0x100, Duration::from_millis(1)));
    let block = MemoryBlockHandle::extended(SharedBlock(Arc::clone(&slow)));
    let token = CancelToken::new();
    token.cancel();

    let desc = ContentDescriptor::new(Address::zero(), 2).with_buffers(0, 0);
    let out = plan_and_fetch_memory(&desc, &block, &token);
    assert!(matches!(out, Err(EngineError::Cancelled)));
    assert_eq!(slow.queries.load(Ordering::SeqCst), 0);
}

#[test]
fn test_cancel_during_query_discards_result() {
    let slow = Arc::new(SlowBlock::new(0x100, Duration::from_millis(200)));
    let block = MemoryBlockHandle::extended(SharedBlock(Arc::clone(&slow)));
    let token = CancelToken::new();

    let canceller = {
        let token = token.clone();
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(50));
            token.cancel();
        })
    };
    let desc = ContentDescriptor::new(Address::zero(), 2).with_buffers(0, 0);
    let out = plan_and_fetch_memory(&desc, &block, &token);
    canceller.join().unwrap();

    // The query ran to completion, but its result was dropped.
    assert_eq!(slow.queries.load(Ordering::SeqCst), 1);
    assert!(matches!(out, Err(EngineError::Cancelled)));
}

#[test]
fn test_cancelled_expansion() {
    let token = CancelToken::new();
    token.cancel();
    let registry = StructureRegistry::new();
    let out = resolve_and_partition(ints(500), true, &registry, 100, &token);
    assert!(matches!(out, Err(EngineError::Cancelled)));
}

#[test]
fn test_cancel_during_size_query_skips_element_queries() {
    let token = CancelToken::new();
    let value = Arc::new(CancelOnSize::new(token.clone(), 20));
    let registry = StructureRegistry::new();

    let out = resolve_and_partition(value.clone(), false, &registry, 100, &token);
    assert!(token.is_cancelled());
    assert!(matches!(out, Err(EngineError::Cancelled)));
    assert_eq!(value.element_queries.load(Ordering::SeqCst), 0);
}
