use crate::common::{ints, retype, CountingProvider, FailingStructure};
use memscope::variables::{resolve_logical_value, ScalarValue, StructureProvider};
use memscope::{resolve_and_partition, CancelToken, EngineError, StructureRegistry};
use std::sync::Arc;

#[test]
fn test_logical_view_is_partitioned() {
    // A linked list whose logical view is a 250 element array.
    let registry = StructureRegistry::new().with(retype("list", "LinkedList", "Node[]", 250));
    let raw = ScalarValue::shared("LinkedList", "{head=0x1000}");
    let token = CancelToken::new();

    let out = resolve_and_partition(Arc::clone(&raw), true, &registry, 100, &token).unwrap();
    assert_eq!(out.data.partitions().unwrap().len(), 3);

    let out = resolve_and_partition(raw, false, &registry, 100, &token).unwrap();
    assert!(out.data.is_empty());
}

#[test]
fn test_transform_failure_falls_back_to_last_value() {
    let registry = StructureRegistry::new()
        .with(retype("wrapper", "Wrapper", "Inner", 5))
        .with(Arc::new(FailingStructure {
            id: "inner".to_string(),
            from: "Inner".to_string(),
        }));
    let raw = ScalarValue::shared("Wrapper", "");
    let out = resolve_and_partition(raw, true, &registry, 100, &CancelToken::new()).unwrap();

    // The wrapper view still renders; the failed second step is reported.
    assert_eq!(out.data.elements().unwrap().len(), 5);
    match out.failure {
        Some(EngineError::Transform { id, source }) => {
            assert_eq!(id, "inner");
            assert_eq!(source.to_string(), "Value query failed: target busy");
        }
        other => panic!("expected transform failure, got {:?}", other),
    }
}

#[test]
fn test_cycle_between_structures_terminates() {
    let registry = StructureRegistry::new()
        .with(retype("a", "A", "B", 1))
        .with(retype("b", "B", "C", 1))
        .with(retype("c", "C", "A", 1));
    let provider = CountingProvider::new(registry);
    let out = resolve_logical_value(ScalarValue::shared("A", ""), true, &provider);

    assert_eq!(out.applied, vec!["a", "b", "c"]);
    assert_eq!(out.value.type_name(), "A");
    assert!(provider.lookups() <= 3 + 1);
}

#[test]
fn test_user_default_changes_resolution() {
    let registry = StructureRegistry::new()
        .with(retype("entries", "HashMap", "Entry[]", 4))
        .with(retype("keys", "HashMap", "Key[]", 2));
    let map = ScalarValue::shared("HashMap", "");
    let types = registry.applicable_types(&map);
    assert_eq!(types.len(), 2);

    let out = resolve_logical_value(Arc::clone(&map), true, &registry);
    assert_eq!(out.value.type_name(), "Entry[]");

    registry.set_default(&types, Some("keys"));
    let out = resolve_logical_value(map, true, &registry);
    assert_eq!(out.value.type_name(), "Key[]");
}

#[test]
fn test_value_without_structures_is_unchanged() {
    let registry = StructureRegistry::new().with(retype("a", "A", "B", 1));
    let value = ints(3);
    let out = resolve_logical_value(Arc::clone(&value), true, &registry);
    assert!(Arc::ptr_eq(&out.value, &value));
    assert!(out.applied.is_empty());
    assert!(out.failure.is_none());
}
