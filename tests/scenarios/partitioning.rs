use crate::common::{ints, BrokenIndexed};
use memscope::variables::{partition_size, Children, ValueError};
use memscope::{
    expand_partition, resolve_and_partition, CancelToken, EngineError, Partition,
    StructureRegistry, ValueRef,
};
use std::sync::Arc;

fn children(value: ValueRef, preferred: u64) -> memscope::Rendered<Children> {
    let registry = StructureRegistry::new();
    resolve_and_partition(value, false, &registry, preferred, &CancelToken::new()).unwrap()
}

#[test]
fn test_scenario_d_small_value_has_direct_elements() {
    let out = children(ints(57), 100);
    let elements = out.data.elements().unwrap();
    assert_eq!(elements.len(), 57);
    assert_eq!(elements[0].name, "[0]");
    assert_eq!(elements[56].name, "[56]");
    assert!(!out.is_degraded());
}

#[test]
fn test_scenario_e_remainder_partition() {
    assert_eq!(partition_size(250, 100), 100);
    let out = children(ints(250), 100);
    let lengths: Vec<u64> = out
        .data
        .partitions()
        .unwrap()
        .iter()
        .map(Partition::length)
        .collect();
    assert_eq!(lengths, vec![100, 100, 50]);
}

#[test]
fn test_exactly_preferred_size_is_not_partitioned() {
    let out = children(ints(100), 100);
    assert_eq!(out.data.elements().unwrap().len(), 100);
    let out = children(ints(101), 100);
    assert_eq!(out.data.partitions().unwrap().len(), 2);
}

#[test]
fn test_drill_down_to_elements() {
    let token = CancelToken::new();
    let out = children(ints(1_234_567), 100);
    let top = out.data.partitions().unwrap().to_vec();
    assert_eq!(top.len(), 2);
    assert_eq!(top[0].length(), 1_000_000);
    assert_eq!(top[1].name(), "[1000000..1234566]");

    let second = expand_partition(&top[1], 100, &token).unwrap();
    let second = second.data.partitions().unwrap().to_vec();
    assert_eq!(second.len(), 24);
    assert_eq!(second[0].length(), 10_000);
    assert_eq!(second[23].length(), 4_567);

    let third = expand_partition(&second[23], 100, &token).unwrap();
    let third = third.data.partitions().unwrap().to_vec();
    assert_eq!(third.len(), 46);
    assert_eq!(third[45].offset(), 1_234_500);

    let leaf = expand_partition(&third[45], 100, &token).unwrap();
    let elements = leaf.data.elements().unwrap();
    assert_eq!(elements.len(), 67);
    assert_eq!(elements[66].name, "[1234566]");
    assert_eq!(elements[66].value.value_string(), "1234566");
}

#[test]
fn test_size_query_failure_degrades_to_leaf() {
    let value: ValueRef = Arc::new(BrokenIndexed { size: None });
    let out = children(value, 100);
    assert!(out.data.is_empty());
    assert!(matches!(
        out.failure,
        Some(EngineError::SizeQuery(ValueError::Query(_)))
    ));
}

#[test]
fn test_element_query_failure_is_reported() {
    let value: ValueRef = Arc::new(BrokenIndexed { size: Some(20) });
    let out = children(value, 100);
    assert!(out.data.is_empty());
    assert!(matches!(
        out.failure,
        Some(EngineError::ElementQuery {
            offset: 0,
            end: 20,
            ..
        })
    ));
}

#[test]
fn test_non_indexed_value_has_no_children() {
    let value = memscope::variables::ScalarValue::shared("int", "7");
    let out = children(value, 100);
    assert!(out.data.is_empty());
    assert!(!out.is_degraded());
}
