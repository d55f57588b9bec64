//! Indexed-value path: resolve logical structures, then partition.

pub mod logical;
pub mod partition;
pub mod value;

pub use logical::{
    resolve_logical_value, LogicalStructureType, Resolution, StructureProvider, StructureRef,
    StructureRegistry,
};
pub use partition::{
    partition_children, partition_size, query_size, split_children, Children, Partition,
    DEFAULT_PARTITION_SIZE,
};
pub use value::{ArrayValue, DebugValue, IndexedValue, ScalarValue, ValueError, ValueRef, Variable};
