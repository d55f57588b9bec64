//! Remote data windowing and partitioning for debugger views.
//!
//! Two request paths share one error model and one cancellation model:
//!
//! - memory: [`engine::plan_and_fetch_memory`] plans a window around a load
//!   address, fetches it from a backing store and cuts it into rows;
//! - variables: [`engine::resolve_and_partition`] swaps a value for its
//!   logical structure and splits large indexed values into partitions.
//!
//! [`session::ViewSession`] runs either path on a Tokio blocking worker.

/// Logging and tracing helpers
pub mod logging;

/// Error types
pub mod error;

/// Engine configuration
pub mod config;

/// Core data types module
pub mod core;

pub mod cancel;
pub mod engine;
pub mod memory;
pub mod session;
pub mod variables;

pub use crate::cancel::CancelToken;
pub use crate::config::{EngineConfig, MemoryConfig, VariablesConfig};
pub use crate::core::{Address, ByteFlags, ContentDescriptor, LineSegment, MemoryByte};
pub use crate::engine::{
    expand_partition, plan_and_fetch_memory, plan_and_fetch_memory_with, resolve_and_partition,
    FetchOptions,
};
pub use crate::error::{EngineError, Rendered, Result};
pub use crate::memory::{BlockBounds, BlockError, MemoryBlockHandle};
pub use crate::session::ViewSession;
pub use crate::variables::{Children, IndexedValue, Partition, StructureRegistry, ValueRef};
