//! Core data types shared by the memory and variable paths.

pub mod address;
pub mod descriptor;
pub mod line;
pub mod memory_byte;

pub use address::Address;
pub use descriptor::ContentDescriptor;
pub use line::LineSegment;
pub use memory_byte::{ByteFlags, MemoryByte};
