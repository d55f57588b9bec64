//! Per-session viewport state for a memory rendering.

use crate::config::MemoryConfig;
use crate::core::address::Address;
use crate::error::{EngineError, Result};
use serde::{Deserialize, Serialize};

/// Viewport state the planner turns into a fetch window.
///
/// Created when a view's input is set and mutated as the user scrolls or
/// resizes. Owned by exactly one session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentDescriptor {
    /// Address anchoring the viewport
    pub load_address: Address,
    /// Number of rows in the view; a fetch never returns more
    pub visible_lines: usize,
    /// Rows kept above the load address when the block allows
    pub pre_buffer_lines: usize,
    /// Rows past the view the window may cover before it is cut to size
    pub post_buffer_lines: usize,
    /// Let the window shift to stay within block bounds
    pub dynamic_load: bool,
    /// Round the load address down to a line boundary
    pub align_to_line: bool,
    /// Bytes per addressable unit
    pub addressable_size: usize,
    pub bytes_per_line: usize,
}

impl ContentDescriptor {
    pub fn new(load_address: Address, visible_lines: usize) -> Self {
        Self::from_config(load_address, visible_lines, &MemoryConfig::default())
    }

    pub fn from_config(load_address: Address, visible_lines: usize, config: &MemoryConfig) -> Self {
        Self {
            load_address,
            visible_lines,
            pre_buffer_lines: config.pre_buffer_lines,
            post_buffer_lines: config.post_buffer_lines,
            dynamic_load: config.dynamic_load,
            align_to_line: config.align_to_line,
            addressable_size: config.addressable_size,
            bytes_per_line: config.bytes_per_line,
        }
    }

    pub fn with_buffers(mut self, pre: usize, post: usize) -> Self {
        self.pre_buffer_lines = pre;
        self.post_buffer_lines = post;
        self
    }

    pub fn with_dynamic_load(mut self, dynamic: bool) -> Self {
        self.dynamic_load = dynamic;
        self
    }

    pub fn with_alignment(mut self, align: bool) -> Self {
        self.align_to_line = align;
        self
    }

    pub fn with_line_shape(mut self, bytes_per_line: usize, addressable_size: usize) -> Self {
        self.bytes_per_line = bytes_per_line;
        self.addressable_size = addressable_size;
        self
    }

    /// Addressable units covered by one row.
    pub fn units_per_line(&self) -> u64 {
        (self.bytes_per_line / self.addressable_size.max(1)) as u64
    }

    /// Reject shapes that cannot be cut into rows.
    pub fn validate(&self) -> Result<()> {
        if self.bytes_per_line == 0 {
            return Err(EngineError::InvalidDescriptor(
                "bytes_per_line must be positive".to_string(),
            ));
        }
        if self.addressable_size == 0 {
            return Err(EngineError::InvalidDescriptor(
                "addressable_size must be positive".to_string(),
            ));
        }
        if self.bytes_per_line % self.addressable_size != 0 {
            return Err(EngineError::InvalidDescriptor(format!(
                "bytes_per_line {} is not a multiple of addressable_size {}",
                self.bytes_per_line, self.addressable_size
            )));
        }
        Ok(())
    }
}
