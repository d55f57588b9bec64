//! Configuration for the windowing engine.
//!
//! Centralized, serde-friendly configuration with sensible defaults. Hosts
//! usually persist this as JSON next to their other view preferences.

use crate::error::{EngineError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Master configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Memory rendering configuration.
    pub memory: MemoryConfig,
    /// Indexed value configuration.
    pub variables: VariablesConfig,
}

impl EngineConfig {
    /// Parse and validate a JSON document. Missing fields take defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON configuration file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        self.memory.validate()?;
        self.variables.validate()
    }
}

/// Memory rendering configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryConfig {
    /// Bytes shown per row (default: 16).
    pub bytes_per_line: usize,
    /// Bytes per addressable unit (default: 1).
    pub addressable_size: usize,
    /// Rows fetched above the viewport (default: 20).
    pub pre_buffer_lines: usize,
    /// Rows fetched below the viewport (default: 20).
    pub post_buffer_lines: usize,
    /// Let the window slide to stay within block bounds (default: true).
    pub dynamic_load: bool,
    /// Align the load address to a row boundary (default: true).
    pub align_to_line: bool,
    /// Text shown in place of unreadable bytes (default: "??").
    pub padded_str: String,
    /// Address width in bytes when the store does not report one (default: 4).
    pub default_address_size: usize,
    /// Retry with the block base address when the load address is out of
    /// range (default: false).
    pub reset_to_base_on_out_of_range: bool,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            bytes_per_line: 16,
            addressable_size: 1,
            pre_buffer_lines: 20,
            post_buffer_lines: 20,
            dynamic_load: true,
            align_to_line: true,
            padded_str: "??".to_string(),
            default_address_size: 4,
            reset_to_base_on_out_of_range: false,
        }
    }
}

impl MemoryConfig {
    pub fn validate(&self) -> Result<()> {
        if self.bytes_per_line == 0 || self.addressable_size == 0 {
            return Err(EngineError::InvalidConfig(
                "bytes_per_line and addressable_size must be positive".to_string(),
            ));
        }
        if self.bytes_per_line % self.addressable_size != 0 {
            return Err(EngineError::InvalidConfig(format!(
                "bytes_per_line {} is not a multiple of addressable_size {}",
                self.bytes_per_line, self.addressable_size
            )));
        }
        Ok(())
    }
}

/// Indexed value configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VariablesConfig {
    /// Preferred partition fan-out (default: 100).
    pub partition_size: u64,
    /// Substitute registered logical structures (default: true).
    pub show_logical_structures: bool,
}

impl Default for VariablesConfig {
    fn default() -> Self {
        Self {
            partition_size: 100,
            show_logical_structures: true,
        }
    }
}

impl VariablesConfig {
    pub fn validate(&self) -> Result<()> {
        // A fan-out of 1 never shrinks the range being partitioned.
        if self.partition_size < 2 {
            return Err(EngineError::InvalidConfig(format!(
                "partition_size must be at least 2, got {}",
                self.partition_size
            )));
        }
        Ok(())
    }
}
