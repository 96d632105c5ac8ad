//! Configuration for tablet construction
//!
//! Centralized options with sensible defaults.

use crate::error::{Result, TabletError};

/// Default target size of a data block (4 KB).
pub const DEFAULT_BLOCK_SIZE: usize = 4096;

/// Options controlling how a tablet is written
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TabletOptions {
    /// Soft target for the encoded size of each data block (in bytes).
    ///
    /// A block is cut after the entry that reaches this size, so a single
    /// entry larger than the target still lands in a block of its own.
    /// A value of 1 places every entry in its own block.
    pub block_size: usize,
}

impl Default for TabletOptions {
    fn default() -> Self {
        Self {
            block_size: DEFAULT_BLOCK_SIZE,
        }
    }
}

impl TabletOptions {
    /// Create a new options builder
    pub fn builder() -> TabletOptionsBuilder {
        TabletOptionsBuilder::default()
    }

    /// Shorthand for default options with a given block size
    pub fn with_block_size(block_size: usize) -> Self {
        Self { block_size }
    }

    /// Reject options the writer cannot honour
    pub fn validate(&self) -> Result<()> {
        if self.block_size == 0 {
            return Err(TabletError::Config(
                "block_size must be a positive number of bytes".to_string(),
            ));
        }
        Ok(())
    }
}

/// Builder for TabletOptions
#[derive(Default)]
pub struct TabletOptionsBuilder {
    options: TabletOptions,
}

impl TabletOptionsBuilder {
    /// Set the target block size (in bytes)
    pub fn block_size(mut self, size: usize) -> Self {
        self.options.block_size = size;
        self
    }

    /// Finish building, validating the result
    pub fn build(self) -> Result<TabletOptions> {
        self.options.validate()?;
        Ok(self.options)
    }
}
