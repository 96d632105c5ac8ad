//! Block Builder
//!
//! Accumulates sorted entries into a single raw block.

use bytes::{Bytes, BytesMut};

use crate::error::Result;

use super::codec::{encode_entry, encoded_len};

/// A sealed block ready to be written out
#[derive(Debug, Clone)]
pub struct FinishedBlock {
    /// Encoded entries
    pub data: Bytes,
    /// Key of the first entry, recorded in the index
    pub first_key: Bytes,
    /// Number of entries in the block
    pub entry_count: usize,
}

/// Builder for one data block at a time
///
/// The budget is checked after each add: the entry that reaches
/// `block_size` stays in the current block, so an oversized entry is never
/// refused, it just ends up alone.
#[derive(Debug)]
pub struct BlockBuilder {
    /// Target encoded size of a block
    block_size: usize,
    /// Encoded entries so far
    buf: BytesMut,
    /// First key added since the last finalize
    first_key: Option<Bytes>,
    entry_count: usize,
}

impl BlockBuilder {
    /// Create a builder targeting `block_size` bytes per block
    pub fn new(block_size: usize) -> Self {
        Self {
            block_size,
            buf: BytesMut::new(),
            first_key: None,
            entry_count: 0,
        }
    }

    /// Append an entry (must be called in sorted key order)
    pub fn add(&mut self, key: &[u8], value: &[u8]) -> Result<()> {
        self.buf.reserve(encoded_len(key.len(), value.len()));
        encode_entry(key, value, &mut self.buf)?;

        if self.first_key.is_none() {
            self.first_key = Some(Bytes::copy_from_slice(key));
        }
        self.entry_count += 1;
        Ok(())
    }

    /// True once the block holds at least one entry and has reached its budget
    pub fn should_flush(&self) -> bool {
        self.entry_count > 0 && self.buf.len() >= self.block_size
    }

    pub fn is_empty(&self) -> bool {
        self.entry_count == 0
    }

    /// Encoded size accumulated so far
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn entry_count(&self) -> usize {
        self.entry_count
    }

    pub fn first_key(&self) -> Option<&[u8]> {
        self.first_key.as_deref()
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Seal the accumulated entries and reset for the next block.
    ///
    /// Returns `None` if nothing was added since the last call.
    pub fn finalize(&mut self) -> Option<FinishedBlock> {
        let first_key = self.first_key.take()?;
        let entry_count = std::mem::take(&mut self.entry_count);

        Some(FinishedBlock {
            data: self.buf.split().freeze(),
            first_key,
            entry_count,
        })
    }
}
