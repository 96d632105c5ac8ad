//! Tablet Module
//!
//! Sorted, block-structured, immutable on-disk key-value storage.
//!
//! ## File Format
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │ Data Blocks (variable)                                  │
//! │   block_0 | block_1 | ... | block_n-1                   │
//! │   each block: [raw(key)][raw(value)] ... repeated       │
//! ├─────────────────────────────────────────────────────────┤
//! │ Index (variable)                                        │
//! │   IndexMagic: u32 (4) = 0xda7aba5e                      │
//! │   [raw(first_key)][0xcf Offset: u64][0xcf Length: u64]  │
//! │   ... one record per block, in key order ...            │
//! ├─────────────────────────────────────────────────────────┤
//! │ Trailer (26 bytes)                                      │
//! │   0xcf IndexOffset: u64 (9) | 0xcf IndexLength: u64 (9) │
//! │   IndexCRC: u32 (4) | TabletMagic: u32 (4) = 0x0b501e7e │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! `raw(x)` is a msgpack-style raw string: a one, three or five byte length
//! header followed by the bytes of `x`. All integers are big-endian.

mod block;
mod builder;
pub mod codec;
mod iterator;
mod reader;
mod source;
mod trailer;
mod writer;

use bytes::Bytes;

pub use block::{IterState, RawBlockIterator};
pub use builder::{BlockBuilder, FinishedBlock};
pub use iterator::TabletIterator;
pub use reader::Tablet;
pub use source::{BlockSource, FileSource};
pub use trailer::Trailer;
pub use writer::{try_write_tablet, write_tablet, TabletSummary, TabletWriter};

// =============================================================================
// Shared Constants (used by writer, reader, trailer)
// =============================================================================

/// Magic number closing every tablet file
pub const TABLET_MAGIC: u32 = 0x0b50_1e7e;

/// Magic number opening the index region
pub const INDEX_MAGIC: u32 = 0xda7a_ba5e;

/// Trailer size: IndexOffset (9) + IndexLength (9) + IndexCRC (4) + Magic (4)
pub const TRAILER_SIZE: u64 = 26;

// =============================================================================
// Key-Value Pair
// =============================================================================

/// A decoded key/value pair.
///
/// Both halves are `Bytes` views into the block they were decoded from, so
/// handing out a `Kv` does not copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Kv {
    pub key: Bytes,
    pub value: Bytes,
}

impl Kv {
    pub fn new(key: impl Into<Bytes>, value: impl Into<Bytes>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Split into a `(key, value)` tuple, the shape the writer consumes
    pub fn into_parts(self) -> (Bytes, Bytes) {
        (self.key, self.value)
    }
}

// =============================================================================
// Index Entry
// =============================================================================

/// One record of the sparse index: where a block lives and its smallest key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    /// First (smallest) key stored in the block
    pub first_key: Bytes,
    /// Byte offset of the block from the start of the tablet
    pub offset: u64,
    /// Encoded length of the block in bytes
    pub length: u64,
}

impl IndexEntry {
    /// Offset one past the last byte of the block
    pub fn end(&self) -> u64 {
        self.offset + self.length
    }
}

/// Position of the only block that can hold `key`: the last block whose
/// first key is `<= key`. `None` when the key sorts before every block.
pub(crate) fn candidate_block(index: &[IndexEntry], key: &[u8]) -> Option<usize> {
    let after = index.partition_point(|entry| entry.first_key.as_ref() <= key);
    after.checked_sub(1)
}
