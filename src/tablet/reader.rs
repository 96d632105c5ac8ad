//! Tablet Reader
//!
//! Opens tablet files and provides point lookups via the in-memory index.

use std::fs::File;
use std::path::Path;

use parking_lot::Mutex;

use crate::error::{Result, TabletError};

use super::block::RawBlockIterator;
use super::iterator::TabletIterator;
use super::source::{BlockSource, FileSource};
use super::trailer::{decode_index, Trailer};
use super::{candidate_block, IndexEntry, Kv, TRAILER_SIZE};

/// An opened tablet: the parsed index bound to the storage it came from
///
/// Only the index is held in memory; blocks are read from `source` when a
/// scan or lookup reaches them. Pass `&source` to borrow a handle owned
/// elsewhere.
pub struct Tablet<S> {
    /// Storage the tablet is read from
    source: S,
    /// Index: one entry per block, ordered by first key
    index: Vec<IndexEntry>,
    trailer: Trailer,
    file_size: u64,
}

impl Tablet<FileSource> {
    /// Open a tablet file by path
    pub fn open_file(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        tracing::debug!(path = %path.as_ref().display(), "opening tablet file");
        Self::open(Mutex::new(file))
    }
}

impl<S: BlockSource> Tablet<S> {
    /// Open a tablet for reading
    ///
    /// Reads and validates the trailer, then loads the index into memory.
    /// Nothing else is read until a scan or lookup needs a block.
    pub fn open(source: S) -> Result<Self> {
        let file_size = source.size()?;

        let result = Self::load_index(&source, file_size);
        let (trailer, index) = match result {
            Ok(parsed) => parsed,
            Err(e) => {
                if e.is_format_error() {
                    tracing::warn!(file_size, error = %e, "rejecting tablet");
                }
                return Err(e);
            }
        };

        tracing::debug!(
            file_size,
            blocks = index.len(),
            index_offset = trailer.index_offset,
            index_length = trailer.index_length,
            "opened tablet"
        );

        Ok(Self {
            source,
            index,
            trailer,
            file_size,
        })
    }

    /// Internal: trailer → bounds checks → checksum → index records
    fn load_index(source: &S, file_size: u64) -> Result<(Trailer, Vec<IndexEntry>)> {
        if file_size < TRAILER_SIZE {
            return Err(TabletError::Truncated { size: file_size });
        }

        let trailer_offset = file_size - TRAILER_SIZE;
        let raw = source.read_at(trailer_offset, TRAILER_SIZE as usize)?;
        let trailer = Trailer::decode(&raw)?;

        // Index must sit directly in front of the trailer
        let index_end = trailer
            .index_offset
            .checked_add(trailer.index_length)
            .ok_or_else(|| TabletError::InvalidIndex("index extent overflows".to_string()))?;
        if index_end != trailer_offset {
            return Err(TabletError::InvalidIndex(format!(
                "index [{}, {}) does not end at trailer offset {}",
                trailer.index_offset, index_end, trailer_offset
            )));
        }

        let index_len = usize::try_from(trailer.index_length)
            .map_err(|_| TabletError::InvalidIndex("index too large".to_string()))?;
        let data = source.read_at(trailer.index_offset, index_len)?;

        let actual = crc32fast::hash(&data);
        if actual != trailer.index_crc {
            return Err(TabletError::ChecksumMismatch {
                expected: trailer.index_crc,
                actual,
            });
        }

        let index = decode_index(&data)?;

        for (i, entry) in index.iter().enumerate() {
            let in_bounds = entry
                .offset
                .checked_add(entry.length)
                .is_some_and(|end| end <= trailer.index_offset);
            if !in_bounds {
                return Err(TabletError::InvalidIndex(format!(
                    "block {} at [{}, +{}) lies outside data region of {} bytes",
                    i, entry.offset, entry.length, trailer.index_offset
                )));
            }
        }

        Ok((trailer, index))
    }

    /// Iterate over every entry in key order, reading blocks lazily
    pub fn iter(&self) -> TabletIterator<'_, S> {
        TabletIterator::new(self)
    }

    /// Point lookup for a single key
    ///
    /// Binary-searches the index for the one block that could hold `key`
    /// and scans only that block. Keys that sort before the first block are
    /// rejected without touching storage.
    pub fn find(&self, key: &[u8]) -> Result<Option<Kv>> {
        let Some(block) = candidate_block(&self.index, key) else {
            tracing::trace!(blocks = self.index.len(), "key precedes every block");
            return Ok(None);
        };

        let mut iter = self.read_block(block)?;
        let found = iter.find(key)?;
        tracing::trace!(block, found, "tablet lookup");
        Ok(if found { iter.current() } else { None })
    }

    /// Scan every entry whose key is `>= start`, across block boundaries
    pub fn scan_from(&self, start: &[u8]) -> Result<impl Iterator<Item = Result<Kv>> + '_> {
        let mut iter = self.iter();
        iter.find(start)?;
        let first = iter.current().map(Ok);
        Ok(first.into_iter().chain(iter))
    }

    /// Load block `block` from storage and return an iterator over it
    pub fn read_block(&self, block: usize) -> Result<RawBlockIterator> {
        let entry = self.index.get(block).ok_or_else(|| {
            TabletError::InvalidIndex(format!(
                "block {} requested from a tablet with {} blocks",
                block,
                self.index.len()
            ))
        })?;
        let len = usize::try_from(entry.length)
            .map_err(|_| TabletError::InvalidIndex(format!("block {block} too large")))?;

        let data = self.source.read_at(entry.offset, len)?;
        Ok(RawBlockIterator::new(data))
    }

    /// The in-memory index, one entry per block
    pub fn index(&self) -> &[IndexEntry] {
        &self.index
    }

    pub fn block_count(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn trailer(&self) -> &Trailer {
        &self.trailer
    }

    pub fn file_size(&self) -> u64 {
        self.file_size
    }

    /// Smallest key in the tablet, read from the index
    pub fn first_key(&self) -> Option<&[u8]> {
        self.index.first().map(|entry| entry.first_key.as_ref())
    }

    /// The storage this tablet reads from
    pub fn source(&self) -> &S {
        &self.source
    }
}
