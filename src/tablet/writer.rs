//! Tablet Writer
//!
//! Streams sorted key-value entries into a new tablet.

use std::io::Write;

use crate::config::TabletOptions;
use crate::error::Result;

use super::builder::BlockBuilder;
use super::trailer::{encode_index, Trailer};
use super::{IndexEntry, TRAILER_SIZE};

/// What a completed write produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TabletSummary {
    /// Number of entries written
    pub entry_count: u64,
    /// Number of data blocks written
    pub block_count: usize,
    /// Offset of the index region
    pub index_offset: u64,
    /// Length of the index region
    pub index_length: u64,
    /// Total bytes written, trailer included
    pub file_size: u64,
}

/// Writer producing a tablet from entries in sorted key order
///
/// Blocks are written out as soon as they fill, so only the block under
/// construction and the index are held in memory. Offsets are counted from
/// the first byte this writer emits.
pub struct TabletWriter<W: Write> {
    /// Destination (never closed by the writer)
    sink: W,
    /// Block under construction
    block: BlockBuilder,
    /// One entry per flushed block, in flush (= key) order
    index: Vec<IndexEntry>,
    /// Bytes written to the sink so far
    offset: u64,
    /// Number of entries added
    entry_count: u64,
}

impl<W: Write> TabletWriter<W> {
    /// Create a writer over `sink`
    pub fn new(sink: W, options: &TabletOptions) -> Result<Self> {
        options.validate()?;
        Ok(Self {
            sink,
            block: BlockBuilder::new(options.block_size),
            index: Vec::new(),
            offset: 0,
            entry_count: 0,
        })
    }

    /// Add a key-value pair (must be called in strictly increasing key order)
    pub fn add(&mut self, key: &[u8], value: &[u8]) -> Result<()> {
        self.block.add(key, value)?;
        self.entry_count += 1;

        if self.block.should_flush() {
            self.flush_block()?;
        }
        Ok(())
    }

    /// Number of entries added so far
    pub fn entry_count(&self) -> u64 {
        self.entry_count
    }

    /// Number of blocks already written to the sink
    pub fn block_count(&self) -> usize {
        self.index.len()
    }

    /// Internal: write out the pending block and record it in the index
    fn flush_block(&mut self) -> Result<()> {
        let Some(block) = self.block.finalize() else {
            return Ok(());
        };

        self.sink.write_all(&block.data)?;

        let length = block.data.len() as u64;
        tracing::debug!(
            block = self.index.len(),
            offset = self.offset,
            length,
            entries = block.entry_count,
            "flushed tablet block"
        );

        self.index.push(IndexEntry {
            first_key: block.first_key,
            offset: self.offset,
            length,
        });
        self.offset += length;
        Ok(())
    }

    /// Finish building: flush the last block, write index and trailer
    pub fn finish(mut self) -> Result<TabletSummary> {
        self.flush_block()?;

        // Record where the index region starts
        let index_offset = self.offset;
        let index = encode_index(&self.index)?;
        let index_length = index.len() as u64;
        self.sink.write_all(&index)?;

        let trailer = Trailer {
            index_offset,
            index_length,
            index_crc: crc32fast::hash(&index),
        };
        self.sink.write_all(&trailer.encode())?;
        self.sink.flush()?;

        let summary = TabletSummary {
            entry_count: self.entry_count,
            block_count: self.index.len(),
            index_offset,
            index_length,
            file_size: index_offset + index_length + TRAILER_SIZE,
        };
        tracing::debug!(?summary, "tablet written");
        Ok(summary)
    }
}

/// Write a complete tablet from a sorted source, driving it to exhaustion.
///
/// The source must yield keys in strictly increasing order; this is not
/// checked. `sink` is flushed but not closed.
pub fn write_tablet<W, I, K, V>(sink: W, source: I, options: &TabletOptions) -> Result<TabletSummary>
where
    W: Write,
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<[u8]>,
    V: AsRef<[u8]>,
{
    let mut writer = TabletWriter::new(sink, options)?;
    for (key, value) in source {
        writer.add(key.as_ref(), value.as_ref())?;
    }
    writer.finish()
}

/// Like [`write_tablet`] for a fallible source, such as another tablet's
/// iterator. The first source error aborts the write and is returned.
pub fn try_write_tablet<W, I, K, V>(
    sink: W,
    source: I,
    options: &TabletOptions,
) -> Result<TabletSummary>
where
    W: Write,
    I: IntoIterator<Item = Result<(K, V)>>,
    K: AsRef<[u8]>,
    V: AsRef<[u8]>,
{
    let mut writer = TabletWriter::new(sink, options)?;
    for item in source {
        let (key, value) = item?;
        writer.add(key.as_ref(), value.as_ref())?;
    }
    writer.finish()
}
