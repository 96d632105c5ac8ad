//! Tablet Iterator
//!
//! Sequential iteration over all entries in a tablet, one block at a time.

use std::cmp::Ordering;

use crate::error::Result;

use super::block::RawBlockIterator;
use super::reader::Tablet;
use super::source::BlockSource;
use super::{candidate_block, Kv};

/// Iterator over tablet entries in sorted key order
///
/// Holds at most one decoded block: when the current block runs out, the
/// next one in index order is read from storage. Dropping the iterator
/// mid-scan needs no cleanup.
pub struct TabletIterator<'a, S> {
    tablet: &'a Tablet<S>,
    /// Index position of the next block to load
    next_block: usize,
    /// Iterator over the block currently being scanned
    current: Option<RawBlockIterator>,
    /// Set once every block is used up or a read failed
    done: bool,
}

impl<'a, S: BlockSource> TabletIterator<'a, S> {
    pub(super) fn new(tablet: &'a Tablet<S>) -> Self {
        Self {
            tablet,
            next_block: 0,
            current: None,
            done: false,
        }
    }

    /// Move to the next entry, loading the following block when needed.
    ///
    /// Returns `Ok(false)` once all blocks are consumed. Errors (storage
    /// reads, corrupt entries) end the iteration.
    pub fn advance(&mut self) -> Result<bool> {
        if self.done {
            return Ok(false);
        }

        loop {
            if let Some(block) = self.current.as_mut() {
                match block.advance() {
                    Ok(true) => return Ok(true),
                    Ok(false) => {}
                    Err(e) => {
                        self.finish();
                        return Err(e);
                    }
                }
            }

            if self.next_block >= self.tablet.block_count() {
                self.finish();
                return Ok(false);
            }

            match self.tablet.read_block(self.next_block) {
                Ok(block) => {
                    self.current = Some(block);
                    self.next_block += 1;
                }
                Err(e) => {
                    self.finish();
                    return Err(e);
                }
            }
        }
    }

    /// Scan forward to the first entry whose key is `>= target` and report
    /// whether it matches exactly.
    ///
    /// Unread blocks that end before `target` are skipped using the index.
    /// The scan never goes back to a block it has already left, and like
    /// [`RawBlockIterator::find`] it starts after the current entry.
    pub fn find(&mut self, target: &[u8]) -> Result<bool> {
        if self.done {
            return Ok(false);
        }

        if let Some(block) = candidate_block(self.tablet.index(), target) {
            if block >= self.next_block {
                self.current = None;
                self.next_block = block;
            }
        }

        while self.advance()? {
            if let Some(key) = self.key() {
                match key.cmp(target) {
                    Ordering::Less => continue,
                    Ordering::Equal => return Ok(true),
                    Ordering::Greater => return Ok(false),
                }
            }
        }
        Ok(false)
    }

    /// Key of the current entry, `None` unless positioned
    pub fn key(&self) -> Option<&[u8]> {
        self.current.as_ref().and_then(|block| block.key())
    }

    /// Value of the current entry, `None` unless positioned
    pub fn value(&self) -> Option<&[u8]> {
        self.current.as_ref().and_then(|block| block.value())
    }

    /// The current entry as an owned pair
    pub fn current(&self) -> Option<Kv> {
        self.current.as_ref().and_then(|block| block.current())
    }

    pub fn is_exhausted(&self) -> bool {
        self.done
    }

    fn finish(&mut self) {
        self.done = true;
        self.current = None;
    }
}

impl<S: BlockSource> Iterator for TabletIterator<'_, S> {
    type Item = Result<Kv>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.advance() {
            Ok(true) => self.current().map(Ok),
            Ok(false) => None,
            Err(e) => Some(Err(e)),
        }
    }
}
