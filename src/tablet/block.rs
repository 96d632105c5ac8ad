//! Raw Block Iterator
//!
//! Sequential decoding of the entries packed into one data block.

use std::cmp::Ordering;

use bytes::Bytes;

use crate::error::Result;

use super::codec::decode_entry;
use super::Kv;

/// Lifecycle of a cursor over entries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IterState {
    /// Constructed, nothing decoded yet
    Fresh,
    /// Sitting on a decoded entry
    Positioned,
    /// No more entries (or a decode error was reported); terminal
    Exhausted,
}

/// Cursor over the entries of a single raw block
///
/// Keys and values are handed out as slices of the block buffer, so a block
/// is decoded without copying entry bytes.
#[derive(Debug, Clone)]
pub struct RawBlockIterator {
    /// Block bytes (entries only)
    data: Bytes,
    /// Offset of the next undecoded entry
    offset: usize,
    /// Most recently decoded entry
    key: Bytes,
    value: Bytes,
    state: IterState,
}

impl RawBlockIterator {
    /// Create an iterator over a raw block
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self {
            data: data.into(),
            offset: 0,
            key: Bytes::new(),
            value: Bytes::new(),
            state: IterState::Fresh,
        }
    }

    /// Decode the next entry.
    ///
    /// Returns `Ok(false)` once the block is used up. A malformed entry is
    /// reported as an error and leaves the iterator exhausted.
    pub fn advance(&mut self) -> Result<bool> {
        if self.state == IterState::Exhausted {
            return Ok(false);
        }

        match decode_entry(&self.data, self.offset) {
            Ok(Some(entry)) => {
                self.key = self.data.slice(entry.key.clone());
                self.value = self.data.slice(entry.value.clone());
                self.offset = entry.next_offset();
                self.state = IterState::Positioned;
                Ok(true)
            }
            Ok(None) => {
                self.exhaust();
                Ok(false)
            }
            Err(e) => {
                self.exhaust();
                Err(e)
            }
        }
    }

    /// Scan forward to the first entry whose key is `>= target`.
    ///
    /// Returns whether that entry's key equals `target`. The current entry
    /// is not reconsidered; the scan starts with the next one. If no such
    /// entry remains the iterator ends up exhausted.
    pub fn find(&mut self, target: &[u8]) -> Result<bool> {
        while self.advance()? {
            match self.key.as_ref().cmp(target) {
                Ordering::Less => continue,
                Ordering::Equal => return Ok(true),
                Ordering::Greater => return Ok(false),
            }
        }
        Ok(false)
    }

    /// Key of the current entry, `None` unless positioned
    pub fn key(&self) -> Option<&[u8]> {
        self.is_positioned().then(|| self.key.as_ref())
    }

    /// Value of the current entry, `None` unless positioned
    pub fn value(&self) -> Option<&[u8]> {
        self.is_positioned().then(|| self.value.as_ref())
    }

    /// The current entry as an owned pair (cheap: shares the block buffer)
    pub fn current(&self) -> Option<Kv> {
        self.is_positioned().then(|| Kv {
            key: self.key.clone(),
            value: self.value.clone(),
        })
    }

    pub fn state(&self) -> IterState {
        self.state
    }

    pub fn is_exhausted(&self) -> bool {
        self.state == IterState::Exhausted
    }

    /// Encoded size of the underlying block
    pub fn block_len(&self) -> usize {
        self.data.len()
    }

    fn is_positioned(&self) -> bool {
        self.state == IterState::Positioned
    }

    fn exhaust(&mut self) {
        self.state = IterState::Exhausted;
        self.key = Bytes::new();
        self.value = Bytes::new();
    }
}

impl Iterator for RawBlockIterator {
    type Item = Result<Kv>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.advance() {
            Ok(true) => self.current().map(Ok),
            Ok(false) => None,
            Err(e) => Some(Err(e)),
        }
    }
}
