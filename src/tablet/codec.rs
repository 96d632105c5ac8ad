//! Entry codec
//!
//! Encoding and decoding of single key/value entries.
//!
//! ## Entry Format
//! ```text
//! ┌─────────────┬───────────┬───────────────┬─────────────┐
//! │ KeyHdr (1-5)│    Key    │ ValueHdr (1-5)│    Value    │
//! └─────────────┴───────────┴───────────────┴─────────────┘
//! ```
//!
//! ### Length Header
//! - `0xa0..=0xbf`: length 0-31 packed into the low five bits
//! - `0xda` + u16: length up to 65535
//! - `0xdb` + u32: length up to 4 GiB

use std::ops::Range;

use bytes::{Buf, BufMut};

use crate::error::{Result, TabletError};

/// Tag range for lengths that fit in five bits
pub const FIXRAW_MASK: u8 = 0xa0;

/// Largest length encodable in a single header byte
pub const FIXRAW_MAX: usize = 31;

/// Tag for a 16-bit length header
pub const RAW16: u8 = 0xda;

/// Tag for a 32-bit length header
pub const RAW32: u8 = 0xdb;

/// Tag for a 64-bit unsigned integer (used by the index and trailer)
pub const UINT64: u8 = 0xcf;

/// Size of a tagged u64: tag (1) + value (8)
pub const UINT64_SIZE: usize = 9;

// =============================================================================
// Length Headers
// =============================================================================

/// Number of bytes the length header for `len` occupies
pub fn header_len(len: usize) -> usize {
    if len <= FIXRAW_MAX {
        1
    } else if len <= u16::MAX as usize {
        3
    } else {
        5
    }
}

/// Write the raw-string header for a payload of `len` bytes
pub fn put_raw_header<B: BufMut>(buf: &mut B, len: usize) -> Result<()> {
    if len <= FIXRAW_MAX {
        buf.put_u8(FIXRAW_MASK | len as u8);
    } else if len <= u16::MAX as usize {
        buf.put_u8(RAW16);
        buf.put_u16(len as u16);
    } else if len <= u32::MAX as usize {
        buf.put_u8(RAW32);
        buf.put_u32(len as u32);
    } else {
        return Err(TabletError::EntryTooLarge { len });
    }
    Ok(())
}

/// Write a length-prefixed byte string
pub fn put_raw<B: BufMut>(buf: &mut B, data: &[u8]) -> Result<()> {
    put_raw_header(buf, data.len())?;
    buf.put_slice(data);
    Ok(())
}

/// Write a tagged u64
pub fn put_uint64<B: BufMut>(buf: &mut B, value: u64) {
    buf.put_u8(UINT64);
    buf.put_u64(value);
}

/// Read a raw-string length header from the front of `cur`.
///
/// `offset` is the position of `cur` inside the enclosing buffer and only
/// feeds error messages.
pub(crate) fn get_raw_header(cur: &mut &[u8], offset: usize) -> Result<usize> {
    if !cur.has_remaining() {
        return Err(TabletError::corruption(offset, "missing length header"));
    }
    let tag = cur.get_u8();
    match tag {
        t if t & 0xe0 == FIXRAW_MASK => Ok((t & 0x1f) as usize),
        RAW16 => {
            if cur.remaining() < 2 {
                return Err(TabletError::corruption(offset, "truncated 16-bit length"));
            }
            Ok(cur.get_u16() as usize)
        }
        RAW32 => {
            if cur.remaining() < 4 {
                return Err(TabletError::corruption(offset, "truncated 32-bit length"));
            }
            Ok(cur.get_u32() as usize)
        }
        other => Err(TabletError::corruption(
            offset,
            format!("unknown length tag {other:#04x}"),
        )),
    }
}

/// Read a tagged u64 from the front of `cur`
pub(crate) fn get_uint64(cur: &mut &[u8], offset: usize) -> Result<u64> {
    if cur.remaining() < UINT64_SIZE {
        return Err(TabletError::corruption(offset, "truncated u64"));
    }
    let tag = cur.get_u8();
    if tag != UINT64 {
        return Err(TabletError::corruption(
            offset,
            format!("expected u64 tag {UINT64:#04x}, found {tag:#04x}"),
        ));
    }
    Ok(cur.get_u64())
}

// =============================================================================
// Entry Encoding/Decoding
// =============================================================================

/// Encoded size of an entry with the given key and value lengths
pub fn encoded_len(key_len: usize, value_len: usize) -> usize {
    header_len(key_len) + key_len + header_len(value_len) + value_len
}

/// Append one encoded entry to `buf`, returning the bytes written
///
/// Nothing is written if either half is too large to encode.
pub fn encode_entry<B: BufMut>(key: &[u8], value: &[u8], buf: &mut B) -> Result<usize> {
    for len in [key.len(), value.len()] {
        if len > u32::MAX as usize {
            return Err(TabletError::EntryTooLarge { len });
        }
    }
    put_raw(buf, key)?;
    put_raw(buf, value)?;
    Ok(encoded_len(key.len(), value.len()))
}

/// Encode one entry into a fresh buffer
pub fn encode(key: &[u8], value: &[u8]) -> Result<Vec<u8>> {
    let mut buf = Vec::with_capacity(encoded_len(key.len(), value.len()));
    encode_entry(key, value, &mut buf)?;
    Ok(buf)
}

/// Location of a decoded entry inside the buffer it came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedEntry {
    /// Byte range of the key
    pub key: Range<usize>,
    /// Byte range of the value
    pub value: Range<usize>,
    /// Total bytes the entry occupied, headers included
    pub consumed: usize,
}

impl DecodedEntry {
    /// Offset of the entry that follows this one
    pub fn next_offset(&self) -> usize {
        self.value.end
    }
}

/// Decode the entry starting at `offset`.
///
/// Returns `Ok(None)` when `offset` is exactly the end of `buf` (a clean end
/// of block). Anything else that fails to parse is a
/// [`TabletError::Corruption`].
pub fn decode_entry(buf: &[u8], offset: usize) -> Result<Option<DecodedEntry>> {
    if offset == buf.len() {
        return Ok(None);
    }
    if offset > buf.len() {
        return Err(TabletError::corruption(offset, "offset past end of block"));
    }

    let key = read_raw(buf, offset)?;
    let value = read_raw(buf, key.end)?;

    Ok(Some(DecodedEntry {
        consumed: value.end - offset,
        key,
        value,
    }))
}

/// Parse one raw string at `offset`, returning the payload's byte range
fn read_raw(buf: &[u8], offset: usize) -> Result<Range<usize>> {
    let mut cur = &buf[offset..];
    let len = get_raw_header(&mut cur, offset)?;
    let start = buf.len() - cur.remaining();
    if len > cur.remaining() {
        return Err(TabletError::corruption(
            offset,
            format!("length {len} runs past end of block ({} left)", cur.remaining()),
        ));
    }
    Ok(start..start + len)
}
