//! Trailer and index region encoding
//!
//! The trailer is the fixed-size tail that tells a reader where the index
//! lives; the index is the list of block extents it points to.

use bytes::{Buf, BufMut, Bytes};

use crate::error::{Result, TabletError};

use super::codec::{get_raw_header, get_uint64, put_raw, put_uint64, UINT64_SIZE};
use super::{IndexEntry, INDEX_MAGIC, TABLET_MAGIC, TRAILER_SIZE};

// =============================================================================
// Trailer
// =============================================================================

/// Decoded trailer: location and checksum of the index region
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Trailer {
    /// Byte offset of the index region
    pub index_offset: u64,
    /// Byte length of the index region
    pub index_length: u64,
    /// CRC32 of the index region
    pub index_crc: u32,
}

impl Trailer {
    /// Serialize to the fixed trailer layout
    pub fn encode(&self) -> [u8; TRAILER_SIZE as usize] {
        let mut out = [0u8; TRAILER_SIZE as usize];
        let mut buf = &mut out[..];
        put_uint64(&mut buf, self.index_offset);
        put_uint64(&mut buf, self.index_length);
        buf.put_u32(self.index_crc);
        buf.put_u32(TABLET_MAGIC);
        out
    }

    /// Parse the last [`TRAILER_SIZE`] bytes of a tablet.
    ///
    /// The magic is checked before anything else so that a file which is
    /// not a tablet at all reports [`TabletError::BadMagic`].
    pub fn decode(buf: &[u8]) -> Result<Self> {
        if buf.len() != TRAILER_SIZE as usize {
            return Err(TabletError::InvalidTrailer(format!(
                "expected {} bytes, got {}",
                TRAILER_SIZE,
                buf.len()
            )));
        }

        let mut magic = &buf[buf.len() - 4..];
        let found = magic.get_u32();
        if found != TABLET_MAGIC {
            return Err(TabletError::BadMagic {
                expected: TABLET_MAGIC,
                found,
            });
        }

        let mut cur = buf;
        let index_offset = get_uint64(&mut cur, 0).map_err(invalid_trailer)?;
        let index_length = get_uint64(&mut cur, UINT64_SIZE).map_err(invalid_trailer)?;
        let index_crc = cur.get_u32();

        Ok(Self {
            index_offset,
            index_length,
            index_crc,
        })
    }
}

fn invalid_trailer(err: TabletError) -> TabletError {
    TabletError::InvalidTrailer(err.to_string())
}

fn invalid_index(err: TabletError) -> TabletError {
    TabletError::InvalidIndex(err.to_string())
}

// =============================================================================
// Index Region
// =============================================================================

/// Serialize the index: magic followed by one record per block
pub(crate) fn encode_index(entries: &[IndexEntry]) -> Result<Vec<u8>> {
    let mut buf = Vec::with_capacity(4 + entries.len() * 32);
    buf.put_u32(INDEX_MAGIC);
    for entry in entries {
        put_raw(&mut buf, &entry.first_key)?;
        put_uint64(&mut buf, entry.offset);
        put_uint64(&mut buf, entry.length);
    }
    Ok(buf)
}

/// Parse an index region read back from storage
pub(crate) fn decode_index(data: &Bytes) -> Result<Vec<IndexEntry>> {
    if data.len() < 4 {
        return Err(TabletError::InvalidIndex(format!(
            "region of {} bytes cannot hold the index magic",
            data.len()
        )));
    }

    let mut cur = &data[..];
    let magic = cur.get_u32();
    if magic != INDEX_MAGIC {
        return Err(TabletError::InvalidIndex(format!(
            "expected magic {INDEX_MAGIC:#010x}, found {magic:#010x}"
        )));
    }

    let mut entries = Vec::new();
    while cur.has_remaining() {
        let pos = data.len() - cur.remaining();
        let key_len = get_raw_header(&mut cur, pos).map_err(invalid_index)?;
        if key_len > cur.remaining() {
            return Err(TabletError::InvalidIndex(format!(
                "record at {pos}: key of {key_len} bytes runs past end of index"
            )));
        }
        let key_start = data.len() - cur.remaining();
        let first_key = data.slice(key_start..key_start + key_len);
        cur.advance(key_len);

        let offset = get_uint64(&mut cur, pos).map_err(invalid_index)?;
        let length = get_uint64(&mut cur, pos).map_err(invalid_index)?;

        entries.push(IndexEntry {
            first_key,
            offset,
            length,
        });
    }

    Ok(entries)
}
