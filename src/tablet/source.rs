//! Block Source
//!
//! Random-access read side of the storage handle a tablet is opened on.

use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::sync::Arc;

use bytes::Bytes;
use parking_lot::Mutex;

/// File handle shared by every reader of one opened tablet
pub type FileSource = Mutex<File>;

/// Positioned reads over immutable tablet bytes
///
/// Reads take `&self`: a tablet never changes after it is written, so any
/// number of readers may share one source.
pub trait BlockSource {
    /// Total size of the underlying tablet in bytes
    fn size(&self) -> io::Result<u64>;

    /// Read exactly `len` bytes starting at `offset`
    fn read_at(&self, offset: u64, len: usize) -> io::Result<Bytes>;
}

impl BlockSource for Bytes {
    fn size(&self) -> io::Result<u64> {
        Ok(self.len() as u64)
    }

    fn read_at(&self, offset: u64, len: usize) -> io::Result<Bytes> {
        let start = checked_range(self.len(), offset, len)?;
        Ok(self.slice(start..start + len))
    }
}

impl BlockSource for Vec<u8> {
    fn size(&self) -> io::Result<u64> {
        Ok(self.len() as u64)
    }

    fn read_at(&self, offset: u64, len: usize) -> io::Result<Bytes> {
        let start = checked_range(self.len(), offset, len)?;
        Ok(Bytes::copy_from_slice(&self[start..start + len]))
    }
}

/// Any seekable reader becomes a source once it sits behind a lock; the
/// seek and the read happen under one guard.
impl<R: Read + Seek> BlockSource for Mutex<R> {
    fn size(&self) -> io::Result<u64> {
        let mut inner = self.lock();
        inner.seek(SeekFrom::End(0))
    }

    fn read_at(&self, offset: u64, len: usize) -> io::Result<Bytes> {
        let mut inner = self.lock();
        inner.seek(SeekFrom::Start(offset))?;
        let mut buf = vec![0u8; len];
        inner.read_exact(&mut buf)?;
        Ok(Bytes::from(buf))
    }
}

impl<T: BlockSource + ?Sized> BlockSource for &T {
    fn size(&self) -> io::Result<u64> {
        (**self).size()
    }

    fn read_at(&self, offset: u64, len: usize) -> io::Result<Bytes> {
        (**self).read_at(offset, len)
    }
}

impl<T: BlockSource + ?Sized> BlockSource for Arc<T> {
    fn size(&self) -> io::Result<u64> {
        (**self).size()
    }

    fn read_at(&self, offset: u64, len: usize) -> io::Result<Bytes> {
        (**self).read_at(offset, len)
    }
}

fn checked_range(size: usize, offset: u64, len: usize) -> io::Result<usize> {
    let start = usize::try_from(offset).ok();
    match start {
        Some(start) if start.checked_add(len).is_some_and(|end| end <= size) => Ok(start),
        _ => Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            format!("read of {len} bytes at offset {offset} past end of {size}-byte source"),
        )),
    }
}
