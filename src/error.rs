//! Error types for tabletdb
//!
//! Provides a unified error type for all tablet operations.

use thiserror::Error;

/// Result type alias using TabletError
pub type Result<T> = std::result::Result<T, TabletError>;

/// Unified error type for tablet operations
#[derive(Debug, Error)]
pub enum TabletError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Block Errors
    // -------------------------------------------------------------------------
    #[error("Corrupt entry at block offset {offset}: {reason}")]
    Corruption { offset: usize, reason: String },

    #[error("Entry component of {len} bytes exceeds the encodable maximum")]
    EntryTooLarge { len: usize },

    // -------------------------------------------------------------------------
    // Format Errors
    // -------------------------------------------------------------------------
    #[error("File of {size} bytes is too small to hold a tablet trailer")]
    Truncated { size: u64 },

    #[error("Not a tablet: expected magic {expected:#010x}, found {found:#010x}")]
    BadMagic { expected: u32, found: u32 },

    #[error("Invalid trailer: {0}")]
    InvalidTrailer(String),

    #[error("Invalid index: {0}")]
    InvalidIndex(String),

    #[error("Index checksum mismatch: expected {expected:#010x}, got {actual:#010x}")]
    ChecksumMismatch { expected: u32, actual: u32 },

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl TabletError {
    /// True for errors that mean the file is not a usable tablet.
    ///
    /// These are raised by [`Tablet::open`](crate::tablet::Tablet::open) and
    /// retrying against the same bytes will fail the same way.
    pub fn is_format_error(&self) -> bool {
        matches!(
            self,
            TabletError::Truncated { .. }
                | TabletError::BadMagic { .. }
                | TabletError::InvalidTrailer(_)
                | TabletError::InvalidIndex(_)
                | TabletError::ChecksumMismatch { .. }
        )
    }

    /// True when the failure came from the underlying storage handle.
    pub fn is_io(&self) -> bool {
        matches!(self, TabletError::Io(_))
    }

    pub(crate) fn corruption(offset: usize, reason: impl Into<String>) -> Self {
        TabletError::Corruption {
            offset,
            reason: reason.into(),
        }
    }
}
