//! # tabletdb
//!
//! Sorted, block-structured, immutable on-disk key-value tablets:
//! - Streaming writer that cuts blocks by size and builds a sparse index
//! - Self-describing files validated by a trailer magic and index checksum
//! - Lazy full scans that read one block at a time
//! - Point lookups via index binary search plus a single block scan
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  Sorted (key, value) source                  │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                     TabletWriter                             │
//! │        BlockBuilder → blocks → index → trailer               │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │  (immutable file)
//!                       ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       Tablet                                 │
//! │        trailer → index ──┬── iter()  (block after block)     │
//! │                          └── find()  (binary search + scan)  │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!                       ▼
//!               ┌───────────────┐
//!               │RawBlockIterator│
//!               └───────────────┘
//! ```
//!
//! ## Example
//!
//! ```
//! use tabletdb::{write_tablet, Tablet, TabletOptions};
//!
//! let mut file = Vec::new();
//! let entries = [("bar", "baz"), ("foo", "bar")];
//! write_tablet(&mut file, entries, &TabletOptions::default())?;
//!
//! let tablet = Tablet::open(file)?;
//! let kv = tablet.find(b"foo")?.expect("foo was written");
//! assert_eq!(kv.value.as_ref(), b"bar");
//! # Ok::<(), tabletdb::TabletError>(())
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod error;

pub mod tablet;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use config::{TabletOptions, TabletOptionsBuilder};
pub use error::{Result, TabletError};
pub use tablet::{
    try_write_tablet, write_tablet, BlockBuilder, BlockSource, FileSource, IndexEntry, IterState,
    Kv, RawBlockIterator, Tablet, TabletIterator, TabletSummary, TabletWriter,
};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of tabletdb
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
