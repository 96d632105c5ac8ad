//! Tests for raw blocks
//!
//! These tests verify:
//! - RawBlockIterator over hand-crafted block bytes
//! - Empty blocks terminate immediately
//! - Forward-only find semantics
//! - Corrupt entries surface as errors, not as end-of-block
//! - BlockBuilder flush rule and reset

use tabletdb::{BlockBuilder, IterState, Kv, RawBlockIterator, TabletError};

// =============================================================================
// Helper Functions
// =============================================================================

/// bar -> baz, foo -> bar
fn simple_block() -> Vec<u8> {
    vec![
        0xa3, b'b', b'a', b'r', 0xa3, b'b', b'a', b'z', //
        0xa3, b'f', b'o', b'o', 0xa3, b'b', b'a', b'r',
    ]
}

fn assert_positioned(iter: &RawBlockIterator, key: &[u8], value: &[u8]) {
    assert_eq!(iter.state(), IterState::Positioned);
    assert_eq!(iter.key(), Some(key));
    assert_eq!(iter.value(), Some(value));
}

// =============================================================================
// RawBlockIterator Tests
// =============================================================================

#[test]
fn test_raw_block_iterator() {
    let mut iter = RawBlockIterator::new(simple_block());
    assert_eq!(iter.state(), IterState::Fresh);
    assert_eq!(iter.key(), None);

    assert!(iter.advance().unwrap());
    assert_positioned(&iter, b"bar", b"baz");

    assert!(iter.advance().unwrap());
    assert_positioned(&iter, b"foo", b"bar");

    assert!(!iter.advance().unwrap());
    assert_eq!(iter.state(), IterState::Exhausted);
    assert_eq!(iter.key(), None);
    assert_eq!(iter.value(), None);
}

#[test]
fn test_empty_raw_block_iterator() {
    let mut iter = RawBlockIterator::new(Vec::new());
    assert!(!iter.advance().unwrap());
    assert!(iter.is_exhausted());
}

#[test]
fn test_exhausted_is_terminal() {
    let mut iter = RawBlockIterator::new(simple_block());
    while iter.advance().unwrap() {}

    for _ in 0..3 {
        assert!(!iter.advance().unwrap());
    }
    assert!(!iter.find(b"bar").unwrap());
    assert!(iter.is_exhausted());
}

#[test]
fn test_raw_block_as_iterator() {
    let entries: Vec<Kv> = RawBlockIterator::new(simple_block())
        .map(|r| r.unwrap())
        .collect();

    assert_eq!(
        entries,
        vec![Kv::new("bar", "baz"), Kv::new("foo", "bar")]
    );
}

// =============================================================================
// Find Tests
// =============================================================================

#[test]
fn test_raw_block_find() {
    let mut iter = RawBlockIterator::new(simple_block());
    assert!(iter.find(b"foo").unwrap());
    assert_positioned(&iter, b"foo", b"bar");

    // Nothing after foo
    assert!(!iter.advance().unwrap());
}

#[test]
fn test_raw_block_find_first_key() {
    let mut iter = RawBlockIterator::new(simple_block());
    assert!(iter.find(b"bar").unwrap());
    assert_positioned(&iter, b"bar", b"baz");

    // Next continues after the match
    assert!(iter.advance().unwrap());
    assert_positioned(&iter, b"foo", b"bar");
}

#[test]
fn test_raw_block_find_missing_past_end() {
    let mut iter = RawBlockIterator::new(simple_block());
    assert!(!iter.find(b"qux").unwrap());
    assert!(iter.is_exhausted());
}

#[test]
fn test_raw_block_find_missing_between_keys() {
    let mut iter = RawBlockIterator::new(simple_block());

    // Stops on the first key greater than the target
    assert!(!iter.find(b"cat").unwrap());
    assert_positioned(&iter, b"foo", b"bar");
}

#[test]
fn test_raw_block_find_is_forward_only() {
    let mut iter = RawBlockIterator::new(simple_block());
    assert!(iter.find(b"foo").unwrap());

    // bar is behind the cursor now
    assert!(!iter.find(b"bar").unwrap());
    assert!(iter.is_exhausted());
}

#[test]
fn test_raw_block_find_on_empty_block() {
    let mut iter = RawBlockIterator::new(Vec::new());
    assert!(!iter.find(b"anything").unwrap());
    assert!(iter.is_exhausted());
}

// =============================================================================
// Corruption Tests
// =============================================================================

#[test]
fn test_corrupt_entry_is_an_error() {
    let mut block = simple_block();
    // Claim a 5-byte value where only 3 bytes remain
    block[12] = 0xa5;

    let mut iter = RawBlockIterator::new(block);
    assert!(iter.advance().unwrap());

    let result = iter.advance();
    assert!(matches!(result, Err(TabletError::Corruption { offset: 12, .. })));

    // The error ends the iteration
    assert!(iter.is_exhausted());
    assert!(!iter.advance().unwrap());
}

#[test]
fn test_corrupt_entry_during_find() {
    let mut block = simple_block();
    block.push(0xc1);

    let mut iter = RawBlockIterator::new(block);
    assert!(iter.find(b"zzz").is_err());
}

#[test]
fn test_iterator_yields_error_once() {
    let mut block = simple_block();
    block.truncate(14);

    let results: Vec<_> = RawBlockIterator::new(block).collect();
    assert_eq!(results.len(), 2);
    assert!(results[0].is_ok());
    assert!(results[1].is_err());
}

// =============================================================================
// BlockBuilder Tests
// =============================================================================

#[test]
fn test_builder_produces_codec_bytes() {
    let mut builder = BlockBuilder::new(4096);
    builder.add(b"bar", b"baz").unwrap();
    builder.add(b"foo", b"bar").unwrap();

    assert_eq!(builder.entry_count(), 2);
    assert_eq!(builder.len(), 16);
    assert_eq!(builder.first_key(), Some(&b"bar"[..]));
    assert!(!builder.should_flush());

    let block = builder.finalize().unwrap();
    assert_eq!(block.data.as_ref(), simple_block().as_slice());
    assert_eq!(block.first_key.as_ref(), b"bar");
    assert_eq!(block.entry_count, 2);
}

#[test]
fn test_builder_flushes_after_crossing_budget() {
    let mut builder = BlockBuilder::new(10);
    builder.add(b"bar", b"baz").unwrap(); // 8 bytes
    assert!(!builder.should_flush());

    builder.add(b"foo", b"bar").unwrap(); // 16 bytes
    assert!(builder.should_flush());
    assert_eq!(builder.entry_count(), 2);
}

#[test]
fn test_builder_block_size_one_flushes_every_entry() {
    let mut builder = BlockBuilder::new(1);
    assert!(!builder.should_flush());

    builder.add(b"", b"").unwrap();
    assert!(builder.should_flush());
}

#[test]
fn test_builder_accepts_oversized_entry() {
    let mut builder = BlockBuilder::new(16);
    let big = vec![7u8; 1000];
    builder.add(b"big", &big).unwrap();

    assert!(builder.should_flush());
    let block = builder.finalize().unwrap();
    assert_eq!(block.entry_count, 1);
    assert!(block.data.len() > 1000);
}

#[test]
fn test_builder_finalize_resets() {
    let mut builder = BlockBuilder::new(4096);
    assert!(builder.finalize().is_none());

    builder.add(b"a", b"1").unwrap();
    let first = builder.finalize().unwrap();
    assert!(builder.is_empty());
    assert_eq!(builder.len(), 0);
    assert_eq!(builder.first_key(), None);

    builder.add(b"b", b"2").unwrap();
    let second = builder.finalize().unwrap();

    assert_eq!(first.first_key.as_ref(), b"a");
    assert_eq!(second.first_key.as_ref(), b"b");
    assert_eq!(second.data.as_ref(), &[0xa1, b'b', 0xa1, b'2']);

    // The first block's bytes are unaffected by later adds
    assert_eq!(first.data.as_ref(), &[0xa1, b'a', 0xa1, b'1']);
}

#[test]
fn test_builder_round_trips_through_iterator() {
    let mut builder = BlockBuilder::new(4096);
    let pairs: Vec<(String, String)> = (0..50)
        .map(|i| (format!("key{:03}", i), "v".repeat(i)))
        .collect();
    for (k, v) in &pairs {
        builder.add(k.as_bytes(), v.as_bytes()).unwrap();
    }

    let block = builder.finalize().unwrap();
    let decoded: Vec<Kv> = RawBlockIterator::new(block.data)
        .map(|r| r.unwrap())
        .collect();

    assert_eq!(decoded.len(), pairs.len());
    for (kv, (k, v)) in decoded.iter().zip(&pairs) {
        assert_eq!(kv.key.as_ref(), k.as_bytes());
        assert_eq!(kv.value.as_ref(), v.as_bytes());
    }
}
