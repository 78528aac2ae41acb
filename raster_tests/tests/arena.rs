// Copyright 2025 the Raster Core Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Checkpoint and lifetime behavior of the arena under realistic usage.

#![allow(clippy::missing_assert_message)]

use raster_core::{Arena, ArenaConfig, ArenaError, ChunkSize, Span};
use raster_tests::Lcg;

#[test]
fn allocations_are_increasing_and_aligned() {
    let mut arena = Arena::with_chunk_size(4096);
    let mut rng = Lcg::new(3);
    let mut spans: Vec<Span> = Vec::new();
    for _ in 0..1_000 {
        let size = rng.next_usize() % 200;
        let align = 1 << (rng.next_usize() % 4);
        let span = arena.allocate_aligned(size, align).unwrap();
        assert_eq!(span.offset() % align, 0);
        if let Some(prev) = spans.last() {
            assert!(prev.precedes(&span), "{prev:?} overlaps {span:?}");
        }
        spans.push(span);
    }
    assert!(arena.chunk_count() > 1);
}

#[test]
fn revert_reuses_first_address() {
    let mut arena = Arena::with_chunk_size(512);
    arena.allocate(40).unwrap();
    let record = arena.record();
    let first = arena.allocate(24).unwrap();
    for _ in 0..100 {
        arena.allocate(48).unwrap();
    }
    arena.revert(&record, true).unwrap();
    assert_eq!(arena.allocate(24).unwrap(), first);

    // The kept record rewinds again.
    arena.revert(&record, false).unwrap();
    assert_eq!(arena.allocate(24).unwrap(), first);
    assert_eq!(arena.revert(&record, false), Err(ArenaError::StaleRecord));
}

#[test]
fn nested_clip_states() {
    // Mirrors how clip spans are saved and restored: a stack of states, each
    // allocating spans, restored innermost first.
    let mut arena = Arena::with_chunk_size(256);
    let mut rng = Lcg::new(42);
    let mut stack = Vec::new();
    for _ in 0..10_000 {
        if rng.next_usize() % 3 == 0 && !stack.is_empty() {
            let (record, used) = stack.pop().unwrap();
            arena.revert(&record, false).unwrap();
            assert_eq!(arena.used_bytes(), used);
        } else if rng.next_usize() % 4 == 0 {
            stack.push((arena.record(), arena.used_bytes()));
        } else {
            let span = arena.allocate(rng.next_usize() % 64).unwrap();
            arena[span].fill(0xab);
        }
    }
}

#[test]
fn reverting_an_outer_record_invalidates_inner_ones() {
    let mut arena = Arena::default();
    let outer = arena.record();
    arena.allocate(8).unwrap();
    let inner = arena.record();
    arena.revert(&outer, true).unwrap();
    assert_eq!(arena.revert(&inner, false), Err(ArenaError::StaleRecord));
    assert_eq!(arena.revert(&outer, false), Ok(()));
}

#[test]
fn reuse_and_reset() {
    let mut arena = Arena::with_chunk_size(128);
    let first = arena.allocate(100).unwrap();
    for _ in 0..9 {
        arena.allocate(100).unwrap();
    }
    let reserved = arena.reserved_bytes();
    assert_eq!(arena.chunk_count(), 10);

    arena.reuse();
    assert_eq!(arena.reserved_bytes(), reserved);
    assert_eq!(arena.used_bytes(), 0);
    assert!(arena.get(first).is_none());
    let again = arena.allocate(100).unwrap();
    assert_eq!((again.chunk(), again.offset()), (first.chunk(), first.offset()));
    // Refilling the retained chunks does not grow the arena.
    for _ in 0..9 {
        arena.allocate(100).unwrap();
    }
    assert_eq!(arena.chunk_count(), 10);

    arena.reset();
    assert_eq!(arena.reserved_bytes(), 0);
    let fresh = arena.allocate(100).unwrap();
    let mut new_arena = Arena::with_chunk_size(128);
    let expected = new_arena.allocate(100).unwrap();
    assert_eq!((fresh.chunk(), fresh.offset()), (expected.chunk(), expected.offset()));
    assert_eq!(arena.chunk_count(), 1);
}

#[test]
fn release_on_revert_policy() {
    let config = ArenaConfig::from_chunk_size(ChunkSize::<[f32; 4]>::new(4));
    assert_eq!(config.chunk_size, 64);

    for release in [false, true] {
        let mut arena = Arena::new(config.with_release_on_revert(release));
        arena.alloc_slice::<[f32; 4]>(2).unwrap();
        let record = arena.record();
        for _ in 0..8 {
            arena.alloc_slice::<[f32; 4]>(3).unwrap();
        }
        assert_eq!(arena.chunk_count(), 9);
        arena.revert(&record, false).unwrap();
        assert_eq!(arena.chunk_count(), if release { 1 } else { 9 });
        assert_eq!(arena.used_bytes(), 32);
    }
}

#[test]
fn typed_spans() {
    let mut arena = Arena::default();
    let span = arena.alloc_slice::<u32>(16).unwrap();
    let values = arena.slice_mut::<u32>(span).unwrap();
    for (i, v) in values.iter_mut().enumerate() {
        *v = i as u32 * 3;
    }
    assert_eq!(arena.slice::<u32>(span).unwrap()[5], 15);
    assert_eq!(arena[span].len(), 64);
    // Not a whole number of `u64`s.
    let odd = arena.alloc_slice::<u32>(3).unwrap();
    assert!(arena.slice::<u64>(odd).is_none());
}

#[test]
#[should_panic(expected = "does not fit")]
fn oversized_allocation_panics() {
    let mut arena = Arena::with_chunk_size(64);
    let _ = arena.allocate(64);
}

#[test]
#[should_panic(expected = "does not fit")]
fn overflowing_slice_length_panics() {
    let mut arena = Arena::with_chunk_size(64);
    let _ = arena.alloc_slice::<u64>(usize::MAX / 8 + 2);
}

#[test]
fn chunk_allocation_failure_is_an_error() {
    let mut arena = Arena::new(ArenaConfig::new(usize::MAX / 2));
    assert!(matches!(
        arena.allocate(16),
        Err(ArenaError::OutOfMemory { .. })
    ));
    assert_eq!(arena.reserved_bytes(), 0);
    // Records still work on an arena that never got a chunk.
    let record = arena.record();
    assert_eq!(arena.revert(&record, false), Ok(()));
}
