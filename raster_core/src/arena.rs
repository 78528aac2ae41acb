// Copyright 2025 the Raster Core Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A bump allocator for short-lived memory that is released in one step.
//!
//! Objects served by an [`Arena`] share a single lifetime: they stay valid until the
//! arena is [reused](Arena::reuse), [reset](Arena::reset) or dropped. A [`Record`]
//! marks the current position so that everything allocated after it can be dropped
//! again with [`Arena::revert`]. The clip-span engine uses this to throw away the
//! spans of a clip state once it has been restored.
//!
//! Memory is handed out as [`Span`] handles (chunk index and byte range) rather than
//! pointers, so rewinding never leaves anything dangling: a span that outlived its
//! memory simply resolves to bytes that may since have been overwritten.
//!
//! The arena is not thread-safe in the sense that every operation takes `&mut self`.
//! Give each worker its own instance.

use core::fmt;
use core::ops::{Index, IndexMut};

use bytemuck::Pod;
use log::{debug, trace, warn};
use thiserror::Error;

use crate::config::{align_up, ArenaConfig, MAX_ALIGN};

/// Errors reported by [`Arena`].
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArenaError {
    /// The underlying allocator could not provide a new chunk.
    #[error("Failed to allocate an arena chunk of {chunk_size} bytes")]
    OutOfMemory {
        /// Size of the chunk that was requested.
        chunk_size: usize,
    },
    /// The record was invalidated by reverting to an older record, or by
    /// [`Arena::reuse`] or [`Arena::reset`].
    #[error("Arena record is no longer valid")]
    StaleRecord,
}

/// A region of memory handed out by an [`Arena`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Span {
    chunk: usize,
    offset: usize,
    len: usize,
    generation: u32,
}

impl Span {
    /// Index of the chunk the span lives in.
    pub fn chunk(&self) -> usize {
        self.chunk
    }

    /// Byte offset from the start of the chunk.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Length in bytes.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the span covers no bytes.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns `true` if `self` ends at or before the start of `other` in allocation order.
    pub fn precedes(&self, other: &Self) -> bool {
        (self.chunk, self.offset + self.len) <= (other.chunk, other.offset)
    }
}

/// A checkpoint created by [`Arena::record`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Record {
    depth: usize,
    generation: u32,
}

#[derive(Copy, Clone, Debug)]
struct Checkpoint {
    chunk: usize,
    pos: usize,
}

struct Chunk {
    // `u64` storage makes every multiple of `MAX_ALIGN` an aligned address.
    data: Vec<u64>,
    pos: usize,
}

impl Chunk {
    fn capacity(&self) -> usize {
        self.data.len() * MAX_ALIGN
    }

    fn bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.data)
    }

    fn bytes_mut(&mut self) -> &mut [u8] {
        bytemuck::cast_slice_mut(&mut self.data)
    }
}

/// Bump allocator over a list of fixed-size chunks.
pub struct Arena {
    config: ArenaConfig,
    chunks: Vec<Chunk>,
    current: usize,
    records: Vec<Checkpoint>,
    generation: u32,
}

static_assertions::assert_impl_all!(Arena: Send);

impl Default for Arena {
    fn default() -> Self {
        Self::new(ArenaConfig::default())
    }
}

impl fmt::Debug for Arena {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Arena")
            .field("config", &self.config)
            .field("chunks", &self.chunks.len())
            .field("current", &self.current)
            .field("records", &self.records.len())
            .field("generation", &self.generation)
            .finish_non_exhaustive()
    }
}

impl Arena {
    /// Creates an empty arena. No memory is reserved until the first allocation.
    pub fn new(config: ArenaConfig) -> Self {
        Self {
            config,
            chunks: Vec::new(),
            current: 0,
            records: Vec::new(),
            generation: 0,
        }
    }

    /// Creates an empty arena with the given chunk size in bytes.
    pub fn with_chunk_size(chunk_size: usize) -> Self {
        Self::new(ArenaConfig::new(chunk_size))
    }

    /// The configuration this arena was created with.
    pub fn config(&self) -> &ArenaConfig {
        &self.config
    }

    /// Allocates `size` bytes aligned to [`MAX_ALIGN`].
    ///
    /// # Panics
    ///
    /// If `size` is not strictly smaller than the chunk size. The arena is meant for
    /// many small objects; larger requests are a bug at the call site.
    #[inline]
    pub fn allocate(&mut self, size: usize) -> Result<Span, ArenaError> {
        self.allocate_aligned(size, MAX_ALIGN)
    }

    /// Allocates `size` bytes aligned to `align`.
    ///
    /// # Panics
    ///
    /// If `size` is not strictly smaller than the chunk size, or if `align` is not a
    /// power of two no larger than [`MAX_ALIGN`].
    #[inline]
    pub fn allocate_aligned(&mut self, size: usize, align: usize) -> Result<Span, ArenaError> {
        assert!(
            size < self.config.chunk_size,
            "arena allocation of {size} bytes does not fit a {} byte chunk",
            self.config.chunk_size
        );
        assert!(
            align.is_power_of_two() && align <= MAX_ALIGN,
            "unsupported arena alignment {align}"
        );

        if let Some(chunk) = self.chunks.get_mut(self.current) {
            let offset = align_up(chunk.pos, align);
            if offset + size <= chunk.capacity() {
                chunk.pos = offset + size;
                return Ok(Span {
                    chunk: self.current,
                    offset,
                    len: size,
                    generation: self.generation,
                });
            }
        }
        self.allocate_slow(size)
    }

    /// Moves to the next chunk, creating it if needed, and bumps from its start.
    #[cold]
    fn allocate_slow(&mut self, size: usize) -> Result<Span, ArenaError> {
        let next = if self.chunks.is_empty() {
            0
        } else {
            self.current + 1
        };

        if next == self.chunks.len() {
            let chunk = self.new_chunk()?;
            self.chunks.push(chunk);
            debug!(
                "arena grew to {} chunks ({} bytes reserved)",
                self.chunks.len(),
                self.reserved_bytes()
            );
        }

        self.current = next;
        let chunk = &mut self.chunks[next];
        chunk.pos = size;
        Ok(Span {
            chunk: next,
            offset: 0,
            len: size,
            generation: self.generation,
        })
    }

    fn new_chunk(&self) -> Result<Chunk, ArenaError> {
        let words = self.config.chunk_words();
        let mut data = Vec::new();
        if data.try_reserve_exact(words).is_err() {
            warn!(
                "failed to allocate an arena chunk of {} bytes",
                self.config.chunk_size
            );
            return Err(ArenaError::OutOfMemory {
                chunk_size: self.config.chunk_size,
            });
        }
        data.resize(words, 0);
        Ok(Chunk { data, pos: 0 })
    }

    /// Allocates room for `len` values of `T`, suitably aligned.
    ///
    /// # Panics
    ///
    /// Under the same conditions as [`Arena::allocate_aligned`], including when the
    /// byte size of `len` values overflows `usize`.
    pub fn alloc_slice<T: Pod>(&mut self, len: usize) -> Result<Span, ArenaError> {
        let Some(size) = len.checked_mul(size_of::<T>()) else {
            panic!(
                "arena allocation of {len} values of {} bytes does not fit a {} byte chunk",
                size_of::<T>(),
                self.config.chunk_size
            );
        };
        self.allocate_aligned(size, align_of::<T>())
    }

    /// Records the current allocation position.
    ///
    /// Every call pushes a new entry onto the record stack, which only shrinks again
    /// on [`Arena::revert`], [`Arena::reuse`] or [`Arena::reset`]. A caller that
    /// records on every frame without ever reverting grows the stack without bound.
    pub fn record(&mut self) -> Record {
        let pos = self.chunks.get(self.current).map_or(0, |chunk| chunk.pos);
        self.records.push(Checkpoint {
            chunk: self.current,
            pos,
        });
        trace!(
            "arena record {} at chunk {} offset {pos}",
            self.records.len() - 1,
            self.current
        );
        Record {
            depth: self.records.len() - 1,
            generation: self.generation,
        }
    }

    /// Reverts to the position saved by `record`, dropping everything allocated since.
    ///
    /// Records nest like a stack: reverting to a record also invalidates every record
    /// taken after it. The record itself is consumed unless `keep_record` is set, in
    /// which case it can be reverted to again later.
    pub fn revert(&mut self, record: &Record, keep_record: bool) -> Result<(), ArenaError> {
        if record.generation != self.generation || record.depth >= self.records.len() {
            return Err(ArenaError::StaleRecord);
        }

        let checkpoint = self.records[record.depth];
        self.records.truncate(record.depth + usize::from(keep_record));

        if self.config.release_on_revert && self.chunks.len() > checkpoint.chunk + 1 {
            let released = self.chunks.len() - checkpoint.chunk - 1;
            self.chunks.truncate(checkpoint.chunk + 1);
            debug!("arena released {released} chunks on revert");
        }

        self.current = checkpoint.chunk;
        if let Some(chunk) = self.chunks.get_mut(checkpoint.chunk) {
            chunk.pos = checkpoint.pos;
        }
        trace!(
            "arena reverted to chunk {} offset {}",
            checkpoint.chunk,
            checkpoint.pos
        );
        Ok(())
    }

    /// Invalidates all allocations but keeps the chunks for the next task.
    pub fn reuse(&mut self) {
        for chunk in &mut self.chunks {
            chunk.pos = 0;
        }
        self.current = 0;
        self.records.clear();
        self.generation = self.generation.wrapping_add(1);
    }

    /// Invalidates all allocations and frees every chunk.
    pub fn reset(&mut self) {
        if !self.chunks.is_empty() {
            debug!("arena released {} chunks on reset", self.chunks.len());
        }
        self.chunks = Vec::new();
        self.current = 0;
        self.records.clear();
        self.generation = self.generation.wrapping_add(1);
    }

    /// Number of chunks currently owned by the arena.
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Total bytes reserved from the underlying allocator.
    pub fn reserved_bytes(&self) -> usize {
        self.chunks.len() * self.config.chunk_size
    }

    /// Bytes handed out (including alignment padding) since the last reuse or reset.
    ///
    /// Space left unused at the end of a chunk is not counted.
    pub fn used_bytes(&self) -> usize {
        self.chunks
            .iter()
            .take(self.current + 1)
            .map(|chunk| chunk.pos)
            .sum()
    }

    /// Returns the bytes of `span`, or `None` if it was invalidated by a reuse or reset.
    pub fn get(&self, span: Span) -> Option<&[u8]> {
        if span.generation != self.generation {
            return None;
        }
        let chunk = self.chunks.get(span.chunk)?;
        chunk.bytes().get(span.offset..span.offset + span.len)
    }

    /// Mutable variant of [`Arena::get`].
    pub fn get_mut(&mut self, span: Span) -> Option<&mut [u8]> {
        if span.generation != self.generation {
            return None;
        }
        let chunk = self.chunks.get_mut(span.chunk)?;
        chunk.bytes_mut().get_mut(span.offset..span.offset + span.len)
    }

    /// Views `span` as a slice of `T`.
    ///
    /// Returns `None` if the span is stale or its size or alignment does not fit `T`.
    pub fn slice<T: Pod>(&self, span: Span) -> Option<&[T]> {
        bytemuck::try_cast_slice(self.get(span)?).ok()
    }

    /// Mutable variant of [`Arena::slice`].
    pub fn slice_mut<T: Pod>(&mut self, span: Span) -> Option<&mut [T]> {
        bytemuck::try_cast_slice_mut(self.get_mut(span)?).ok()
    }
}

impl Index<Span> for Arena {
    type Output = [u8];

    fn index(&self, span: Span) -> &[u8] {
        match self.get(span) {
            Some(bytes) => bytes,
            None => panic!("span {span:?} is not valid in this arena"),
        }
    }
}

impl IndexMut<Span> for Arena {
    fn index_mut(&mut self, span: Span) -> &mut [u8] {
        match self.get_mut(span) {
            Some(bytes) => bytes,
            None => panic!("span {span:?} is not valid in this arena"),
        }
    }
}
