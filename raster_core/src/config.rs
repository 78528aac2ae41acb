// Copyright 2025 the Raster Core Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Sizing and policy configuration for [`Arena`](crate::arena::Arena).

use core::marker::PhantomData;

/// Largest alignment the arena can honor.
///
/// Chunks are backed by `u64` storage, so every offset that is a multiple of the
/// requested alignment is also suitably aligned in memory.
pub const MAX_ALIGN: usize = 8;

/// Default chunk size in bytes.
pub const DEFAULT_CHUNK_SIZE: usize = 8192;

/// Typed chunk size primitive.
///
/// Lets callers size arena chunks in terms of the elements they intend to store.
#[derive(Copy, Clone, Eq, PartialEq, Default, Debug)]
pub struct ChunkSize<T: Sized> {
    len: usize,
    _phantom: PhantomData<T>,
}

impl<T: Sized> ChunkSize<T> {
    /// Creates a new chunk size from a number of elements.
    pub const fn new(len: usize) -> Self {
        Self {
            // A chunk must be able to hold at least one element.
            len: if len > 0 { len } else { 1 },
            _phantom: PhantomData,
        }
    }

    /// Returns the number of elements.
    #[expect(clippy::len_without_is_empty, reason = "A chunk can never be empty")]
    pub const fn len(self) -> usize {
        self.len
    }

    /// Returns the size in bytes, rounded up to [`MAX_ALIGN`].
    pub const fn size_in_bytes(self) -> usize {
        align_up(size_of::<T>() * self.len, MAX_ALIGN)
    }
}

/// Configuration of an [`Arena`](crate::arena::Arena).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ArenaConfig {
    /// Size of each chunk in bytes. Always a multiple of [`MAX_ALIGN`].
    pub chunk_size: usize,
    /// Whether reverting to a checkpoint frees chunks appended after it.
    ///
    /// When `false`, those chunks are kept and refilled by later allocations.
    pub release_on_revert: bool,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            release_on_revert: false,
        }
    }
}

impl ArenaConfig {
    /// Creates a configuration with the given chunk size in bytes.
    ///
    /// The size is rounded up to a multiple of [`MAX_ALIGN`].
    pub const fn new(chunk_size: usize) -> Self {
        Self {
            chunk_size: align_up(if chunk_size > 0 { chunk_size } else { 1 }, MAX_ALIGN),
            release_on_revert: false,
        }
    }

    /// Creates a configuration with chunks large enough for `size`.
    pub const fn from_chunk_size<T>(size: ChunkSize<T>) -> Self {
        Self::new(size.size_in_bytes())
    }

    /// Sets whether reverting frees chunks appended after the checkpoint.
    #[must_use]
    pub const fn with_release_on_revert(mut self, release: bool) -> Self {
        self.release_on_revert = release;
        self
    }

    /// Number of `u64` words backing one chunk.
    pub(crate) const fn chunk_words(&self) -> usize {
        self.chunk_size.div_ceil(MAX_ALIGN)
    }
}

/// Rounds `len` up to the next multiple of `alignment`, which must be a power of two.
pub const fn align_up(len: usize, alignment: usize) -> usize {
    len + (len.wrapping_neg() & (alignment - 1))
}
