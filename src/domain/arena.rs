//! Bump arena for serialized records.
//!
//! The arena hands out byte ranges from fixed-size chunks and never frees them
//! individually; everything goes away when the arena is dropped together with its
//! domain. Allocations are addressed by [`ArenaSpan`] (chunk index, offset, length)
//! instead of pointers, so growth never invalidates an earlier span.

/// Default chunk size in bytes.
pub const DEFAULT_CHUNK_SIZE: usize = 4096;

/// Location of one allocation inside a [`RecordArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArenaSpan {
    chunk: usize,
    offset: usize,
    len: usize,
}

impl ArenaSpan {
    /// Length of the allocation in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` for a zero-length allocation.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Monotonically growing byte arena.
#[derive(Debug)]
pub struct RecordArena {
    chunks: Vec<Vec<u8>>,
    chunk_size: usize,
    /// Chunk new small allocations are bumped into.
    current: Option<usize>,
    allocated: usize,
}

impl RecordArena {
    /// Create an arena allocating chunks of `chunk_size` bytes.
    #[must_use]
    pub fn new(chunk_size: usize) -> Self {
        RecordArena {
            chunks: Vec::new(),
            chunk_size: chunk_size.max(1),
            current: None,
            allocated: 0,
        }
    }

    /// Copy `bytes` into the arena.
    pub fn alloc(&mut self, bytes: &[u8]) -> ArenaSpan {
        self.allocated += bytes.len();

        if bytes.len() > self.chunk_size {
            self.chunks.push(bytes.to_vec());
            return ArenaSpan {
                chunk: self.chunks.len() - 1,
                offset: 0,
                len: bytes.len(),
            };
        }

        let chunk = match self.current {
            Some(index) if self.chunk_size - self.chunks[index].len() >= bytes.len() => index,
            _ => {
                self.chunks.push(Vec::with_capacity(self.chunk_size));
                let index = self.chunks.len() - 1;
                self.current = Some(index);
                index
            }
        };

        let offset = self.chunks[chunk].len();
        self.chunks[chunk].extend_from_slice(bytes);
        ArenaSpan {
            chunk,
            offset,
            len: bytes.len(),
        }
    }

    /// Bytes of an earlier allocation.
    ///
    /// # Panics
    /// Panics if `span` was not produced by this arena.
    #[must_use]
    pub fn get(&self, span: ArenaSpan) -> &[u8] {
        &self.chunks[span.chunk][span.offset..span.offset + span.len]
    }

    /// Total bytes handed out, overwritten records included.
    #[must_use]
    pub fn allocated_bytes(&self) -> usize {
        self.allocated
    }

    /// Number of chunks backing the arena.
    #[must_use]
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }
}

impl Default for RecordArena {
    fn default() -> Self {
        RecordArena::new(DEFAULT_CHUNK_SIZE)
    }
}
