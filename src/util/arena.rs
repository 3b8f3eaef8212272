use std::{alloc::{Layout, alloc, dealloc, handle_alloc_error},
          cell::{Cell, RefCell},
          mem,
          ptr::NonNull,
          slice};

/// Payload size of a regular chunk in bytes.
pub const DEFAULT_CHUNK_SIZE: usize = 8192;

/// Alignment of every pointer handed out by the arena.
const ALIGNMENT: usize = 16;

/// Rounds `size` up to the next multiple of [`ALIGNMENT`].
const fn round_up(size: usize) -> usize {
    (size + ALIGNMENT - 1) & !(ALIGNMENT - 1)
}

/// One contiguous block of arena memory.
///
/// `used` is the bump offset; a chunk dedicated to an oversized request
/// is created with `used == size` so it can never serve another
/// allocation and the `alloc_size` accounting stays uniform.
struct Chunk {
    start: NonNull<u8>,
    size:  usize,
    used:  usize,
}

impl Chunk {
    fn new(size: usize) -> Self {
        debug_assert!(size > 0);
        // The layout is valid: `size` is bounded by the caller and
        // `ALIGNMENT` is a power of two.
        let layout = Layout::from_size_align(size, ALIGNMENT).expect("chunk layout");
        let ptr = unsafe { alloc(layout) };
        let Some(start) = NonNull::new(ptr) else {
            handle_alloc_error(layout);
        };
        Self { start, size, used: 0 }
    }
}

/// Usage counters for an [`Arena`], queried by tests and logged on
/// interest via `tracing`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArenaStats {
    /// Number of chunks, including dedicated oversized chunks.
    pub chunk_count: usize,
    /// Total payload capacity of all chunks in bytes.
    pub chunk_size:  usize,
    /// Number of allocation requests served.
    pub alloc_count: usize,
    /// Total bytes handed out, after rounding each request up to the
    /// alignment boundary.
    pub alloc_size:  usize,
}

/// A bump-pointer allocator backed by a list of chunks.
///
/// All allocations share one lifetime: values are placed into chunk
/// memory, handed out as references borrowing the arena, and released
/// together when the arena is dropped. The parser uses one arena per
/// parse so the whole AST is freed as a unit.
///
/// Requests larger than [`DEFAULT_CHUNK_SIZE`] get a dedicated chunk;
/// smaller requests bump the current chunk and open a fresh one when it
/// is full. Every returned pointer is aligned to 16 bytes.
///
/// Values stored in the arena are **never dropped**, so only types
/// without meaningful `Drop` behavior may be allocated. AST nodes are
/// plain spans, enums and references, which satisfies this.
pub struct Arena {
    chunks:      RefCell<Vec<Chunk>>,
    current:     Cell<usize>,
    alloc_count: Cell<usize>,
}

impl Arena {
    /// Creates an arena with one empty default-sized chunk.
    #[must_use]
    pub fn new() -> Self {
        Self { chunks:      RefCell::new(vec![Chunk::new(DEFAULT_CHUNK_SIZE)]),
               current:     Cell::new(0),
               alloc_count: Cell::new(0), }
    }

    /// Moves `value` into the arena and returns a reference with the
    /// arena's lifetime.
    pub fn alloc<T>(&self, value: T) -> &mut T {
        debug_assert!(mem::align_of::<T>() <= ALIGNMENT);
        debug_assert!(!mem::needs_drop::<T>(), "arena values are never dropped");
        let ptr = self.alloc_raw(mem::size_of::<T>()).cast::<T>().as_ptr();
        // The region is fresh, properly sized and 16-aligned.
        unsafe {
            ptr.write(value);
            &mut *ptr
        }
    }

    /// Moves the elements of `values` into a contiguous arena slice.
    pub fn alloc_slice<T>(&self, values: Vec<T>) -> &mut [T] {
        debug_assert!(mem::align_of::<T>() <= ALIGNMENT);
        debug_assert!(!mem::needs_drop::<T>(), "arena values are never dropped");
        let len = values.len();
        if len == 0 {
            return &mut [];
        }
        let ptr = self.alloc_raw(mem::size_of::<T>() * len).cast::<T>().as_ptr();
        // Each element is written exactly once into the fresh region;
        // the vector's buffer is released by `into_iter`.
        unsafe {
            for (index, value) in values.into_iter().enumerate() {
                ptr.add(index).write(value);
            }
            slice::from_raw_parts_mut(ptr, len)
        }
    }

    /// Reserves `size` bytes, rounded up to the alignment boundary.
    fn alloc_raw(&self, size: usize) -> NonNull<u8> {
        let size = round_up(size);
        self.alloc_count.set(self.alloc_count.get() + 1);
        if size == 0 {
            // Zero-sized requests get a well-aligned dangling pointer
            // that is never dereferenced.
            return unsafe { NonNull::new_unchecked(ALIGNMENT as *mut u8) };
        }
        let mut chunks = self.chunks.borrow_mut();
        if size > DEFAULT_CHUNK_SIZE {
            // Dedicated chunk; marked fully used so it never serves a
            // later small request.
            let mut chunk = Chunk::new(size);
            chunk.used = size;
            let start = chunk.start;
            chunks.push(chunk);
            return start;
        }
        let mut current = self.current.get();
        if chunks[current].used + size > chunks[current].size {
            chunks.push(Chunk::new(DEFAULT_CHUNK_SIZE));
            current = chunks.len() - 1;
            self.current.set(current);
        }
        let chunk = &mut chunks[current];
        // In-bounds by the check above.
        let ptr = unsafe { chunk.start.add(chunk.used) };
        chunk.used += size;
        ptr
    }

    /// Current usage counters.
    #[must_use]
    pub fn stats(&self) -> ArenaStats {
        let chunks = self.chunks.borrow();
        ArenaStats { chunk_count: chunks.len(),
                     chunk_size:  chunks.iter().map(|c| c.size).sum(),
                     alloc_count: self.alloc_count.get(),
                     alloc_size:  chunks.iter().map(|c| c.used).sum(), }
    }
}

impl Default for Arena {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Arena {
    fn drop(&mut self) {
        for chunk in self.chunks.borrow_mut().drain(..) {
            let layout = Layout::from_size_align(chunk.size, ALIGNMENT).expect("chunk layout");
            // The chunk was allocated with exactly this layout.
            unsafe { dealloc(chunk.start.as_ptr(), layout) };
        }
    }
}
