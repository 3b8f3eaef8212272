use tracing::debug;

use crate::{error::RuntimeError,
            interpreter::value::core::{Obj, TypeKind}};

/// Capacity of the root stack.
pub const MAX_ROOTS: usize = 64;

/// Smallest cached integer value.
pub const INT_CACHE_MIN: i64 = -1;
/// Largest cached integer value.
pub const INT_CACHE_MAX: i64 = 255;

/// Collection threshold at startup.
const INITIAL_THRESHOLD: usize = 100;

/// Slot index of the `false` singleton.
const FALSE_SLOT: u32 = 0;
/// Slot index of the `true` singleton.
const TRUE_SLOT: u32 = 1;
/// First slot of the small-int cache.
const INT_CACHE_BASE: u32 = 2;
/// First slot of the type objects.
const TYPE_BASE: u32 = INT_CACHE_BASE + (INT_CACHE_MAX - INT_CACHE_MIN + 1) as u32;
/// Number of pinned slots created at heap construction.
const PINNED_SLOTS: usize = TYPE_BASE as usize + TypeKind::ALL.len();

/// A reference to a heap object.
///
/// Handles are plain indices into the heap's slot table; equality of
/// handles is object identity. A handle stays valid for as long as its
/// object is reachable from the root stack; using a handle to a
/// collected object is a bug and panics on access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Handle(u32);

struct Slot {
    obj:    Obj,
    marked: bool,
    pinned: bool,
}

/// The garbage-collected object heap.
///
/// A mark-and-sweep collector over a slot table with a free list.
/// Collection is driven by allocation pressure: when the number of
/// live objects reaches the threshold, a collection runs before the
/// allocation, and the threshold doubles whenever a sweep leaves at
/// least 87.5% of it alive.
///
/// Reachability starts from an explicit stack of at most [`MAX_ROOTS`]
/// roots, used in strict LIFO order. The safety contract for callers:
/// every handle returned by an allocation must be made reachable
/// (rooted, or wired into a rooted object) before the next allocation,
/// because that allocation may collect.
///
/// The `false`/`true` singletons, the small-int cache for
/// `[INT_CACHE_MIN, INT_CACHE_MAX]` and the type objects occupy pinned
/// slots created at construction: they are never counted, marked, or
/// swept, which makes cache hits observable as handle identity.
pub struct Heap {
    slots:         Vec<Option<Slot>>,
    free:          Vec<u32>,
    roots:         Vec<Handle>,
    objects_count: usize,
    threshold:     usize,
}

impl Heap {
    /// Creates a heap containing only the pinned singletons.
    #[must_use]
    pub fn new() -> Self {
        let mut slots = Vec::with_capacity(PINNED_SLOTS);
        slots.push(pinned(Obj::Bool(false)));
        slots.push(pinned(Obj::Bool(true)));
        for value in INT_CACHE_MIN..=INT_CACHE_MAX {
            slots.push(pinned(Obj::Int(value)));
        }
        for kind in TypeKind::ALL {
            slots.push(pinned(Obj::Type(kind)));
        }
        debug_assert_eq!(slots.len(), PINNED_SLOTS);
        Self { slots,
               free: Vec::new(),
               roots: Vec::new(),
               objects_count: 0,
               threshold: INITIAL_THRESHOLD }
    }

    /// Allocates a heap object and returns its handle.
    ///
    /// Runs a collection first when the live count has reached the
    /// threshold, so any previously allocated object that the caller
    /// still needs must already be reachable.
    ///
    /// # Errors
    /// Propagates `TooManyObjects` when the collection threshold can
    /// no longer grow.
    pub fn alloc(&mut self, obj: Obj) -> Result<Handle, RuntimeError> {
        if self.objects_count >= self.threshold {
            self.collect()?;
        }
        let slot = Some(Slot { obj,
                               marked: false,
                               pinned: false });
        let handle = if let Some(index) = self.free.pop() {
            self.slots[index as usize] = slot;
            Handle(index)
        } else {
            self.slots.push(slot);
            Handle(self.slots.len() as u32 - 1)
        };
        self.objects_count += 1;
        Ok(handle)
    }

    /// Pushes a handle onto the root stack.
    ///
    /// # Errors
    /// Returns `TooManyRoots` when the stack is full.
    pub fn root(&mut self, handle: Handle) -> Result<(), RuntimeError> {
        if self.roots.len() >= MAX_ROOTS {
            return Err(RuntimeError::TooManyRoots);
        }
        self.roots.push(handle);
        Ok(())
    }

    /// Pops the top of the root stack, which must be `handle`.
    pub fn unroot(&mut self, handle: Handle) {
        let top = self.roots.pop();
        debug_assert_eq!(top, Some(handle), "unroot must match the top of the root stack");
    }

    /// Runs a full mark-and-sweep collection.
    ///
    /// # Errors
    /// Returns `TooManyObjects` when the threshold would overflow
    /// while doubling.
    pub fn collect(&mut self) -> Result<(), RuntimeError> {
        // Mark phase: chase handles from the roots; pinned objects
        // terminate the walk and already-marked objects make it
        // cycle-safe.
        let mut worklist: Vec<Handle> = self.roots.clone();
        while let Some(handle) = worklist.pop() {
            let Some(slot) = self.slots[handle.0 as usize].as_mut() else {
                continue;
            };
            if slot.pinned || slot.marked {
                continue;
            }
            slot.marked = true;
            slot.obj.trace(&mut worklist);
        }

        // Sweep phase: unmark survivors, recycle the rest.
        let mut freed = 0;
        for index in 0..self.slots.len() {
            let keep = match &mut self.slots[index] {
                None => true,
                Some(slot) if slot.pinned => true,
                Some(slot) if slot.marked => {
                    slot.marked = false;
                    true
                },
                Some(_) => false,
            };
            if !keep {
                self.slots[index] = None;
                self.free.push(index as u32);
                freed += 1;
            }
        }
        self.objects_count -= freed;
        debug!(target: "natrix::gc",
               freed,
               remaining = self.objects_count,
               threshold = self.threshold,
               "collection done");

        if self.objects_count >= self.threshold - self.threshold / 8 {
            self.threshold = self.threshold
                                 .checked_mul(2)
                                 .ok_or(RuntimeError::TooManyObjects)?;
        }
        Ok(())
    }

    /// Immutable access to an object. Panics on a collected handle,
    /// which indicates a rooting bug.
    #[must_use]
    pub fn get(&self, handle: Handle) -> &Obj {
        match &self.slots[handle.0 as usize] {
            Some(slot) => &slot.obj,
            None => panic!("access to a collected object"),
        }
    }

    /// Mutable access to an object. Panics on a collected handle.
    pub fn get_mut(&mut self, handle: Handle) -> &mut Obj {
        match &mut self.slots[handle.0 as usize] {
            Some(slot) => &mut slot.obj,
            None => panic!("access to a collected object"),
        }
    }

    /// Whether the handle still refers to a live object.
    #[must_use]
    pub fn contains(&self, handle: Handle) -> bool {
        self.slots
            .get(handle.0 as usize)
            .is_some_and(Option::is_some)
    }

    /// Number of live collectable objects (pinned slots excluded).
    #[must_use]
    pub fn objects_count(&self) -> usize {
        self.objects_count
    }

    /// The current collection threshold.
    #[must_use]
    pub fn threshold(&self) -> usize {
        self.threshold
    }

    /// Number of entries on the root stack.
    #[must_use]
    pub fn roots_count(&self) -> usize {
        self.roots.len()
    }

    /// One of the two boolean singletons. Never allocates.
    #[must_use]
    pub fn new_bool(&self, value: bool) -> Handle {
        if value { Handle(TRUE_SLOT) } else { Handle(FALSE_SLOT) }
    }

    /// An `int` object for `value`.
    ///
    /// Values inside the cache range come from the pinned cache and
    /// preserve handle identity across calls; all others allocate.
    ///
    /// # Errors
    /// Propagates allocation failure for uncached values.
    pub fn new_int(&mut self, value: i64) -> Result<Handle, RuntimeError> {
        if (INT_CACHE_MIN..=INT_CACHE_MAX).contains(&value) {
            let offset = (value - INT_CACHE_MIN) as u32;
            return Ok(Handle(INT_CACHE_BASE + offset));
        }
        self.alloc(Obj::Int(value))
    }

    /// A new `str` object holding a copy of `bytes`.
    ///
    /// # Errors
    /// Propagates allocation failure.
    pub fn new_str(&mut self, bytes: &[u8]) -> Result<Handle, RuntimeError> {
        self.alloc(Obj::Str(bytes.into()))
    }

    /// The pinned type object describing `kind`.
    #[must_use]
    pub fn type_object(&self, kind: TypeKind) -> Handle {
        Handle(TYPE_BASE + kind as u32)
    }
}

impl Default for Heap {
    fn default() -> Self {
        Self::new()
    }
}

fn pinned(obj: Obj) -> Option<Slot> {
    Some(Slot { obj,
                marked: false,
                pinned: true })
}
