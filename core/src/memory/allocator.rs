use std::sync::atomic::{AtomicUsize, Ordering};

/// Source of the byte storage behind a [`MemoryBlock`](super::MemoryBlock).
///
/// Allocation failure is reported as `None` rather than aborting, so that a
/// failed allocation on the I/O worker turns into a failed request instead of
/// taking the process down.
pub trait BlockAllocator: Send + Sync + 'static {
    /// Allocate a zero-filled buffer of exactly `size` bytes.
    fn allocate(&self, size: usize) -> Option<Box<[u8]>>;

    /// Return a buffer previously produced by [`allocate`](Self::allocate).
    fn free(&self, bytes: Box<[u8]>);

    /// Number of bytes currently handed out by this allocator.
    fn allocated_bytes(&self) -> usize;
}

/// Global heap allocator with live byte accounting.
#[derive(Debug, Default)]
pub struct HeapAllocator {
    allocated: AtomicUsize,
}

impl HeapAllocator {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BlockAllocator for HeapAllocator {
    fn allocate(&self, size: usize) -> Option<Box<[u8]>> {
        let bytes = try_alloc_zeroed(size)?;
        self.allocated.fetch_add(size, Ordering::Relaxed);
        Some(bytes)
    }

    fn free(&self, bytes: Box<[u8]>) {
        self.allocated.fetch_sub(bytes.len(), Ordering::Relaxed);
    }

    fn allocated_bytes(&self) -> usize {
        self.allocated.load(Ordering::Relaxed)
    }
}

/// Heap allocator capped at a fixed byte budget.
///
/// Requests that would push the live total past the budget fail with `None`.
/// Useful on memory-constrained targets where asset loading must never grow
/// past a known ceiling.
#[derive(Debug)]
pub struct BudgetAllocator {
    budget: usize,
    allocated: AtomicUsize,
}

impl BudgetAllocator {
    pub fn new(budget: usize) -> Self {
        Self {
            budget,
            allocated: AtomicUsize::new(0),
        }
    }

    pub fn budget(&self) -> usize {
        self.budget
    }
}

impl BlockAllocator for BudgetAllocator {
    fn allocate(&self, size: usize) -> Option<Box<[u8]>> {
        // Reserve the bytes first so concurrent callers cannot overshoot.
        self.allocated
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
                current
                    .checked_add(size)
                    .filter(|&total| total <= self.budget)
            })
            .ok()?;

        match try_alloc_zeroed(size) {
            Some(bytes) => Some(bytes),
            None => {
                self.allocated.fetch_sub(size, Ordering::AcqRel);
                None
            }
        }
    }

    fn free(&self, bytes: Box<[u8]>) {
        self.allocated.fetch_sub(bytes.len(), Ordering::AcqRel);
    }

    fn allocated_bytes(&self) -> usize {
        self.allocated.load(Ordering::Acquire)
    }
}

fn try_alloc_zeroed(size: usize) -> Option<Box<[u8]>> {
    let mut buffer = Vec::new();
    if buffer.try_reserve_exact(size).is_err() {
        log::error!("Out of memory allocating a {size} byte block");
        return None;
    }
    buffer.resize(size, 0);
    Some(buffer.into_boxed_slice())
}
