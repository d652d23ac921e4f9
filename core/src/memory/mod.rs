//! Pooled, reference-counted memory blocks.
//!
//! See [`pool`] for the block lifecycle.

mod allocator;
mod error;
pub mod pool;

pub use allocator::{BlockAllocator, BudgetAllocator, HeapAllocator};
pub use error::MemoryError;
pub use pool::{BlockHandle, MemoryBlock, MemoryPool};

/// Default number of block slots in an engine pool.
pub const DEFAULT_POOL_CAPACITY: usize = 256;
