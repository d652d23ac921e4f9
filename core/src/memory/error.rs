use thiserror::Error;

/// Errors produced when creating memory blocks.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MemoryError {
    /// Every slot of the block pool is in use.
    ///
    /// The pool is a fixed-size slab sized at startup. Hitting this limit is a
    /// configuration problem, not a transient condition: raise the pool
    /// capacity or release blocks sooner.
    #[error("memory block pool exhausted ({capacity} blocks in use)")]
    PoolExhausted { capacity: usize },
    /// The slot table for a pool of this capacity cannot be allocated.
    #[error("memory block pool of {capacity} slots is too large")]
    PoolTooLarge { capacity: usize },
    /// The allocator could not provide the requested bytes.
    #[error("out of memory allocating {size} bytes")]
    OutOfMemory { size: usize },
}
