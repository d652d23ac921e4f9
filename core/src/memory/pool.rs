//! Fixed-capacity pool of reference-counted memory blocks.
//!
//! Every I/O result in the engine travels in a [`MemoryBlock`]: a sized byte
//! buffer shared between threads by reference counting. Block records live in
//! a fixed-size slab owned by a [`MemoryPool`]. The slab is guarded by a single
//! mutex, while retaining and releasing a block is a lock-free atomic
//! operation on the block itself.
//!
//! # Lifecycle
//!
//! - [`MemoryPool::create_block`] allocates fresh zeroed bytes,
//!   [`MemoryPool::copy_block`] copies caller data, and
//!   [`MemoryPool::wrap_static`] wraps memory the block does not own.
//! - [`MemoryBlock::retain`] (or `clone`) adds a reference.
//! - [`MemoryBlock::release`] (or dropping the handle) removes one. When the
//!   last reference goes away the bytes are returned to the allocator that
//!   produced them and the slot goes back to the pool.
//!
//! Releasing consumes the handle, so a block cannot be released twice.
//! Slot identities carry a generation counter; a [`BlockHandle`] captured
//! from a released block never reports live again even after its slot has
//! been reused.
//!
//! # Example
//!
//! ```
//! use redlilium_core::memory::MemoryPool;
//!
//! let pool = MemoryPool::new(16);
//! let block = pool.copy_block(b"hello").unwrap();
//! assert_eq!(pool.live_blocks(), 1);
//!
//! let shared = block.retain();
//! assert_eq!(block.ref_count(), 2);
//!
//! block.release();
//! assert_eq!(shared.data(), b"hello");
//! assert_eq!(pool.live_blocks(), 1);
//!
//! shared.release();
//! assert_eq!(pool.live_blocks(), 0);
//! ```

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

use super::allocator::{BlockAllocator, HeapAllocator};
use super::error::MemoryError;

/// Identity of one occupancy of a pool slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockHandle {
    index: u32,
    generation: u32,
}

impl BlockHandle {
    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }
}

/// Fixed-capacity slab of memory block records.
///
/// `Clone` is cheap (Arc internals). Blocks keep the pool alive, so a pool
/// handle may be dropped while blocks are still in flight.
#[derive(Clone)]
pub struct MemoryPool {
    shared: Arc<PoolShared>,
}

struct PoolShared {
    capacity: usize,
    allocator: Arc<dyn BlockAllocator>,
    slots: Mutex<SlotTable>,
}

struct SlotTable {
    generations: Vec<u32>,
    free: Vec<u32>,
    live: usize,
}

impl SlotTable {
    fn new(capacity: u32) -> Self {
        Self {
            generations: vec![0; capacity as usize],
            // Reversed so that slots are handed out from index 0 upwards.
            free: (0..capacity).rev().collect(),
            live: 0,
        }
    }

    fn try_new(capacity: u32) -> Option<Self> {
        let mut generations = Vec::new();
        let mut free = Vec::new();
        generations.try_reserve_exact(capacity as usize).ok()?;
        free.try_reserve_exact(capacity as usize).ok()?;
        generations.resize(capacity as usize, 0);
        free.extend((0..capacity).rev());
        Some(Self {
            generations,
            free,
            live: 0,
        })
    }
}

impl PoolShared {
    fn acquire(&self) -> Result<BlockHandle, MemoryError> {
        let mut slots = self.slots.lock();
        let Some(index) = slots.free.pop() else {
            return Err(MemoryError::PoolExhausted {
                capacity: self.capacity,
            });
        };
        slots.live += 1;
        Ok(BlockHandle {
            index,
            generation: slots.generations[index as usize],
        })
    }

    fn release(&self, handle: BlockHandle) {
        let mut slots = self.slots.lock();
        let generation = &mut slots.generations[handle.index as usize];
        debug_assert_eq!(*generation, handle.generation, "stale block handle released");
        *generation = generation.wrapping_add(1);
        slots.free.push(handle.index);
        slots.live -= 1;
    }
}

impl MemoryPool {
    /// Create a pool with room for `capacity` live blocks, backed by the
    /// global heap.
    pub fn new(capacity: usize) -> Self {
        Self::with_allocator(capacity, Arc::new(HeapAllocator::new()))
    }

    /// Create a pool whose blocks are allocated from `allocator` by default.
    ///
    /// Capacities above `u32::MAX` are clamped. The slot table is allocated
    /// up front; use [`try_with_allocator`](Self::try_with_allocator) for
    /// capacities that come from configuration.
    pub fn with_allocator(capacity: usize, allocator: Arc<dyn BlockAllocator>) -> Self {
        let capacity = u32::try_from(capacity).unwrap_or(u32::MAX);
        Self::from_slots(SlotTable::new(capacity), allocator)
    }

    /// Like [`new`](Self::new), but reports a capacity whose slot table
    /// cannot be allocated instead of aborting.
    pub fn try_new(capacity: usize) -> Result<Self, MemoryError> {
        Self::try_with_allocator(capacity, Arc::new(HeapAllocator::new()))
    }

    /// Like [`with_allocator`](Self::with_allocator), but fails with
    /// [`MemoryError::PoolTooLarge`] for capacities above `u32::MAX` or when
    /// the slot table cannot be allocated.
    pub fn try_with_allocator(
        capacity: usize,
        allocator: Arc<dyn BlockAllocator>,
    ) -> Result<Self, MemoryError> {
        let slots = u32::try_from(capacity)
            .ok()
            .and_then(SlotTable::try_new)
            .ok_or(MemoryError::PoolTooLarge { capacity })?;
        Ok(Self::from_slots(slots, allocator))
    }

    fn from_slots(slots: SlotTable, allocator: Arc<dyn BlockAllocator>) -> Self {
        let capacity = slots.generations.len();
        log::debug!("Memory block pool created with {capacity} slots");
        Self {
            shared: Arc::new(PoolShared {
                capacity,
                allocator,
                slots: Mutex::new(slots),
            }),
        }
    }

    /// Maximum number of blocks that can be alive at once.
    pub fn capacity(&self) -> usize {
        self.shared.capacity
    }

    /// Number of blocks currently alive.
    pub fn live_blocks(&self) -> usize {
        self.shared.slots.lock().live
    }

    /// The allocator used by [`create_block`](Self::create_block) and
    /// [`copy_block`](Self::copy_block).
    pub fn allocator(&self) -> &Arc<dyn BlockAllocator> {
        &self.shared.allocator
    }

    /// Whether `handle` still refers to a live block.
    pub fn is_live(&self, handle: BlockHandle) -> bool {
        let slots = self.shared.slots.lock();
        slots
            .generations
            .get(handle.index as usize)
            .is_some_and(|&generation| generation == handle.generation)
    }

    /// Create a zero-filled block of exactly `size` bytes.
    pub fn create_block(&self, size: usize) -> Result<MemoryBlock, MemoryError> {
        let allocator = self.shared.allocator.clone();
        self.create_block_in(size, &allocator)
    }

    /// Create a zero-filled block of `size` bytes from a specific allocator.
    pub fn create_block_in(
        &self,
        size: usize,
        allocator: &Arc<dyn BlockAllocator>,
    ) -> Result<MemoryBlock, MemoryError> {
        let handle = self.shared.acquire()?;
        let Some(bytes) = allocator.allocate(size) else {
            self.shared.release(handle);
            return Err(MemoryError::OutOfMemory { size });
        };
        Ok(self.make_block(
            handle,
            Storage::Owned {
                bytes,
                allocator: allocator.clone(),
            },
        ))
    }

    /// Create a block holding a copy of `data`.
    pub fn copy_block(&self, data: &[u8]) -> Result<MemoryBlock, MemoryError> {
        let allocator = self.shared.allocator.clone();
        self.copy_block_in(data, &allocator)
    }

    /// Create a block holding a copy of `data`, allocated from `allocator`.
    pub fn copy_block_in(
        &self,
        data: &[u8],
        allocator: &Arc<dyn BlockAllocator>,
    ) -> Result<MemoryBlock, MemoryError> {
        let mut block = self.create_block_in(data.len(), allocator)?;
        if let Some(bytes) = block.get_mut() {
            bytes.copy_from_slice(data);
        }
        Ok(block)
    }

    /// Wrap memory that outlives every block, such as embedded assets.
    ///
    /// The block has no allocator; releasing it only returns the slot.
    pub fn wrap_static(&self, data: &'static [u8]) -> Result<MemoryBlock, MemoryError> {
        let handle = self.shared.acquire()?;
        Ok(self.make_block(handle, Storage::External(data)))
    }

    fn make_block(&self, handle: BlockHandle, storage: Storage) -> MemoryBlock {
        MemoryBlock {
            record: Arc::new(BlockRecord {
                pool: self.shared.clone(),
                handle,
                storage,
            }),
        }
    }
}

impl fmt::Debug for MemoryPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryPool")
            .field("capacity", &self.capacity())
            .field("live_blocks", &self.live_blocks())
            .finish()
    }
}

/// A sized, reference-counted byte buffer owned by a [`MemoryPool`] slot.
///
/// The size is fixed at creation. Cloning retains, dropping releases.
pub struct MemoryBlock {
    record: Arc<BlockRecord>,
}

struct BlockRecord {
    pool: Arc<PoolShared>,
    handle: BlockHandle,
    storage: Storage,
}

enum Storage {
    Owned {
        bytes: Box<[u8]>,
        allocator: Arc<dyn BlockAllocator>,
    },
    External(&'static [u8]),
}

impl Drop for BlockRecord {
    fn drop(&mut self) {
        let storage = std::mem::replace(&mut self.storage, Storage::External(&[]));
        if let Storage::Owned { bytes, allocator } = storage {
            allocator.free(bytes);
        }
        self.pool.release(self.handle);
    }
}

impl MemoryBlock {
    /// The block contents.
    pub fn data(&self) -> &[u8] {
        match &self.record.storage {
            Storage::Owned { bytes, .. } => &bytes[..],
            Storage::External(bytes) => *bytes,
        }
    }

    /// Size of the block in bytes.
    pub fn size(&self) -> usize {
        self.data().len()
    }

    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Mutable access to the bytes.
    ///
    /// Only available while this is the sole reference and the block owns
    /// its storage; shared or wrapped blocks are read-only.
    pub fn get_mut(&mut self) -> Option<&mut [u8]> {
        match &mut Arc::get_mut(&mut self.record)?.storage {
            Storage::Owned { bytes, .. } => Some(&mut bytes[..]),
            Storage::External(_) => None,
        }
    }

    /// Take an additional reference to the block.
    pub fn retain(&self) -> MemoryBlock {
        self.clone()
    }

    /// Drop this reference. The last release frees the bytes and returns
    /// the slot to the pool.
    pub fn release(self) {
        drop(self);
    }

    /// Current number of references.
    pub fn ref_count(&self) -> usize {
        Arc::strong_count(&self.record)
    }

    /// Pool slot identity of this block.
    pub fn handle(&self) -> BlockHandle {
        self.record.handle
    }

    /// Whether the block wraps memory it does not own.
    pub fn is_external(&self) -> bool {
        matches!(self.record.storage, Storage::External(_))
    }
}

impl Clone for MemoryBlock {
    fn clone(&self) -> Self {
        Self {
            record: Arc::clone(&self.record),
        }
    }
}

impl AsRef<[u8]> for MemoryBlock {
    fn as_ref(&self) -> &[u8] {
        self.data()
    }
}

impl fmt::Debug for MemoryBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryBlock")
            .field("size", &self.size())
            .field("handle", &self.record.handle)
            .field("ref_count", &self.ref_count())
            .field("external", &self.is_external())
            .finish()
    }
}
