use redlilium_core::memory::{MemoryBlock, MemoryPool};

use crate::error::IoError;
use crate::events::IoDriverEvents;
use crate::path::PathKind;

/// Whether a driver completes requests on the calling thread or later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationMode {
    Blocking,
    Async,
}

/// Result of submitting a request to an [`IoDriver`].
#[derive(Debug)]
pub enum Completion<T> {
    /// The request ran on the calling thread.
    Ready(T),
    /// The request was queued; its outcome arrives through the driver's
    /// callbacks on a later [`run_async_loop`](IoDriver::run_async_loop).
    Submitted,
}

impl<T> Completion<T> {
    pub fn is_submitted(&self) -> bool {
        matches!(self, Completion::Submitted)
    }

    /// The ready value, or `None` if the request was queued.
    pub fn ready(self) -> Option<T> {
        match self {
            Completion::Ready(value) => Some(value),
            Completion::Submitted => None,
        }
    }
}

/// Common interface of the blocking and asynchronous disk drivers.
///
/// The resource loader addresses drivers through this trait and picks the
/// operation mode per call site.
///
/// # Read vs Write
///
/// `read` loads a whole file into a [`MemoryBlock`]; `write` stores a whole
/// block, truncating the target. Writes to [`PathKind::Assets`] are always
/// rejected.
pub trait IoDriver {
    /// Start the driver with a block pool and a root directory.
    ///
    /// Fails with [`IoError::AlreadyInitialized`] if the driver is running.
    fn init(
        &mut self,
        pool: MemoryPool,
        root_uri: &str,
        callbacks: Option<Box<dyn IoDriverEvents>>,
    ) -> Result<(), IoError>;

    /// Stop the driver. Safe to call on a driver that was never started.
    fn shutdown(&mut self);

    /// Replace the completion callbacks, returning the previous set.
    fn set_callbacks(
        &mut self,
        callbacks: Option<Box<dyn IoDriverEvents>>,
    ) -> Option<Box<dyn IoDriverEvents>>;

    /// Currently registered callbacks.
    fn callbacks(&self) -> Option<&dyn IoDriverEvents>;

    /// Read a whole file.
    ///
    /// Failures are logged; the caller gets `Ready(None)`, the same as for a
    /// zero-length file.
    fn read(&self, uri: &str, kind: PathKind) -> Completion<Option<MemoryBlock>>;

    /// Write a whole block. Failures are logged and report zero bytes.
    fn write(&self, uri: &str, block: &MemoryBlock, kind: PathKind) -> Completion<usize>;

    /// Deliver completed requests to the callbacks. Call once per frame.
    fn run_async_loop(&mut self);

    fn operation_mode(&self) -> OperationMode;

    /// The normalized root directory, or an empty string before `init`.
    fn root_uri(&self) -> &str;
}
