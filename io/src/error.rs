use thiserror::Error;

/// Errors returned by driver setup and configuration.
///
/// Per-request outcomes are never reported through this type; they travel as
/// an [`IoResultKind`] instead.
#[derive(Debug, Error)]
pub enum IoError {
    /// `init` was called on a driver that is already running.
    #[error("driver is already initialized")]
    AlreadyInitialized,
    /// The async worker thread could not be started.
    #[error("failed to spawn async I/O worker: {0}")]
    WorkerSpawn(#[source] std::io::Error),
    /// The driver configuration is unusable.
    #[error("invalid I/O driver config: {0}")]
    Config(String),
}

/// Outcome of a single read or write request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IoResultKind {
    /// The path could not be opened for the requested mode.
    OpenFailed,
    /// The file opened but its contents could not be read in full, or the
    /// destination block could not be allocated.
    ReadFailed,
    /// The whole file was read. Zero-length files succeed without a block.
    ReadOk,
    /// Nothing was written, or the path kind is read-only.
    WriteFailed,
    /// A non-zero number of bytes was written.
    WriteOk,
}

impl IoResultKind {
    pub fn is_ok(self) -> bool {
        matches!(self, IoResultKind::ReadOk | IoResultKind::WriteOk)
    }
}
