use std::fs::File;
use std::io::{Read, Write};
use std::path::PathBuf;

use redlilium_core::memory::{MemoryBlock, MemoryPool};

use crate::driver::{Completion, IoDriver, OperationMode};
use crate::error::{IoError, IoResultKind};
use crate::events::IoDriverEvents;
use crate::path::{self, AssetSource, PathKind};

/// Synchronous disk driver.
///
/// Every call opens, reads or writes, and closes the file on the caller's
/// thread before returning. The async driver's worker runs these same
/// primitives on its own thread.
///
/// `Clone` copies the configuration and shares the block pool.
///
/// # Example
///
/// ```ignore
/// let mut driver = BlockingDriver::new();
/// driver.init(pool, "/data", None)?;
///
/// // Reads /data/config.txt
/// let config = driver.read("config.txt", PathKind::Relative).ready().flatten();
/// ```
#[derive(Clone, Default)]
pub struct BlockingDriver {
    state: Option<BlockingState>,
    assets: AssetSource,
}

#[derive(Clone)]
struct BlockingState {
    pool: MemoryPool,
    root: PathBuf,
    root_uri: String,
}

impl BlockingDriver {
    /// Create an uninitialized driver.
    pub fn new() -> Self {
        Self::default()
    }

    /// Choose where `Assets` paths are looked up.
    pub fn set_asset_source(&mut self, assets: AssetSource) {
        self.assets = assets;
    }

    pub fn asset_source(&self) -> &AssetSource {
        &self.assets
    }

    pub fn is_initialized(&self) -> bool {
        self.state.is_some()
    }

    /// The pool read results are allocated from.
    pub fn pool(&self) -> Option<&MemoryPool> {
        self.state.as_ref().map(|state| &state.pool)
    }

    /// Filesystem path a request would touch, or `None` before init.
    pub fn resolve(&self, uri: &str, kind: PathKind) -> Option<PathBuf> {
        let state = self.state.as_ref()?;
        Some(path::resolve(uri, kind, &state.root, &self.assets))
    }

    /// Read a whole file without logging failures.
    ///
    /// A zero-length file succeeds with no block. Any failure after the file
    /// was opened, including a short read or a failed block allocation, is
    /// `ReadFailed`.
    pub fn read_raw(&self, uri: &str, kind: PathKind) -> (Option<MemoryBlock>, IoResultKind) {
        let Some(state) = &self.state else {
            log::debug!("Blocking driver used before init (reading '{uri}')");
            return (None, IoResultKind::OpenFailed);
        };

        let filepath = path::resolve(uri, kind, &state.root, &self.assets);
        let mut file = match File::open(&filepath) {
            Ok(file) => file,
            Err(err) => {
                log::debug!("Open {} failed: {err}", filepath.display());
                return (None, IoResultKind::OpenFailed);
            }
        };

        let size = match file.metadata() {
            Ok(metadata) => metadata.len(),
            Err(err) => {
                log::debug!("Stat {} failed: {err}", filepath.display());
                return (None, IoResultKind::ReadFailed);
            }
        };
        if size == 0 {
            return (None, IoResultKind::ReadOk);
        }
        let Ok(size) = usize::try_from(size) else {
            return (None, IoResultKind::ReadFailed);
        };

        let mut block = match state.pool.create_block(size) {
            Ok(block) => block,
            Err(err) => {
                log::error!("No memory block for '{uri}': {err}");
                return (None, IoResultKind::ReadFailed);
            }
        };
        let Some(bytes) = block.get_mut() else {
            return (None, IoResultKind::ReadFailed);
        };
        if let Err(err) = file.read_exact(bytes) {
            log::debug!("Read {} failed: {err}", filepath.display());
            return (None, IoResultKind::ReadFailed);
        }

        (Some(block), IoResultKind::ReadOk)
    }

    /// Write a whole block without logging failures.
    ///
    /// `Assets` paths are read-only and always fail without touching the
    /// filesystem. Writing zero bytes is reported as `WriteFailed`, even for
    /// an empty block.
    pub fn write_raw(&self, uri: &str, block: &MemoryBlock, kind: PathKind) -> (usize, IoResultKind) {
        if kind == PathKind::Assets {
            log::debug!("Rejected write to read-only asset '{uri}'");
            return (0, IoResultKind::WriteFailed);
        }
        let Some(state) = &self.state else {
            log::debug!("Blocking driver used before init (writing '{uri}')");
            return (0, IoResultKind::OpenFailed);
        };

        let filepath = path::resolve(uri, kind, &state.root, &self.assets);
        let mut file = match File::create(&filepath) {
            Ok(file) => file,
            Err(err) => {
                log::debug!("Create {} failed: {err}", filepath.display());
                return (0, IoResultKind::OpenFailed);
            }
        };

        let data = block.data();
        if let Err(err) = file.write_all(data) {
            log::debug!("Write {} failed: {err}", filepath.display());
            return (0, IoResultKind::WriteFailed);
        }

        // Zero bytes written always reports failure.
        let written = data.len();
        if written != 0 {
            (written, IoResultKind::WriteOk)
        } else {
            (0, IoResultKind::WriteFailed)
        }
    }

    /// Read a whole file as UTF-8 text.
    ///
    /// Zero-length files give an empty string.
    pub fn read_text(&self, uri: &str, kind: PathKind) -> Option<String> {
        let (block, result) = self.read_raw(uri, kind);
        if !log_read_result(uri, result) {
            return None;
        }
        let Some(block) = block else {
            return Some(String::new());
        };
        match std::str::from_utf8(block.data()) {
            Ok(text) => Some(text.to_owned()),
            Err(err) => {
                log::error!("File '{uri}' is not valid UTF-8: {err}");
                None
            }
        }
    }
}

fn log_read_result(uri: &str, result: IoResultKind) -> bool {
    match result {
        IoResultKind::ReadOk => true,
        IoResultKind::OpenFailed => {
            log::error!("Unable to open file '{uri}' for reading");
            false
        }
        _ => {
            log::error!("Unable to read file '{uri}'");
            false
        }
    }
}

impl IoDriver for BlockingDriver {
    fn init(
        &mut self,
        pool: MemoryPool,
        root_uri: &str,
        callbacks: Option<Box<dyn IoDriverEvents>>,
    ) -> Result<(), IoError> {
        if self.state.is_some() {
            return Err(IoError::AlreadyInitialized);
        }
        if callbacks.is_some() {
            log::debug!("Blocking driver does not use completion callbacks");
        }

        let root = path::normalize_root(root_uri);
        let root_uri = root.to_string_lossy().into_owned();
        log::info!("Blocking I/O driver rooted at '{root_uri}'");
        self.state = Some(BlockingState {
            pool,
            root,
            root_uri,
        });
        Ok(())
    }

    fn shutdown(&mut self) {
        if self.state.take().is_some() {
            log::debug!("Blocking I/O driver shut down");
        }
    }

    /// Blocking drivers never retain callbacks; the given set is handed back.
    fn set_callbacks(
        &mut self,
        callbacks: Option<Box<dyn IoDriverEvents>>,
    ) -> Option<Box<dyn IoDriverEvents>> {
        callbacks
    }

    fn callbacks(&self) -> Option<&dyn IoDriverEvents> {
        None
    }

    fn read(&self, uri: &str, kind: PathKind) -> Completion<Option<MemoryBlock>> {
        let (block, result) = self.read_raw(uri, kind);
        log_read_result(uri, result);
        Completion::Ready(block)
    }

    fn write(&self, uri: &str, block: &MemoryBlock, kind: PathKind) -> Completion<usize> {
        let (written, result) = self.write_raw(uri, block, kind);
        match result {
            IoResultKind::WriteOk => {}
            IoResultKind::OpenFailed => log::error!("Unable to open file '{uri}' for writing"),
            _ => log::error!("Unable to write file '{uri}'"),
        }
        Completion::Ready(written)
    }

    fn run_async_loop(&mut self) {}

    fn operation_mode(&self) -> OperationMode {
        OperationMode::Blocking
    }

    fn root_uri(&self) -> &str {
        self.state
            .as_ref()
            .map_or("", |state| state.root_uri.as_str())
    }
}
