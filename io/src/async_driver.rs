use std::cell::Cell;
use std::sync::Arc;
use std::thread::JoinHandle;

use redlilium_core::memory::{MemoryBlock, MemoryPool};

use crate::blocking::BlockingDriver;
use crate::driver::{Completion, IoDriver, OperationMode};
use crate::error::IoError;
use crate::events::IoDriverEvents;
use crate::path::{AssetSource, PathKind};
use crate::queue::{spsc, Consumer, Producer};
use crate::request::{AsyncRequest, AsyncResponse};
use crate::worker::{WakeSignal, Worker, WorkerConfig};

/// Disk driver that runs requests on a dedicated worker thread.
///
/// `read` and `write` only enqueue work and return
/// [`Completion::Submitted`]. Outcomes are handed to the registered
/// [`IoDriverEvents`] when the owning thread calls
/// [`run_async_loop`](IoDriver::run_async_loop), usually once per frame.
/// Requests complete in submission order.
///
/// # Example
///
/// ```ignore
/// let mut driver = AsyncDriver::new();
/// driver.init(pool, "/data", Some(Box::new(loader_events)))?;
/// driver.read("level1.bin", PathKind::Assets);
///
/// // Each frame:
/// driver.run_async_loop();
/// ```
pub struct AsyncDriver {
    worker_config: WorkerConfig,
    assets: AssetSource,
    callbacks: Option<Box<dyn IoDriverEvents>>,
    running: Option<Running>,
    in_flight: Cell<usize>,
}

struct Running {
    root_uri: String,
    requests: Producer<AsyncRequest>,
    responses: Consumer<AsyncResponse>,
    signal: Arc<WakeSignal>,
    worker: Option<JoinHandle<()>>,
}

impl AsyncDriver {
    pub fn new() -> Self {
        Self::with_worker(WorkerConfig::default())
    }

    pub fn with_worker(worker_config: WorkerConfig) -> Self {
        Self {
            worker_config,
            assets: AssetSource::default(),
            callbacks: None,
            running: None,
            in_flight: Cell::new(0),
        }
    }

    /// Choose where `Assets` paths are looked up. Takes effect on the next
    /// `init`.
    pub fn set_asset_source(&mut self, assets: AssetSource) {
        self.assets = assets;
    }

    pub fn asset_source(&self) -> &AssetSource {
        &self.assets
    }

    pub fn worker_config(&self) -> &WorkerConfig {
        &self.worker_config
    }

    pub fn is_initialized(&self) -> bool {
        self.running.is_some()
    }

    /// Requests submitted but not yet delivered to callbacks.
    pub fn in_flight(&self) -> usize {
        self.in_flight.get()
    }

    fn submit(&self, running: &Running, request: AsyncRequest) {
        running.signal.submit(&running.requests, request);
        self.in_flight.set(self.in_flight.get() + 1);
    }
}

impl Default for AsyncDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl IoDriver for AsyncDriver {
    fn init(
        &mut self,
        pool: MemoryPool,
        root_uri: &str,
        callbacks: Option<Box<dyn IoDriverEvents>>,
    ) -> Result<(), IoError> {
        if self.running.is_some() {
            return Err(IoError::AlreadyInitialized);
        }

        let mut disk = BlockingDriver::new();
        disk.set_asset_source(self.assets.clone());
        disk.init(pool, root_uri, None)?;
        let root_uri = disk.root_uri().to_owned();

        let (requests, worker_requests) = spsc();
        let (worker_responses, responses) = spsc();
        let signal = Arc::new(WakeSignal::new());
        let worker = Worker {
            disk,
            requests: worker_requests,
            responses: worker_responses,
            signal: Arc::clone(&signal),
        };

        let handle = std::thread::Builder::new()
            .name(self.worker_config.name.clone())
            .stack_size(self.worker_config.stack_size)
            .spawn(move || worker.run())
            .map_err(IoError::WorkerSpawn)?;

        log::info!(
            "Async I/O driver rooted at '{root_uri}' (worker \"{}\")",
            self.worker_config.name
        );
        self.callbacks = callbacks;
        self.in_flight.set(0);
        self.running = Some(Running {
            root_uri,
            requests,
            responses,
            signal,
            worker: Some(handle),
        });
        Ok(())
    }

    fn shutdown(&mut self) {
        let Some(mut running) = self.running.take() else {
            return;
        };

        running.signal.stop();
        if let Some(handle) = running.worker.take() {
            if handle.join().is_err() {
                log::warn!("Async I/O worker panicked");
            }
        }

        if !running.requests.is_empty() {
            log::warn!(
                "Abandoning {} queued async I/O request(s)",
                running.requests.len()
            );
        }
        let undelivered = running.responses.drain().count();
        if undelivered > 0 {
            log::debug!("Discarded {undelivered} undelivered async I/O response(s)");
        }
        // Dropping the queues releases every block they still hold.
        drop(running);
        self.in_flight.set(0);
        log::debug!("Async I/O driver shut down");
    }

    fn set_callbacks(
        &mut self,
        callbacks: Option<Box<dyn IoDriverEvents>>,
    ) -> Option<Box<dyn IoDriverEvents>> {
        std::mem::replace(&mut self.callbacks, callbacks)
    }

    fn callbacks(&self) -> Option<&dyn IoDriverEvents> {
        self.callbacks.as_deref()
    }

    fn read(&self, uri: &str, kind: PathKind) -> Completion<Option<MemoryBlock>> {
        let Some(running) = &self.running else {
            log::error!("Async driver used before init (reading '{uri}')");
            return Completion::Ready(None);
        };
        self.submit(
            running,
            AsyncRequest::Read {
                uri: uri.to_owned(),
                kind,
            },
        );
        Completion::Submitted
    }

    fn write(&self, uri: &str, block: &MemoryBlock, kind: PathKind) -> Completion<usize> {
        let Some(running) = &self.running else {
            log::error!("Async driver used before init (writing '{uri}')");
            return Completion::Ready(0);
        };
        self.submit(
            running,
            AsyncRequest::Write {
                uri: uri.to_owned(),
                kind,
                payload: block.retain(),
            },
        );
        Completion::Submitted
    }

    fn run_async_loop(&mut self) {
        let Some(running) = &self.running else {
            return;
        };

        for response in running.responses.drain() {
            self.in_flight.set(self.in_flight.get().saturating_sub(1));
            match self.callbacks.as_deref_mut() {
                Some(events) => response.dispatch(events),
                None => log::trace!(
                    "No I/O callbacks registered, dropping {:?} for '{}'",
                    response.result(),
                    response.uri()
                ),
            }
        }
    }

    fn operation_mode(&self) -> OperationMode {
        OperationMode::Async
    }

    fn root_uri(&self) -> &str {
        self.running
            .as_ref()
            .map_or("", |running| running.root_uri.as_str())
    }
}

impl Drop for AsyncDriver {
    fn drop(&mut self) {
        self.shutdown();
    }
}
