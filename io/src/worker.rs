use std::sync::Arc;

use parking_lot::{Condvar, Mutex};

use crate::blocking::BlockingDriver;
use crate::driver::IoDriver;
use crate::queue::{Consumer, Producer};
use crate::request::{AsyncRequest, AsyncResponse};

/// Default name of the I/O worker thread.
pub const DEFAULT_WORKER_NAME: &str = "redlilium-io";

/// Default stack size of the I/O worker thread.
pub const DEFAULT_WORKER_STACK_SIZE: usize = 128 * 1024;

/// Thread parameters for the async driver's worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerConfig {
    pub name: String,
    pub stack_size: usize,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_WORKER_NAME.to_owned(),
            stack_size: DEFAULT_WORKER_STACK_SIZE,
        }
    }
}

struct WakeState {
    pending: usize,
    stopping: bool,
}

/// Sleep/wake handshake between the submitting thread and the worker.
///
/// `pending` counts requests pushed but not yet taken by the worker. It only
/// changes under the lock, together with the queue push, so the worker never
/// sleeps while work is queued.
pub(crate) struct WakeSignal {
    state: Mutex<WakeState>,
    condvar: Condvar,
}

impl WakeSignal {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(WakeState {
                pending: 0,
                stopping: false,
            }),
            condvar: Condvar::new(),
        }
    }

    /// Push `item` and wake the worker.
    pub fn submit<T>(&self, queue: &Producer<T>, item: T) {
        let mut state = self.state.lock();
        queue.push(item);
        state.pending += 1;
        drop(state);
        self.condvar.notify_one();
    }

    /// Record that the worker took one request off the queue.
    pub fn taken(&self) {
        let mut state = self.state.lock();
        state.pending = state.pending.saturating_sub(1);
    }

    /// Block until work is pending or a stop was requested.
    ///
    /// Returns `false` once stopping.
    pub fn wait(&self) -> bool {
        let mut state = self.state.lock();
        while state.pending == 0 && !state.stopping {
            self.condvar.wait(&mut state);
        }
        !state.stopping
    }

    pub fn stop(&self) {
        self.state.lock().stopping = true;
        self.condvar.notify_all();
    }

    pub fn is_stopping(&self) -> bool {
        self.state.lock().stopping
    }
}

/// The worker side of an async driver.
pub(crate) struct Worker {
    pub disk: BlockingDriver,
    pub requests: Consumer<AsyncRequest>,
    pub responses: Producer<AsyncResponse>,
    pub signal: Arc<WakeSignal>,
}

impl Worker {
    pub fn run(self) {
        log::debug!("I/O worker started (root '{}')", self.disk.root_uri());

        'outer: while self.signal.wait() {
            while let Some(request) = self.requests.pop() {
                self.signal.taken();
                let response = self.execute(request);
                self.responses.push(response);

                if self.signal.is_stopping() {
                    break 'outer;
                }
            }
        }

        log::debug!("I/O worker stopped");
    }

    fn execute(&self, request: AsyncRequest) -> AsyncResponse {
        match request {
            AsyncRequest::Read { uri, kind } => {
                log::trace!("Async read '{uri}' ({kind:?})");
                let (block, result) = self.disk.read_raw(&uri, kind);
                AsyncResponse::from_read(uri, block, result)
            }
            AsyncRequest::Write { uri, kind, payload } => {
                log::trace!("Async write '{uri}' ({kind:?}, {} bytes)", payload.size());
                let (written, result) = self.disk.write_raw(&uri, &payload, kind);
                payload.release();
                AsyncResponse::from_write(uri, written, result)
            }
        }
    }
}
