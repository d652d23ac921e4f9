//! Disk I/O drivers for the RedLilium engine.
//!
//! Two drivers share the [`IoDriver`] interface:
//!
//! - [`BlockingDriver`] performs each read or write on the calling thread.
//! - [`AsyncDriver`] hands requests to a dedicated worker thread and reports
//!   outcomes through [`IoDriverEvents`] when the owner polls
//!   [`run_async_loop`](IoDriver::run_async_loop), usually once per frame.
//!
//! [`IoDriverDual`] bundles both around one root directory and one
//! [`MemoryPool`](redlilium_core::memory::MemoryPool).
//!
//! # Paths
//!
//! Every request names a uri and a [`PathKind`]. `Relative` paths live under
//! the driver root, `Assets` paths under the read-only asset location (a
//! directory under the root or a platform bundle), and `Absolute` paths are
//! used as given.
//!
//! ```ignore
//! let (mut io, pool) = IoDriverDual::start(&IoDriverConfig::default(), Some(Box::new(events)))?;
//!
//! // Synchronous:
//! let config = io.blocking.read("config.txt", PathKind::Relative).ready().flatten();
//!
//! // Asynchronous, delivered on a later frame:
//! io.async_driver.read("level1.bin", PathKind::Assets);
//! io.run_async_loop();
//! ```
//!
//! # Results
//!
//! Per-request failures never panic and never surface as `Err`. Each request
//! ends in one [`IoResultKind`]; the drivers log failures and the async
//! driver invokes the matching callback. Only setup problems (double init,
//! worker spawn, bad config) are reported as [`IoError`].

mod async_driver;
mod blocking;
pub mod bundle;
mod config;
mod driver;
mod dual;
mod error;
mod events;
pub mod path;
pub mod queue;
mod request;
mod worker;

pub use async_driver::AsyncDriver;
pub use blocking::BlockingDriver;
pub use bundle::{AssetBundleResolver, BundleId, DirectoryBundles};
pub use config::{IoDriverConfig, MAX_BLOCK_POOL_CAPACITY};
pub use driver::{Completion, IoDriver, OperationMode};
pub use dual::IoDriverDual;
pub use error::{IoError, IoResultKind};
pub use events::IoDriverEvents;
pub use path::{AssetSource, PathKind};
pub use request::{AsyncRequest, AsyncResponse};
pub use worker::{WorkerConfig, DEFAULT_WORKER_NAME, DEFAULT_WORKER_STACK_SIZE};
