use std::sync::Arc;

use redlilium_core::memory::MemoryPool;

use crate::async_driver::AsyncDriver;
use crate::blocking::BlockingDriver;
use crate::bundle::{AssetBundleResolver, BundleId};
use crate::config::IoDriverConfig;
use crate::driver::{IoDriver, OperationMode};
use crate::error::IoError;
use crate::events::IoDriverEvents;
use crate::path::AssetSource;

/// A blocking and an async driver sharing one root and one block pool.
///
/// The application owns this and hands out [`driver`](Self::driver) per call
/// site: startup code and tools read synchronously, streaming systems submit
/// asynchronously and poll once per frame.
///
/// # Example
///
/// ```ignore
/// let config = IoDriverConfig::load(Path::new("io.toml"))?;
/// let (mut io, pool) = IoDriverDual::start(&config, Some(Box::new(events)))?;
///
/// let settings = io.blocking.read_text("settings.toml", PathKind::Relative);
/// io.driver(OperationMode::Async).read("level1.bin", PathKind::Assets);
///
/// // Each frame:
/// io.run_async_loop();
/// ```
pub struct IoDriverDual {
    pub blocking: BlockingDriver,
    pub async_driver: AsyncDriver,
}

impl IoDriverDual {
    pub fn new() -> Self {
        Self {
            blocking: BlockingDriver::new(),
            async_driver: AsyncDriver::new(),
        }
    }

    /// Build uninitialized drivers from a config's asset and worker settings.
    pub fn from_config(config: &IoDriverConfig) -> Self {
        let assets = AssetSource::Directory(config.assets_dir.clone());
        let mut blocking = BlockingDriver::new();
        blocking.set_asset_source(assets.clone());
        let mut async_driver = AsyncDriver::with_worker(config.worker());
        async_driver.set_asset_source(assets);
        Self {
            blocking,
            async_driver,
        }
    }

    /// Validate `config`, create its block pool and start both drivers.
    pub fn start(
        config: &IoDriverConfig,
        callbacks: Option<Box<dyn IoDriverEvents>>,
    ) -> Result<(Self, MemoryPool), IoError> {
        config.validate()?;
        let pool = MemoryPool::try_new(config.block_pool_capacity)
            .map_err(|e| IoError::Config(e.to_string()))?;
        let mut dual = Self::from_config(config);
        dual.init(pool.clone(), &config.root_uri, callbacks)?;
        Ok((dual, pool))
    }

    /// Start both drivers. `callbacks` go to the async driver.
    ///
    /// If the async driver fails to start, the blocking driver is shut down
    /// again so both stay in the same state.
    pub fn init(
        &mut self,
        pool: MemoryPool,
        root_uri: &str,
        callbacks: Option<Box<dyn IoDriverEvents>>,
    ) -> Result<(), IoError> {
        self.blocking.init(pool.clone(), root_uri, None)?;
        if let Err(err) = self.async_driver.init(pool, root_uri, callbacks) {
            self.blocking.shutdown();
            return Err(err);
        }
        Ok(())
    }

    /// Route `Assets` paths of both drivers through `resolver`.
    ///
    /// Registers the "assets" bundle. Call before `init`; the async worker
    /// picks up its asset source when it starts.
    pub fn use_asset_bundles(&mut self, resolver: Arc<dyn AssetBundleResolver>) -> BundleId {
        let bundle = resolver.add_bundle("assets");
        let assets = AssetSource::Bundle { resolver, bundle };
        self.blocking.set_asset_source(assets.clone());
        self.async_driver.set_asset_source(assets);
        bundle
    }

    pub fn driver(&self, mode: OperationMode) -> &dyn IoDriver {
        match mode {
            OperationMode::Blocking => &self.blocking,
            OperationMode::Async => &self.async_driver,
        }
    }

    pub fn driver_mut(&mut self, mode: OperationMode) -> &mut dyn IoDriver {
        match mode {
            OperationMode::Blocking => &mut self.blocking,
            OperationMode::Async => &mut self.async_driver,
        }
    }

    /// Deliver finished async requests. Call once per frame.
    pub fn run_async_loop(&mut self) {
        self.async_driver.run_async_loop();
    }

    pub fn shutdown(&mut self) {
        self.async_driver.shutdown();
        self.blocking.shutdown();
    }
}

impl Default for IoDriverDual {
    fn default() -> Self {
        Self::new()
    }
}
