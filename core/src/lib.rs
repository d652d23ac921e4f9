//! # RedLilium Engine Core
//!
//! Core crate for RedLilium Engine basic utilities.

pub mod memory;

/// Core library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Log the core version at engine startup.
pub fn init() {
    log::info!("RedLilium Core v{} initialized", VERSION);
}
