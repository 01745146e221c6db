// vaultlint-core/src/infrastructure/mod.rs

pub mod bridge;
pub mod cache;
pub mod config;
pub mod error;
pub mod templates;

pub use bridge::{BridgeClient, BridgeSettings};
pub use cache::{CacheStats, QueryCache};
pub use config::{ValidationConfig, find_config_file, load};
pub use error::InfrastructureError;
