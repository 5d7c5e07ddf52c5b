//! Configuration surface: diagnostic flags, TOML loading, shared storage.

mod loader;
mod store;
mod types;

pub use loader::ConfigError;
pub use store::ConfigStore;
pub use types::{Config, LogConfig};
