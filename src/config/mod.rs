//! Configuration loading and management.
//!
//! This module is split into logical submodules:
//! - [`types`]: Config struct definitions and TOML loading
//! - [`env`]: Loading from `PUMP19_*` environment variables
//! - [`defaults`]: Serde default value functions
//! - [`validation`]: Startup validation returning every problem found

mod defaults;
mod env;
mod types;
mod validation;

pub use types::{CommandConfig, Config, DatabaseConfig, IrcConfig};
pub use validation::validate;
