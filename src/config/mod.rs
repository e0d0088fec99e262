// src/config/mod.rs

//! Build file loading and validation.
//!
//! - `model.rs`: the TOML-backed data model.
//! - `loader.rs`: reading a file from disk.
//! - `validate.rs`: structural checks run by `ConfigFile::try_from`.
//! - `plan.rs`: static dependency order for dry runs.

pub mod loader;
pub mod model;
pub mod plan;
pub mod validate;

pub use loader::{default_config_path, load_and_validate, load_from_path};
pub use model::{ConfigFile, ConfigSection, RawConfigFile, TaskConfig, WatchConfig};
pub use plan::{PlannedTask, execution_order};
