//! Shared utilities: configuration, logging setup, progress reporting

pub mod app_data;
pub mod logging;
pub mod progress;

pub use app_data::{AppConfig, get_app_data_dir, get_config_path};
pub use logging::{Verbosity, init_logging};
