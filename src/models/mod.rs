pub mod config;
pub mod event;

pub use config::{AppConfig, ConfigFile, ConfigOverrides, RetryConfig, DEFAULT_QUALITY};
pub use config::validate_quality;
pub use event::{FileAction, FileChangeEvent};
