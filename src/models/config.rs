use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::ConfigError;

/// Resolved application configuration
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Directory to monitor for incoming images
    pub watch_dir: PathBuf,

    /// Directory receiving transformed images
    pub output_dir: PathBuf,

    /// The `.cube` LUT applied to every image
    pub lut_path: PathBuf,

    /// JPEG encode quality (1-100)
    pub quality: u8,

    pub retry: RetryConfig,

    /// Skip events for sources whose size and mtime match the last successful run
    pub skip_unchanged: bool,
}

/// Contents of config.yaml. Every key is optional here so that environment
/// variables and CLI flags can fill the gaps.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct ConfigFile {
    #[serde(default)]
    pub watch_dir: Option<PathBuf>,

    #[serde(default)]
    pub output_dir: Option<PathBuf>,

    #[serde(default)]
    pub lut_path: Option<PathBuf>,

    #[serde(default)]
    pub quality: Option<u8>,

    #[serde(default)]
    pub retry: RetryConfig,

    #[serde(default)]
    pub skip_unchanged: Option<bool>,
}

/// Retry policy for a failed pipeline run
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct RetryConfig {
    /// Total attempts per event, including the first
    #[serde(default = "default_attempts")]
    pub attempts: u32,

    /// Pause between attempts in milliseconds
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,
}

fn default_attempts() -> u32 {
    3
}

fn default_delay_ms() -> u64 {
    500
}

/// JPEG quality used when none is configured
pub const DEFAULT_QUALITY: u8 = 90;

fn default_quality() -> u8 {
    DEFAULT_QUALITY
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            attempts: default_attempts(),
            delay_ms: default_delay_ms(),
        }
    }
}

impl RetryConfig {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

/// Settings that take precedence over config.yaml (environment, then CLI)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigOverrides {
    pub watch_dir: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub lut_path: Option<PathBuf>,
    pub quality: Option<u8>,
}

impl ConfigOverrides {
    /// Read WATCH_DIR, OUTPUT_DIR, LUT_PATH and JPEG_QUALITY from the environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ConfigOverrides::from_env`] with an injectable variable source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let quality = match lookup("JPEG_QUALITY") {
            Some(value) => Some(value.trim().parse::<u8>().map_err(|_| {
                ConfigError::InvalidValue {
                    key: "JPEG_QUALITY",
                    value,
                }
            })?),
            None => None,
        };

        Ok(Self {
            watch_dir: lookup("WATCH_DIR").map(PathBuf::from),
            output_dir: lookup("OUTPUT_DIR").map(PathBuf::from),
            lut_path: lookup("LUT_PATH").map(PathBuf::from),
            quality,
        })
    }

    /// Layer `other` on top of `self`; values set in `other` win
    pub fn merge(self, other: ConfigOverrides) -> Self {
        Self {
            watch_dir: other.watch_dir.or(self.watch_dir),
            output_dir: other.output_dir.or(self.output_dir),
            lut_path: other.lut_path.or(self.lut_path),
            quality: other.quality.or(self.quality),
        }
    }
}

impl ConfigFile {
    /// Load config.yaml from disk
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_yaml(&content)?;
        tracing::info!(path = %path.display(), "Loaded configuration file");
        Ok(config)
    }

    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(content)?)
    }
}

/// JPEG quality must be 1-100
pub fn validate_quality(quality: u8) -> Result<(), ConfigError> {
    if !(1..=100).contains(&quality) {
        return Err(ConfigError::InvalidQuality(quality));
    }
    Ok(())
}

fn same_directory(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }
    match (std::fs::canonicalize(a), std::fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

impl AppConfig {
    /// Combine the config file with overrides and validate the result
    pub fn resolve(file: ConfigFile, overrides: ConfigOverrides) -> Result<Self, ConfigError> {
        let config = Self {
            watch_dir: overrides
                .watch_dir
                .or(file.watch_dir)
                .ok_or(ConfigError::Missing("watch_dir"))?,
            output_dir: overrides
                .output_dir
                .or(file.output_dir)
                .ok_or(ConfigError::Missing("output_dir"))?,
            lut_path: overrides
                .lut_path
                .or(file.lut_path)
                .ok_or(ConfigError::Missing("lut_path"))?,
            quality: overrides
                .quality
                .or(file.quality)
                .unwrap_or_else(default_quality),
            retry: file.retry,
            skip_unchanged: file.skip_unchanged.unwrap_or(true),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_quality(self.quality)?;
        if self.retry.attempts == 0 {
            return Err(ConfigError::InvalidRetry);
        }
        // Output written into the watched directory would replace the source
        // and retrigger the pipeline on its own result
        if same_directory(&self.watch_dir, &self.output_dir) {
            return Err(ConfigError::SameDirectory(self.output_dir.clone()));
        }
        Ok(())
    }

    /// Where the transformed copy of `source` is written
    pub fn output_path_for(&self, source: &Path) -> Option<PathBuf> {
        source.file_name().map(|name| self.output_dir.join(name))
    }
}
