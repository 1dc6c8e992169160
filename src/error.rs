use std::io;
use std::path::PathBuf;

use cube_lut::{BufferError, LutError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("Directory monitor is already running")]
    AlreadyRunning,

    #[error("Cannot watch directory {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: notify::Error,
    },
}

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("Invalid JPEG data: {0}")]
    Decode(String),

    #[error("JPEG encoding failed: {0}")]
    Encode(String),

    #[error("Image too large to encode: {width}x{height}")]
    UnsupportedDimensions { width: u32, height: u32 },

    #[error("Pixel buffer error: {0}")]
    Buffer(#[from] BufferError),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("Not a JPEG file: {}", .0.display())]
    NotJpeg(PathBuf),

    #[error("Truncated JPEG segment in {}", .0.display())]
    Truncated(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Failure of one pipeline stage. Every variant names the file it was
/// working on so the retry wrapper can log it as-is.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Failed to decode {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: CodecError,
    },

    #[error("Failed to load LUT {}: {source}", path.display())]
    LutLoad {
        path: PathBuf,
        #[source]
        source: LutError,
    },

    #[error("Failed to encode {}: {source}", path.display())]
    Encode {
        path: PathBuf,
        #[source]
        source: CodecError,
    },

    #[error("Failed to copy metadata into {}: {source}", path.display())]
    Metadata {
        path: PathBuf,
        #[source]
        source: MetadataError,
    },

    #[error("Failed to commit {}: {source}", path.display())]
    Commit {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Missing required setting: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },

    #[error("JPEG quality must be between 1 and 100, got {0}")]
    InvalidQuality(u8),

    #[error("retry.attempts must be at least 1")]
    InvalidRetry,

    #[error("output_dir must differ from watch_dir ({})", .0.display())]
    SameDirectory(PathBuf),
}
