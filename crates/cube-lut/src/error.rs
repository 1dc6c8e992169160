//! Error types for LUT loading and pixel buffers

use std::fmt;
use std::io;

/// Error returned when a `.cube` resource cannot be turned into a table.
#[derive(Debug)]
pub enum LutError {
    /// The resource could not be read
    Io(io::Error),
    /// The resource was read but does not describe a valid 3D table
    Malformed {
        /// 1-based line number, if the problem is tied to a line
        line: Option<usize>,
        /// What was wrong
        reason: String,
    },
}

impl LutError {
    pub(crate) fn at_line(line: usize, reason: impl Into<String>) -> Self {
        LutError::Malformed {
            line: Some(line),
            reason: reason.into(),
        }
    }

    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        LutError::Malformed {
            line: None,
            reason: reason.into(),
        }
    }
}

impl From<io::Error> for LutError {
    fn from(err: io::Error) -> Self {
        LutError::Io(err)
    }
}

impl fmt::Display for LutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LutError::Io(err) => write!(f, "failed to read LUT: {}", err),
            LutError::Malformed {
                line: Some(line),
                reason,
            } => write!(f, "malformed LUT at line {}: {}", line, reason),
            LutError::Malformed { line: None, reason } => {
                write!(f, "malformed LUT: {}", reason)
            }
        }
    }
}

impl std::error::Error for LutError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LutError::Io(err) => Some(err),
            _ => None,
        }
    }
}

/// Error returned when pixel data does not match its declared dimensions.
#[derive(Debug, Clone, PartialEq)]
pub enum BufferError {
    /// Width or height is zero
    EmptyDimensions { width: u32, height: u32 },
    /// Byte length differs from `width * height * 3`
    LengthMismatch { expected: usize, actual: usize },
}

impl fmt::Display for BufferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BufferError::EmptyDimensions { width, height } => {
                write!(f, "pixel buffer has empty dimensions {}x{}", width, height)
            }
            BufferError::LengthMismatch { expected, actual } => {
                write!(
                    f,
                    "pixel buffer length mismatch: expected {} bytes, got {}",
                    expected, actual
                )
            }
        }
    }
}

impl std::error::Error for BufferError {}
