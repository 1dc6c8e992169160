//! lutwatch - color grade incoming photos with a 3D LUT
//!
//! Watches a directory for JPEG files, applies a `.cube` LUT to each one,
//! carries the original metadata over and atomically writes the result to
//! an output directory. This library exposes modules for integration testing.

pub mod codec;
pub mod error;
pub mod models;
pub mod services;
