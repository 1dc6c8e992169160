//! Image codec and metadata collaborators used by the pipeline.
//!
//! Both are traits so the pipeline can be exercised with stand-ins; the
//! JPEG implementations are what the binary wires up.

pub mod jpeg;
pub mod metadata;

use std::path::Path;

use cube_lut::PixelBuffer;

use crate::error::{CodecError, MetadataError};

pub use jpeg::JpegCodec;
pub use metadata::JpegMetadataCopier;

/// Decode and encode RGB8 images
pub trait Codec: Send + Sync {
    fn load(&self, path: &Path) -> Result<PixelBuffer, CodecError>;

    /// Encode `buffer` to `path`. `quality` is 1-100 and passed through as-is.
    fn save(&self, buffer: &PixelBuffer, path: &Path, quality: u8) -> Result<(), CodecError>;
}

/// Copy embedded metadata (EXIF and friends) from one image file to another
pub trait MetadataTransfer: Send + Sync {
    /// Rewrites `dest` in place with the metadata blocks found in `source`
    fn copy(&self, source: &Path, dest: &Path) -> Result<(), MetadataError>;
}
