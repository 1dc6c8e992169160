//! Codec and metadata stand-ins that fail on demand.

use std::path::Path;
use std::sync::atomic::{AtomicU32, Ordering};

use cube_lut::PixelBuffer;
use lutwatch::codec::{Codec, JpegCodec, MetadataTransfer};
use lutwatch::error::{CodecError, MetadataError};

/// Metadata transfer that always fails
pub struct FailingMetadata;

impl MetadataTransfer for FailingMetadata {
    fn copy(&self, _source: &Path, dest: &Path) -> Result<(), MetadataError> {
        Err(MetadataError::Truncated(dest.to_path_buf()))
    }
}

/// JPEG codec whose first `failures` loads fail. Counts every load.
pub struct FlakyCodec {
    inner: JpegCodec,
    failures_left: AtomicU32,
    loads: AtomicU32,
}

impl FlakyCodec {
    pub fn new(failures: u32) -> Self {
        Self {
            inner: JpegCodec::new(),
            failures_left: AtomicU32::new(failures),
            loads: AtomicU32::new(0),
        }
    }

    /// Codec that never succeeds
    pub fn always_failing() -> Self {
        Self::new(u32::MAX)
    }

    pub fn loads(&self) -> u32 {
        self.loads.load(Ordering::SeqCst)
    }
}

impl Codec for FlakyCodec {
    fn load(&self, path: &Path) -> Result<PixelBuffer, CodecError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        let failing = self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(CodecError::Decode("simulated decode failure".to_string()));
        }
        self.inner.load(path)
    }

    fn save(&self, buffer: &PixelBuffer, path: &Path, quality: u8) -> Result<(), CodecError> {
        self.inner.save(buffer, path, quality)
    }
}

/// Codec that writes half a file and then reports an encode failure
pub struct PartialWriteCodec;

impl Codec for PartialWriteCodec {
    fn load(&self, path: &Path) -> Result<PixelBuffer, CodecError> {
        JpegCodec::new().load(path)
    }

    fn save(&self, _buffer: &PixelBuffer, path: &Path, _quality: u8) -> Result<(), CodecError> {
        std::fs::write(path, [0xFF, 0xD8, 0xFF, 0xE0])?;
        Err(CodecError::Encode("disk full".to_string()))
    }
}
