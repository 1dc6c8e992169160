use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use cube_lut::{LutTable, PixelTransformer};

use crate::codec::{Codec, JpegCodec, JpegMetadataCopier, MetadataTransfer};
use crate::error::PipelineError;
use crate::models::{FileAction, FileChangeEvent};

/// Marker appended to the output path while a result is being written.
/// Files carrying it are never picked up as input.
pub const TEMP_SUFFIX: &str = ".tmp_lut_proc";

/// Summary of one successful pipeline run
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineReport {
    pub source: PathBuf,
    pub output: PathBuf,
    pub width: u32,
    pub height: u32,
    pub elapsed: Duration,
}

/// Decode → LUT → encode → metadata → commit for a single file
pub struct Pipeline {
    lut_path: PathBuf,
    codec: Arc<dyn Codec>,
    metadata: Arc<dyn MetadataTransfer>,
    transformer: PixelTransformer,
}

impl Pipeline {
    /// Pipeline using the JPEG codec and JPEG metadata copier
    pub fn new(lut_path: impl Into<PathBuf>) -> Self {
        Self::with_backends(
            lut_path,
            Arc::new(JpegCodec::new()),
            Arc::new(JpegMetadataCopier::new()),
        )
    }

    pub fn with_backends(
        lut_path: impl Into<PathBuf>,
        codec: Arc<dyn Codec>,
        metadata: Arc<dyn MetadataTransfer>,
    ) -> Self {
        Self {
            lut_path: lut_path.into(),
            codec,
            metadata,
            transformer: PixelTransformer::new(),
        }
    }

    /// Process `source` into `output`.
    ///
    /// The result is written next to `output` under a temporary name and
    /// renamed into place only after encoding and metadata transfer both
    /// succeeded. On any error `output` is left as it was and the temporary
    /// file is removed.
    pub fn run(
        &self,
        source: &Path,
        output: &Path,
        quality: u8,
    ) -> Result<PipelineReport, PipelineError> {
        let started = Instant::now();

        let mut buffer = self
            .codec
            .load(source)
            .map_err(|source_err| PipelineError::Decode {
                path: source.to_path_buf(),
                source: source_err,
            })?;
        tracing::debug!(
            path = %source.display(),
            width = buffer.width(),
            height = buffer.height(),
            "Decoded source image"
        );

        // Loaded per run so an edited LUT takes effect on the next file
        let table = LutTable::load(&self.lut_path).map_err(|e| PipelineError::LutLoad {
            path: self.lut_path.clone(),
            source: e,
        })?;
        tracing::debug!(
            path = %self.lut_path.display(),
            lattice_size = table.lattice_size(),
            "Loaded LUT"
        );

        self.transformer.apply(&mut buffer, &table);

        let temp = TempFileGuard::new(temp_path_for(output));

        self.codec
            .save(&buffer, temp.path(), quality)
            .map_err(|e| PipelineError::Encode {
                path: temp.path().to_path_buf(),
                source: e,
            })?;
        tracing::debug!(path = %temp.path().display(), quality, "Encoded transformed image");

        self.metadata
            .copy(source, temp.path())
            .map_err(|e| PipelineError::Metadata {
                path: temp.path().to_path_buf(),
                source: e,
            })?;

        temp.commit(output).map_err(|e| PipelineError::Commit {
            path: output.to_path_buf(),
            source: e,
        })?;

        Ok(PipelineReport {
            source: source.to_path_buf(),
            output: output.to_path_buf(),
            width: buffer.width(),
            height: buffer.height(),
            elapsed: started.elapsed(),
        })
    }
}

/// `output` with [`TEMP_SUFFIX`] appended to the full file name
pub fn temp_path_for(output: &Path) -> PathBuf {
    let mut name = output.as_os_str().to_os_string();
    name.push(TEMP_SUFFIX);
    PathBuf::from(name)
}

/// Whether an event should run through the pipeline: only additions and
/// modifications of `.jpg`/`.jpeg` files that are not our own temp files.
pub fn should_process(event: &FileChangeEvent) -> bool {
    if !matches!(event.action, FileAction::Added | FileAction::Modified) {
        return false;
    }

    if event.path.to_string_lossy().contains(TEMP_SUFFIX) {
        return false;
    }

    event
        .path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("jpg") || ext.eq_ignore_ascii_case("jpeg"))
        .unwrap_or(false)
}

/// Deletes the temp file when dropped unless it was committed
struct TempFileGuard {
    path: PathBuf,
    committed: bool,
}

impl TempFileGuard {
    fn new(path: PathBuf) -> Self {
        Self {
            path,
            committed: false,
        }
    }

    fn path(&self) -> &Path {
        &self.path
    }

    /// Replace `output` with the temp file
    fn commit(mut self, output: &Path) -> io::Result<()> {
        match std::fs::remove_file(output) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e),
        }
        std::fs::rename(&self.path, output)?;
        self.committed = true;
        Ok(())
    }
}

impl Drop for TempFileGuard {
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        match std::fs::remove_file(&self.path) {
            Ok(()) => tracing::debug!(path = %self.path.display(), "Removed temp file"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Failed to remove temp file")
            }
        }
    }
}
