//! Scratch directory layout shared by integration tests.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use lutwatch::codec::{Codec, JpegMetadataCopier, MetadataTransfer};
use lutwatch::models::{AppConfig, RetryConfig};
use lutwatch::services::{EventDispatcher, Pipeline};
use tempfile::TempDir;

use super::fixtures;

/// Temp directory with `in/`, `out/` and a `grade.cube`
pub struct TestWorkspace {
    dir: TempDir,
    pub watch_dir: PathBuf,
    pub output_dir: PathBuf,
    pub lut_path: PathBuf,
}

impl TestWorkspace {
    /// Workspace with a 17-point identity LUT
    pub fn new() -> Self {
        Self::with_lut(&fixtures::identity_cube(17))
    }

    pub fn with_lut(cube: &str) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let watch_dir = dir.path().join("in");
        let output_dir = dir.path().join("out");
        let lut_path = dir.path().join("grade.cube");

        std::fs::create_dir_all(&watch_dir).unwrap();
        std::fs::create_dir_all(&output_dir).unwrap();
        std::fs::write(&lut_path, cube).unwrap();

        Self {
            dir,
            watch_dir,
            output_dir,
            lut_path,
        }
    }

    /// Config pointing at this workspace with short retry delays
    pub fn config(&self) -> AppConfig {
        AppConfig {
            watch_dir: self.watch_dir.clone(),
            output_dir: self.output_dir.clone(),
            lut_path: self.lut_path.clone(),
            quality: 95,
            retry: RetryConfig {
                attempts: 3,
                delay_ms: 10,
            },
            skip_unchanged: true,
        }
    }

    /// Write a file into the watched directory
    pub fn write_source(&self, name: &str, bytes: &[u8]) -> PathBuf {
        let path = self.watch_dir.join(name);
        std::fs::write(&path, bytes).unwrap();
        path
    }

    pub fn output(&self, name: &str) -> PathBuf {
        self.output_dir.join(name)
    }

    pub fn pipeline(&self) -> Pipeline {
        Pipeline::new(self.lut_path.clone())
    }

    pub fn pipeline_with(
        &self,
        codec: Arc<dyn Codec>,
        metadata: Arc<dyn MetadataTransfer>,
    ) -> Pipeline {
        Pipeline::with_backends(self.lut_path.clone(), codec, metadata)
    }

    pub fn pipeline_with_codec(&self, codec: Arc<dyn Codec>) -> Pipeline {
        self.pipeline_with(codec, Arc::new(JpegMetadataCopier::new()))
    }

    /// Dispatcher over the real JPEG pipeline
    pub fn dispatcher(&self) -> EventDispatcher {
        EventDispatcher::new(self.config(), self.pipeline())
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }
}
