//! Routes monitor events into the pipeline.
//!
//! The dispatcher is the handler the directory monitor calls for every
//! event. It filters, skips sources that have not changed since their last
//! successful run, and retries failed runs. Nothing escapes it: failures are
//! logged and the event is dropped after the last attempt.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::models::{AppConfig, FileChangeEvent};
use crate::services::pipeline::{should_process, Pipeline, PipelineReport};

/// Size and modification time of a source file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileSignature {
    pub len: u64,
    pub modified: Option<SystemTime>,
}

impl FileSignature {
    pub fn of(path: &Path) -> std::io::Result<Self> {
        let metadata = std::fs::metadata(path)?;
        Ok(Self {
            len: metadata.len(),
            modified: metadata.modified().ok(),
        })
    }
}

/// What the dispatcher did with one event
#[derive(Debug)]
pub enum DispatchOutcome {
    /// Not a JPEG addition or modification
    Ignored,
    /// Same size and mtime as the last successful run
    Unchanged,
    /// Source disappeared before it could be processed
    Vanished,
    Processed(PipelineReport),
    /// Every attempt failed
    Dropped { attempts: u32 },
}

pub struct EventDispatcher {
    config: AppConfig,
    pipeline: Pipeline,
    processed: HashMap<PathBuf, FileSignature>,
}

impl EventDispatcher {
    pub fn new(config: AppConfig, pipeline: Pipeline) -> Self {
        Self {
            config,
            pipeline,
            processed: HashMap::new(),
        }
    }

    pub fn handle(&mut self, event: FileChangeEvent) -> DispatchOutcome {
        if !should_process(&event) {
            tracing::trace!(path = %event.path.display(), action = %event.action, "Ignoring event");
            return DispatchOutcome::Ignored;
        }

        let Some(output) = self.config.output_path_for(&event.path) else {
            return DispatchOutcome::Ignored;
        };

        let signature = if self.config.skip_unchanged {
            match FileSignature::of(&event.path) {
                Ok(signature) => {
                    if self.processed.get(&event.path) == Some(&signature) {
                        tracing::debug!(path = %event.path.display(), "Source unchanged, skipping");
                        return DispatchOutcome::Unchanged;
                    }
                    Some(signature)
                }
                Err(_) => {
                    tracing::debug!(path = %event.path.display(), "Source vanished, skipping");
                    return DispatchOutcome::Vanished;
                }
            }
        } else {
            None
        };

        let retry = self.config.retry;
        for attempt in 1..=retry.attempts {
            match self.pipeline.run(&event.path, &output, self.config.quality) {
                Ok(report) => {
                    tracing::info!(
                        source = %report.source.display(),
                        output = %report.output.display(),
                        width = report.width,
                        height = report.height,
                        elapsed_ms = report.elapsed.as_millis() as u64,
                        "Processed image"
                    );
                    if let Some(signature) = signature {
                        self.processed.insert(event.path.clone(), signature);
                    }
                    return DispatchOutcome::Processed(report);
                }
                Err(e) if attempt < retry.attempts => {
                    tracing::warn!(
                        path = %event.path.display(),
                        attempt,
                        max_attempts = retry.attempts,
                        error = %e,
                        "Pipeline failed, retrying"
                    );
                    std::thread::sleep(retry.delay());
                }
                Err(e) => {
                    tracing::error!(
                        path = %event.path.display(),
                        attempts = retry.attempts,
                        error = %e,
                        "Pipeline failed, dropping event"
                    );
                }
            }
        }

        DispatchOutcome::Dropped {
            attempts: retry.attempts,
        }
    }
}
