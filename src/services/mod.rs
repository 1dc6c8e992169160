pub mod directory_monitor;
pub mod dispatcher;
pub mod pipeline;

pub use directory_monitor::DirectoryMonitor;
pub use dispatcher::{DispatchOutcome, EventDispatcher, FileSignature};
pub use pipeline::{should_process, temp_path_for, Pipeline, PipelineReport, TEMP_SUFFIX};
