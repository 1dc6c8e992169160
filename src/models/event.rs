use std::fmt;
use std::path::PathBuf;

/// What happened to a file in the watched directory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileAction {
    Added,
    Removed,
    Modified,
    /// Previous name of a renamed file
    RenamedOld,
    /// New name of a renamed file
    RenamedNew,
}

impl fmt::Display for FileAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FileAction::Added => "added",
            FileAction::Removed => "removed",
            FileAction::Modified => "modified",
            FileAction::RenamedOld => "renamed-from",
            FileAction::RenamedNew => "renamed-to",
        };
        f.write_str(name)
    }
}

/// A single change reported by the directory monitor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileChangeEvent {
    /// Full path of the affected file
    pub path: PathBuf,
    pub action: FileAction,
    /// Size in bytes if known, 0 otherwise. The monitor never stats files,
    /// so events it produces always carry 0.
    pub size_hint: u64,
}

impl FileChangeEvent {
    pub fn new(path: impl Into<PathBuf>, action: FileAction) -> Self {
        Self {
            path: path.into(),
            action,
            size_hint: 0,
        }
    }
}
