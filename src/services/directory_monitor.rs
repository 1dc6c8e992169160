//! Directory monitor.
//!
//! Watches a single directory (non-recursively) and hands every reported
//! change to a registered handler on a dedicated thread. The notification
//! backend and [`DirectoryMonitor::stop`] feed the same channel, so a stop
//! request wakes the thread even while it is blocked waiting for events.
//!
//! No debouncing happens here: one write commonly produces several
//! `Modified` events and handlers have to tolerate duplicates.

use notify::event::{AccessKind, AccessMode, ModifyKind, RenameMode};
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use tokio::sync::mpsc;

use crate::error::MonitorError;
use crate::models::{FileAction, FileChangeEvent};

enum MonitorMessage {
    Batch(notify::Result<Event>),
    Shutdown,
}

struct ActiveWatch {
    directory: PathBuf,
    /// Dropping the watcher releases the OS watch
    watcher: RecommendedWatcher,
    control: mpsc::UnboundedSender<MonitorMessage>,
    thread: JoinHandle<()>,
}

/// Monitors one directory and delivers [`FileChangeEvent`]s to a handler
pub struct DirectoryMonitor {
    running: Arc<AtomicBool>,
    active: Option<ActiveWatch>,
}

impl DirectoryMonitor {
    pub fn new() -> Self {
        Self {
            running: Arc::new(AtomicBool::new(false)),
            active: None,
        }
    }

    /// Start watching `directory`. The handler runs on the monitor thread,
    /// once per event, in the order the OS reported them.
    pub fn start<F>(&mut self, directory: impl AsRef<Path>, handler: F) -> Result<(), MonitorError>
    where
        F: FnMut(FileChangeEvent) + Send + 'static,
    {
        if self.active.is_some() || self.is_running() {
            return Err(MonitorError::AlreadyRunning);
        }

        let directory = directory.as_ref().to_path_buf();
        let open_error = |source: notify::Error| MonitorError::Open {
            path: directory.clone(),
            source,
        };

        if !directory.exists() {
            return Err(open_error(
                notify::Error::path_not_found().add_path(directory.clone()),
            ));
        }
        if !directory.is_dir() {
            return Err(open_error(
                notify::Error::generic("not a directory").add_path(directory.clone()),
            ));
        }

        let (control, rx) = mpsc::unbounded_channel::<MonitorMessage>();
        let backend_tx = control.clone();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| {
                // Receiver is gone once the monitor stopped
                let _ = backend_tx.send(MonitorMessage::Batch(res));
            },
            Config::default(),
        )
        .map_err(open_error)?;

        watcher
            .watch(&directory, RecursiveMode::NonRecursive)
            .map_err(open_error)?;

        self.running.store(true, Ordering::SeqCst);
        let running = self.running.clone();
        let thread = std::thread::Builder::new()
            .name("directory-monitor".to_string())
            .spawn(move || monitor_loop(rx, running, handler));

        let thread = match thread {
            Ok(thread) => thread,
            Err(e) => {
                self.running.store(false, Ordering::SeqCst);
                return Err(open_error(notify::Error::io(e)));
            }
        };

        tracing::info!(path = %directory.display(), "Directory monitor started");

        self.active = Some(ActiveWatch {
            directory,
            watcher,
            control,
            thread,
        });
        Ok(())
    }

    /// Stop watching and wait for the monitor thread to exit.
    ///
    /// Calling this when the monitor is not running does nothing. A pipeline
    /// run already in progress on the monitor thread finishes first.
    pub fn stop(&mut self) {
        let Some(active) = self.active.take() else {
            return;
        };

        self.running.store(false, Ordering::SeqCst);
        let _ = active.control.send(MonitorMessage::Shutdown);
        drop(active.watcher);

        if active.thread.join().is_err() {
            tracing::error!(path = %active.directory.display(), "Directory monitor thread panicked");
        }
        tracing::info!(path = %active.directory.display(), "Directory monitor stopped");
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Directory currently being watched
    pub fn directory(&self) -> Option<&Path> {
        self.active.as_ref().map(|a| a.directory.as_path())
    }
}

impl Default for DirectoryMonitor {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for DirectoryMonitor {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Clears the running flag when the monitor thread exits, also on panic
struct RunningGuard(Arc<AtomicBool>);

impl Drop for RunningGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

fn monitor_loop<F>(
    mut rx: mpsc::UnboundedReceiver<MonitorMessage>,
    running: Arc<AtomicBool>,
    mut handler: F,
) where
    F: FnMut(FileChangeEvent),
{
    let _guard = RunningGuard(running.clone());

    while let Some(message) = rx.blocking_recv() {
        if !running.load(Ordering::SeqCst) {
            break;
        }
        match message {
            MonitorMessage::Shutdown => break,
            MonitorMessage::Batch(Ok(event)) => {
                if event.need_rescan() {
                    tracing::warn!("Notification buffer overflowed, some file events were lost");
                }
                for change in translate(&event) {
                    if !running.load(Ordering::SeqCst) {
                        break;
                    }
                    tracing::trace!(path = %change.path.display(), action = %change.action, "File event");
                    handler(change);
                }
            }
            MonitorMessage::Batch(Err(e)) => {
                tracing::warn!(error = %e, "Directory notification error, events may have been lost");
            }
        }
    }
}

/// Convert one backend event into zero or more [`FileChangeEvent`]s, one per path.
pub fn translate(event: &Event) -> Vec<FileChangeEvent> {
    let action = match event.kind {
        EventKind::Create(_) => FileAction::Added,
        EventKind::Remove(_) => FileAction::Removed,
        EventKind::Modify(ModifyKind::Name(RenameMode::From)) => FileAction::RenamedOld,
        EventKind::Modify(ModifyKind::Name(RenameMode::To)) => FileAction::RenamedNew,
        EventKind::Modify(ModifyKind::Name(RenameMode::Both)) => {
            // paths are [old, new]
            return event
                .paths
                .iter()
                .enumerate()
                .map(|(i, path)| {
                    let action = if i == 0 {
                        FileAction::RenamedOld
                    } else {
                        FileAction::RenamedNew
                    };
                    FileChangeEvent::new(path.clone(), action)
                })
                .collect();
        }
        EventKind::Modify(ModifyKind::Name(_)) => {
            // Backends that cannot tell the two sides apart; the side that
            // still exists is the new name
            return event
                .paths
                .iter()
                .map(|path| {
                    let action = if path.exists() {
                        FileAction::RenamedNew
                    } else {
                        FileAction::RenamedOld
                    };
                    FileChangeEvent::new(path.clone(), action)
                })
                .collect();
        }
        EventKind::Modify(_) => FileAction::Modified,
        EventKind::Access(AccessKind::Close(AccessMode::Write)) => FileAction::Modified,
        _ => return Vec::new(),
    };

    event
        .paths
        .iter()
        .map(|path| FileChangeEvent::new(path.clone(), action))
        .collect()
}
