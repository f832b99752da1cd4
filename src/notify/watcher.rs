//! Directory watching and the background reload loop.

use crate::core::Data;
use crate::error::{ConfigError, Result};
use arc_swap::ArcSwapOption;
use notify::event::ModifyKind;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher as NotifyWatcher};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, Weak};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

/// Filesystem operations that trigger a reload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeOp {
    /// A file or directory was created.
    Create,
    /// File content was written.
    Write,
    /// A file or directory was removed.
    Remove,
    /// A file or directory was renamed.
    Rename,
}

impl ChangeOp {
    /// Classify a notify event kind. Returns `None` for events that cannot
    /// change configuration content, such as access or metadata changes.
    pub fn from_kind(kind: &EventKind) -> Option<Self> {
        match kind {
            EventKind::Create(_) => Some(Self::Create),
            EventKind::Remove(_) => Some(Self::Remove),
            EventKind::Modify(ModifyKind::Name(_)) => Some(Self::Rename),
            EventKind::Modify(ModifyKind::Data(_) | ModifyKind::Any) => Some(Self::Write),
            _ => None,
        }
    }
}

/// A live filesystem subscription.
///
/// Dropping the handle shuts the notify backend down, which closes the event
/// channels feeding the watch loop.
pub struct WatchHandle {
    // Mutex only makes the handle Sync on every notify backend.
    _watcher: Mutex<RecommendedWatcher>,
    directory: PathBuf,
}

impl WatchHandle {
    /// The directory this handle watches.
    pub fn directory(&self) -> &Path {
        &self.directory
    }
}

impl Drop for WatchHandle {
    fn drop(&mut self) {
        debug!(dir = %self.directory.display(), "releasing watch handle");
    }
}

/// Watches one directory at a time and republishes configuration on change.
///
/// At most one [`WatchHandle`] is installed at any moment. The slot holding it
/// is swapped atomically, so a concurrent [`close`](Self::close) and
/// [`start`](Self::start) never leave two live handles behind.
pub struct DirectoryWatcher {
    slot: Arc<ArcSwapOption<WatchHandle>>,
}

impl DirectoryWatcher {
    /// Create a watcher with no handle installed.
    pub fn new() -> Self {
        Self {
            slot: Arc::new(ArcSwapOption::empty()),
        }
    }

    /// Returns `true` while a handle is installed.
    pub fn is_watching(&self) -> bool {
        self.slot.load().is_some()
    }

    /// Start watching `directory` and spawn the reload loop.
    ///
    /// On every create, write, remove or rename event the loop calls `reload`
    /// on tokio's blocking pool and sends a successful result to `data_tx`,
    /// waiting until the receiver has room. Failed reloads are discarded. The
    /// loop ends once the handle is released (see [`close`](Self::close)) or
    /// the receiver is dropped. A loop parked on a full `data_tx` only notices
    /// either of these after that send completes.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::AlreadyWatching`] if a handle is already
    /// installed, or [`ConfigError::WatchError`] if the notify backend cannot
    /// be created or the directory cannot be registered.
    pub fn start<F>(
        &self,
        directory: &Path,
        reload: F,
        data_tx: mpsc::Sender<Data>,
    ) -> Result<JoinHandle<()>>
    where
        F: Fn() -> Result<Data> + Send + Sync + 'static,
    {
        if self.is_watching() {
            return Err(ConfigError::AlreadyWatching);
        }

        let (event_tx, event_rx) = mpsc::unbounded_channel::<Event>();
        let (error_tx, error_rx) = mpsc::unbounded_channel::<notify::Error>();

        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            match res {
                Ok(event) => {
                    let _ = event_tx.send(event);
                }
                Err(e) => {
                    let _ = error_tx.send(e);
                }
            }
        })
        .map_err(|e| ConfigError::WatchError(format!("Failed to create file watcher: {}", e)))?;

        watcher
            .watch(directory, RecursiveMode::Recursive)
            .map_err(|e| ConfigError::WatchError(format!("Failed to watch path: {}", e)))?;

        let handle = Arc::new(WatchHandle {
            _watcher: Mutex::new(watcher),
            directory: directory.to_path_buf(),
        });

        let previous = self
            .slot
            .compare_and_swap(&None::<Arc<WatchHandle>>, Some(Arc::clone(&handle)));
        if previous.is_some() {
            return Err(ConfigError::AlreadyWatching);
        }

        let guard = SlotGuard {
            slot: Arc::clone(&self.slot),
            handle: Arc::downgrade(&handle),
        };
        drop(handle);

        info!(dir = %directory.display(), "watching configuration directory");

        let watch_loop = WatchLoop {
            directory: directory.to_path_buf(),
            events: event_rx,
            errors: error_rx,
            data_tx,
        };
        Ok(tokio::spawn(watch_loop.run(reload, guard)))
    }

    /// Release the installed handle, if any.
    ///
    /// Idempotent: closing a watcher that never started, or closing twice,
    /// does nothing.
    ///
    /// The loop exits once the notify backend has shut down. If it is blocked
    /// sending a snapshot to a consumer that is not reading, it keeps the
    /// sender and stays alive until that send completes or the receiver is
    /// dropped.
    pub fn close(&self) {
        if let Some(handle) = self.slot.swap(None) {
            debug!(dir = %handle.directory.display(), "closing file watcher");
        }
    }
}

impl Default for DirectoryWatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for DirectoryWatcher {
    fn drop(&mut self) {
        self.close();
    }
}

/// Releases the loop's own handle when the loop exits, unless it was already
/// released or replaced.
struct SlotGuard {
    slot: Arc<ArcSwapOption<WatchHandle>>,
    handle: Weak<WatchHandle>,
}

impl Drop for SlotGuard {
    fn drop(&mut self) {
        let current = self.slot.load();
        let ours = match &*current {
            Some(installed) => std::ptr::eq(Arc::as_ptr(installed), self.handle.as_ptr()),
            None => false,
        };
        if ours {
            let _ = self.slot.compare_and_swap(&current, None::<Arc<WatchHandle>>);
        }
    }
}

struct WatchLoop {
    directory: PathBuf,
    events: mpsc::UnboundedReceiver<Event>,
    errors: mpsc::UnboundedReceiver<notify::Error>,
    data_tx: mpsc::Sender<Data>,
}

impl WatchLoop {
    async fn run<F>(mut self, reload: F, _guard: SlotGuard)
    where
        F: Fn() -> Result<Data> + Send + Sync + 'static,
    {
        let reload = Arc::new(reload);
        loop {
            tokio::select! {
                event = self.events.recv() => {
                    let Some(event) = event else {
                        debug!(
                            cause = "watcher event channel closed",
                            dir = %self.directory.display(),
                            "closing file watcher"
                        );
                        return;
                    };

                    let Some(op) = ChangeOp::from_kind(&event.kind) else {
                        continue;
                    };

                    let reload = Arc::clone(&reload);
                    let loaded = tokio::task::spawn_blocking(move || reload())
                        .await
                        .unwrap_or_else(|e| Err(ConfigError::IoError(e.into())));

                    match loaded {
                        Ok(data) => {
                            debug!(?op, paths = ?event.paths, "configuration changed");
                            if self.data_tx.send(data).await.is_err() {
                                debug!(
                                    cause = "output channel closed",
                                    dir = %self.directory.display(),
                                    "closing file watcher"
                                );
                                return;
                            }
                        }
                        // Partially written files are expected mid-save.
                        Err(e) => debug!(error = %e, ?op, "discarding failed reload"),
                    }
                }
                err = self.errors.recv() => {
                    let Some(err) = err else {
                        debug!(
                            cause = "watcher error channel closed",
                            dir = %self.directory.display(),
                            "closing file watcher"
                        );
                        return;
                    };

                    error!(
                        error = %err,
                        dir = %self.directory.display(),
                        "error while watching directory"
                    );
                }
            }
        }
    }
}
