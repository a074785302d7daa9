use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use notify::RecursiveMode;
use notify_debouncer_mini::{new_debouncer, DebounceEventResult, Debouncer};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::error::{AppError, Result};
use crate::event::Event;

/// Default debounce interval in milliseconds.
pub const DEFAULT_DEBOUNCE_MS: u64 = 300;

/// Notification produced by the watcher thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchEvent {
    /// Something inside this watched directory changed; re-read it.
    Changed(PathBuf),
    /// The OS backend reported an error. Watching may have degraded.
    Error(String),
}

/// A live subscription on one directory.
#[derive(Debug, PartialEq, Eq)]
pub struct WatchHandle {
    path: PathBuf,
}

impl WatchHandle {
    pub(crate) fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Subscribes to change notifications for single directories.
pub trait DirectoryWatch {
    /// Start watching `path` (non-recursively).
    fn subscribe(&mut self, path: &Path) -> Result<WatchHandle>;

    /// Stop watching. Failures are logged, never surfaced.
    fn unsubscribe(&mut self, handle: WatchHandle);

    /// Whether subscriptions actually deliver events.
    fn is_live(&self) -> bool {
        true
    }
}

/// Filesystem watcher backed by notify, debounced, posting into the app mailbox.
///
/// Two subscribed paths may name one directory (a symlink alias, a bind
/// mount). The OS backend then shares a single kernel watch between them,
/// so it is only released when the last alias is unsubscribed.
pub struct DirWatcher {
    watched: Arc<Mutex<HashSet<PathBuf>>>,
    /// Canonical directory behind each subscribed path.
    identities: HashMap<PathBuf, PathBuf>,
    debouncer: Debouncer<notify::RecommendedWatcher>,
}

impl DirWatcher {
    /// Create a watcher with no subscriptions.
    ///
    /// Changes are collapsed per debounce window into one `Changed` per
    /// watched directory and sent via `event_tx`.
    pub fn new(debounce: Duration, event_tx: mpsc::UnboundedSender<Event>) -> notify::Result<Self> {
        let watched: Arc<Mutex<HashSet<PathBuf>>> = Arc::new(Mutex::new(HashSet::new()));
        let watched_clone = watched.clone();

        let debouncer = new_debouncer(debounce, move |result: DebounceEventResult| match result {
            Ok(events) => {
                let dirs: BTreeSet<PathBuf> = {
                    let watched = lock(&watched_clone);
                    events
                        .iter()
                        .filter_map(|e| owning_dir(&e.path, &watched))
                        .collect()
                };
                for dir in dirs {
                    if event_tx.send(Event::Watch(WatchEvent::Changed(dir))).is_err() {
                        return;
                    }
                }
            }
            Err(e) => {
                let _ = event_tx.send(Event::Watch(WatchEvent::Error(e.to_string())));
            }
        })?;

        Ok(Self {
            watched,
            identities: HashMap::new(),
            debouncer,
        })
    }
}

impl DirectoryWatch for DirWatcher {
    fn subscribe(&mut self, path: &Path) -> Result<WatchHandle> {
        self.debouncer
            .watcher()
            .watch(path, RecursiveMode::NonRecursive)
            .map_err(|source| AppError::WatchSetup {
                path: path.to_path_buf(),
                source,
            })?;
        let identity = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        self.identities.insert(path.to_path_buf(), identity);
        lock(&self.watched).insert(path.to_path_buf());
        debug!(path = %path.display(), "watch added");
        Ok(WatchHandle::new(path.to_path_buf()))
    }

    fn unsubscribe(&mut self, handle: WatchHandle) {
        let path = handle.path();
        lock(&self.watched).remove(path);
        let identity = self.identities.remove(path);
        let shared = identity
            .as_ref()
            .is_some_and(|id| self.identities.values().any(|other| other == id));
        if shared {
            debug!(path = %path.display(), "watch kept, directory still watched under another path");
            return;
        }
        match self.debouncer.watcher().unwatch(path) {
            Ok(()) => debug!(path = %path.display(), "watch removed"),
            Err(e) => warn!(path = %path.display(), error = %e, "failed to remove watch"),
        }
    }
}

/// Stand-in used when live updates are disabled.
#[derive(Debug, Default)]
pub struct NoopWatcher;

impl DirectoryWatch for NoopWatcher {
    fn subscribe(&mut self, path: &Path) -> Result<WatchHandle> {
        Ok(WatchHandle::new(path.to_path_buf()))
    }

    fn unsubscribe(&mut self, _handle: WatchHandle) {}

    fn is_live(&self) -> bool {
        false
    }
}

fn lock(watched: &Mutex<HashSet<PathBuf>>) -> MutexGuard<'_, HashSet<PathBuf>> {
    watched.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// The watched directory an event path belongs to: the path itself when it
/// is watched, otherwise its parent when that is watched.
pub fn owning_dir(path: &Path, watched: &HashSet<PathBuf>) -> Option<PathBuf> {
    if watched.contains(path) {
        return Some(path.to_path_buf());
    }
    path.parent()
        .filter(|parent| watched.contains(*parent))
        .map(Path::to_path_buf)
}
