//! Navigation state machine: the single writer of the current directory snapshot.
//!
//! User actions and watcher notifications are applied here, one at a time,
//! from the main loop. New collections are built off to the side and swapped
//! in whole through a `watch` channel, so readers only ever see complete
//! snapshots.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::error::{AppError, Result};
use crate::fs::entries::{Entry, EntryCollection, EntryHandle, ViewMode};
use crate::fs::opener::Launcher;
use crate::fs::reader::read_path;
use crate::fs::watcher::{DirectoryWatch, WatchEvent, WatchHandle};

/// Default delay between attempts to re-establish a failed watch.
pub const DEFAULT_WATCH_RETRY_MS: u64 = 2_000;

/// Whether a background re-read is outstanding for the current directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    Idle,
    Refreshing,
}

/// A re-read of the current directory, to be run off the main loop.
#[derive(Debug)]
pub struct RefreshRequest {
    generation: u64,
    path: PathBuf,
}

impl RefreshRequest {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and prepare the directory. Blocking.
    pub fn run(self) -> RefreshOutcome {
        let result = read_path(&self.path).map(EntryCollection::prepare);
        RefreshOutcome {
            generation: self.generation,
            path: self.path,
            result,
        }
    }
}

/// Result of a `RefreshRequest`, handed back to `complete_refresh`.
#[derive(Debug)]
pub struct RefreshOutcome {
    generation: u64,
    path: PathBuf,
    result: Result<EntryCollection>,
}

/// Coordinates reads, the shared snapshot, and the directory watch.
pub struct NavigationController {
    snapshot: watch::Sender<Arc<EntryCollection>>,
    watcher: Box<dyn DirectoryWatch>,
    launcher: Box<dyn Launcher>,
    watch_handle: Option<WatchHandle>,
    /// When the next resubscribe attempt is due, if the current directory is unwatched.
    watch_retry_at: Option<Instant>,
    retry_interval: Duration,
    /// Bumped whenever the snapshot moves to a different listing.
    generation: u64,
    in_flight: Option<u64>,
    refresh_queued: bool,
}

impl NavigationController {
    /// Read `start`, publish it as the first snapshot and watch it.
    pub fn open(
        start: &Path,
        view_mode: ViewMode,
        watcher: Box<dyn DirectoryWatch>,
        launcher: Box<dyn Launcher>,
        retry_interval: Duration,
    ) -> Result<Self> {
        let collection = read_path(start)?.prepare().with_view_mode(view_mode);
        let (snapshot, _) = watch::channel(Arc::new(collection));

        let mut controller = Self {
            snapshot,
            watcher,
            launcher,
            watch_handle: None,
            watch_retry_at: None,
            retry_interval,
            generation: 0,
            in_flight: None,
            refresh_queued: false,
        };
        controller.move_watch(start);
        info!(path = %start.display(), "explorer opened");
        Ok(controller)
    }

    /// The current snapshot.
    pub fn snapshot(&self) -> Arc<EntryCollection> {
        self.snapshot.borrow().clone()
    }

    /// A read-only view that observes every swap.
    pub fn subscribe(&self) -> watch::Receiver<Arc<EntryCollection>> {
        self.snapshot.subscribe()
    }

    pub fn current_path(&self) -> PathBuf {
        self.snapshot.borrow().current_path().to_path_buf()
    }

    pub fn view_mode(&self) -> ViewMode {
        self.snapshot.borrow().view_mode()
    }

    pub fn state(&self) -> ControllerState {
        if self.in_flight == Some(self.generation) {
            ControllerState::Refreshing
        } else {
            ControllerState::Idle
        }
    }

    /// Whether the current directory has a live watch.
    pub fn is_watching(&self) -> bool {
        self.watch_handle.is_some() && self.watcher.is_live()
    }

    /// Dispatch a click on the entry identified by `handle`.
    pub fn activate(&mut self, handle: EntryHandle) -> Result<()> {
        let snapshot = self.snapshot();
        let entry = snapshot
            .find_by_handle(handle)
            .ok_or(AppError::StaleEntry)?;
        if entry.is_folder() {
            self.enter_folder(entry)
        } else {
            self.open_file(entry);
            Ok(())
        }
    }

    /// Make `entry` the current directory. On failure the current listing stays.
    pub fn enter_folder(&mut self, entry: &Entry) -> Result<()> {
        if !entry.is_folder() {
            return Err(AppError::InvalidPath(format!(
                "{} is not a folder",
                entry.path().display()
            )));
        }
        self.navigate_to(entry.path())
    }

    /// Hand a file to the default application. Failures are logged only.
    pub fn open_file(&self, entry: &Entry) {
        if entry.is_folder() {
            debug!(path = %entry.path().display(), "open_file called on a folder");
            return;
        }
        if let Err(e) = self.launcher.launch(entry.path()) {
            warn!(error = %e, "failed to open file");
        }
    }

    /// Navigate to the parent directory. Returns `false` at a filesystem root.
    pub fn go_up(&mut self) -> Result<bool> {
        let snapshot = self.snapshot();
        if !snapshot.has_parent() {
            return Ok(false);
        }
        match snapshot.parent_entry() {
            Some(parent) => self.enter_folder(parent)?,
            None => {
                let parent = snapshot.current_path().parent().unwrap_or(snapshot.current_path());
                self.navigate_to(parent)?;
            }
        }
        Ok(true)
    }

    /// Navigate to a user-typed path.
    ///
    /// `~` expands to the home directory and relative paths resolve against
    /// the current directory. Anything that is not an existing directory is
    /// an `InvalidPath` and leaves the current listing in place.
    pub fn submit_path(&mut self, text: &str) -> Result<()> {
        let target = resolve_input(text, &self.current_path())?;
        match self.navigate_to(&target) {
            Err(AppError::NotFound(_)) | Err(AppError::NotADirectory(_)) => {
                Err(AppError::InvalidPath(text.trim().to_string()))
            }
            other => other,
        }
    }

    /// Flip list/grid on the current snapshot.
    pub fn toggle_view_mode(&mut self) -> ViewMode {
        let current = self.snapshot();
        let mode = current.view_mode().toggled();
        let flipped = (*current).clone().with_view_mode(mode);
        self.snapshot.send_replace(Arc::new(flipped));
        debug!(mode = mode.label(), "view mode toggled");
        mode
    }

    /// React to a watcher notification.
    ///
    /// Returns a re-read to run when the change concerns the current
    /// directory and none is in flight. A change arriving during a refresh is
    /// remembered and issued by `complete_refresh`.
    pub fn handle_watch_event(&mut self, event: WatchEvent) -> Option<RefreshRequest> {
        match event {
            WatchEvent::Changed(path) => {
                if path != self.current_path() {
                    debug!(path = %path.display(), "ignoring change for a directory no longer shown");
                    return None;
                }
                if self.state() == ControllerState::Refreshing {
                    self.refresh_queued = true;
                    return None;
                }
                Some(self.start_refresh())
            }
            WatchEvent::Error(message) => {
                warn!(error = %message, "filesystem watcher error");
                None
            }
        }
    }

    /// Swap in a finished re-read, unless the listing has moved on since.
    pub fn complete_refresh(&mut self, outcome: RefreshOutcome) -> Option<RefreshRequest> {
        if self.in_flight == Some(outcome.generation) {
            self.in_flight = None;
        }
        if outcome.generation != self.generation || outcome.path != self.current_path() {
            debug!(path = %outcome.path.display(), "discarding stale refresh");
            return None;
        }

        match outcome.result {
            Ok(collection) => {
                let collection = collection.with_view_mode(self.view_mode());
                self.snapshot.send_replace(Arc::new(collection));
                debug!(path = %outcome.path.display(), "listing refreshed");
            }
            Err(AppError::NotFound(_)) => {
                warn!(path = %outcome.path.display(), "current directory disappeared");
                self.fall_back_to_ancestor(&outcome.path);
            }
            Err(e) => warn!(error = %e, "refresh failed, keeping previous listing"),
        }

        if self.refresh_queued {
            self.refresh_queued = false;
            return Some(self.start_refresh());
        }
        None
    }

    /// Try again to watch the current directory if an earlier attempt failed
    /// and the retry delay has passed. Returns `true` once watching resumes.
    pub fn retry_watch(&mut self, now: Instant) -> bool {
        match self.watch_retry_at {
            Some(due) if now >= due => {}
            _ => return false,
        }
        let path = self.current_path();
        match self.watcher.subscribe(&path) {
            Ok(handle) => {
                self.watch_handle = Some(handle);
                self.watch_retry_at = None;
                info!(path = %path.display(), "watch re-established");
                true
            }
            Err(e) => {
                debug!(error = %e, "watch retry failed");
                self.watch_retry_at = Some(now + self.retry_interval);
                false
            }
        }
    }

    fn start_refresh(&mut self) -> RefreshRequest {
        self.in_flight = Some(self.generation);
        RefreshRequest {
            generation: self.generation,
            path: self.current_path(),
        }
    }

    /// Read `path` and make it current. Nothing changes if the read fails.
    fn navigate_to(&mut self, path: &Path) -> Result<()> {
        let collection = read_path(path)?.prepare().with_view_mode(self.view_mode());
        let previous = self.current_path();

        self.snapshot.send_replace(Arc::new(collection));
        self.generation += 1;
        self.refresh_queued = false;

        if previous != path {
            self.move_watch(path);
        }
        info!(from = %previous.display(), to = %path.display(), "navigated");
        Ok(())
    }

    /// Add the new watch first, then drop the old one.
    fn move_watch(&mut self, path: &Path) {
        match self.watcher.subscribe(path) {
            Ok(handle) => {
                if let Some(old) = self.watch_handle.replace(handle) {
                    self.watcher.unsubscribe(old);
                }
                self.watch_retry_at = None;
            }
            Err(e) => {
                warn!(error = %e, "cannot watch directory, will retry");
                if let Some(old) = self.watch_handle.take() {
                    self.watcher.unsubscribe(old);
                }
                self.watch_retry_at = Some(Instant::now() + self.retry_interval);
            }
        }
    }

    fn fall_back_to_ancestor(&mut self, gone: &Path) {
        for ancestor in gone.ancestors().skip(1) {
            if self.navigate_to(ancestor).is_ok() {
                return;
            }
        }
        warn!(path = %gone.display(), "no readable ancestor, keeping previous listing");
    }
}

/// Turn user input into an absolute, canonical directory path.
pub fn resolve_input(text: &str, base: &Path) -> Result<PathBuf> {
    let text = text.trim();
    if text.is_empty() {
        return Err(AppError::InvalidPath("empty path".into()));
    }

    let expanded = if text == "~" {
        dirs::home_dir().ok_or_else(|| AppError::InvalidPath(text.to_string()))?
    } else if let Some(rest) = text.strip_prefix("~/") {
        dirs::home_dir()
            .ok_or_else(|| AppError::InvalidPath(text.to_string()))?
            .join(rest)
    } else {
        base.join(text)
    };

    expanded
        .canonicalize()
        .map_err(|_| AppError::InvalidPath(text.to_string()))
}
