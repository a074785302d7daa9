use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

/// Alias of the synthetic parent-directory entry.
pub const PARENT_ALIAS: &str = "..";
/// Alias of the synthetic self-reference entry.
pub const SELF_ALIAS: &str = ".";

static NEXT_HANDLE: AtomicU64 = AtomicU64::new(1);

/// Opaque token correlating an entry with a click target in the UI.
///
/// Every entry built gets a fresh handle, so a handle taken from one
/// snapshot never resolves against a later re-read of the same directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntryHandle(u64);

impl EntryHandle {
    fn fresh() -> Self {
        Self(NEXT_HANDLE.fetch_add(1, Ordering::Relaxed))
    }
}

/// Presentation of a directory listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ViewMode {
    #[default]
    List,
    Grid,
}

impl ViewMode {
    /// Parse a view mode from a config string. Unknown values fall back to list.
    pub fn parse_config(s: &str) -> Self {
        match s {
            "grid" => ViewMode::Grid,
            _ => ViewMode::List,
        }
    }

    /// The other mode.
    pub fn toggled(self) -> Self {
        match self {
            ViewMode::List => ViewMode::Grid,
            ViewMode::Grid => ViewMode::List,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ViewMode::List => "List",
            ViewMode::Grid => "Grid",
        }
    }
}

/// One child of a directory as seen by the explorer.
#[derive(Debug, Clone)]
pub struct Entry {
    path: PathBuf,
    alias: Option<String>,
    is_folder: bool,
    handle: EntryHandle,
}

impl Entry {
    /// A real filesystem child.
    pub fn new(path: PathBuf, is_folder: bool) -> Self {
        Self {
            path,
            alias: None,
            is_folder,
            handle: EntryHandle::fresh(),
        }
    }

    /// A synthetic navigation entry (`..` or `.`); always a folder.
    fn synthetic(path: PathBuf, alias: &str) -> Self {
        Self {
            path,
            alias: Some(alias.to_string()),
            is_folder: true,
            handle: EntryHandle::fresh(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    pub fn is_folder(&self) -> bool {
        self.is_folder
    }

    pub fn handle(&self) -> EntryHandle {
        self.handle
    }

    /// Whether this is one of the `..` / `.` navigation entries.
    pub fn is_synthetic(&self) -> bool {
        matches!(self.alias.as_deref(), Some(PARENT_ALIAS) | Some(SELF_ALIAS))
    }

    /// Name shown in the UI: the alias if set, otherwise the basename.
    pub fn display_name(&self) -> String {
        if let Some(alias) = &self.alias {
            return alias.clone();
        }
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.path.to_string_lossy().to_string())
    }
}

/// Snapshot of one directory's contents plus the view preference.
#[derive(Debug, Clone)]
pub struct EntryCollection {
    current_path: PathBuf,
    entries: Vec<Entry>,
    view_mode: ViewMode,
}

impl EntryCollection {
    /// Build a raw (unsorted, no synthetic entries) collection.
    pub fn new(current_path: PathBuf, entries: Vec<Entry>) -> Self {
        Self {
            current_path,
            entries,
            view_mode: ViewMode::default(),
        }
    }

    pub fn current_path(&self) -> &Path {
        &self.current_path
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn view_mode(&self) -> ViewMode {
        self.view_mode
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries that exist on disk (synthetic ones excluded).
    pub fn real_entries(&self) -> impl Iterator<Item = &Entry> {
        self.entries.iter().filter(|e| !e.is_synthetic())
    }

    /// Carry a view preference into this collection.
    pub fn with_view_mode(mut self, view_mode: ViewMode) -> Self {
        self.view_mode = view_mode;
        self
    }

    /// Sort folders first, then by full path, and frame the result with the
    /// synthetic `..` and `.` entries.
    ///
    /// Synthetic entries already present are dropped first, so preparing an
    /// already prepared collection yields the same sequence again.
    pub fn prepare(mut self) -> Self {
        self.entries.retain(|e| !e.is_synthetic());
        self.entries.sort_by(|a, b| {
            b.is_folder
                .cmp(&a.is_folder)
                .then_with(|| a.path.as_os_str().cmp(b.path.as_os_str()))
        });

        let parent = self
            .current_path
            .parent()
            .unwrap_or(&self.current_path)
            .to_path_buf();
        self.entries
            .insert(0, Entry::synthetic(parent, PARENT_ALIAS));
        self.entries
            .push(Entry::synthetic(self.current_path.clone(), SELF_ALIAS));
        self
    }

    /// Whether `prepare` has framed this collection.
    #[allow(dead_code)]
    pub fn is_prepared(&self) -> bool {
        matches!(self.entries.first().and_then(Entry::alias), Some(PARENT_ALIAS))
            && matches!(self.entries.last().and_then(Entry::alias), Some(SELF_ALIAS))
    }

    /// The synthetic `..` entry, if prepared.
    pub fn parent_entry(&self) -> Option<&Entry> {
        self.entries
            .first()
            .filter(|e| e.alias() == Some(PARENT_ALIAS))
    }

    /// The synthetic `.` entry, if prepared.
    #[allow(dead_code)]
    pub fn self_entry(&self) -> Option<&Entry> {
        self.entries.last().filter(|e| e.alias() == Some(SELF_ALIAS))
    }

    /// Whether the current directory has a parent to go up to.
    pub fn has_parent(&self) -> bool {
        self.current_path.parent().is_some()
    }

    pub fn find_by_handle(&self, handle: EntryHandle) -> Option<&Entry> {
        self.entries.iter().find(|e| e.handle == handle)
    }

    /// Index of the first entry with this path. Synthetic entries match too.
    pub fn find_index_by_path(&self, path: &Path) -> Option<usize> {
        self.entries.iter().position(|e| e.path == path)
    }
}
