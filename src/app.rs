use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use ratatui::layout::Rect;
use tokio::sync::watch;
use tracing::debug;

use crate::components::menubar::MenuAction;
use crate::controller::{NavigationController, RefreshOutcome, RefreshRequest};
use crate::error::Result;
use crate::fs::entries::{Entry, EntryCollection, PARENT_ALIAS};
use crate::fs::watcher::WatchEvent;
use crate::layout::{project, scroll_to_show, Direction, Projection};

/// How long a status message stays on screen.
const STATUS_TTL: Duration = Duration::from_secs(3);

/// Application mode.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
    #[default]
    Normal,
    EditingPath,
}

/// Text input state of the path editor.
#[derive(Debug, Default)]
pub struct PathEditorState {
    pub input: String,
    /// Byte offset into `input`.
    pub cursor_position: usize,
}

/// Transient message shown in the status bar.
#[derive(Debug, Clone)]
pub struct StatusMessage {
    pub text: String,
    pub is_error: bool,
    pub created: Instant,
}

/// UI state around the navigation controller.
///
/// The listing itself is only read through `snapshot_rx`; every change goes
/// through `controller`.
pub struct App {
    pub controller: NavigationController,
    snapshot_rx: watch::Receiver<Arc<EntryCollection>>,
    /// The snapshot drawn this frame.
    pub view: Arc<EntryCollection>,
    pub selected_index: usize,
    /// First visible row.
    pub scroll_offset: usize,
    /// Inner area of the listing pane, from the last frame.
    pub entries_area: Rect,
    /// Clickable menubar regions, from the last frame.
    pub menu_hits: Vec<(Rect, MenuAction)>,
    pub grid_item_width: u16,
    pub mode: AppMode,
    pub editor: PathEditorState,
    pub status_message: Option<StatusMessage>,
    pub should_quit: bool,
    /// Path to select once the next directory is shown (set when going up).
    return_to: Option<PathBuf>,
}

impl App {
    pub fn new(controller: NavigationController, grid_item_width: u16) -> Self {
        let mut snapshot_rx = controller.subscribe();
        let view = snapshot_rx.borrow_and_update().clone();
        Self {
            controller,
            snapshot_rx,
            view,
            selected_index: 0,
            scroll_offset: 0,
            entries_area: Rect::default(),
            menu_hits: Vec::new(),
            grid_item_width,
            mode: AppMode::Normal,
            editor: PathEditorState::default(),
            status_message: None,
            should_quit: false,
            return_to: None,
        }
    }

    /// Pick up a newer snapshot, keeping the selection where it makes sense.
    pub fn sync_snapshot(&mut self) {
        if !self.snapshot_rx.has_changed().unwrap_or(false) {
            return;
        }
        let next = self.snapshot_rx.borrow_and_update().clone();
        let same_dir = next.current_path() == self.view.current_path();

        let keep = if same_dir {
            self.selected_entry().map(|e| e.path().to_path_buf())
        } else {
            self.return_to.take()
        };
        let fallback = if same_dir {
            self.selected_index.min(next.len().saturating_sub(1))
        } else {
            self.scroll_offset = 0;
            0
        };

        self.view = next;
        self.selected_index = keep
            .and_then(|p| self.view.find_index_by_path(&p))
            .unwrap_or(fallback);
    }

    /// Geometry of the listing for the current pane width.
    pub fn projection(&self) -> Projection {
        project(
            &self.view,
            self.entries_area.width as usize,
            self.grid_item_width as usize,
        )
    }

    pub fn selected_entry(&self) -> Option<&Entry> {
        self.view.entries().get(self.selected_index)
    }

    /// Keep the selected row inside the visible window.
    pub fn update_scroll(&mut self) {
        let visible_rows = self.entries_area.height as usize;
        if let Some((row, _)) = self.projection().cell_of(self.selected_index) {
            self.scroll_offset = scroll_to_show(row, self.scroll_offset, visible_rows);
        }
    }

    // ── Selection ────────────────────────────────────────────────────────────

    pub fn move_selection(&mut self, direction: Direction) {
        self.selected_index = self.projection().move_by(self.selected_index, direction);
    }

    pub fn select_first(&mut self) {
        self.selected_index = 0;
    }

    pub fn select_last(&mut self) {
        self.selected_index = self.view.len().saturating_sub(1);
    }

    // ── Controller actions ───────────────────────────────────────────────────

    /// Open the selected entry: enter it if a folder, launch it if a file.
    pub fn activate_selected(&mut self) {
        let Some(entry) = self.selected_entry() else {
            return;
        };
        let handle = entry.handle();
        if entry.alias() == Some(PARENT_ALIAS) {
            self.return_to = Some(self.view.current_path().to_path_buf());
        }
        let result = self.controller.activate(handle);
        self.after_action(result);
    }

    pub fn go_up(&mut self) {
        self.return_to = Some(self.view.current_path().to_path_buf());
        let result = self.controller.go_up().map(|_| ());
        self.after_action(result);
    }

    pub fn toggle_view(&mut self) {
        let mode = self.controller.toggle_view_mode();
        self.sync_snapshot();
        self.set_status_message(format!("{} view", mode.label()), false);
    }

    fn after_action(&mut self, result: Result<()>) {
        if let Err(e) = result {
            self.return_to = None;
            self.set_status_message(e.to_string(), true);
        }
        self.sync_snapshot();
    }

    // ── Watcher plumbing ─────────────────────────────────────────────────────

    pub fn handle_watch_event(&mut self, event: WatchEvent) -> Option<RefreshRequest> {
        self.controller.handle_watch_event(event)
    }

    pub fn handle_refreshed(&mut self, outcome: RefreshOutcome) -> Option<RefreshRequest> {
        let next = self.controller.complete_refresh(outcome);
        self.sync_snapshot();
        next
    }

    /// Periodic housekeeping.
    pub fn tick(&mut self, now: Instant) {
        self.clear_expired_status(now);
        if self.controller.retry_watch(now) {
            self.set_status_message("Live updates resumed".to_string(), false);
        }
    }

    // ── Mouse ────────────────────────────────────────────────────────────────

    /// Handle a left click at terminal cell (`column`, `row`).
    pub fn click_at(&mut self, column: u16, row: u16) {
        if let Some(action) = self
            .menu_hits
            .iter()
            .find(|(rect, _)| contains(rect, column, row))
            .map(|(_, action)| *action)
        {
            self.perform(action);
            return;
        }

        if let Some(index) = self.index_at(column, row) {
            self.selected_index = index;
            self.activate_selected();
        }
    }

    /// Listing index under a terminal cell, if any.
    pub fn index_at(&self, column: u16, row: u16) -> Option<usize> {
        let area = self.entries_area;
        if !contains(&area, column, row) {
            return None;
        }
        let projection = self.projection();
        let grid_row = (row - area.y) as usize + self.scroll_offset;
        let grid_col = match projection.columns {
            1 => 0,
            _ => ((column - area.x) / self.grid_item_width.max(1)) as usize,
        };
        projection.index_at(grid_row, grid_col)
    }

    pub fn perform(&mut self, action: MenuAction) {
        debug!(?action, "menu action");
        match action {
            MenuAction::GoUp => self.go_up(),
            MenuAction::ToggleView => self.toggle_view(),
            MenuAction::EditPath => self.start_path_edit(),
        }
    }

    // ── Path editor ──────────────────────────────────────────────────────────

    /// Enter path-editing mode, prefilled with the current directory.
    pub fn start_path_edit(&mut self) {
        let current = self.view.current_path().to_string_lossy().to_string();
        self.editor.cursor_position = current.len();
        self.editor.input = current;
        self.mode = AppMode::EditingPath;
    }

    pub fn cancel_path_edit(&mut self) {
        self.mode = AppMode::Normal;
        self.editor = PathEditorState::default();
    }

    /// Navigate to the typed path. On failure the editor stays open with the text.
    pub fn submit_path_edit(&mut self) {
        let text = self.editor.input.clone();
        match self.controller.submit_path(&text) {
            Ok(()) => {
                self.cancel_path_edit();
                self.sync_snapshot();
            }
            Err(e) => self.set_status_message(e.to_string(), true),
        }
    }

    /// Insert a character at the current cursor position.
    pub fn editor_input_char(&mut self, c: char) {
        self.editor.input.insert(self.editor.cursor_position, c);
        self.editor.cursor_position += c.len_utf8();
    }

    /// Delete the character before the cursor (backspace).
    pub fn editor_delete_char(&mut self) {
        if let Some(prev) = self.editor.input[..self.editor.cursor_position]
            .chars()
            .next_back()
        {
            self.editor.cursor_position -= prev.len_utf8();
            self.editor.input.remove(self.editor.cursor_position);
        }
    }

    /// Move cursor left by one character.
    pub fn editor_cursor_left(&mut self) {
        if let Some(prev) = self.editor.input[..self.editor.cursor_position]
            .chars()
            .next_back()
        {
            self.editor.cursor_position -= prev.len_utf8();
        }
    }

    /// Move cursor right by one character.
    pub fn editor_cursor_right(&mut self) {
        if let Some(next) = self.editor.input[self.editor.cursor_position..]
            .chars()
            .next()
        {
            self.editor.cursor_position += next.len_utf8();
        }
    }

    pub fn editor_cursor_home(&mut self) {
        self.editor.cursor_position = 0;
    }

    pub fn editor_cursor_end(&mut self) {
        self.editor.cursor_position = self.editor.input.len();
    }

    // ── Status ───────────────────────────────────────────────────────────────

    pub fn set_status_message(&mut self, text: String, is_error: bool) {
        self.status_message = Some(StatusMessage {
            text,
            is_error,
            created: Instant::now(),
        });
    }

    /// Clear the status message once it has been displayed long enough.
    pub fn clear_expired_status(&mut self, now: Instant) {
        if let Some(msg) = &self.status_message {
            if now.duration_since(msg.created) > STATUS_TTL {
                self.status_message = None;
            }
        }
    }

    /// Quit the application.
    pub fn quit(&mut self) {
        self.should_quit = true;
    }
}

fn contains(rect: &Rect, column: u16, row: u16) -> bool {
    column >= rect.x
        && column < rect.x.saturating_add(rect.width)
        && row >= rect.y
        && row < rect.y.saturating_add(rect.height)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::entries::ViewMode;
    use crate::fs::opener::Launcher;
    use crate::fs::watcher::NoopWatcher;
    use std::fs::{self, File};
    use std::path::Path;
    use tempfile::TempDir;

    struct NullLauncher;

    impl Launcher for NullLauncher {
        fn launch(&self, _path: &Path) -> Result<()> {
            Ok(())
        }
    }

    fn setup_app() -> (TempDir, App) {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("alpha")).unwrap();
        fs::create_dir(dir.path().join("beta")).unwrap();
        File::create(dir.path().join("file_a.txt")).unwrap();
        File::create(dir.path().join("file_b.rs")).unwrap();
        let controller = NavigationController::open(
            dir.path(),
            ViewMode::List,
            Box::new(NoopWatcher),
            Box::new(NullLauncher),
            Duration::from_secs(1),
        )
        .unwrap();
        let mut app = App::new(controller, 10);
        app.entries_area = Rect::new(0, 1, 40, 10);
        (dir, app)
    }

    fn select_named(app: &mut App, name: &str) {
        app.selected_index = app
            .view
            .entries()
            .iter()
            .position(|e| e.display_name() == name)
            .unwrap();
    }

    // listing: .. alpha beta file_a.txt file_b.rs .

    #[test]
    fn move_selection_in_list() {
        let (_dir, mut app) = setup_app();
        app.move_selection(Direction::Down);
        assert_eq!(app.selected_index, 1);
        app.move_selection(Direction::Up);
        app.move_selection(Direction::Up);
        assert_eq!(app.selected_index, 0);
    }

    #[test]
    fn select_first_and_last() {
        let (_dir, mut app) = setup_app();
        app.select_last();
        assert_eq!(app.selected_index, 5);
        app.select_first();
        assert_eq!(app.selected_index, 0);
    }

    #[test]
    fn activate_folder_enters_and_resets_selection() {
        let (dir, mut app) = setup_app();
        select_named(&mut app, "alpha");
        app.activate_selected();
        assert_eq!(app.view.current_path(), dir.path().join("alpha"));
        assert_eq!(app.selected_index, 0);
    }

    #[test]
    fn go_up_selects_the_folder_we_came_from() {
        let (dir, mut app) = setup_app();
        select_named(&mut app, "beta");
        app.activate_selected();
        app.go_up();
        assert_eq!(app.view.current_path(), dir.path());
        assert_eq!(app.selected_entry().unwrap().display_name(), "beta");
    }

    #[test]
    fn activating_parent_entry_selects_origin() {
        let (dir, mut app) = setup_app();
        select_named(&mut app, "alpha");
        app.activate_selected();
        app.select_first();
        app.activate_selected();
        assert_eq!(app.view.current_path(), dir.path());
        assert_eq!(app.selected_entry().unwrap().display_name(), "alpha");
    }

    #[test]
    fn failed_navigation_reports_error_and_keeps_listing() {
        let (dir, mut app) = setup_app();
        select_named(&mut app, "beta");
        fs::remove_dir(dir.path().join("beta")).unwrap();
        app.activate_selected();
        assert_eq!(app.view.current_path(), dir.path());
        let msg = app.status_message.as_ref().unwrap();
        assert!(msg.is_error);
        assert!(msg.text.contains("Not found"));
    }

    #[test]
    fn toggle_view_switches_to_grid_navigation() {
        let (_dir, mut app) = setup_app();
        app.toggle_view();
        assert_eq!(app.view.view_mode(), ViewMode::Grid);
        // 40 wide / 10 per cell = 4 columns
        assert_eq!(app.projection().columns, 4);
        app.move_selection(Direction::Down);
        assert_eq!(app.selected_index, 4);
        app.move_selection(Direction::Right);
        assert_eq!(app.selected_index, 5);
    }

    #[test]
    fn refresh_keeps_selected_entry() {
        let (dir, mut app) = setup_app();
        select_named(&mut app, "file_b.rs");
        File::create(dir.path().join("aaa.txt")).unwrap();
        let request = app
            .handle_watch_event(WatchEvent::Changed(dir.path().to_path_buf()))
            .unwrap();
        assert!(app.handle_refreshed(request.run()).is_none());
        assert_eq!(app.view.len(), 7);
        assert_eq!(app.selected_entry().unwrap().display_name(), "file_b.rs");
    }

    #[test]
    fn click_on_list_row_activates_entry() {
        let (dir, mut app) = setup_app();
        // Row 1 of the pane (y = 2) is "alpha"
        app.click_at(3, 2);
        assert_eq!(app.view.current_path(), dir.path().join("alpha"));
    }

    #[test]
    fn click_outside_listing_does_nothing() {
        let (dir, mut app) = setup_app();
        app.click_at(50, 20);
        assert_eq!(app.view.current_path(), dir.path());
        assert!(app.index_at(3, 0).is_none());
    }

    #[test]
    fn index_at_in_grid() {
        let (_dir, mut app) = setup_app();
        app.toggle_view();
        assert_eq!(app.index_at(0, 1), Some(0));
        assert_eq!(app.index_at(25, 1), Some(2));
        assert_eq!(app.index_at(12, 2), Some(5));
        assert_eq!(app.index_at(25, 2), None);
    }

    #[test]
    fn menu_hit_performs_action() {
        let (_dir, mut app) = setup_app();
        app.menu_hits = vec![(Rect::new(0, 0, 4, 1), MenuAction::ToggleView)];
        app.click_at(1, 0);
        assert_eq!(app.view.view_mode(), ViewMode::Grid);
    }

    #[test]
    fn update_scroll_follows_selection() {
        let (_dir, mut app) = setup_app();
        app.entries_area = Rect::new(0, 1, 40, 2);
        app.select_last();
        app.update_scroll();
        assert_eq!(app.scroll_offset, 4);
    }

    #[test]
    fn path_edit_submit_navigates() {
        let (dir, mut app) = setup_app();
        app.start_path_edit();
        assert_eq!(app.mode, AppMode::EditingPath);
        assert_eq!(app.editor.input, dir.path().to_string_lossy());
        for c in "/alpha".chars() {
            app.editor_input_char(c);
        }
        app.submit_path_edit();
        assert_eq!(app.mode, AppMode::Normal);
        assert_eq!(app.view.current_path(), dir.path().join("alpha"));
    }

    #[test]
    fn path_edit_invalid_keeps_editor_open() {
        let (dir, mut app) = setup_app();
        app.start_path_edit();
        app.editor_input_char('x');
        app.submit_path_edit();
        assert_eq!(app.mode, AppMode::EditingPath);
        assert_eq!(app.view.current_path(), dir.path());
        assert!(app.status_message.as_ref().unwrap().is_error);
    }

    #[test]
    fn editor_cursor_editing() {
        let (_dir, mut app) = setup_app();
        app.mode = AppMode::EditingPath;
        app.editor = PathEditorState::default();
        app.editor_input_char('a');
        app.editor_input_char('é');
        app.editor_input_char('c');
        app.editor_cursor_left();
        app.editor_delete_char();
        assert_eq!(app.editor.input, "ac");
        assert_eq!(app.editor.cursor_position, 1);
        app.editor_cursor_home();
        app.editor_delete_char();
        assert_eq!(app.editor.input, "ac");
        app.editor_cursor_right();
        app.editor_cursor_end();
        assert_eq!(app.editor.cursor_position, 2);
    }

    #[test]
    fn cancel_path_edit_restores_normal_mode() {
        let (_dir, mut app) = setup_app();
        app.start_path_edit();
        app.cancel_path_edit();
        assert_eq!(app.mode, AppMode::Normal);
        assert!(app.editor.input.is_empty());
    }

    #[test]
    fn status_message_expires() {
        let (_dir, mut app) = setup_app();
        app.set_status_message("hello".into(), false);
        app.clear_expired_status(Instant::now());
        assert!(app.status_message.is_some());
        app.clear_expired_status(Instant::now() + Duration::from_secs(5));
        assert!(app.status_message.is_none());
    }

    #[test]
    fn quit_sets_flag() {
        let (_dir, mut app) = setup_app();
        app.quit();
        assert!(app.should_quit);
    }
}
