use ratatui::{
    layout::{Constraint, Layout},
    style::Style,
    widgets::{Block, Borders},
    Frame,
};

use crate::app::App;
use crate::components::entries::EntriesWidget;
use crate::components::menubar::{menu_items, MenubarWidget};
use crate::components::status_bar::StatusBarWidget;
use crate::controller::ControllerState;
use crate::theme::RenderContext;

/// Render the application UI: menubar, listing pane, status bar.
pub fn render(app: &mut App, frame: &mut Frame, ctx: &RenderContext) {
    app.sync_snapshot();

    let [menu_area, body_area, status_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(1),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(ctx.theme.border_fg))
        .title(format!(" {} ", app.view.current_path().display()));
    app.entries_area = block.inner(body_area);
    app.update_scroll();

    let items = menu_items(app);
    let menubar = MenubarWidget::new(&items, ctx);
    app.menu_hits = menubar.hits(menu_area);
    frame.render_widget(menubar, menu_area);

    let view = app.view.clone();
    let entries = EntriesWidget::new(&view, app.projection(), ctx)
        .selected(app.selected_index)
        .scroll_offset(app.scroll_offset)
        .block(block);
    frame.render_widget(entries, body_area);

    let path_str = view.current_path().to_string_lossy();
    let item_count = view.real_entries().count();
    let listing_info = format!(
        "{} item{} | {}",
        item_count,
        if item_count == 1 { "" } else { "s" },
        view.view_mode().label()
    );
    let watch_status = match (app.controller.state(), app.controller.is_watching()) {
        (ControllerState::Refreshing, _) => "refreshing",
        (ControllerState::Idle, true) => "live",
        (ControllerState::Idle, false) => "static",
    };
    let mut status = StatusBarWidget::new(&path_str, &listing_info, &ctx.theme).watch_status(watch_status);
    if let Some(msg) = &app.status_message {
        status = status.status_message(&msg.text, msg.is_error);
    }
    frame.render_widget(status, status_area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::NavigationController;
    use crate::error::Result;
    use crate::fs::entries::ViewMode;
    use crate::fs::opener::Launcher;
    use crate::fs::watcher::NoopWatcher;
    use crate::theme::IconSet;
    use ratatui::{backend::TestBackend, buffer::Buffer, layout::Rect, Terminal};
    use std::fs;
    use std::path::Path;
    use std::time::Duration;
    use tempfile::TempDir;

    struct NullLauncher;

    impl Launcher for NullLauncher {
        fn launch(&self, _path: &Path) -> Result<()> {
            Ok(())
        }
    }

    fn buffer_to_string(buf: &Buffer) -> String {
        let area = buf.area;
        let mut s = String::new();
        for y in area.y..area.y + area.height {
            for x in area.x..area.x + area.width {
                s.push_str(buf.cell((x, y)).unwrap().symbol());
            }
            s.push('\n');
        }
        s
    }

    fn setup(files: usize) -> (TempDir, App, RenderContext) {
        let dir = TempDir::new().unwrap();
        for i in 0..files {
            fs::write(dir.path().join(format!("f{i:02}")), "").unwrap();
        }
        let controller = NavigationController::open(
            dir.path(),
            ViewMode::List,
            Box::new(NoopWatcher),
            Box::new(NullLauncher),
            Duration::from_secs(1),
        )
        .unwrap();
        let mut ctx = RenderContext::default();
        ctx.icons = IconSet::new(false);
        ctx.grid_item_width = 10;
        let app = App::new(controller, ctx.grid_item_width);
        (dir, app, ctx)
    }

    #[test]
    fn draws_menubar_listing_and_status() {
        let (_dir, mut app, ctx) = setup(2);
        let mut terminal = Terminal::new(TestBackend::new(60, 10)).unwrap();
        terminal.draw(|f| render(&mut app, f, &ctx)).unwrap();

        let text = buffer_to_string(terminal.backend().buffer());
        let lines: Vec<&str> = text.lines().collect();
        assert!(lines[0].contains("[^]"));
        assert!(text.contains("[F] f00"));
        assert!(text.contains("[F] f01"));
        assert!(lines[9].contains("2 items | list static"));
    }

    #[test]
    fn records_geometry_for_mouse_hits() {
        let (_dir, mut app, ctx) = setup(1);
        let mut terminal = Terminal::new(TestBackend::new(60, 10)).unwrap();
        terminal.draw(|f| render(&mut app, f, &ctx)).unwrap();

        // 10 rows minus menubar, status bar and the two border rows
        assert_eq!(app.entries_area, Rect::new(1, 2, 58, 6));
        assert_eq!(app.menu_hits.len(), 3);
    }

    #[test]
    fn selection_scrolls_into_view() {
        let (_dir, mut app, ctx) = setup(20);
        let mut terminal = Terminal::new(TestBackend::new(60, 10)).unwrap();
        terminal.draw(|f| render(&mut app, f, &ctx)).unwrap();
        app.select_last();
        terminal.draw(|f| render(&mut app, f, &ctx)).unwrap();

        // 22 entries, 6 visible rows
        assert_eq!(app.scroll_offset, 16);
        let text = buffer_to_string(terminal.backend().buffer());
        assert!(text.contains("[F] f19"));
        assert!(!text.contains("[F] f00"));
    }

    #[test]
    fn grid_mode_uses_columns() {
        let (_dir, mut app, ctx) = setup(4);
        app.toggle_view();
        let mut terminal = Terminal::new(TestBackend::new(42, 8)).unwrap();
        terminal.draw(|f| render(&mut app, f, &ctx)).unwrap();

        // 40 inner columns / 10 per item
        assert_eq!(app.projection().columns, 4);
        let text = buffer_to_string(terminal.backend().buffer());
        let row = text.lines().nth(2).unwrap();
        assert!(row.contains("[D] .."));
        assert!(row.contains("[F] f02"));
    }

    #[test]
    fn error_message_replaces_status_line() {
        let (_dir, mut app, ctx) = setup(0);
        app.set_status_message("Invalid path: /nope".into(), true);
        let mut terminal = Terminal::new(TestBackend::new(60, 6)).unwrap();
        terminal.draw(|f| render(&mut app, f, &ctx)).unwrap();
        let text = buffer_to_string(terminal.backend().buffer());
        assert!(text.lines().nth(5).unwrap().contains("Invalid path: /nope"));
    }
}
