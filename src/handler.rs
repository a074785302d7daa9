use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};

use crate::app::{App, AppMode};
use crate::layout::Direction;

/// Handle a key event.
pub fn handle_key_event(app: &mut App, key: KeyEvent) {
    if key.kind != KeyEventKind::Press {
        return;
    }
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.quit();
        return;
    }
    match app.mode {
        AppMode::Normal => handle_normal_key(app, key),
        AppMode::EditingPath => handle_editor_key(app, key),
    }
}

fn handle_normal_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.quit(),
        KeyCode::Up | KeyCode::Char('k') => app.move_selection(Direction::Up),
        KeyCode::Down | KeyCode::Char('j') => app.move_selection(Direction::Down),
        KeyCode::Left | KeyCode::Char('h') => app.move_selection(Direction::Left),
        KeyCode::Right | KeyCode::Char('l') if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.move_selection(Direction::Right)
        }
        KeyCode::Home | KeyCode::Char('g') => app.select_first(),
        KeyCode::End | KeyCode::Char('G') => app.select_last(),
        KeyCode::Enter => app.activate_selected(),
        KeyCode::Backspace | KeyCode::Char('u') | KeyCode::Char('-') => app.go_up(),
        KeyCode::Char('v') => app.toggle_view(),
        KeyCode::Char('e') => app.start_path_edit(),
        KeyCode::Char('l') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.start_path_edit()
        }
        _ => {}
    }
}

fn handle_editor_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Enter => app.submit_path_edit(),
        KeyCode::Esc => app.cancel_path_edit(),
        KeyCode::Backspace => app.editor_delete_char(),
        KeyCode::Left => app.editor_cursor_left(),
        KeyCode::Right => app.editor_cursor_right(),
        KeyCode::Home => app.editor_cursor_home(),
        KeyCode::End => app.editor_cursor_end(),
        KeyCode::Char(c) => app.editor_input_char(c),
        _ => {}
    }
}

/// Handle a mouse event. Only left clicks and the wheel do anything.
pub fn handle_mouse_event(app: &mut App, mouse: MouseEvent) {
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => app.click_at(mouse.column, mouse.row),
        MouseEventKind::ScrollDown if app.mode == AppMode::Normal => {
            app.move_selection(Direction::Down)
        }
        MouseEventKind::ScrollUp if app.mode == AppMode::Normal => {
            app.move_selection(Direction::Up)
        }
        _ => {}
    }
}
