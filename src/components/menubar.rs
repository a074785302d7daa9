use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::Span,
    widgets::Widget,
};

use crate::app::{App, AppMode};
use crate::fs::entries::ViewMode;
use crate::theme::{IconKind, RenderContext};

/// What a clickable menubar item does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    GoUp,
    ToggleView,
    EditPath,
}

/// One menubar item. Each variant carries only what it needs to draw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuItem {
    Icon { kind: IconKind, action: MenuAction },
    Label { text: String, action: Option<MenuAction> },
    /// Text input. `cursor` is a byte offset into `input`.
    PathEditor { input: String, cursor: usize },
    Separator,
}

impl MenuItem {
    fn action(&self) -> Option<MenuAction> {
        match self {
            MenuItem::Icon { action, .. } => Some(*action),
            MenuItem::Label { action, .. } => *action,
            MenuItem::PathEditor { .. } | MenuItem::Separator => None,
        }
    }

    /// Preferred width in cells. `None` means take whatever is left.
    fn preferred_width(&self, ctx: &RenderContext) -> Option<u16> {
        match self {
            MenuItem::Icon { kind, .. } => Some(Span::raw(ctx.icons.glyph(*kind)).width() as u16 + 2),
            MenuItem::Label { text, .. } => Some(Span::raw(text.as_str()).width() as u16 + 2),
            MenuItem::PathEditor { .. } => None,
            MenuItem::Separator => Some(1),
        }
    }
}

/// Items for the current application state.
pub fn menu_items(app: &App) -> Vec<MenuItem> {
    let view_icon = match app.view.view_mode() {
        ViewMode::List => IconKind::ViewList,
        ViewMode::Grid => IconKind::ViewGrid,
    };
    let location = match app.mode {
        AppMode::EditingPath => MenuItem::PathEditor {
            input: app.editor.input.clone(),
            cursor: app.editor.cursor_position,
        },
        AppMode::Normal => MenuItem::Label {
            text: app.view.current_path().to_string_lossy().to_string(),
            action: Some(MenuAction::EditPath),
        },
    };
    vec![
        MenuItem::Icon {
            kind: IconKind::Up,
            action: MenuAction::GoUp,
        },
        MenuItem::Separator,
        MenuItem::Icon {
            kind: view_icon,
            action: MenuAction::ToggleView,
        },
        MenuItem::Separator,
        location,
    ]
}

/// Single-row menubar.
pub struct MenubarWidget<'a> {
    items: &'a [MenuItem],
    ctx: &'a RenderContext,
}

impl<'a> MenubarWidget<'a> {
    pub fn new(items: &'a [MenuItem], ctx: &'a RenderContext) -> Self {
        Self { items, ctx }
    }

    /// Where each item lands inside `area`, left to right. Items that do
    /// not fit are dropped.
    pub fn layout(&self, area: Rect) -> Vec<(Rect, &'a MenuItem)> {
        let mut placed = Vec::with_capacity(self.items.len());
        let mut x = area.x;
        let right = area.x.saturating_add(area.width);
        for item in self.items {
            let remaining = right.saturating_sub(x);
            if remaining == 0 {
                break;
            }
            let width = item
                .preferred_width(self.ctx)
                .map_or(remaining, |w| w.min(remaining));
            placed.push((Rect::new(x, area.y, width, 1), item));
            x = x.saturating_add(width);
        }
        placed
    }

    /// Clickable regions for the items in `area`.
    pub fn hits(&self, area: Rect) -> Vec<(Rect, MenuAction)> {
        self.layout(area)
            .into_iter()
            .filter_map(|(rect, item)| item.action().map(|a| (rect, a)))
            .collect()
    }
}

impl Widget for MenubarWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height == 0 || area.width == 0 {
            return;
        }
        let base = Style::default()
            .bg(self.ctx.theme.menu_bg)
            .fg(self.ctx.theme.menu_fg);
        buf.set_style(area, base);

        for (rect, item) in self.layout(area) {
            render_item(item, rect, buf, self.ctx, base);
        }
    }
}

fn render_item(item: &MenuItem, rect: Rect, buf: &mut Buffer, ctx: &RenderContext, base: Style) {
    match item {
        MenuItem::Icon { kind, .. } => {
            let style = base.fg(ctx.theme.accent_fg).add_modifier(Modifier::BOLD);
            buf.set_stringn(rect.x + 1, rect.y, ctx.icons.glyph(*kind), rect.width.saturating_sub(1) as usize, style);
        }
        MenuItem::Label { text, .. } => {
            buf.set_stringn(rect.x + 1, rect.y, text, rect.width.saturating_sub(1) as usize, base);
        }
        MenuItem::PathEditor { input, cursor } => {
            let field = base.bg(ctx.theme.selected_bg).fg(ctx.theme.selected_fg);
            buf.set_style(rect, field);
            let inner_width = rect.width.saturating_sub(2) as usize;
            if inner_width == 0 {
                return;
            }
            let chars: Vec<char> = input.chars().collect();
            let cursor_chars = input[..(*cursor).min(input.len())].chars().count();
            // Scroll so the cursor stays visible.
            let start = (cursor_chars + 1).saturating_sub(inner_width);
            let visible: String = chars.iter().skip(start).take(inner_width).collect();
            buf.set_stringn(rect.x + 1, rect.y, &visible, inner_width, field);

            let cursor_x = rect.x + 1 + (cursor_chars - start) as u16;
            if let Some(cell) = buf.cell_mut((cursor_x, rect.y)) {
                cell.set_style(field.add_modifier(Modifier::REVERSED));
            }
        }
        MenuItem::Separator => {
            buf.set_string(rect.x, rect.y, "│", base.fg(ctx.theme.border_fg));
        }
    }
}
