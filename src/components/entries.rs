use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    widgets::{Block, Widget},
};

use crate::fs::entries::{Entry, EntryCollection};
use crate::layout::Projection;
use crate::theme::{IconKind, RenderContext};

/// Listing pane. Draws `collection` in the cells `projection` assigns.
pub struct EntriesWidget<'a> {
    collection: &'a EntryCollection,
    projection: Projection,
    ctx: &'a RenderContext,
    selected: usize,
    scroll_offset: usize,
    block: Option<Block<'a>>,
}

impl<'a> EntriesWidget<'a> {
    pub fn new(collection: &'a EntryCollection, projection: Projection, ctx: &'a RenderContext) -> Self {
        Self {
            collection,
            projection,
            ctx,
            selected: 0,
            scroll_offset: 0,
            block: None,
        }
    }

    pub fn selected(mut self, index: usize) -> Self {
        self.selected = index;
        self
    }

    pub fn scroll_offset(mut self, rows: usize) -> Self {
        self.scroll_offset = rows;
        self
    }

    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }

    fn entry_style(&self, entry: &Entry, selected: bool) -> Style {
        let theme = &self.ctx.theme;
        let style = if entry.is_folder() {
            Style::default().fg(theme.folder_fg).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(theme.entry_fg)
        };
        if selected {
            style.bg(theme.selected_bg).fg(theme.selected_fg)
        } else {
            style
        }
    }

    fn label(&self, entry: &Entry) -> String {
        let kind = if entry.is_folder() {
            IconKind::Folder
        } else {
            IconKind::File
        };
        format!("{}{}", self.ctx.icons.glyph(kind), entry.display_name())
    }
}

impl Widget for EntriesWidget<'_> {
    fn render(mut self, area: Rect, buf: &mut Buffer) {
        let inner = match self.block.take() {
            Some(block) => {
                let inner = block.inner(area);
                block.render(area, buf);
                inner
            }
            None => area,
        };
        if inner.width == 0 || inner.height == 0 {
            return;
        }

        let columns = self.projection.columns.max(1);
        let cell_width = if columns == 1 {
            inner.width
        } else {
            self.ctx.grid_item_width.max(1)
        };

        for visible_row in 0..inner.height as usize {
            let row = self.scroll_offset + visible_row;
            if row >= self.projection.row_count {
                break;
            }
            let y = inner.y + visible_row as u16;
            for column in 0..columns {
                let Some(index) = self.projection.index_at(row, column) else {
                    break;
                };
                let Some(entry) = self.collection.entries().get(index) else {
                    break;
                };
                let x = inner.x + (column as u16).saturating_mul(cell_width);
                let right = inner.x + inner.width;
                if x >= right {
                    break;
                }
                let width = cell_width.min(right - x);
                let style = self.entry_style(entry, index == self.selected);
                if index == self.selected {
                    buf.set_style(Rect::new(x, y, width, 1), style);
                }
                // One blank column between grid cells.
                let text_width = if columns == 1 { width } else { width.saturating_sub(1) };
                buf.set_stringn(x, y, fit(&self.label(entry), text_width as usize), text_width as usize, style);
            }
        }
    }
}

/// Truncate `text` to `width` characters, marking the cut with `…`.
fn fit(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    if width == 0 {
        return String::new();
    }
    let mut out: String = text.chars().take(width - 1).collect();
    out.push('…');
    out
}
