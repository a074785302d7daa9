use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Widget,
};

use crate::theme::ThemeColors;

const KEY_HINTS: &str = " e:path  v:view  u:up  q:quit ";

/// Bottom bar: current path, listing summary, watch state and key hints,
/// or a transient message spanning the whole row.
pub struct StatusBarWidget<'a> {
    path_str: &'a str,
    listing_info: &'a str,
    theme: &'a ThemeColors,
    status_message: Option<&'a str>,
    is_error: bool,
    watch_status: Option<&'a str>,
}

impl<'a> StatusBarWidget<'a> {
    pub fn new(path_str: &'a str, listing_info: &'a str, theme: &'a ThemeColors) -> Self {
        Self {
            path_str,
            listing_info,
            theme,
            status_message: None,
            is_error: false,
            watch_status: None,
        }
    }

    pub fn status_message(mut self, msg: &'a str, is_error: bool) -> Self {
        self.status_message = Some(msg);
        self.is_error = is_error;
        self
    }

    pub fn watch_status(mut self, status: &'a str) -> Self {
        self.watch_status = Some(status);
        self
    }
}

/// Keep the last `budget` characters of `path`, prefixed with `...` when cut.
fn tail(path: &str, budget: usize) -> String {
    let len = path.chars().count();
    if len <= budget {
        return path.to_string();
    }
    if budget <= 3 {
        return path.chars().take(budget).collect();
    }
    let kept: String = path.chars().skip(len - (budget - 3)).collect();
    format!("...{kept}")
}

impl Widget for StatusBarWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height == 0 || area.width == 0 {
            return;
        }

        let width = area.width as usize;
        buf.set_style(area, Style::default().bg(self.theme.status_bg));

        if let Some(msg) = self.status_message {
            let style = if self.is_error {
                Style::default()
                    .bg(self.theme.error_fg)
                    .fg(self.theme.status_fg)
            } else {
                Style::default().fg(self.theme.success_fg)
            };
            let display = format!("{:<width$}", msg.chars().take(width).collect::<String>());
            buf.set_line(area.x, area.y, &Line::from(Span::styled(display, style)), area.width);
            return;
        }

        // [path] ... [info] [watch] [hints]
        let watch = self.watch_status.map(|s| format!(" {s}")).unwrap_or_default();
        let right_len = self.listing_info.chars().count() + watch.chars().count() + KEY_HINTS.len();
        let path_budget = width.saturating_sub(right_len + 1);
        let path_display = tail(self.path_str, path_budget);
        let gap = width
            .saturating_sub(path_display.chars().count())
            .saturating_sub(right_len);

        let spans = vec![
            Span::styled(path_display, Style::default().fg(self.theme.status_fg)),
            Span::raw(" ".repeat(gap)),
            Span::styled(self.listing_info, Style::default().fg(self.theme.accent_fg)),
            Span::styled(
                watch,
                Style::default()
                    .fg(self.theme.dim_fg)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                KEY_HINTS,
                Style::default()
                    .fg(self.theme.dim_fg)
                    .add_modifier(Modifier::DIM),
            ),
        ];
        buf.set_line(area.x, area.y, &Line::from(spans), area.width);
    }
}
