//! Rendering context: color palettes, icon lookup, and resolution from config.
//!
//! Nothing here is global. `main` resolves one `RenderContext` from the
//! config and the UI passes it by reference into every widget.

use ratatui::style::Color;

use crate::config::{AppConfig, ThemeColorsConfig, ThemeConfig};

// ── Runtime theme colors ─────────────────────────────────────────────────────

/// All runtime colors used in the UI.
#[derive(Debug, Clone)]
pub struct ThemeColors {
    // Listing
    pub entry_fg: Color,
    pub folder_fg: Color,
    pub selected_bg: Color,
    pub selected_fg: Color,

    // Menubar
    pub menu_bg: Color,
    pub menu_fg: Color,

    // Status bar
    pub status_bg: Color,
    pub status_fg: Color,

    // Borders & chrome
    pub border_fg: Color,

    // Semantic colors (not configurable, consistent across themes)
    pub error_fg: Color,
    pub success_fg: Color,
    pub accent_fg: Color,
    pub dim_fg: Color,
}

// ── Built-in palettes ────────────────────────────────────────────────────────

/// Dark theme using Catppuccin Mocha palette.
pub fn dark_theme() -> ThemeColors {
    ThemeColors {
        entry_fg: Color::Rgb(205, 214, 244),    // #cdd6f4 (text)
        folder_fg: Color::Rgb(137, 180, 250),   // #89b4fa (blue)
        selected_bg: Color::Rgb(69, 71, 90),    // #45475a (surface1)
        selected_fg: Color::Rgb(205, 214, 244), // #cdd6f4

        menu_bg: Color::Rgb(49, 50, 68),     // #313244 (surface0)
        menu_fg: Color::Rgb(205, 214, 244),

        status_bg: Color::Rgb(30, 30, 46), // #1e1e2e (base)
        status_fg: Color::Rgb(205, 214, 244),

        border_fg: Color::Rgb(88, 91, 112), // #585b70 (surface2)

        error_fg: Color::Rgb(243, 139, 168),   // #f38ba8 (red)
        success_fg: Color::Rgb(166, 227, 161), // #a6e3a1 (green)
        accent_fg: Color::Rgb(203, 166, 247),  // #cba6f7 (mauve)
        dim_fg: Color::Rgb(108, 112, 134),     // #6c7086 (overlay0)
    }
}

/// Light theme using Catppuccin Latte palette.
pub fn light_theme() -> ThemeColors {
    ThemeColors {
        entry_fg: Color::Rgb(76, 79, 105),        // #4c4f69 (text)
        folder_fg: Color::Rgb(30, 102, 245),      // #1e66f5 (blue)
        selected_bg: Color::Rgb(204, 208, 218),   // #ccd0da (surface1)
        selected_fg: Color::Rgb(76, 79, 105),

        menu_bg: Color::Rgb(230, 233, 239), // #e6e9ef (surface0)
        menu_fg: Color::Rgb(76, 79, 105),

        status_bg: Color::Rgb(239, 241, 245), // #eff1f5 (base)
        status_fg: Color::Rgb(76, 79, 105),

        border_fg: Color::Rgb(172, 176, 190), // #acb0be (surface2)

        error_fg: Color::Rgb(210, 15, 57),   // #d20f39 (red)
        success_fg: Color::Rgb(64, 160, 43), // #40a02b (green)
        accent_fg: Color::Rgb(136, 57, 239), // #8839ef (mauve)
        dim_fg: Color::Rgb(156, 160, 176),   // #9ca0b0 (overlay0)
    }
}

// ── Color parsing ────────────────────────────────────────────────────────────

/// Parse a hex color string like `"#aabbcc"` into a `ratatui::style::Color`.
/// Returns `None` for malformed input.
pub fn parse_hex_color(hex: &str) -> Option<Color> {
    let hex = hex.strip_prefix('#').unwrap_or(hex);
    if hex.len() != 6 {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some(Color::Rgb(r, g, b))
}

/// Overwrite `slot` when `hex` parses.
fn override_color(slot: &mut Color, hex: Option<&str>) {
    if let Some(color) = hex.and_then(parse_hex_color) {
        *slot = color;
    }
}

// ── Theme resolution ─────────────────────────────────────────────────────────

/// Resolve the final `ThemeColors` from config.
///
/// - `"dark"` (default): dark Catppuccin palette
/// - `"light"`: light Catppuccin palette
/// - `"custom"`: start from dark palette, then override with custom hex values
pub fn resolve_theme(config: &ThemeConfig) -> ThemeColors {
    let scheme = config.scheme.as_deref().unwrap_or("dark");
    match scheme {
        "light" => light_theme(),
        "custom" => {
            let mut theme = dark_theme();
            if let Some(custom) = &config.custom {
                apply_custom_colors(&mut theme, custom);
            }
            theme
        }
        _ => dark_theme(),
    }
}

fn apply_custom_colors(theme: &mut ThemeColors, custom: &ThemeColorsConfig) {
    override_color(&mut theme.entry_fg, custom.entry_fg.as_deref());
    override_color(&mut theme.folder_fg, custom.folder_fg.as_deref());
    override_color(&mut theme.selected_bg, custom.selected_bg.as_deref());
    override_color(&mut theme.selected_fg, custom.selected_fg.as_deref());
    override_color(&mut theme.menu_bg, custom.menu_bg.as_deref());
    override_color(&mut theme.menu_fg, custom.menu_fg.as_deref());
    override_color(&mut theme.status_bg, custom.status_bg.as_deref());
    override_color(&mut theme.status_fg, custom.status_fg.as_deref());
    override_color(&mut theme.border_fg, custom.border_fg.as_deref());
}

// ── Icons ────────────────────────────────────────────────────────────────────

/// What an icon stands for. Widgets ask by meaning, never by glyph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IconKind {
    Folder,
    File,
    Up,
    ViewList,
    ViewGrid,
}

/// Glyph table for one icon style.
#[derive(Debug, Clone)]
pub struct IconSet {
    nerd: bool,
}

impl IconSet {
    pub fn new(nerd: bool) -> Self {
        Self { nerd }
    }

    pub fn glyph(&self, kind: IconKind) -> &'static str {
        if self.nerd {
            match kind {
                IconKind::Folder => "\u{f07b} ",
                IconKind::File => "\u{f15b} ",
                IconKind::Up => "\u{f062}",
                IconKind::ViewList => "\u{f03a}",
                IconKind::ViewGrid => "\u{f00a}",
            }
        } else {
            match kind {
                IconKind::Folder => "[D] ",
                IconKind::File => "[F] ",
                IconKind::Up => "[^]",
                IconKind::ViewList => "[=]",
                IconKind::ViewGrid => "[#]",
            }
        }
    }
}

/// Everything widgets need besides the state they draw.
#[derive(Debug, Clone)]
pub struct RenderContext {
    pub theme: ThemeColors,
    pub icons: IconSet,
    pub grid_item_width: u16,
}

impl RenderContext {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            theme: resolve_theme(&config.theme),
            icons: IconSet::new(config.use_icons()),
            grid_item_width: config.grid_item_width(),
        }
    }
}

impl Default for RenderContext {
    fn default() -> Self {
        Self::from_config(&AppConfig::default())
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────
