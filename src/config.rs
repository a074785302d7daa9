//! Application configuration: TOML file loading, CLI overrides, and defaults.
//!
//! Resolution order (first found wins, values merge/override):
//! 1. CLI flags (`--config`, `--no-watcher`, `--grid`, etc.)
//! 2. `$FX_CONFIG` environment variable (path to config file)
//! 3. Project-local `.fx.toml` in the current working directory
//! 4. Global `~/.config/fx/config.toml`
//! 5. Built-in defaults

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::fs::entries::ViewMode;

// ── Section configs ──────────────────────────────────────────────────────────

/// General application settings.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct GeneralConfig {
    /// Starting directory (overridden by CLI positional arg). Home if unset.
    pub default_path: Option<String>,
    /// Enable mouse support.
    pub mouse: Option<bool>,
}

/// Listing presentation settings.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ViewConfig {
    /// View mode at startup: "list" or "grid".
    pub default_mode: Option<String>,
    /// Width of one grid cell, in terminal columns.
    pub grid_item_width: Option<u16>,
    /// Use nerd font icons (false = ASCII fallback).
    pub use_icons: Option<bool>,
}

/// Filesystem watcher settings.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct WatcherConfig {
    /// Enable live updates.
    pub enabled: Option<bool>,
    /// Debounce interval in milliseconds.
    pub debounce_ms: Option<u64>,
    /// Delay before re-trying a watch that could not be set up.
    pub retry_ms: Option<u64>,
}

/// Color overrides for the custom theme.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ThemeColorsConfig {
    pub entry_fg: Option<String>,
    pub folder_fg: Option<String>,
    pub selected_bg: Option<String>,
    pub selected_fg: Option<String>,
    pub menu_bg: Option<String>,
    pub menu_fg: Option<String>,
    pub status_bg: Option<String>,
    pub status_fg: Option<String>,
    pub border_fg: Option<String>,
}

/// Theme configuration section.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ThemeConfig {
    /// Color scheme: "dark", "light", "custom".
    pub scheme: Option<String>,
    /// Custom color overrides.
    pub custom: Option<ThemeColorsConfig>,
}

/// Log output settings.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive, e.g. "info" or "fx_explorer=debug".
    pub level: Option<String>,
    /// Directory for log files.
    pub directory: Option<String>,
}

// ── Top-level config ─────────────────────────────────────────────────────────

/// Top-level application configuration.
///
/// All fields are optional so that partial configs from different sources
/// can be merged together (CLI overrides file, file overrides defaults).
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub general: GeneralConfig,
    pub view: ViewConfig,
    pub watcher: WatcherConfig,
    pub theme: ThemeConfig,
    pub logging: LoggingConfig,
}

// ── Default constants ────────────────────────────────────────────────────────

/// Default grid cell width in terminal columns.
pub const DEFAULT_GRID_ITEM_WIDTH: u16 = 20;
/// Default debounce interval in milliseconds.
pub const DEFAULT_DEBOUNCE_MS: u64 = crate::fs::watcher::DEFAULT_DEBOUNCE_MS;
/// Default watch retry delay in milliseconds.
pub const DEFAULT_RETRY_MS: u64 = crate::controller::DEFAULT_WATCH_RETRY_MS;
/// Default log filter.
pub const DEFAULT_LOG_LEVEL: &str = "info";

// ── Config file locator ──────────────────────────────────────────────────────

/// Return the list of candidate config file paths in priority order.
///
/// Does NOT include the CLI `--config` path; `load` appends it.
fn candidate_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    if let Ok(env_path) = std::env::var("FX_CONFIG") {
        paths.push(PathBuf::from(env_path));
    }

    if let Ok(cwd) = std::env::current_dir() {
        paths.push(cwd.join(".fx.toml"));
    }

    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join("fx").join("config.toml"));
    }

    paths
}

/// Try to read and parse a TOML config file.
///
/// A missing file is `Ok(None)`; a file that exists but cannot be read or
/// parsed is an `Err` with a message for the log.
fn load_file(path: &Path) -> Result<Option<AppConfig>, String> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(format!("cannot read config file {}: {}", path.display(), e)),
    };
    toml::from_str::<AppConfig>(&content)
        .map(Some)
        .map_err(|e| format!("failed to parse config file {}: {}", path.display(), e))
}

// ── Merge logic ──────────────────────────────────────────────────────────────

/// The merged configuration plus any problems met while loading it.
///
/// Warnings are kept until logging is up, since logging is itself configured here.
#[derive(Debug, Default)]
pub struct LoadedConfig {
    pub config: AppConfig,
    pub warnings: Vec<String>,
}

impl AppConfig {
    /// Merge `other` on top of `self`. Its `Some` values win.
    pub fn merge(self, other: &AppConfig) -> AppConfig {
        AppConfig {
            general: GeneralConfig {
                default_path: other
                    .general
                    .default_path
                    .clone()
                    .or(self.general.default_path),
                mouse: other.general.mouse.or(self.general.mouse),
            },
            view: ViewConfig {
                default_mode: other
                    .view
                    .default_mode
                    .clone()
                    .or(self.view.default_mode),
                grid_item_width: other.view.grid_item_width.or(self.view.grid_item_width),
                use_icons: other.view.use_icons.or(self.view.use_icons),
            },
            watcher: WatcherConfig {
                enabled: other.watcher.enabled.or(self.watcher.enabled),
                debounce_ms: other.watcher.debounce_ms.or(self.watcher.debounce_ms),
                retry_ms: other.watcher.retry_ms.or(self.watcher.retry_ms),
            },
            theme: ThemeConfig {
                scheme: other.theme.scheme.clone().or(self.theme.scheme),
                custom: match (&self.theme.custom, &other.theme.custom) {
                    (_, Some(o)) => Some(o.clone()),
                    (Some(s), None) => Some(s.clone()),
                    (None, None) => None,
                },
            },
            logging: LoggingConfig {
                level: other.logging.level.clone().or(self.logging.level),
                directory: other.logging.directory.clone().or(self.logging.directory),
            },
        }
    }

    /// Load the final merged configuration.
    ///
    /// `cli_config_path` is an explicit config file path from `--config`.
    /// `cli_overrides` are partial overrides derived from CLI flags.
    pub fn load(cli_config_path: Option<&Path>, cli_overrides: Option<&AppConfig>) -> LoadedConfig {
        let mut loaded = LoadedConfig::default();

        let mut files: Vec<PathBuf> = candidate_paths();
        files.reverse();
        if let Some(cli_path) = cli_config_path {
            files.push(cli_path.to_path_buf());
        }

        // Lowest priority first so that later files overwrite.
        for path in &files {
            match load_file(path) {
                Ok(Some(file_cfg)) => loaded.config = loaded.config.merge(&file_cfg),
                Ok(None) => {}
                Err(warning) => loaded.warnings.push(warning),
            }
        }

        if let Some(overrides) = cli_overrides {
            loaded.config = loaded.config.merge(overrides);
        }

        loaded
    }

    // ── Convenience getters with built-in defaults ──────────────────────────

    /// Configured start directory, if any.
    pub fn default_path(&self) -> Option<&str> {
        self.general.default_path.as_deref()
    }

    /// Whether mouse support is enabled.
    pub fn mouse_enabled(&self) -> bool {
        self.general.mouse.unwrap_or(true)
    }

    /// View mode at startup.
    pub fn default_view_mode(&self) -> ViewMode {
        ViewMode::parse_config(self.view.default_mode.as_deref().unwrap_or("list"))
    }

    /// Grid cell width in terminal columns (never zero).
    pub fn grid_item_width(&self) -> u16 {
        self.view
            .grid_item_width
            .unwrap_or(DEFAULT_GRID_ITEM_WIDTH)
            .max(1)
    }

    /// Whether to use nerd font icons.
    pub fn use_icons(&self) -> bool {
        self.view.use_icons.unwrap_or(true)
    }

    /// Whether the watcher is enabled.
    pub fn watcher_enabled(&self) -> bool {
        self.watcher.enabled.unwrap_or(true)
    }

    /// Watcher debounce interval in milliseconds.
    pub fn debounce_ms(&self) -> u64 {
        self.watcher.debounce_ms.unwrap_or(DEFAULT_DEBOUNCE_MS)
    }

    /// Watch retry delay in milliseconds.
    pub fn retry_ms(&self) -> u64 {
        self.watcher.retry_ms.unwrap_or(DEFAULT_RETRY_MS)
    }

    /// Theme scheme: "dark", "light", or "custom".
    pub fn theme_scheme(&self) -> &str {
        self.theme.scheme.as_deref().unwrap_or("dark")
    }

    /// Log filter directive.
    pub fn log_level(&self) -> &str {
        self.logging.level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL)
    }

    /// Directory for log files: configured, else `<cache_dir>/fx/logs`.
    pub fn log_directory(&self) -> PathBuf {
        if let Some(dir) = &self.logging.directory {
            return PathBuf::from(dir);
        }
        dirs::cache_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join("fx")
            .join("logs")
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_values() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.default_path(), None);
        assert!(cfg.mouse_enabled());
        assert_eq!(cfg.default_view_mode(), ViewMode::List);
        assert_eq!(cfg.grid_item_width(), 20);
        assert!(cfg.use_icons());
        assert!(cfg.watcher_enabled());
        assert_eq!(cfg.debounce_ms(), 300);
        assert_eq!(cfg.retry_ms(), 2_000);
        assert_eq!(cfg.theme_scheme(), "dark");
        assert_eq!(cfg.log_level(), "info");
        assert!(cfg.log_directory().ends_with("fx/logs"));
    }

    #[test]
    fn test_toml_parsing_full() {
        let toml = r#"
[general]
default_path = "/srv"
mouse = false

[view]
default_mode = "grid"
grid_item_width = 28
use_icons = false

[watcher]
enabled = false
debounce_ms = 500
retry_ms = 10000

[theme]
scheme = "light"

[logging]
level = "debug"
directory = "/var/tmp/fx"
"#;
        let cfg: AppConfig = toml::from_str(toml).expect("parse failed");
        assert_eq!(cfg.default_path(), Some("/srv"));
        assert!(!cfg.mouse_enabled());
        assert_eq!(cfg.default_view_mode(), ViewMode::Grid);
        assert_eq!(cfg.grid_item_width(), 28);
        assert!(!cfg.use_icons());
        assert!(!cfg.watcher_enabled());
        assert_eq!(cfg.debounce_ms(), 500);
        assert_eq!(cfg.retry_ms(), 10_000);
        assert_eq!(cfg.theme_scheme(), "light");
        assert_eq!(cfg.log_level(), "debug");
        assert_eq!(cfg.log_directory(), PathBuf::from("/var/tmp/fx"));
    }

    #[test]
    fn test_toml_parsing_partial() {
        let toml = r#"
[view]
default_mode = "grid"
"#;
        let cfg: AppConfig = toml::from_str(toml).expect("parse failed");
        assert_eq!(cfg.default_view_mode(), ViewMode::Grid);
        assert_eq!(cfg.grid_item_width(), 20);
        assert!(cfg.watcher_enabled());
    }

    #[test]
    fn test_toml_parsing_empty() {
        let cfg: AppConfig = toml::from_str("").expect("parse failed");
        assert_eq!(cfg.default_view_mode(), ViewMode::List);
    }

    #[test]
    fn test_zero_grid_width_is_clamped() {
        let cfg: AppConfig = toml::from_str("[view]\ngrid_item_width = 0").expect("parse");
        assert_eq!(cfg.grid_item_width(), 1);
    }

    #[test]
    fn test_merge_overrides() {
        let base = AppConfig {
            view: ViewConfig {
                default_mode: Some("list".into()),
                grid_item_width: Some(16),
                ..Default::default()
            },
            watcher: WatcherConfig {
                debounce_ms: Some(100),
                ..Default::default()
            },
            ..Default::default()
        };

        let over = AppConfig {
            view: ViewConfig {
                default_mode: Some("grid".into()),
                ..Default::default()
            },
            ..Default::default()
        };

        let merged = base.merge(&over);
        assert_eq!(merged.default_view_mode(), ViewMode::Grid); // overridden
        assert_eq!(merged.grid_item_width(), 16); // from base
        assert_eq!(merged.debounce_ms(), 100); // from base
    }

    #[test]
    fn test_merge_none_does_not_clear_some() {
        let base = AppConfig {
            watcher: WatcherConfig {
                enabled: Some(false),
                debounce_ms: Some(500),
                retry_ms: None,
            },
            ..Default::default()
        };
        let merged = base.merge(&AppConfig::default());
        assert!(!merged.watcher_enabled());
        assert_eq!(merged.debounce_ms(), 500);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cfg_path = dir.path().join("test-config.toml");
        let mut f = std::fs::File::create(&cfg_path).expect("create");
        writeln!(
            f,
            r#"
[view]
grid_item_width = 24

[watcher]
debounce_ms = 75
"#
        )
        .expect("write");

        let cfg = load_file(&cfg_path).expect("read").expect("present");
        assert_eq!(cfg.grid_item_width(), 24);
        assert_eq!(cfg.debounce_ms(), 75);
        assert!(cfg.use_icons());
    }

    #[test]
    fn test_load_missing_file() {
        let result = load_file(Path::new("/nonexistent/config.toml"));
        assert!(matches!(result, Ok(None)));
    }

    #[test]
    fn test_load_invalid_toml_is_a_warning() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cfg_path = dir.path().join("bad.toml");
        std::fs::write(&cfg_path, "this is { not valid toml").expect("write");
        assert!(load_file(&cfg_path).is_err());

        let loaded = AppConfig::load(Some(&cfg_path), None);
        assert!(loaded
            .warnings
            .iter()
            .any(|w| w.contains("bad.toml")));
    }

    #[test]
    fn test_load_with_cli_overrides() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cfg_path = dir.path().join("config.toml");
        std::fs::write(
            &cfg_path,
            r#"
[view]
default_mode = "grid"

[watcher]
enabled = true
"#,
        )
        .expect("write");

        let cli_overrides = AppConfig {
            watcher: WatcherConfig {
                enabled: Some(false),
                ..Default::default()
            },
            ..Default::default()
        };

        let cfg = AppConfig::load(Some(&cfg_path), Some(&cli_overrides)).config;
        assert!(!cfg.watcher_enabled());
        assert_eq!(cfg.default_view_mode(), ViewMode::Grid);
    }

    #[test]
    fn test_theme_custom_colors() {
        let toml = r##"
[theme]
scheme = "custom"

[theme.custom]
folder_fg = "#89b4fa"
border_fg = "#565f89"
"##;
        let cfg: AppConfig = toml::from_str(toml).expect("parse");
        assert_eq!(cfg.theme_scheme(), "custom");
        let custom = cfg.theme.custom.as_ref().expect("custom present");
        assert_eq!(custom.folder_fg.as_deref(), Some("#89b4fa"));
        assert_eq!(custom.border_fg.as_deref(), Some("#565f89"));
        assert!(custom.menu_bg.is_none());
    }
}
