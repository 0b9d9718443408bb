use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::backend::{ApiFlavor, parse_tag_list};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub poll: PollConfig,
    /// One entry per quick-action control, in display order
    pub quick_tags: Vec<QuickTagConfig>,
    pub layout: LayoutConfig,
    pub ui: UiConfig,
    pub theme: ThemeConfig,
    /// tracing filter directive, e.g. "info" or "inboxreview=debug"
    pub log_level: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Root URL of the review backend
    pub base_url: String,
    pub timeout_secs: u64,
    pub user_agent: Option<String>,
    /// "current" for /doc/... endpoints, "legacy" for the old /api/... aliases
    pub api: ApiFlavor,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct PollConfig {
    pub status_interval_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuickTagConfig {
    pub label: String,
    pub key: char,
    /// Comma separated tag names; a leading '-' asks the backend to remove the tag
    pub tags: String,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Width of the pagination pane in columns
    pub pagination_width: u16,
    /// Height of the detail pane in rows
    pub detail_height: u16,
    /// Rows taken by everything above and below the preview
    pub navbar_rows: u16,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// How long a notification stays in the status bar
    pub toast_secs: u64,
}

/// Semantic theme configuration using Capstan Cloud colors as defaults
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ThemeConfig {
    // Base colors
    pub bg_panel: String,
    pub fg: String,
    pub fg_muted: String,
    pub fg_subtle: String,

    // Border colors
    pub border: String,
    pub border_subtle: String,
    pub border_active: String,

    // Accent colors
    pub primary: String,

    // Semantic colors
    pub success: String,
    pub error: String,
    pub info: String,

    // UI-specific mappings
    pub selected_bg: String,
    pub badge_bg: String,
    pub badge_fg: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            poll: PollConfig::default(),
            quick_tags: default_quick_tags(),
            layout: LayoutConfig::default(),
            ui: UiConfig::default(),
            theme: ThemeConfig::default(),
            log_level: None,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            timeout_secs: 30,
            user_agent: None,
            api: ApiFlavor::Current,
        }
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            status_interval_secs: 5,
        }
    }
}

impl PollConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.status_interval_secs)
    }
}

impl QuickTagConfig {
    pub fn new(label: &str, key: char, tags: &str) -> Self {
        Self {
            label: label.to_string(),
            key,
            tags: tags.to_string(),
        }
    }

    pub fn tag_list(&self) -> Vec<String> {
        parse_tag_list(&self.tags)
    }
}

/// Done, send to AI, flag for review
fn default_quick_tags() -> Vec<QuickTagConfig> {
    vec![
        QuickTagConfig::new("Done", '1', "-Inbox"),
        QuickTagConfig::new("Send to AI", '2', "ai-title, -Inbox"),
        QuickTagConfig::new("Investigate", '3', "check, -Inbox"),
    ]
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            pagination_width: 24,
            detail_height: 9,
            navbar_rows: 10,
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self { toast_secs: 5 }
    }
}

/// Capstan Cloud theme - warm earth tones with gold accents
impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            // Base colors
            bg_panel: "#262422".to_string(),
            fg: "#f7f7f5".to_string(),
            fg_muted: "#8c8985".to_string(),
            fg_subtle: "#b8b5b0".to_string(),

            // Border colors
            border: "#524f4c".to_string(),
            border_subtle: "#393634".to_string(),
            border_active: "#d4a366".to_string(), // primary

            // Accent colors
            primary: "#d4a366".to_string(),

            // Semantic colors
            success: "#52c41a".to_string(),
            error: "#ff4d4f".to_string(),
            info: "#88c0d0".to_string(), // cyan

            // UI-specific mappings
            selected_bg: "#393634".to_string(), // border_subtle
            badge_bg: "#ff4d4f".to_string(),    // error (red pill)
            badge_fg: "#f7f7f5".to_string(),    // fg
        }
    }
}

impl Config {
    /// Default location: <config dir>/inboxreview/config.toml
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .map(|p| p.join("inboxreview/config.toml"))
            .unwrap_or_else(|| PathBuf::from("~/.config/inboxreview/config.toml"))
    }

    /// Load from `path`, or the default location. A missing file yields defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config_path = path.map(Path::to_path_buf).unwrap_or_else(Self::default_path);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content =
            std::fs::read_to_string(&config_path).map_err(|source| ConfigError::Read {
                path: config_path.clone(),
                source,
            })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: config_path,
            source,
        })
    }
}

impl ThemeConfig {
    // Convenience methods for common colors
    pub fn bg_panel(&self) -> ratatui::style::Color {
        parse_color(&self.bg_panel)
    }
    pub fn fg(&self) -> ratatui::style::Color {
        parse_color(&self.fg)
    }
    pub fn fg_muted(&self) -> ratatui::style::Color {
        parse_color(&self.fg_muted)
    }
    pub fn fg_subtle(&self) -> ratatui::style::Color {
        parse_color(&self.fg_subtle)
    }
    pub fn border(&self) -> ratatui::style::Color {
        parse_color(&self.border)
    }
    pub fn border_subtle(&self) -> ratatui::style::Color {
        parse_color(&self.border_subtle)
    }
    pub fn border_active(&self) -> ratatui::style::Color {
        parse_color(&self.border_active)
    }
    pub fn primary(&self) -> ratatui::style::Color {
        parse_color(&self.primary)
    }
    pub fn success(&self) -> ratatui::style::Color {
        parse_color(&self.success)
    }
    pub fn error(&self) -> ratatui::style::Color {
        parse_color(&self.error)
    }
    pub fn info(&self) -> ratatui::style::Color {
        parse_color(&self.info)
    }
    pub fn selected_bg(&self) -> ratatui::style::Color {
        parse_color(&self.selected_bg)
    }
    pub fn badge_bg(&self) -> ratatui::style::Color {
        parse_color(&self.badge_bg)
    }
    pub fn badge_fg(&self) -> ratatui::style::Color {
        parse_color(&self.badge_fg)
    }
}

/// Parse color string to ratatui Color
pub fn parse_color(s: &str) -> ratatui::style::Color {
    use ratatui::style::Color;

    // Try hex first (#RRGGBB)
    if s.starts_with('#') && s.len() == 7 && s.is_ascii() {
        if let (Ok(r), Ok(g), Ok(b)) = (
            u8::from_str_radix(&s[1..3], 16),
            u8::from_str_radix(&s[3..5], 16),
            u8::from_str_radix(&s[5..7], 16),
        ) {
            return Color::Rgb(r, g, b);
        }
    }

    // Named colors
    match s.to_lowercase().as_str() {
        "black" => Color::Black,
        "red" => Color::Red,
        "green" => Color::Green,
        "yellow" => Color::Yellow,
        "blue" => Color::Blue,
        "magenta" => Color::Magenta,
        "cyan" => Color::Cyan,
        "gray" | "grey" => Color::Gray,
        "darkgray" | "darkgrey" => Color::DarkGray,
        "white" => Color::White,
        _ => Color::White,
    }
}
