//! Color palettes and the persisted theme choice

use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::shell::markup::{Line, Span};

#[derive(Debug, Error)]
pub enum ThemeError {
    #[error("invalid color '{0}', expected #rrggbb")]
    InvalidColor(String),
    #[error("theme file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Border {
    pub visible: bool,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptColors {
    pub default: String,
    pub user: String,
    pub host: String,
    pub input: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LinkColors {
    pub text: String,
    pub highlight_color: String,
    pub highlight_text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CommandColors {
    pub text_color: String,
}

/// One color table. Field names follow the config file keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Palette {
    pub background: String,
    pub foreground: String,
    pub banner: String,
    pub border: Border,
    pub prompt: PromptColors,
    pub link: LinkColors,
    pub commands: CommandColors,
}

fn palette(
    background: &str,
    foreground: &str,
    banner: &str,
    border: &str,
    prompt: [&str; 4],
    link: [&str; 3],
    commands: &str,
) -> Palette {
    Palette {
        background: background.into(),
        foreground: foreground.into(),
        banner: banner.into(),
        border: Border { visible: true, color: border.into() },
        prompt: PromptColors {
            default: prompt[0].into(),
            user: prompt[1].into(),
            host: prompt[2].into(),
            input: prompt[3].into(),
        },
        link: LinkColors {
            text: link[0].into(),
            highlight_color: link[1].into(),
            highlight_text: link[2].into(),
        },
        commands: CommandColors { text_color: commands.into() },
    }
}

impl Default for Palette {
    fn default() -> Self {
        palette(
            "#1e1e2e",
            "#cdd6f4",
            "#89b4fa",
            "#45475a",
            ["#a6adc8", "#f5c2e7", "#94e2d5", "#cdd6f4"],
            ["#89dceb", "#45475a", "#cdd6f4"],
            "#a6e3a1",
        )
    }
}

impl Default for Border {
    fn default() -> Self {
        Palette::default().border
    }
}

impl Default for PromptColors {
    fn default() -> Self {
        Palette::default().prompt
    }
}

impl Default for LinkColors {
    fn default() -> Self {
        Palette::default().link
    }
}

impl Default for CommandColors {
    fn default() -> Self {
        Palette::default().commands
    }
}

/// Names `theme` accepts, in listing order.
pub const THEME_NAMES: &[&str] = &["default", "matrix", "dracula", "gruvbox", "nord"];

/// Built-in palette by name. `default` is the configured palette.
pub fn builtin(name: &str, configured: &Palette) -> Option<Palette> {
    let p = match name {
        "default" => configured.clone(),
        "matrix" => palette(
            "#0D0208",
            "#00FF41",
            "#00FF41",
            "#003B00",
            ["#008F11", "#00FF41", "#003B00", "#00FF41"],
            ["#00FF41", "#003B00", "#00FF41"],
            "#008F11",
        ),
        "dracula" => palette(
            "#282a36",
            "#f8f8f2",
            "#bd93f9",
            "#44475a",
            ["#ffb86c", "#ff79c6", "#8be9fd", "#f8f8f2"],
            ["#8be9fd", "#44475a", "#f8f8f2"],
            "#ff79c6",
        ),
        "gruvbox" => palette(
            "#282828",
            "#ebdbb2",
            "#d79921",
            "#504945",
            ["#a89984", "#fb4934", "#b8bb26", "#ebdbb2"],
            ["#83a598", "#504945", "#ebdbb2"],
            "#d3869b",
        ),
        "nord" => palette(
            "#2E3440",
            "#D8DEE9",
            "#88C0D0",
            "#4C566A",
            ["#81A1C1", "#88C0D0", "#81A1C1", "#ECEFF4"],
            ["#8FBCBB", "#434C5E", "#ECEFF4"],
            "#88C0D0",
        ),
        _ => return None,
    };
    Some(p)
}

/// Monochrome palette for bare mode.
pub fn bare() -> Palette {
    let mut p = palette(
        "#000000",
        "#ffffff",
        "#ffffff",
        "#ffffff",
        ["#ffffff", "#ffffff", "#ffffff", "#ffffff"],
        ["#ffffff", "#000000", "#ffffff"],
        "#ffffff",
    );
    p.border.visible = false;
    p
}

/// Parse `#rrggbb` (the leading `#` is optional).
pub fn parse_hex(s: &str) -> Result<(u8, u8, u8), ThemeError> {
    let hex = s.trim().trim_start_matches('#');
    if hex.len() != 6 || !hex.is_ascii() {
        return Err(ThemeError::InvalidColor(s.to_string()));
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| ThemeError::InvalidColor(s.to_string()));
    Ok((channel(0)?, channel(2)?, channel(4)?))
}

/// Usage text plus the theme list.
pub fn theme_help() -> Vec<Line> {
    let mut out = vec![
        Line::blank(),
        Line::plain("Usage: ").push(Span::command("theme [name]")),
        Line::blank(),
        Line::plain("Available themes:"),
    ];
    for name in THEME_NAMES {
        out.push(Line::plain("  ").push(Span::clickable(*name, format!("theme {}", name))));
    }
    out.push(Line::blank());
    out
}

/// Where the active theme name is remembered between runs.
#[derive(Debug, Clone, Default)]
pub struct ThemeStore {
    path: Option<PathBuf>,
}

impl ThemeStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path: Some(path) }
    }

    /// `~/.webterm_theme`, or a store that remembers nothing without a home dir.
    pub fn from_home() -> Self {
        Self { path: dirs::home_dir().map(|h| h.join(".webterm_theme")) }
    }

    /// A store that never touches the disk.
    pub fn in_memory() -> Self {
        Self { path: None }
    }

    /// The saved name if it is a known theme.
    pub fn load(&self) -> Option<String> {
        let path = self.path.as_ref()?;
        let raw = fs::read_to_string(path).ok()?;
        let name = raw.trim();
        if THEME_NAMES.contains(&name) {
            Some(name.to_string())
        } else {
            tracing::warn!(name, "ignoring unknown persisted theme");
            None
        }
    }

    pub fn save(&self, name: &str) -> Result<(), ThemeError> {
        let Some(path) = self.path.as_ref() else {
            return Ok(());
        };
        fs::write(path, name).map_err(|source| ThemeError::Io { path: path.clone(), source })
    }
}
