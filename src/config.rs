//! Portfolio configuration
//!
//! Everything the commands print comes from here. Every field has a
//! default, so an empty `{}` file is a valid config.

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::Error as _;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::theme::Palette;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Social {
    pub github: String,
    pub linkedin: String,
    pub email: String,
}

impl Default for Social {
    fn default() -> Self {
        Self {
            github: "https://github.com/webterm".into(),
            linkedin: "https://www.linkedin.com/in/webterm".into(),
            email: "hello@webterm.dev".into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Project {
    pub name: String,
    pub description: String,
    pub link: String,
    pub video: Option<String>,
    pub screenshots: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Education {
    pub degree: String,
    pub institution: String,
    pub period: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Skills {
    pub languages: Vec<String>,
    pub web: Vec<String>,
    pub ai_ml: Vec<String>,
    pub tools: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub username: String,
    pub hostname: String,
    pub password: String,
    pub repo_link: String,
    /// Path or URL of the resume document.
    pub resume: String,
    pub social: Social,
    pub about_greeting: String,
    pub about_summary: Vec<String>,
    pub ascii: Vec<String>,
    /// Banner art for narrow viewports. Falls back to `ascii` when empty.
    pub ascii_mobile: Vec<String>,
    pub projects: Vec<Project>,
    pub education: Vec<Education>,
    pub skills: Skills,
    /// The `default` theme.
    pub colors: Palette,
    /// Pixels per terminal column.
    pub cell_width: i32,
    /// Pixels per terminal row.
    pub cell_height: i32,
    /// Gap between staggered output lines, in milliseconds.
    pub stagger_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            username: "guest".into(),
            hostname: "webterm".into(),
            password: "password".into(),
            repo_link: "https://github.com/webterm/webterm".into(),
            resume: "https://webterm.dev/resume.pdf".into(),
            social: Social::default(),
            about_greeting: "Hi, I'm a developer who likes building things for the terminal.".into(),
            about_summary: vec![
                "I work across the stack, from layout to data.".into(),
                "".into(),
                "Most of my learning comes from building and refining.".into(),
            ],
            ascii: vec![
                "__      __   _   _                    ".into(),
                "\\ \\    / /__| |_| |_ ___ _ _ _ __    ".into(),
                " \\ \\/\\/ / -_) '_ \\  _/ -_) '_| '  \\ ".into(),
                "  \\_/\\_/\\___|_.__/\\__\\___|_| |_|_|_|".into(),
            ],
            ascii_mobile: vec!["webterm".into()],
            projects: vec![Project {
                name: "webterm".into(),
                description: "This shell.".into(),
                link: "https://github.com/webterm/webterm".into(),
                video: None,
                screenshots: Vec::new(),
            }],
            education: Vec::new(),
            skills: Skills::default(),
            colors: Palette::default(),
            cell_width: 8,
            cell_height: 16,
            stagger_ms: 40,
        }
    }
}

/// Largest accepted cell dimension in pixels.
pub const MAX_CELL: i32 = 64;

impl Config {
    /// Parse a config. Cell sizes outside `1..=MAX_CELL` are rejected.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        let config: Self = serde_json::from_str(text)?;
        for (field, value) in [("cell_width", config.cell_width), ("cell_height", config.cell_height)] {
            if !(1..=MAX_CELL).contains(&value) {
                let msg = format!("{} must be between 1 and {}, got {}", field, MAX_CELL, value);
                return Err(serde_json::Error::custom(msg));
            }
        }
        Ok(config)
    }

    /// Read and parse the file at `path`.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;
        Self::from_json(&text).map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })
    }

    /// Explicit path if given, else `~/.webterm/config.json` when it exists,
    /// else the built-in defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        match default_path() {
            Some(path) if path.exists() => Self::from_file(&path),
            _ => {
                tracing::debug!("no config file, using defaults");
                Ok(Self::default())
            }
        }
    }
}

/// `~/.webterm`
pub fn data_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".webterm"))
}

pub fn default_path() -> Option<PathBuf> {
    data_dir().map(|d| d.join("config.json"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_object_is_default() {
        let cfg = Config::from_json("{}").unwrap();
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn test_partial_config_keeps_other_defaults() {
        let cfg = Config::from_json(
            r#"{
                "username": "ada",
                "social": {"email": "ada@example.com"},
                "projects": [{"name": "engine", "link": "https://example.com/engine"}],
                "skills": {"languages": ["Rust"]}
            }"#,
        )
        .unwrap();
        assert_eq!(cfg.username, "ada");
        assert_eq!(cfg.hostname, "webterm");
        assert_eq!(cfg.social.email, "ada@example.com");
        assert_eq!(cfg.social.github, Social::default().github);
        assert_eq!(cfg.projects.len(), 1);
        assert!(cfg.projects[0].screenshots.is_empty());
        assert_eq!(cfg.skills.languages, vec!["Rust"]);
        assert_eq!(cfg.stagger_ms, 40);
    }

    #[test]
    fn test_cell_size_bounds() {
        assert!(Config::from_json(r#"{"cell_width": 0}"#).is_err());
        assert!(Config::from_json(r#"{"cell_height": -16}"#).is_err());
        let err = Config::from_json(r#"{"cell_height": 100000}"#).unwrap_err();
        assert!(err.to_string().contains("cell_height"));

        let cfg = Config::from_json(r#"{"cell_width": 10, "cell_height": 20}"#).unwrap();
        assert_eq!((cfg.cell_width, cfg.cell_height), (10, 20));
    }

    #[test]
    fn test_malformed_file_is_parse_error() {
        let dir = std::env::temp_dir().join(format!("webterm-config-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.json");
        fs::write(&path, "{ not json").unwrap();
        let err = Config::load(Some(path.as_path())).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("malformed config"));

        let missing = Config::load(Some(dir.join("missing.json").as_path())).unwrap_err();
        assert!(matches!(missing, ConfigError::Read { .. }));
        let _ = fs::remove_dir_all(&dir);
    }
}
