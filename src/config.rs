use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::LevelFilter;
use serde::Deserialize;

use crate::history::{History, Overflow};
use crate::redirection::DanglingPolicy;
use crate::tokenize::Limits;

/// Embedded default configuration.
const DEFAULT_CONFIG: &str = include_str!("../config.default.toml");

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub prompt: String,
    pub max_line_len: usize,
    pub max_args: usize,
    pub history_capacity: usize,
    pub history_overflow: Overflow,
    pub strict_redirections: bool,
    pub log_level: LevelFilter,
    pub log_file: Option<PathBuf>,
}

/// User file: every key optional, present keys override the defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigOverlay {
    prompt: Option<String>,
    max_line_len: Option<usize>,
    max_args: Option<usize>,
    history_capacity: Option<usize>,
    history_overflow: Option<Overflow>,
    strict_redirections: Option<bool>,
    log_level: Option<LevelFilter>,
    log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        toml::from_str(DEFAULT_CONFIG).expect("embedded default config must parse")
    }
}

impl Config {
    /// Load configuration with resolution order:
    /// 1. Start with embedded defaults
    /// 2. Overlay `path` if given, else ~/.config/pipesh/config.toml if it exists
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = Self::default();
        let path = match path {
            Some(path) => Some(path.to_path_buf()),
            None => Self::user_path().filter(|path| path.exists()),
        };
        if let Some(path) = path {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("reading config {}", path.display()))?;
            config
                .apply_str(&content)
                .with_context(|| format!("parsing config {}", path.display()))?;
        }
        Ok(config)
    }

    fn user_path() -> Option<PathBuf> {
        let home = std::env::var_os("HOME")?;
        Some(Path::new(&home).join(".config/pipesh/config.toml"))
    }

    /// Overlays a TOML document on top of this config.
    pub fn apply_str(&mut self, content: &str) -> Result<()> {
        let overlay: ConfigOverlay = toml::from_str(content)?;
        self.apply_overlay(overlay);
        Ok(())
    }

    fn apply_overlay(&mut self, overlay: ConfigOverlay) {
        if let Some(v) = overlay.prompt {
            self.prompt = v;
        }
        if let Some(v) = overlay.max_line_len {
            self.max_line_len = v;
        }
        if let Some(v) = overlay.max_args {
            self.max_args = v;
        }
        if let Some(v) = overlay.history_capacity {
            self.history_capacity = v;
        }
        if let Some(v) = overlay.history_overflow {
            self.history_overflow = v;
        }
        if let Some(v) = overlay.strict_redirections {
            self.strict_redirections = v;
        }
        if let Some(v) = overlay.log_level {
            self.log_level = v;
        }
        if overlay.log_file.is_some() {
            self.log_file = overlay.log_file;
        }
    }

    pub fn limits(&self) -> Limits {
        Limits {
            max_line_len: self.max_line_len,
            max_args: self.max_args,
            dangling: if self.strict_redirections {
                DanglingPolicy::Reject
            } else {
                DanglingPolicy::Drop
            },
        }
    }

    pub fn history(&self) -> History {
        History::new(self.history_capacity, self.history_overflow)
    }
}
