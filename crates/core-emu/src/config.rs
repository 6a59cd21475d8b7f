//! Emulator configuration.
//!
//! Parsed from `cellterm.toml`. Every field has a serde default, so an
//! absent or empty file yields a working emulator; unknown fields are
//! tolerated to allow forward evolution without warnings.

use std::{fs, path::PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::info;

#[derive(Debug, Deserialize, Clone)]
pub struct TerminalConfig {
    #[serde(default = "TerminalConfig::default_columns")]
    pub columns: u32,
    #[serde(default = "TerminalConfig::default_rows")]
    pub rows: u32,
    /// Name reported through DCS $ q and friends.
    #[serde(default = "TerminalConfig::default_term_name")]
    pub term_name: String,
    /// Answerback string sent for ENQ-style queries (empty disables).
    #[serde(default)]
    pub answerback: String,
    #[serde(default = "TerminalConfig::default_tab_width")]
    pub tab_width: u32,
}

impl TerminalConfig {
    const fn default_columns() -> u32 {
        80
    }
    const fn default_rows() -> u32 {
        24
    }
    fn default_term_name() -> String {
        "xterm-256color".to_string()
    }
    const fn default_tab_width() -> u32 {
        8
    }
}

impl Default for TerminalConfig {
    fn default() -> Self {
        TerminalConfig {
            columns: Self::default_columns(),
            rows: Self::default_rows(),
            term_name: Self::default_term_name(),
            answerback: String::new(),
            tab_width: Self::default_tab_width(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ParserConfig {
    /// Length cap for OSC/DCS text parameters.
    #[serde(default = "ParserConfig::default_text_field_max")]
    pub text_field_max: usize,
}

impl ParserConfig {
    const fn default_text_field_max() -> usize {
        core_parser::SEQUENCE_FIELD_MAX
    }
}

impl Default for ParserConfig {
    fn default() -> Self {
        ParserConfig {
            text_field_max: Self::default_text_field_max(),
        }
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct ConfigFile {
    #[serde(default)]
    pub terminal: TerminalConfig,
    #[serde(default)]
    pub parser: ParserConfig,
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub file: ConfigFile,
}

impl Config {
    pub fn parse(raw: &str) -> Result<Config> {
        let file: ConfigFile = toml::from_str(raw).context("parsing configuration")?;
        Ok(Config { file })
    }

    /// Load from a path; a missing file is not an error, it is the default
    /// configuration.
    pub fn load(path: &std::path::Path) -> Result<Config> {
        if !path.exists() {
            info!(target: "emu.config", path = %path.display(), "no config file, using defaults");
            return Ok(Config::default());
        }
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        Config::parse(&raw)
    }
}

/// Conventional config path: `cellterm.toml` in the working directory,
/// falling back to the XDG config home.
pub fn discover() -> PathBuf {
    let local = PathBuf::from("cellterm.toml");
    if local.exists() {
        return local;
    }
    let base = std::env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))
        .unwrap_or_default();
    base.join("cellterm").join("cellterm.toml")
}
