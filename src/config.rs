//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/aggtree/aggtree.toml`
//! 3. Local config: `<project_dir>/.aggtree.toml`
//! 4. Environment variables: `AGGTREE_*` prefix

use std::path::{Path, PathBuf};
use std::str::FromStr;

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors while loading settings.
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("config error: {message}")]
    Config { message: String },
}

fn config_err(e: ConfigError) -> SettingsError {
    SettingsError::Config {
        message: e.to_string(),
    }
}

/// Widest accepted `indent`.
pub const MAX_INDENT: usize = 16;

fn check_indent(indent: usize) -> Result<usize, SettingsError> {
    if indent > MAX_INDENT {
        return Err(SettingsError::Config {
            message: format!("indent must be at most {}: {}", MAX_INDENT, indent),
        });
    }
    Ok(indent)
}

/// Layout of the tree dump logged before the first creation pass.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RenderStyle {
    /// One line per node, indented per depth
    #[default]
    Indented,
    /// Box-drawing branches
    Branches,
}

impl FromStr for RenderStyle {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "indented" => Ok(Self::Indented),
            "branches" => Ok(Self::Branches),
            other => Err(SettingsError::Config {
                message: format!("unknown render style: {}", other),
            }),
        }
    }
}

/// Unified configuration for aggtree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Log the tree before the first creation pass
    pub dump_tree: bool,
    pub render_style: RenderStyle,
    /// Spaces per nesting level in the indented dump, at most [`MAX_INDENT`]
    pub indent: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            dump_tree: true,
            render_style: RenderStyle::Indented,
            indent: 4,
        }
    }
}

/// Raw settings for intermediate parsing (None means "not specified").
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub dump_tree: Option<bool>,
    pub render_style: Option<RenderStyle>,
    pub indent: Option<usize>,
}

/// Get the XDG config directory for aggtree.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "aggtree").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("aggtree.toml"))
}

/// Get the path to the local config file in a project directory.
pub fn local_config_path(project_dir: &Path) -> PathBuf {
    project_dir.join(".aggtree.toml")
}

/// `AGGTREE_*` environment source; `__` separates nested keys.
pub fn environment() -> Environment {
    Environment::with_prefix("AGGTREE")
        .prefix_separator("_")
        .separator("__")
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, SettingsError> {
    let content = std::fs::read_to_string(path).map_err(|e| SettingsError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    let raw: RawSettings = toml::from_str(&content).map_err(|e| SettingsError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })?;
    if let Some(indent) = raw.indent {
        check_indent(indent).map_err(|e| match e {
            SettingsError::Config { message } => SettingsError::Config {
                message: format!("{}: {}", path.display(), message),
            },
        })?;
    }
    Ok(raw)
}

impl Settings {
    /// Overlay wins where it specifies a value.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            dump_tree: overlay.dump_tree.unwrap_or(self.dump_tree),
            render_style: overlay.render_style.unwrap_or(self.render_style),
            indent: overlay.indent.unwrap_or(self.indent),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `project_dir` - Optional directory holding a local `.aggtree.toml`
    pub fn load(project_dir: Option<&Path>) -> Result<Self, SettingsError> {
        let mut current = Self::default();

        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                current = current.merge_with(&load_raw_settings(&global_path)?);
            }
        }

        if let Some(dir) = project_dir {
            let local_path = local_config_path(dir);
            if local_path.exists() {
                current = current.merge_with(&load_raw_settings(&local_path)?);
            }
        }

        current.apply_env(environment())
    }

    /// Apply environment variables as explicit overrides.
    pub fn apply_env(mut self, environment: Environment) -> Result<Self, SettingsError> {
        let config = Config::builder()
            .add_source(environment)
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_bool("dump_tree") {
            self.dump_tree = val;
        }
        if let Ok(val) = config.get_string("render_style") {
            self.render_style = val.parse()?;
        }
        if let Ok(val) = config.get_int("indent") {
            let indent = usize::try_from(val).map_err(|_| SettingsError::Config {
                message: format!("indent must not be negative: {}", val),
            })?;
            self.indent = check_indent(indent)?;
        }

        Ok(self)
    }
}
