//! Configuration with layered resolution using figment.
//!
//! Resolution order (highest priority last):
//! 1. Built-in defaults
//! 2. User config: `~/.config/graph-explorer/config.toml` (XDG) or platform config dir
//! 3. Project config: `.graph-explorer.toml`
//! 4. Environment variables: `GRAPH_EXPLORER_*` (nested keys split on `__`)
//!
//! # Example
//!
//! ```toml
//! [exploration]
//! grouping_threshold = 8
//!
//! [layout]
//! iterations = 300
//! ```
//!
//! `GRAPH_EXPLORER_EXPLORATION__GROUPING_THRESHOLD=3` overrides the
//! threshold from the environment.

use std::ops::Deref;
use std::path::PathBuf;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Default number of neighbors in one (direction, type) bucket that
/// collapses them into a group.
pub const DEFAULT_GROUPING_THRESHOLD: usize = 5;

/// Default number of layout relaxation steps.
pub const DEFAULT_LAYOUT_ITERATIONS: usize = 500;

/// Boxed wrapper for figment::Error to reduce Result size on the stack.
#[derive(Debug)]
pub struct ConfigError(Box<figment::Error>);

impl Deref for ConfigError {
    type Target = figment::Error;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.source()
    }
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self(Box::new(err))
    }
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub exploration: ExplorationConfig,
    #[serde(default)]
    pub layout: LayoutConfig,
}

/// Exploration model settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExplorationConfig {
    /// Minimum bucket size that collapses neighbors into a group.
    #[serde(default = "default_grouping_threshold")]
    pub grouping_threshold: usize,
}

impl Default for ExplorationConfig {
    fn default() -> Self {
        Self {
            grouping_threshold: DEFAULT_GROUPING_THRESHOLD,
        }
    }
}

/// Force-directed layout settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Relaxation steps run before positions are reported.
    #[serde(default = "default_layout_iterations")]
    pub iterations: usize,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_LAYOUT_ITERATIONS,
        }
    }
}

fn default_grouping_threshold() -> usize {
    DEFAULT_GROUPING_THRESHOLD
}

fn default_layout_iterations() -> usize {
    DEFAULT_LAYOUT_ITERATIONS
}

impl Config {
    /// Load config with layered resolution (defaults → user → project → env).
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_figment(Self::figment())
    }

    /// The layered figment used by [`Config::load`].
    pub fn figment() -> Figment {
        Figment::from(Serialized::defaults(Config::default()))
            // Layer 1: User config
            .merge(Toml::file(Self::user_config_path()))
            // Layer 2: Project config
            .merge(Toml::file(".graph-explorer.toml"))
            // Layer 3: Environment variables (highest priority)
            .merge(Env::prefixed("GRAPH_EXPLORER_").split("__"))
    }

    /// Extract a config from an arbitrary figment.
    pub fn from_figment(figment: Figment) -> Result<Self, ConfigError> {
        figment.extract().map_err(ConfigError::from)
    }

    /// Check values that deserialize fine but make no sense.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.exploration.grouping_threshold == 0 {
            return Err(AppError::InvalidThreshold(
                self.exploration.grouping_threshold,
            ));
        }
        Ok(())
    }

    /// User config path: ~/.config/graph-explorer/config.toml (XDG) or platform config dir.
    fn user_config_path() -> PathBuf {
        // Prefer XDG config location (~/.config) on all platforms
        if let Some(home) = dirs::home_dir() {
            let xdg_path = home
                .join(".config")
                .join("graph-explorer")
                .join("config.toml");
            if xdg_path.exists() {
                return xdg_path;
            }
        }
        dirs::config_dir()
            .map(|p| p.join("graph-explorer").join("config.toml"))
            .unwrap_or_default()
    }
}
