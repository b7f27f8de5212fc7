//! Configuration management for the PaneStack host.
//!
//! Configuration is loaded from a TOML file. Unless a path is given on the
//! command line, the following locations are tried in order:
//! 1. The platform config directory (`ProjectDirs`), e.g. `~/.config/panestack/config.toml`
//! 2. `~/.config/panestack/config.toml` (Unix-style, for platforms where 1 differs)
//! 3. `./config.toml` (current directory, for development)

use anyhow::{Context, Result};
use directories::ProjectDirs;
use panestack_core_layout::{
    ConfigError, ContainerConfig, PaneDescriptor, ViewportMetrics, DEFAULT_PANE_WIDTH,
    DEFAULT_TAB_WIDTH,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Log levels accepted by `behavior.log_level`.
pub const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Main configuration structure for the host.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Pane and tab widths.
    pub layout: LayoutConfig,
    /// Initial viewport metrics.
    pub viewport: ViewportConfig,
    /// Behavior configuration.
    pub behavior: BehaviorConfig,
    /// Panes open at startup, in display order.
    #[serde(default)]
    pub panes: Vec<PaneConfig>,
}

/// Layout-related configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Width of a full pane in pixels.
    #[serde(default = "default_pane_width")]
    pub pane_width: f64,

    /// Width of a collapsed tab in pixels.
    #[serde(default = "default_tab_width")]
    pub tab_width: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            pane_width: default_pane_width(),
            tab_width: default_tab_width(),
        }
    }
}

/// Viewport the host lays out into until a `resize` command arrives.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
    /// Width in pixels; zero leaves the viewport unmeasured.
    #[serde(default = "default_viewport_width")]
    pub width: f64,

    /// Height in pixels.
    #[serde(default = "default_viewport_height")]
    pub height: f64,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            width: default_viewport_width(),
            height: default_viewport_height(),
        }
    }
}

/// Behavior-related configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BehaviorConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

/// A pane opened at startup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaneConfig {
    /// Unique pane id.
    pub id: String,
    /// Tab title; the id is used when empty.
    #[serde(default)]
    pub title: String,
}

impl PaneConfig {
    /// Title shown on the tab.
    pub fn display_title(&self) -> &str {
        if self.title.is_empty() {
            &self.id
        } else {
            &self.title
        }
    }
}

// Default value functions for serde
fn default_pane_width() -> f64 {
    DEFAULT_PANE_WIDTH
}

fn default_tab_width() -> f64 {
    DEFAULT_TAB_WIDTH
}

fn default_viewport_width() -> f64 {
    1920.0
}

fn default_viewport_height() -> f64 {
    1080.0
}

fn default_log_level() -> String {
    "info".to_string()
}

/// A problem found (and corrected) while validating the configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigWarning {
    /// Dotted path of the offending field.
    pub field: String,
    /// What was wrong and what was done about it.
    pub message: String,
}

impl ConfigWarning {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl Config {
    /// Load configuration from standard locations.
    ///
    /// Returns default config if no file is found.
    pub fn load() -> Result<Self> {
        let paths = config_paths();

        for path in &paths {
            if path.exists() {
                tracing::info!("Loading config from: {}", path.display());
                return Self::load_from_path(path);
            }
        }

        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Load from an explicit path if given, otherwise from standard locations.
    pub fn load_with(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                tracing::info!("Loading config from: {}", path.display());
                Self::load_from_path(path)
            }
            None => Self::load(),
        }
    }

    /// Load configuration from a specific path.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Clamp invalid values to usable ones and report what was changed.
    pub fn validate(&mut self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        if !is_positive(self.layout.pane_width) {
            warnings.push(ConfigWarning::new(
                "layout.pane_width",
                format!(
                    "{} is not a positive width, using {}",
                    self.layout.pane_width, DEFAULT_PANE_WIDTH
                ),
            ));
            self.layout.pane_width = DEFAULT_PANE_WIDTH;
        }

        if !is_positive(self.layout.tab_width) {
            warnings.push(ConfigWarning::new(
                "layout.tab_width",
                format!(
                    "{} is not a positive width, using {}",
                    self.layout.tab_width, DEFAULT_TAB_WIDTH
                ),
            ));
            self.layout.tab_width = DEFAULT_TAB_WIDTH;
        }

        if self.layout.tab_width >= self.layout.pane_width {
            // Left as is; the allocator never collapses panes in this case.
            warnings.push(ConfigWarning::new(
                "layout.tab_width",
                format!(
                    "{} is not narrower than pane_width {}, panes will never collapse",
                    self.layout.tab_width, self.layout.pane_width
                ),
            ));
        }

        for (field, value) in [
            ("viewport.width", &mut self.viewport.width),
            ("viewport.height", &mut self.viewport.height),
        ] {
            if !(value.is_finite() && *value >= 0.0) {
                warnings.push(ConfigWarning::new(
                    field,
                    format!("{} is not a valid size, using 0", value),
                ));
                *value = 0.0;
            }
        }

        let level = self.behavior.log_level.to_lowercase();
        if LOG_LEVELS.contains(&level.as_str()) {
            self.behavior.log_level = level;
        } else {
            warnings.push(ConfigWarning::new(
                "behavior.log_level",
                format!("unknown level {:?}, using \"info\"", self.behavior.log_level),
            ));
            self.behavior.log_level = default_log_level();
        }

        let before = self.panes.len();
        self.panes.retain(|pane| !pane.id.trim().is_empty());
        let dropped = before - self.panes.len();
        if dropped > 0 {
            warnings.push(ConfigWarning::new(
                "panes",
                format!("dropped {} pane(s) with an empty id", dropped),
            ));
        }

        warnings
    }

    /// Container configuration derived from `[layout]`.
    pub fn container_config(&self) -> std::result::Result<ContainerConfig, ConfigError> {
        ContainerConfig::new(self.layout.pane_width, self.layout.tab_width)
    }

    /// Viewport metrics derived from `[viewport]`.
    pub fn viewport_metrics(&self) -> ViewportMetrics {
        ViewportMetrics::new(self.viewport.width, self.viewport.height)
    }

    /// Descriptors for the configured startup panes.
    ///
    /// The host has no content of its own; a pane's view is its title.
    pub fn initial_panes(&self) -> Vec<PaneDescriptor<String>> {
        self.panes
            .iter()
            .map(|pane| {
                let title = pane.display_title().to_string();
                PaneDescriptor::new(pane.id.clone(), title.clone(), title)
            })
            .collect()
    }
}

fn is_positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

/// Get all possible config file paths in priority order.
pub fn config_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    // 1. Platform standard location
    if let Some(proj_dirs) = ProjectDirs::from("com", "panestack", "panestack") {
        paths.push(proj_dirs.config_dir().join("config.toml"));
    }

    // 2. Unix-style: ~/.config/panestack/config.toml
    if let Some(home) = dirs_home() {
        let unix = home.join(".config").join("panestack").join("config.toml");
        if !paths.contains(&unix) {
            paths.push(unix);
        }
    }

    // 3. Current directory: ./config.toml
    paths.push(PathBuf::from("config.toml"));

    paths
}

/// Get the user's home directory.
fn dirs_home() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| d.home_dir().to_path_buf())
}
