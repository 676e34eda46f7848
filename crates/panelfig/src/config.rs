#![forbid(unsafe_code)]

//! Figure configuration loaded from TOML or JSON.
//!
//! ```toml
//! # panelfig.toml
//! interpolation = "bicubic"
//! min_panel_extent = 12
//!
//! [separator]
//! thickness = 4
//! color = { r = 0, g = 0, b = 0 }
//! ```
//!
//! ```rust,ignore
//! let config = FigureConfig::from_toml_file("panelfig.toml")?;
//! let config = FigureConfig::from_json_str(json)?;
//! ```
//!
//! Every field has a default, so an empty document is a valid config.
//! Environment overrides are applied on top with [`FigureConfig::apply_env`].

use std::path::Path;

use panelfig_core::Interpolation;
use panelfig_layout::{
    DEFAULT_MIN_PANEL_EXTENT, DEFAULT_SEPARATOR_THICKNESS, Rgb, SeparatorStyle,
};
use panelfig_sample::{DEFAULT_PROGRESS_EVERY_ROWS, Sampler};
use serde::{Deserialize, Serialize};

/// Largest accepted separator thickness, in canvas pixels.
pub const MAX_SEPARATOR_THICKNESS: u32 = 1024;

pub const ENV_INTERPOLATION: &str = "PANELFIG_INTERPOLATION";
pub const ENV_SEPARATOR_THICKNESS: &str = "PANELFIG_SEPARATOR_THICKNESS";
pub const ENV_MIN_PANEL_EXTENT: &str = "PANELFIG_MIN_PANEL_EXTENT";
pub const ENV_PARALLEL: &str = "PANELFIG_PARALLEL";

/// Separator settings applied to future splits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeparatorConfig {
    pub thickness: u32,
    pub color: Rgb,
}

impl Default for SeparatorConfig {
    fn default() -> Self {
        Self {
            thickness: DEFAULT_SEPARATOR_THICKNESS,
            color: Rgb::WHITE,
        }
    }
}

/// Top-level figure configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FigureConfig {
    pub separator: SeparatorConfig,
    /// Resize floor for leaves along a separator's axis.
    pub min_panel_extent: u32,
    /// Kernel recorded on leaves filled without an explicit choice.
    pub interpolation: Interpolation,
    pub parallel_sampling: bool,
    pub progress_every_rows: u32,
}

impl Default for FigureConfig {
    fn default() -> Self {
        Self {
            separator: SeparatorConfig::default(),
            min_panel_extent: DEFAULT_MIN_PANEL_EXTENT,
            interpolation: Interpolation::default(),
            parallel_sampling: true,
            progress_every_rows: DEFAULT_PROGRESS_EVERY_ROWS,
        }
    }
}

impl FigureConfig {
    /// Load from a TOML string. Invalid values are rejected.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s).map_err(ConfigError::Toml)?;
        config.checked()
    }

    /// Load from a TOML file on disk.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_toml_str(&content)
    }

    /// Load from a JSON string. Invalid values are rejected.
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(s).map_err(ConfigError::Json)?;
        config.checked()
    }

    /// Load from a JSON file on disk.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_json_str(&content)
    }

    /// Serialize to pretty TOML.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(ConfigError::TomlSerialize)
    }

    /// Returns a list of validation errors. An empty list means the config
    /// is valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.separator.thickness > MAX_SEPARATOR_THICKNESS {
            errors.push(format!(
                "separator.thickness must be <= {MAX_SEPARATOR_THICKNESS}, got {}",
                self.separator.thickness
            ));
        }
        if self.progress_every_rows == 0 {
            errors.push("progress_every_rows must be > 0".into());
        }
        errors
    }

    fn checked(self) -> Result<Self, ConfigError> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    /// Apply `PANELFIG_*` overrides from the process environment.
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.apply_env_with(|key| std::env::var(key).ok())
    }

    /// Apply overrides using `get_env` as the variable lookup.
    ///
    /// Unparseable values are reported together and leave the config
    /// unchanged.
    pub fn apply_env_with<F>(&mut self, get_env: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut next = self.clone();
        let mut errors = Vec::new();

        if let Some(value) = get_env(ENV_INTERPOLATION) {
            match value.parse::<Interpolation>() {
                Ok(kernel) => next.interpolation = kernel,
                Err(err) => errors.push(format!("{ENV_INTERPOLATION}: {err}")),
            }
        }
        if let Some(value) = get_env(ENV_SEPARATOR_THICKNESS) {
            match value.trim().parse::<u32>() {
                Ok(thickness) => next.separator.thickness = thickness,
                Err(err) => errors.push(format!("{ENV_SEPARATOR_THICKNESS}={value:?}: {err}")),
            }
        }
        if let Some(value) = get_env(ENV_MIN_PANEL_EXTENT) {
            match value.trim().parse::<u32>() {
                Ok(extent) => next.min_panel_extent = extent,
                Err(err) => errors.push(format!("{ENV_MIN_PANEL_EXTENT}={value:?}: {err}")),
            }
        }
        if let Some(value) = get_env(ENV_PARALLEL) {
            match parse_flag(&value) {
                Some(flag) => next.parallel_sampling = flag,
                None => errors.push(format!("{ENV_PARALLEL}={value:?}: expected a boolean")),
            }
        }

        errors.extend(next.validate());
        if !errors.is_empty() {
            return Err(ConfigError::Validation(errors));
        }
        *self = next;
        Ok(())
    }

    #[must_use]
    pub fn separator_style(&self) -> SeparatorStyle {
        SeparatorStyle {
            thickness: self.separator.thickness,
            color: self.separator.color,
        }
    }

    /// Sampler for `interpolation` honoring the parallelism and progress
    /// settings.
    #[must_use]
    pub fn sampler(&self, interpolation: Interpolation) -> Sampler {
        Sampler::new(interpolation)
            .with_parallel(self.parallel_sampling)
            .with_progress_every_rows(self.progress_every_rows)
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Errors from loading or validating a [`FigureConfig`].
#[derive(Debug)]
pub enum ConfigError {
    /// I/O error reading a file.
    Io(std::io::Error),
    /// TOML parse error.
    Toml(toml::de::Error),
    /// TOML serialization error.
    TomlSerialize(toml::ser::Error),
    /// JSON parse error.
    Json(serde_json::Error),
    /// Validation errors.
    Validation(Vec<String>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::Toml(e) => write!(f, "TOML parse error: {e}"),
            Self::TomlSerialize(e) => write!(f, "TOML serialize error: {e}"),
            Self::Json(e) => write!(f, "JSON parse error: {e}"),
            Self::Validation(errors) => {
                write!(f, "validation errors: {}", errors.join("; "))
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Toml(e) => Some(e),
            Self::TomlSerialize(e) => Some(e),
            Self::Json(e) => Some(e),
            Self::Validation(_) => None,
        }
    }
}
