//! `roadmap.toml` configuration
//!
//! ```toml
//! [layout]
//! quarter_count = 12
//! unit_width = 100
//! stacking = "interval"
//!
//! [build]
//! output = "dist/roadmap.html"
//! copy_to = "../site/public"
//! title = "Additive Manufacturing Roadmap"
//!
//! [server]
//! port = 8080
//! data = "roadmap.json"
//! ```
//!
//! Every section and key is optional. Command-line flags override the file.

use std::fs;
use std::path::{Path, PathBuf};

use roadmap_layout::{LayoutConfig, LayoutConfigError};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

/// File looked up in the working directory when `--config` is not given
pub const DEFAULT_CONFIG_FILE: &str = "roadmap.toml";

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RoadmapConfig {
    pub layout: LayoutConfig,
    pub build: BuildConfig,
    pub server: ServerConfig,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuildConfig {
    /// Where `roadmap build` writes the page
    pub output: PathBuf,
    /// Second directory receiving a copy of the page
    pub copy_to: Option<PathBuf>,
    /// Page title
    pub title: String,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            output: PathBuf::from("dist/roadmap.html"),
            copy_to: None,
            title: "Manufacturing Roadmap".into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub port: u16,
    /// Document edited by the server
    pub data: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            data: PathBuf::from("roadmap.json"),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid [layout] section: {0}")]
    Layout(#[from] LayoutConfigError),
}

impl RoadmapConfig {
    /// Load configuration.
    ///
    /// An explicit `path` must exist. Without one, `roadmap.toml` in the
    /// working directory is used when present, otherwise defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => {
                let fallback = PathBuf::from(DEFAULT_CONFIG_FILE);
                if !fallback.is_file() {
                    debug!("no {} found, using defaults", DEFAULT_CONFIG_FILE);
                    return Ok(Self::default());
                }
                fallback
            }
        };
        let text = fs::read_to_string(&path).map_err(|source| ConfigError::Io {
            path: path.clone(),
            source,
        })?;
        let config = Self::parse(&text).map_err(|err| match err {
            ConfigError::Parse { source, .. } => ConfigError::Parse {
                path: path.clone(),
                source,
            },
            other => other,
        })?;
        debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Parse and validate configuration text
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: PathBuf::from(DEFAULT_CONFIG_FILE),
            source,
        })?;
        config.layout.validate()?;
        Ok(config)
    }

    /// Replace the window length when a flag was given
    pub fn with_quarters(mut self, quarters: Option<usize>) -> Result<Self, ConfigError> {
        if let Some(count) = quarters {
            self.layout.quarter_count = count;
            self.layout.validate()?;
        }
        Ok(self)
    }
}
