//! Configuration for fluent chain diagnostics.
//!
//! Read from `~/.fluent/config.toml`; every section and key is optional:
//!
//! ```toml
//! [diagnostics]
//! enabled = true
//! max_value_chars = 120
//! log_filter = "fluent_chain=debug"
//!
//! [demo]
//! default_context = "demo"
//! ```
//!
//! `FLUENT_DIAGNOSTICS` and `FLUENT_MAX_VALUE_CHARS` override the file.

use std::path::{Path, PathBuf};
use std::{env, fs, io};

use fluent_chain::diagnostics::DEFAULT_MAX_VALUE_CHARS;
use fluent_chain::{Diagnostics, DiagnosticsOptions};
use serde::Deserialize;
use thiserror::Error;

pub const DIAGNOSTICS_ENV: &str = "FLUENT_DIAGNOSTICS";
pub const MAX_VALUE_CHARS_ENV: &str = "FLUENT_MAX_VALUE_CHARS";

// Default value function for serde (bool::default() is false, so only true needs a fn)
const fn default_true() -> bool {
    true
}

#[derive(Debug, Default, Deserialize)]
pub struct FluentConfig {
    pub diagnostics: Option<DiagnosticsConfig>,
    pub demo: Option<DemoConfig>,
}

#[derive(Debug, Deserialize)]
pub struct DiagnosticsConfig {
    /// Emit diagnostic records at all. Default: true.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Character budget for rendered values. Default: 120. Minimum: 8.
    pub max_value_chars: Option<usize>,
    /// `tracing` filter directive used when `RUST_LOG` is unset.
    pub log_filter: Option<String>,
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_value_chars: None,
            log_filter: None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct DemoConfig {
    /// Context label attached to every demo chain.
    pub default_context: Option<String>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {}: {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to parse config at {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

impl ConfigError {
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            ConfigError::Read { path, .. } | ConfigError::Parse { path, .. } => path,
        }
    }
}

impl FluentConfig {
    /// Load the user config. `Ok(None)` when there is no home dir or no file.
    pub fn load() -> Result<Option<Self>, ConfigError> {
        match config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(None),
        }
    }

    pub fn load_from(path: &Path) -> Result<Option<Self>, ConfigError> {
        if !path.exists() {
            return Ok(None);
        }

        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) => {
                tracing::warn!("Failed to read config at {:?}: {}", path, err);
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source: err,
                });
            }
        };

        match Self::parse(&content) {
            Ok(config) => Ok(Some(config)),
            Err(err) => {
                tracing::warn!("Failed to parse config at {:?}: {}", path, err);
                Err(ConfigError::Parse {
                    path: path.to_path_buf(),
                    source: err,
                })
            }
        }
    }

    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    #[must_use]
    pub fn path() -> Option<PathBuf> {
        config_path()
    }

    /// Apply `FLUENT_*` overrides from the process environment.
    #[must_use]
    pub fn apply_env_overrides(self) -> Self {
        self.apply_overrides(|key| env::var(key).ok())
    }

    /// Apply `FLUENT_*` overrides read through `lookup`.
    ///
    /// Unparseable values are ignored with a warning.
    #[must_use]
    pub fn apply_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let diagnostics = self.diagnostics.get_or_insert_with(DiagnosticsConfig::default);

        if let Some(raw) = lookup(DIAGNOSTICS_ENV) {
            match parse_flag(&raw) {
                Some(enabled) => diagnostics.enabled = enabled,
                None => tracing::warn!("Ignoring {DIAGNOSTICS_ENV}={raw:?}: expected a boolean"),
            }
        }

        if let Some(raw) = lookup(MAX_VALUE_CHARS_ENV) {
            match raw.trim().parse::<usize>() {
                Ok(chars) => diagnostics.max_value_chars = Some(chars),
                Err(err) => tracing::warn!("Ignoring {MAX_VALUE_CHARS_ENV}={raw:?}: {err}"),
            }
        }

        self
    }

    #[must_use]
    pub fn diagnostics_options(&self) -> DiagnosticsOptions {
        let section = self.diagnostics.as_ref();
        DiagnosticsOptions::new(
            section.is_none_or(|d| d.enabled),
            section
                .and_then(|d| d.max_value_chars)
                .unwrap_or(DEFAULT_MAX_VALUE_CHARS),
        )
    }

    /// Default (tracing) diagnostics configured with [`Self::diagnostics_options`].
    #[must_use]
    pub fn diagnostics(&self) -> Diagnostics {
        let options = self.diagnostics_options();
        if options.enabled {
            Diagnostics::default().with_options(options)
        } else {
            Diagnostics::disabled()
        }
    }

    #[must_use]
    pub fn log_filter(&self) -> Option<&str> {
        self.diagnostics.as_ref()?.log_filter.as_deref()
    }

    #[must_use]
    pub fn default_context(&self) -> Option<&str> {
        self.demo.as_ref()?.default_context.as_deref()
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Some(true),
        "0" | "false" | "off" | "no" => Some(false),
        _ => None,
    }
}

#[must_use]
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".fluent").join("config.toml"))
}
