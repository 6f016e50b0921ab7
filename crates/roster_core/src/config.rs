//! Process configuration loaded once at startup.
//!
//! # Responsibility
//! - Parse the TOML config file into typed settings.
//! - Build the immutable course catalog from configuration.
//!
//! # Invariants
//! - Missing `catalog.courses` means the built-in course list.
//! - The unknown-course policy applies to the whole catalog.

use crate::catalog::{CatalogEntry, CatalogError, CourseCatalog, UnknownCoursePolicy};
use crate::logging::default_log_level;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub enum ConfigError {
    Io { path: PathBuf, source: std::io::Error },
    Parse(toml::de::Error),
    Catalog(CatalogError),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse(err) => write!(f, "invalid config: {err}"),
            Self::Catalog(err) => write!(f, "invalid course catalog config: {err}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
            Self::Catalog(err) => Some(err),
        }
    }
}

impl From<CatalogError> for ConfigError {
    fn from(value: CatalogError) -> Self {
        Self::Catalog(value)
    }
}

/// Course catalog section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogConfig {
    #[serde(default)]
    pub unknown_course_policy: UnknownCoursePolicy,
    /// Ordered (name, id) pairs; empty means built-in.
    #[serde(default)]
    pub courses: Vec<CatalogEntry>,
}

/// Top-level roster configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterConfig {
    pub database_path: PathBuf,
    /// `trace|debug|info|warn|error`; build-mode default when absent.
    #[serde(default)]
    pub log_level: Option<String>,
    /// Absolute directory for rolling log files; logging off when absent.
    #[serde(default)]
    pub log_dir: Option<PathBuf>,
    #[serde(default)]
    pub catalog: CatalogConfig,
}

impl RosterConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(ConfigError::Parse)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn effective_log_level(&self) -> &str {
        self.log_level.as_deref().unwrap_or(default_log_level())
    }

    /// Builds the catalog described by this config.
    pub fn build_catalog(&self) -> Result<CourseCatalog, ConfigError> {
        let policy = self.catalog.unknown_course_policy;
        if self.catalog.courses.is_empty() {
            return Ok(CourseCatalog::builtin().with_policy(policy));
        }
        Ok(CourseCatalog::from_entries(
            self.catalog.courses.clone(),
            policy,
        )?)
    }
}
