//! Project location settings.
//!
//! Task records live under `<project_root>/<docs_dir>/<tasks_dir>`. The
//! project root is resolved from an explicit value, then the
//! `DOCS_PROJECT_ROOT` environment variable, then the working directory.

use crate::task::services::DEFAULT_ACTIVITY_LIMIT;
use camino::{Utf8Path, Utf8PathBuf};
use std::env;
use thiserror::Error;

/// Environment variable naming the project root.
pub const PROJECT_ROOT_ENV: &str = "DOCS_PROJECT_ROOT";

/// Errors raised while resolving configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The working directory could not be determined.
    #[error("failed to determine working directory: {0}")]
    WorkingDirectory(#[source] std::io::Error),

    /// A path is not valid UTF-8.
    #[error("path is not valid UTF-8: {0}")]
    NonUtf8Path(String),
}

/// Resolved settings for locating and reporting on task records.
///
/// # Examples
///
/// ```rust
/// use devflow::config::DevflowConfig;
///
/// let config = DevflowConfig::for_root("/srv/project");
/// assert_eq!(config.tasks_path().as_str(), "/srv/project/Docs/.tasks");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DevflowConfig {
    /// Project root directory.
    pub project_root: Utf8PathBuf,
    /// Documentation directory relative to the root.
    pub docs_dir: String,
    /// Task record directory relative to the documentation directory.
    pub tasks_dir: String,
    /// Number of entries in a report's recent activity feed.
    pub recent_activity_limit: usize,
}

impl Default for DevflowConfig {
    fn default() -> Self {
        Self::for_root(".")
    }
}

impl DevflowConfig {
    /// Creates a configuration with default layout under `project_root`.
    #[must_use]
    pub fn for_root(project_root: impl Into<Utf8PathBuf>) -> Self {
        Self {
            project_root: project_root.into(),
            docs_dir: "Docs".to_owned(),
            tasks_dir: ".tasks".to_owned(),
            recent_activity_limit: DEFAULT_ACTIVITY_LIMIT,
        }
    }

    /// Resolves the project root from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the working directory is needed but
    /// unavailable, or when a candidate path is not valid UTF-8.
    pub fn resolve(explicit: Option<&Utf8Path>) -> Result<Self, ConfigError> {
        let from_env = match env::var(PROJECT_ROOT_ENV) {
            Ok(value) => Some(value),
            Err(env::VarError::NotPresent) => None,
            Err(env::VarError::NotUnicode(value)) => {
                return Err(ConfigError::NonUtf8Path(value.to_string_lossy().into_owned()));
            }
        };
        let current_dir = env::current_dir().map_err(ConfigError::WorkingDirectory)?;
        let working_dir = Utf8PathBuf::try_from(current_dir)
            .map_err(|err| ConfigError::NonUtf8Path(err.into_path_buf().display().to_string()))?;
        Ok(Self::resolve_from(explicit, from_env.as_deref(), &working_dir))
    }

    /// Resolves the project root from explicit inputs.
    ///
    /// Empty values are ignored. Relative roots are joined onto
    /// `working_dir`.
    #[must_use]
    pub fn resolve_from(
        explicit: Option<&Utf8Path>,
        from_env: Option<&str>,
        working_dir: &Utf8Path,
    ) -> Self {
        let chosen = explicit
            .filter(|path| !path.as_str().trim().is_empty())
            .map(Utf8Path::to_path_buf)
            .or_else(|| {
                from_env
                    .map(str::trim)
                    .filter(|value| !value.is_empty())
                    .map(Utf8PathBuf::from)
            });

        let project_root = match chosen {
            Some(path) if path.is_absolute() => path,
            Some(path) => working_dir.join(path),
            None => working_dir.to_path_buf(),
        };
        Self::for_root(project_root)
    }

    /// Overrides the recent activity window.
    #[must_use]
    pub const fn with_recent_activity_limit(mut self, limit: usize) -> Self {
        self.recent_activity_limit = limit;
        self
    }

    /// Returns the documentation directory.
    #[must_use]
    pub fn docs_path(&self) -> Utf8PathBuf {
        self.project_root.join(&self.docs_dir)
    }

    /// Returns the directory holding task records.
    #[must_use]
    pub fn tasks_path(&self) -> Utf8PathBuf {
        self.docs_path().join(&self.tasks_dir)
    }
}
