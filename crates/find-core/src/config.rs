use std::{fs, path::Path, path::PathBuf};

use directories::ProjectDirs;
use serde::Deserialize;

use crate::browser::DEFAULT_EXCLUDED_TAGS;
use crate::error::{FindError, Result};

pub const QUALIFIER: &str = "com";
pub const ORGANIZATION: &str = "sean";
pub const APPLICATION: &str = "pagefind";

pub fn config_root() -> Option<PathBuf> {
    ProjectDirs::from(QUALIFIER, ORGANIZATION, APPLICATION).map(|p| p.config_dir().to_path_buf())
}

pub fn settings_path() -> Option<PathBuf> {
    config_root().map(|dir| dir.join("settings.toml"))
}

/// Find-in-page settings, owned by the host.
///
/// ```toml
/// excluded_tags = ["script", "form", "style", "nav"]
/// instrumentation = true
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FindConfig {
    /// Elements whose subtree is never searched.
    pub excluded_tags: Vec<String>,
    /// Wraps the finder with timing and logging.
    pub instrumentation: bool,
}

impl Default for FindConfig {
    fn default() -> Self {
        Self {
            excluded_tags: DEFAULT_EXCLUDED_TAGS.iter().map(|t| t.to_string()).collect(),
            instrumentation: false,
        }
    }
}

impl FindConfig {
    /// Reads `settings.toml` from the user config dir, falling back to the
    /// defaults when there is none.
    pub fn load() -> Result<Self> {
        match settings_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        toml::from_str(contents).map_err(|err| FindError::Config(err.to_string()))
    }
}
