//! cpp-hub configuration.
//! Resolves where the registry checkout and the template cache live, and
//! which registry to clone.

use crate::error::{Error, Result};
use log::debug;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Registry cloned when no other one is configured
pub const DEFAULT_REGISTRY_URL: &str = "https://github.com/example/cpp-hub-registry.git";

/// Overrides the configuration root directory
pub const HOME_ENV: &str = "CPP_HUB_HOME";

/// Overrides the registry repository URL
pub const REGISTRY_URL_ENV: &str = "CPP_HUB_REGISTRY_URL";

/// Locations and remote used by the registry and the template cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HubConfig {
    pub root: PathBuf,
    pub registry_url: String,
}

impl HubConfig {
    pub fn new<P: Into<PathBuf>, S: Into<String>>(root: P, registry_url: S) -> Self {
        Self { root: root.into(), registry_url: registry_url.into() }
    }

    /// Reads the configuration from the environment.
    ///
    /// The root is `$CPP_HUB_HOME`, else `<home>/.cpp-hub`. The registry URL is
    /// `$CPP_HUB_REGISTRY_URL`, else [`DEFAULT_REGISTRY_URL`].
    ///
    /// # Errors
    /// * `Error::ConfigError` if no override is set and the home directory is unknown
    pub fn from_env() -> Result<Self> {
        let root = resolve_root(non_empty_var(HOME_ENV), dirs::home_dir())?;
        let registry_url =
            non_empty_var(REGISTRY_URL_ENV).unwrap_or_else(|| DEFAULT_REGISTRY_URL.to_string());
        debug!("Configuration root: {}", root.display());
        Ok(Self { root, registry_url })
    }

    pub fn registry_path(&self) -> PathBuf {
        self.root.join("registry")
    }

    pub fn cache_root(&self) -> PathBuf {
        self.root.join("cache")
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.is_empty())
}

/// Configuration root from an explicit override or the user's home directory.
fn resolve_root(override_root: Option<String>, home: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(root) = override_root {
        return Ok(PathBuf::from(root));
    }
    home.filter(|home| !home.as_os_str().is_empty())
        .map(|home| home.join(".cpp-hub"))
        .ok_or_else(|| {
            Error::ConfigError(format!(
                "could not determine the home directory; set {HOME_ENV} to choose a configuration root"
            ))
        })
}

/// Creates `dir` and its parents if needed.
///
/// # Errors
/// * `Error::IoError` if `dir` exists but is not a directory, or creation fails
pub fn ensure_directory<P: AsRef<Path>>(dir: P) -> Result<()> {
    let dir = dir.as_ref();
    if dir.exists() {
        if !dir.is_dir() {
            return Err(Error::IoError(std::io::Error::new(
                std::io::ErrorKind::AlreadyExists,
                format!("path exists but is not a directory: {}", dir.display()),
            )));
        }
        return Ok(());
    }
    fs::create_dir_all(dir).map_err(Error::IoError)
}

/// Tool version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
