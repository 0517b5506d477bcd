//! Template source resolution for cpp-hub.
//! Turns a registry id, a git URL or a local path into a template root
//! directory on disk.
use crate::config::{ensure_directory, HubConfig};
use crate::error::{Error, Result};
use crate::git;
use crate::registry::Registry;
use log::debug;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

/// Represents the source location of a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateSource {
    /// Template id looked up in the registry
    Registry(String),
    /// Git repository URL (HTTPS or SSH), optionally on a branch
    Git { url: String, branch: Option<String> },
    /// Local filesystem template path
    FileSystem(PathBuf),
}

impl std::fmt::Display for TemplateSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TemplateSource::Registry(id) => write!(f, "registry template: '{id}'"),
            TemplateSource::Git { url, branch: Some(branch) } => {
                write!(f, "git repository: '{url}' (branch '{branch}')")
            }
            TemplateSource::Git { url, branch: None } => write!(f, "git repository: '{url}'"),
            TemplateSource::FileSystem(path) => {
                write!(f, "local path: '{}'", path.display())
            }
        }
    }
}

/// Trait for loading templates from different sources.
pub trait TemplateLoader {
    /// Makes the template available locally and returns its root directory.
    fn load(&self) -> Result<PathBuf>;
}

/// Loader for templates from the local filesystem.
pub struct LocalLoader<P: AsRef<Path>> {
    path: P,
}

impl<P: AsRef<Path>> LocalLoader<P> {
    pub fn new(path: P) -> Self {
        Self { path }
    }
}

impl<P: AsRef<Path>> TemplateLoader for LocalLoader<P> {
    /// # Errors
    /// * `Error::TemplateDoesNotExistsError` if the path is not a directory
    fn load(&self) -> Result<PathBuf> {
        let path = self.path.as_ref();
        if !path.is_dir() {
            return Err(Error::TemplateDoesNotExistsError {
                template_dir: path.display().to_string(),
            });
        }

        Ok(path.to_path_buf())
    }
}

/// Loader for templates from git repositories, cached under the cache root.
pub struct GitLoader<'a> {
    url: &'a str,
    branch: Option<&'a str>,
    cache_root: PathBuf,
}

impl<'a> GitLoader<'a> {
    pub fn new(url: &'a str, branch: Option<&'a str>, cache_root: PathBuf) -> Self {
        Self { url, branch, cache_root }
    }

    /// Cache directory name, unique per URL and branch and stable across builds.
    pub fn cache_dir_name(url: &str, branch: Option<&str>) -> String {
        let mut hasher = Sha256::new();
        hasher.update(url.as_bytes());
        hasher.update([0u8]);
        if let Some(branch) = branch {
            hasher.update(branch.as_bytes());
        }
        let digest = format!("{:x}", hasher.finalize());
        format!("git-{}", &digest[..16])
    }
}

impl TemplateLoader for GitLoader<'_> {
    /// # Errors
    /// * `Error::InvalidGitUrlError` if the URL does not name a git remote
    /// * `Error::Git2Error` if the clone fails
    fn load(&self) -> Result<PathBuf> {
        if !git::is_git_url(self.url) {
            return Err(Error::InvalidGitUrlError(self.url.to_string()));
        }
        ensure_directory(&self.cache_root)?;

        let clone_path = self.cache_root.join(Self::cache_dir_name(self.url, self.branch));
        if clone_path.exists() {
            println!("Using cached repository at {}", clone_path.display());
        } else {
            git::clone_repository(self.url, &clone_path, self.branch)?;
        }
        Ok(clone_path)
    }
}

/// Loader for templates listed in the registry, cached under their id.
pub struct RegistryLoader<'a> {
    id: &'a str,
    config: &'a HubConfig,
}

impl<'a> RegistryLoader<'a> {
    pub fn new(id: &'a str, config: &'a HubConfig) -> Self {
        Self { id, config }
    }
}

impl TemplateLoader for RegistryLoader<'_> {
    /// # Errors
    /// * `Error::TemplateNotFoundError` if the registry does not list the id
    fn load(&self) -> Result<PathBuf> {
        let mut registry = Registry::new(self.config);
        registry.ensure_initialized()?;
        let info = registry
            .find_template(self.id)
            .ok_or_else(|| Error::TemplateNotFoundError(self.id.to_string()))?;

        let cache_root = self.config.cache_root();
        ensure_directory(&cache_root)?;

        let template_path = cache_root.join(&info.id);
        if template_path.exists() {
            println!("Using cached template at {}", template_path.display());
        } else {
            debug!("Cloning template '{}' from {}", info.id, info.url);
            git::clone_repository(&info.url, &template_path, None)?;
        }
        Ok(template_path)
    }
}

/// Returns the template directory for the provided template source.
pub fn load_template(source: &TemplateSource, config: &HubConfig) -> Result<PathBuf> {
    println!("Using template from the {source}");

    let loader: Box<dyn TemplateLoader + '_> = match source {
        TemplateSource::Registry(id) => Box::new(RegistryLoader::new(id, config)),
        TemplateSource::Git { url, branch } => {
            Box::new(GitLoader::new(url, branch.as_deref(), config.cache_root()))
        }
        TemplateSource::FileSystem(path) => Box::new(LocalLoader::new(path)),
    };

    loader.load()
}
