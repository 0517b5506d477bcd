//! Git operations used by the registry and by git template sources.

use crate::error::{Error, Result};
use git2::build::{CheckoutBuilder, RepoBuilder};
use git2::{Cred, FetchOptions, RemoteCallbacks, Repository};
use log::debug;
use std::path::Path;
use url::Url;

/// True for URLs that name a git remote: `https`, `http`, `git`, `ssh` and
/// `file` URLs, and scp-like `git@host:path` addresses.
pub fn is_git_url(s: &str) -> bool {
    if let Ok(url) = Url::parse(s) {
        return matches!(url.scheme(), "https" | "http" | "git" | "ssh" | "file");
    }
    s.starts_with("git@") && s.contains(':')
}

fn fetch_options<'a>() -> FetchOptions<'a> {
    let mut callbacks = RemoteCallbacks::new();
    callbacks.credentials(|_url, username_from_url, _allowed_types| {
        Cred::ssh_key_from_agent(username_from_url.unwrap_or("git"))
    });

    let mut fetch_opts = FetchOptions::new();
    fetch_opts.remote_callbacks(callbacks);
    fetch_opts
}

/// Clones `url` into `dest`, checking out `branch` when given.
pub fn clone_repository(url: &str, dest: &Path, branch: Option<&str>) -> Result<()> {
    debug!("Cloning '{}' to '{}'.", url, dest.display());

    let mut builder = RepoBuilder::new();
    builder.fetch_options(fetch_options());
    if let Some(branch) = branch {
        builder.branch(branch);
    }
    builder.clone(url, dest)?;
    Ok(())
}

/// Fetches `origin` and fast-forwards the checked-out branch of the repository at `path`.
///
/// # Errors
/// * `Error::RegistryError` if the branch has diverged and cannot be fast-forwarded
pub fn fast_forward(path: &Path) -> Result<()> {
    let repo = Repository::open(path)?;
    let mut remote = repo.find_remote("origin")?;
    remote.fetch(&[] as &[&str], Some(&mut fetch_options()), None)?;

    let fetch_head = repo.find_reference("FETCH_HEAD")?;
    let fetch_commit = repo.reference_to_annotated_commit(&fetch_head)?;
    let (analysis, _) = repo.merge_analysis(&[&fetch_commit])?;

    if analysis.is_up_to_date() {
        debug!("'{}' is up to date.", path.display());
        return Ok(());
    }
    if !analysis.is_fast_forward() {
        return Err(Error::RegistryError(format!(
            "cannot fast-forward '{}'",
            path.display()
        )));
    }

    let head = repo.head()?;
    let refname = head
        .name()
        .ok_or_else(|| Error::RegistryError("HEAD is not a valid reference".to_string()))?
        .to_string();
    let mut reference = repo.find_reference(&refname)?;
    reference.set_target(fetch_commit.id(), "fast-forward")?;
    repo.set_head(&refname)?;
    repo.checkout_head(Some(CheckoutBuilder::default().force()))?;
    debug!("Fast-forwarded '{}' to {}.", path.display(), fetch_commit.id());
    Ok(())
}
