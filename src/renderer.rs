//! Template tree rendering.
//! Copies a template tree into a destination while substituting `{{name}}`
//! tokens in path segments and file contents.

use crate::collector::ValueMapping;
use crate::constants::{GIT_DIR, MANIFEST_FILE};
use crate::error::{Error, Result};
use log::debug;
use regex::bytes::{Captures, Regex};
use std::borrow::Cow;
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::sync::LazyLock;
use walkdir::{DirEntry, WalkDir};

/// `{{` followed by a brace-free name and `}}`.
static TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{([^{}]*)\}\}").expect("token pattern is valid"));

/// Replaces every `{{name}}` whose name is a key of `values` with its value.
///
/// The input is scanned once, left to right, and matches never overlap.
/// Replacement text is not scanned again, so a value that itself contains a
/// token is emitted literally. Tokens with unknown names are left as they are.
/// Content is treated as raw bytes; nothing but the token syntax is interpreted.
pub fn substitute_bytes<'a>(content: &'a [u8], values: &ValueMapping) -> Cow<'a, [u8]> {
    TOKEN.replace_all(content, |caps: &Captures| {
        let name = std::str::from_utf8(&caps[1]).ok();
        match name.and_then(|name| values.get(name)) {
            Some(value) => value.as_bytes().to_vec(),
            None => caps[0].to_vec(),
        }
    })
}

/// [`substitute_bytes`] for text.
pub fn substitute(text: &str, values: &ValueMapping) -> String {
    match substitute_bytes(text.as_bytes(), values) {
        Cow::Borrowed(_) => text.to_string(),
        // Values are UTF-8 and tokens are only replaced whole, so this is lossless.
        Cow::Owned(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
    }
}

/// True for entries whose whole subtree must not be rendered: `.git` and the
/// manifest file, at any depth. The walk root itself is never skipped.
fn is_skipped(entry: &DirEntry) -> bool {
    if entry.depth() == 0 {
        return false;
    }
    let name = entry.file_name();
    name == GIT_DIR || name == MANIFEST_FILE
}

/// Builds the destination path for `relative` by substituting each segment.
fn target_path(
    destination_root: &Path,
    relative: &Path,
    values: &ValueMapping,
) -> Result<PathBuf> {
    let mut target = destination_root.to_path_buf();
    for component in relative.components() {
        let Component::Normal(segment) = component else {
            return Err(Error::RelativePathError { path: relative.display().to_string() });
        };
        let segment = segment.to_str().ok_or_else(|| Error::RelativePathError {
            path: relative.display().to_string(),
        })?;
        // A substituted value must not add separators that leave the destination.
        let rendered = substitute(segment, values);
        let mut parts = Path::new(&rendered).components().peekable();
        if parts.peek().is_none() {
            return Err(Error::RelativePathError { path: relative.display().to_string() });
        }
        for part in parts {
            let Component::Normal(part) = part else {
                return Err(Error::RelativePathError { path: rendered.clone() });
            };
            target.push(part);
        }
    }
    Ok(target)
}

/// Location of `destination_root` relative to `source_root` when the
/// destination lies strictly inside the source tree.
fn nested_destination(source_root: &Path, destination_root: &Path) -> Option<PathBuf> {
    let source = fs::canonicalize(source_root).ok()?;
    let destination = fs::canonicalize(destination_root).ok()?;
    destination
        .strip_prefix(&source)
        .ok()
        .filter(|relative| !relative.as_os_str().is_empty())
        .map(Path::to_path_buf)
}

fn create_dir_all(path: &Path) -> Result<()> {
    fs::create_dir_all(path).map_err(|e| Error::RenderError {
        path: path.display().to_string(),
        source: e,
    })
}

fn render_file(source: &Path, target: &Path, values: &ValueMapping) -> Result<()> {
    if let Some(parent) = target.parent() {
        create_dir_all(parent)?;
    }
    let content = fs::read(source).map_err(|e| Error::RenderError {
        path: source.display().to_string(),
        source: e,
    })?;
    let rendered = substitute_bytes(&content, values);
    fs::write(target, &*rendered).map_err(|e| Error::RenderError {
        path: target.display().to_string(),
        source: e,
    })
}

/// Renders the tree at `source_root` into `destination_root`.
///
/// # Arguments
/// * `source_root` - Template (or overlay) directory to walk
/// * `destination_root` - Directory receiving the rendered tree
/// * `values` - Token values
/// * `allow_merge` - Whether `destination_root` may already exist. When it
///   does, directories are merged and files are overwritten.
///
/// # Returns
/// * `Result<Vec<PathBuf>>` - Destination paths of the files written, in walk order
///
/// # Errors
/// * `Error::DestinationExistsError` if the destination exists and merging is
///   not allowed; nothing is written in that case
/// * `Error::RenderError`, `Error::WalkDirError`, `Error::RelativePathError`
///   for I/O and path failures. The render stops at the first failure and
///   output written so far is left in place.
pub fn render_tree<S: AsRef<Path>, D: AsRef<Path>>(
    source_root: S,
    destination_root: D,
    values: &ValueMapping,
    allow_merge: bool,
) -> Result<Vec<PathBuf>> {
    let source_root = source_root.as_ref();
    let destination_root = destination_root.as_ref();

    if !allow_merge && destination_root.exists() {
        return Err(Error::DestinationExistsError {
            path: destination_root.display().to_string(),
        });
    }
    debug!(
        "Rendering '{}' into '{}' (merge: {})",
        source_root.display(),
        destination_root.display(),
        allow_merge
    );
    create_dir_all(destination_root)?;

    // The output is never walked as part of the template it is rendered from.
    let excluded = nested_destination(source_root, destination_root);
    if let Some(excluded) = &excluded {
        debug!("Excluding destination '{}' from the walk", excluded.display());
    }
    let is_destination = |entry: &DirEntry| {
        excluded.as_deref().is_some_and(|excluded| {
            entry.path().strip_prefix(source_root).is_ok_and(|relative| relative == excluded)
        })
    };

    let mut written = Vec::new();
    let walker = WalkDir::new(source_root)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| !is_skipped(entry) && !is_destination(entry));

    for entry in walker {
        let entry = entry?;
        let source = entry.path();
        let relative = source
            .strip_prefix(source_root)
            .map_err(|_| Error::RelativePathError { path: source.display().to_string() })?;
        let target = target_path(destination_root, relative, values)?;

        let file_type = entry.file_type();
        if file_type.is_dir() {
            debug!("Creating directory: {}", target.display());
            create_dir_all(&target)?;
        } else if file_type.is_file() {
            debug!("Writing file: {}", target.display());
            render_file(source, &target, values)?;
            written.push(target);
        } else {
            debug!("Skipping non-regular entry: {}", source.display());
        }
    }

    Ok(written)
}
