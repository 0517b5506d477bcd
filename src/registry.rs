//! Template registry.
//! A registry is a git repository holding an `index.json` that describes the
//! available templates. It is cloned on first use and fast-forwarded on update.

use crate::config::{ensure_directory, HubConfig};
use crate::constants::REGISTRY_INDEX_FILE;
use crate::error::{Error, Result};
use crate::git;
use indexmap::IndexMap;
use log::{debug, info, warn};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// One template advertised by the registry.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TemplateInfo {
    pub id: String,
    pub name: String,
    pub description: String,
    pub url: String,
    pub tags: Vec<String>,
    pub build_system: String,
}

#[derive(Debug, Deserialize)]
struct RawIndex {
    #[serde(default)]
    registry_name: Option<String>,
    templates: Option<IndexMap<String, RawTemplateInfo>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawTemplateInfo {
    id: Option<String>,
    name: String,
    description: String,
    url: String,
    tags: Vec<serde_json::Value>,
    build_system: String,
}

const COLUMN_WIDTHS: [usize; 3] = [20, 24, 14];

fn cell(text: &str, width: usize) -> String {
    let truncated: String = text.chars().take(width - 1).collect();
    format!("{truncated:<width$}")
}

impl TemplateInfo {
    /// Fixed-width table row: id, name, build system, then the full description.
    pub fn table_row(&self) -> String {
        format!(
            "{}{}{}{}",
            cell(&self.id, COLUMN_WIDTHS[0]),
            cell(&self.name, COLUMN_WIDTHS[1]),
            cell(&self.build_system, COLUMN_WIDTHS[2]),
            self.description
        )
    }

    fn matches_query(&self, query: &str) -> bool {
        let query = query.to_lowercase();
        let contains = |text: &str| text.to_lowercase().contains(&query);
        contains(&self.id)
            || contains(&self.name)
            || contains(&self.description)
            || self.tags.iter().any(|tag| contains(tag))
    }

    fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|candidate| candidate.eq_ignore_ascii_case(tag))
    }
}

/// Header lines for [`TemplateInfo::table_row`] output.
pub fn table_header() -> String {
    let header = format!(
        "{:<w0$}{:<w1$}{:<w2$}DESCRIPTION",
        "ID",
        "NAME",
        "BUILD SYSTEM",
        w0 = COLUMN_WIDTHS[0],
        w1 = COLUMN_WIDTHS[1],
        w2 = COLUMN_WIDTHS[2],
    );
    let rule = "-".repeat(COLUMN_WIDTHS.iter().sum::<usize>() + 40);
    format!("{header}\n{rule}")
}

/// Local checkout of a template registry.
#[derive(Debug)]
pub struct Registry {
    path: PathBuf,
    url: String,
    name: String,
    templates: BTreeMap<String, TemplateInfo>,
}

impl Registry {
    pub fn new(config: &HubConfig) -> Self {
        Self::open(config.registry_path(), config.registry_url.clone())
    }

    /// Registry checked out at `path`, cloned from `url` when missing. Nothing
    /// is read until [`Registry::reload`] or [`Registry::ensure_initialized`].
    pub fn open<P: Into<PathBuf>, S: Into<String>>(path: P, url: S) -> Self {
        Self { path: path.into(), url: url.into(), name: String::new(), templates: BTreeMap::new() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn templates(&self) -> &BTreeMap<String, TemplateInfo> {
        &self.templates
    }

    pub fn find_template(&self, id: &str) -> Option<&TemplateInfo> {
        self.templates.get(id)
    }

    /// Templates whose id, name, description or a tag contains `query`, ignoring case.
    pub fn search(&self, query: &str) -> Vec<&TemplateInfo> {
        self.templates.values().filter(|info| info.matches_query(query)).collect()
    }

    /// Templates carrying `tag` (ignoring case). An empty tag selects everything.
    pub fn with_tag(&self, tag: &str) -> Vec<&TemplateInfo> {
        self.templates
            .values()
            .filter(|info| tag.is_empty() || info.has_tag(tag))
            .collect()
    }

    /// Clones the registry if it is not present yet, then loads its index.
    pub fn ensure_initialized(&mut self) -> Result<()> {
        if !self.path.exists() {
            if let Some(parent) = self.path.parent() {
                ensure_directory(parent)?;
            }
            info!("Cloning registry from {}", self.url);
            git::clone_repository(&self.url, &self.path, None).map_err(|e| {
                Error::RegistryError(format!("failed to clone registry from {}: {}", self.url, e))
            })?;
        }
        self.reload()
    }

    /// Brings the registry up to date with its remote and reloads the index.
    pub fn update(&mut self) -> Result<()> {
        if !self.path.exists() {
            return self.ensure_initialized();
        }
        git::fast_forward(&self.path).map_err(|e| match e {
            Error::RegistryError(_) => e,
            other => Error::RegistryError(format!("failed to update registry: {other}")),
        })?;
        self.reload()
    }

    /// Re-reads `index.json` without touching the network.
    pub fn reload(&mut self) -> Result<()> {
        let index_path = self.path.join(REGISTRY_INDEX_FILE);
        let content = fs::read_to_string(&index_path).map_err(|e| {
            Error::RegistryError(format!(
                "could not open registry index {}: {}",
                index_path.display(),
                e
            ))
        })?;
        let (name, templates) = parse_index(&content)?;
        debug!("Loaded {} templates from {}", templates.len(), index_path.display());
        self.name = name;
        self.templates = templates;
        Ok(())
    }
}

fn parse_index(content: &str) -> Result<(String, BTreeMap<String, TemplateInfo>)> {
    let raw: RawIndex = serde_json::from_str(content)
        .map_err(|e| Error::RegistryError(format!("failed to parse registry index: {e}")))?;

    let entries = raw.templates.ok_or_else(|| {
        Error::RegistryError("registry index missing 'templates' object".to_string())
    })?;

    let mut templates = BTreeMap::new();
    for (key, entry) in entries {
        let id = entry.id.unwrap_or_else(|| key.clone());
        if id.is_empty() || entry.url.is_empty() {
            warn!("Skipping template '{key}' due to missing id or url.");
            continue;
        }
        let tags = entry
            .tags
            .into_iter()
            .filter_map(|tag| tag.as_str().map(str::to_owned))
            .collect();
        let info = TemplateInfo {
            id: id.clone(),
            name: entry.name,
            description: entry.description,
            url: entry.url,
            tags,
            build_system: entry.build_system,
        };
        templates.insert(id, info);
    }

    Ok((raw.registry_name.unwrap_or_default(), templates))
}
