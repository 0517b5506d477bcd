//! Template manifest model and loader.
//! Parses `hub-manifest.json` into a [`TemplateManifest`]: identity fields,
//! ordered variable definitions, post-generation hooks and overlay rules.

use crate::constants::MANIFEST_FILE;
use crate::error::{Error, Result};
use indexmap::IndexMap;
use log::{debug, warn};
use regex::Regex;
use serde::de::IgnoredAny;
use serde::Deserialize;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

/// Pattern constraint attached to a string variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringValidation {
    /// Regular expression the whole value has to match
    pub pattern: String,
    /// Message shown when the value does not match
    pub message: Option<String>,
}

impl StringValidation {
    /// Compiles the pattern anchored at both ends, so that it has to match the
    /// entire value rather than a substring of it.
    pub fn compile(&self) -> std::result::Result<Regex, regex::Error> {
        Regex::new(&format!("^(?:{})$", self.pattern))
    }
}

/// The kind of a variable together with the fields only that kind uses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VariableKind {
    String { validation: Option<StringValidation> },
    /// `options` is never empty.
    Select { options: Vec<String> },
    Boolean,
}

impl VariableKind {
    /// Manifest spelling of the kind.
    pub fn type_name(&self) -> &'static str {
        match self {
            VariableKind::String { .. } => "string",
            VariableKind::Select { .. } => "select",
            VariableKind::Boolean => "boolean",
        }
    }
}

/// A single entry of the manifest's `variables` object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableDefinition {
    pub name: String,
    pub prompt: String,
    /// Default as text. Booleans are stored as "true"/"false", empty defaults as `None`.
    pub default: Option<String>,
    pub kind: VariableKind,
}

/// Renders the subtree at `path` on top of the project when `variable` equals `equals_value`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OverlayRule {
    pub variable: String,
    #[serde(rename = "equalsValue")]
    pub equals_value: String,
    pub path: String,
}

/// In-memory form of a template's manifest. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateManifest {
    pub schema_version: String,
    pub id: String,
    pub name: String,
    pub version: String,
    pub description: String,
    pub variables: Vec<VariableDefinition>,
    pub post_gen_hooks: Vec<String>,
    pub overlays: Vec<OverlayRule>,
}

impl TemplateManifest {
    pub fn variable(&self, name: &str) -> Option<&VariableDefinition> {
        self.variables.iter().find(|variable| variable.name == name)
    }
}

/// `variables` is kept in declaration order. Anything that is not an object
/// falls through to `Other` and is reported as a schema error.
#[derive(Deserialize)]
#[serde(untagged)]
enum VariablesField {
    Map(IndexMap<String, Value>),
    Other(IgnoredAny),
}

#[derive(Deserialize)]
struct RawManifest {
    schema_version: Option<Value>,
    id: Option<Value>,
    name: Option<Value>,
    version: Option<Value>,
    description: Option<Value>,
    variables: Option<VariablesField>,
    hooks: Option<Value>,
    overlays: Option<Value>,
}

/// Returns the manifest location for a template root.
pub fn manifest_path<P: AsRef<Path>>(template_root: P) -> PathBuf {
    template_root.as_ref().join(MANIFEST_FILE)
}

/// Reads and parses a manifest file.
///
/// # Errors
/// * `Error::ManifestError` if the file cannot be read or violates the schema
/// * `Error::ManifestParseError` if the file is not valid JSON
pub fn load_manifest<P: AsRef<Path>>(manifest_path: P) -> Result<TemplateManifest> {
    let manifest_path = manifest_path.as_ref();
    debug!("Loading manifest from {}", manifest_path.display());

    let content = fs::read_to_string(manifest_path).map_err(|e| {
        Error::ManifestError(format!(
            "could not open manifest '{}': {}",
            manifest_path.display(),
            e
        ))
    })?;

    parse_manifest(&content, manifest_path)
}

/// Parses manifest content. `origin` is only used in error messages.
pub fn parse_manifest<P: AsRef<Path>>(content: &str, origin: P) -> Result<TemplateManifest> {
    let raw: RawManifest =
        serde_json::from_str(content).map_err(|e| Error::ManifestParseError {
            path: origin.as_ref().display().to_string(),
            source: e,
        })?;

    let schema_version = require_string(raw.schema_version.as_ref(), "schema_version")?;
    let id = require_string(raw.id.as_ref(), "id")?;
    let name = require_string(raw.name.as_ref(), "name")?;
    let version = require_string(raw.version.as_ref(), "version")?;
    let description = match raw.description {
        Some(Value::String(description)) => description,
        _ => String::new(),
    };

    let raw_variables = match raw.variables {
        Some(VariablesField::Map(map)) => map,
        _ => {
            return Err(Error::ManifestError(
                "manifest 'variables' must be an object".to_string(),
            ))
        }
    };

    let variables = raw_variables
        .iter()
        .map(|(name, definition)| parse_variable(name, definition))
        .collect::<Result<Vec<_>>>()?;

    let post_gen_hooks = raw.hooks.as_ref().map(parse_hooks).unwrap_or_default();
    let overlays = raw.overlays.as_ref().map(parse_overlays).unwrap_or_default();

    Ok(TemplateManifest {
        schema_version,
        id,
        name,
        version,
        description,
        variables,
        post_gen_hooks,
        overlays,
    })
}

fn require_string(value: Option<&Value>, field: &str) -> Result<String> {
    match value {
        Some(Value::String(s)) if !s.is_empty() => Ok(s.clone()),
        _ => Err(Error::ManifestError(format!(
            "manifest missing required string field '{field}'"
        ))),
    }
}

fn parse_variable(name: &str, definition: &Value) -> Result<VariableDefinition> {
    let fields = definition.as_object().ok_or_else(|| {
        Error::ManifestError(format!("variable '{name}' must be an object"))
    })?;

    let type_name = fields.get("type").and_then(Value::as_str).ok_or_else(|| {
        Error::ManifestError(format!("variable '{name}' missing 'type' field"))
    })?;

    let text_field = |key: &str| {
        fields.get(key).and_then(Value::as_str).map(str::to_owned)
    };

    let kind = match type_name {
        "string" => {
            let validation = text_field("validation_regex")
                .filter(|pattern| !pattern.is_empty())
                .map(|pattern| StringValidation {
                    pattern,
                    message: text_field("error_message").filter(|m| !m.is_empty()),
                });
            VariableKind::String { validation }
        }
        "select" => {
            let options = fields.get("options").and_then(Value::as_array).ok_or_else(|| {
                Error::ManifestError(format!(
                    "select variable '{name}' must have 'options' array"
                ))
            })?;
            let options: Vec<String> = options
                .iter()
                .filter_map(|option| option.as_str().map(str::to_owned))
                .collect();
            if options.is_empty() {
                return Err(Error::ManifestError(format!(
                    "select variable '{name}' has empty 'options' array"
                )));
            }
            VariableKind::Select { options }
        }
        "boolean" => VariableKind::Boolean,
        other => {
            return Err(Error::ManifestError(format!(
                "variable '{name}' has unsupported type '{other}'"
            )))
        }
    };

    Ok(VariableDefinition {
        name: name.to_string(),
        prompt: text_field("prompt").unwrap_or_else(|| format!("{name}?")),
        default: fields.get("default").and_then(default_text),
        kind,
    })
}

/// Canonical text form of a `default` value.
fn default_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::Null => return None,
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    };
    (!text.is_empty()).then_some(text)
}

fn parse_hooks(hooks: &Value) -> Vec<String> {
    let Some(post_gen) = hooks.get("post_gen").and_then(Value::as_array) else {
        return Vec::new();
    };

    post_gen
        .iter()
        .filter_map(|command| {
            let command = command.as_str();
            if command.is_none() {
                debug!("Ignoring non-string post_gen hook entry");
            }
            command.map(str::to_owned)
        })
        .collect()
}

// Overlays are optional extensions: malformed entries are dropped, never fatal.
fn parse_overlays(overlays: &Value) -> Vec<OverlayRule> {
    let Some(entries) = overlays.as_array() else {
        warn!("Manifest 'overlays' is not an array; ignoring it");
        return Vec::new();
    };

    entries
        .iter()
        .enumerate()
        .filter_map(|(index, entry)| {
            match serde_json::from_value::<OverlayRule>(entry.clone()) {
                Ok(rule) => Some(rule),
                Err(e) => {
                    warn!("Skipping malformed overlay entry #{index}: {e}");
                    None
                }
            }
        })
        .collect()
}
