//! Core generation orchestration.
//! Combines rendering and overlays into one project generation, and checks a
//! template for authoring mistakes that do not prevent loading it.

use crate::collector::{Validation, ValueMapping};
use crate::constants::{DEFAULT_PROJECT_NAME, PROJECT_NAME_VARIABLE};
use crate::error::{Error, Result};
use crate::manifest::{TemplateManifest, VariableKind};
use crate::overlay::{apply_overlays, OverlayOutcome};
use crate::renderer::render_tree;
use log::info;
use std::path::{Path, PathBuf};

/// Result of a successful generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationReport {
    pub project_root: PathBuf,
    /// Files written by the base render.
    pub files: Vec<PathBuf>,
    pub overlays: Vec<OverlayOutcome>,
}

/// Default project directory: `cwd/<project_name>`, falling back to the
/// manifest id and then to a fixed name.
pub fn default_target_dir<P: AsRef<Path>>(
    cwd: P,
    manifest: &TemplateManifest,
    values: &ValueMapping,
) -> PathBuf {
    let name = values
        .get(PROJECT_NAME_VARIABLE)
        .filter(|name| !name.is_empty())
        .map(String::as_str)
        .or_else(|| (!manifest.id.is_empty()).then_some(manifest.id.as_str()))
        .unwrap_or(DEFAULT_PROJECT_NAME);
    cwd.as_ref().join(name)
}

/// Generates a project from `template_root` into `project_root`.
///
/// The base tree is rendered first; overlays whose rule matches `values` are
/// then rendered on top of it.
///
/// # Errors
/// * `Error::DestinationExistsError` if `project_root` exists, before anything is written
/// * Any render error from the base render or from an overlay
pub fn generate_project<T: AsRef<Path>, P: AsRef<Path>>(
    template_root: T,
    manifest: &TemplateManifest,
    values: &ValueMapping,
    project_root: P,
) -> Result<GenerationReport> {
    let template_root = template_root.as_ref();
    let project_root = project_root.as_ref();

    if project_root.exists() {
        return Err(Error::DestinationExistsError {
            path: project_root.display().to_string(),
        });
    }

    info!("Rendering base template '{}'", manifest.id);
    let files = render_tree(template_root, project_root, values, false)?;
    let overlays = apply_overlays(template_root, project_root, &manifest.overlays, values)?;

    Ok(GenerationReport { project_root: project_root.to_path_buf(), files, overlays })
}

/// Lists authoring problems in a loaded manifest that are tolerated at
/// generation time: unusable validation patterns, defaults that fail their own
/// validation, and overlay rules that can never apply.
pub fn lint_template<P: AsRef<Path>>(template_root: P, manifest: &TemplateManifest) -> Vec<String> {
    let template_root = template_root.as_ref();
    let mut warnings = Vec::new();

    for variable in &manifest.variables {
        if let VariableKind::String { validation: Some(validation) } = &variable.kind {
            if let Err(e) = validation.compile() {
                warnings.push(format!(
                    "variable '{}' has an invalid validation_regex, it will not be enforced: {}",
                    variable.name, e
                ));
                continue;
            }
        }
        if let Some(default) = &variable.default {
            if let Validation::Rejected(message) = variable.validate(default) {
                warnings.push(format!(
                    "{} variable '{}' has an invalid default '{}': {}",
                    variable.kind.type_name(),
                    variable.name,
                    default,
                    message
                ));
            }
        }
    }

    for rule in &manifest.overlays {
        if manifest.variable(&rule.variable).is_none() {
            warnings.push(format!(
                "overlay '{}' references undeclared variable '{}'",
                rule.path, rule.variable
            ));
        }
        if !template_root.join(&rule.path).exists() {
            warnings.push(format!("overlay path does not exist: '{}'", rule.path));
        }
    }

    warnings
}
