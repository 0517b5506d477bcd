//! Conditional overlays.
//! After the base render, each matching overlay subtree is rendered on top of
//! the generated project, in manifest order.

use crate::collector::ValueMapping;
use crate::error::Result;
use crate::manifest::OverlayRule;
use crate::renderer::render_tree;
use log::{info, warn};
use std::path::{Path, PathBuf};

impl OverlayRule {
    /// True when the rule's variable was collected and equals `equals_value`
    /// exactly. Rules naming an unknown variable never match.
    pub fn matches(&self, values: &ValueMapping) -> bool {
        values
            .get(&self.variable)
            .is_some_and(|value| *value == self.equals_value)
    }
}

/// What happened to one matching overlay rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OverlayOutcome {
    Applied { source: PathBuf, files: Vec<PathBuf> },
    /// The overlay directory does not exist; generation continues without it.
    Missing { source: PathBuf },
}

/// Applies every matching rule of `rules` to the already generated `project_root`.
///
/// Non-matching rules are ignored and do not appear in the result.
///
/// # Errors
/// Any render failure while applying an overlay aborts the whole operation.
pub fn apply_overlays<T: AsRef<Path>, P: AsRef<Path>>(
    template_root: T,
    project_root: P,
    rules: &[OverlayRule],
    values: &ValueMapping,
) -> Result<Vec<OverlayOutcome>> {
    let template_root = template_root.as_ref();
    let project_root = project_root.as_ref();
    let mut outcomes = Vec::new();

    for rule in rules.iter().filter(|rule| rule.matches(values)) {
        let source = template_root.join(&rule.path);
        if !source.exists() {
            warn!("Overlay path does not exist: {}", source.display());
            outcomes.push(OverlayOutcome::Missing { source });
            continue;
        }

        info!(
            "Applying overlay for {} == {} from {}",
            rule.variable,
            rule.equals_value,
            source.display()
        );
        let files = render_tree(&source, project_root, values, true)?;
        outcomes.push(OverlayOutcome::Applied { source, files });
    }

    Ok(outcomes)
}
