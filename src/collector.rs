//! Variable collection.
//! Walks the manifest's variables in declaration order and produces the final
//! name to value mapping, either from defaults or from interactive input.

use crate::error::{Error, Result};
use crate::manifest::{TemplateManifest, VariableDefinition, VariableKind};
use crate::prompt::{parse_bool, Prompter};
use log::{debug, error, warn};
use std::collections::HashMap;

/// Final, validated variable values for one generation run.
pub type ValueMapping = HashMap<String, String>;

/// Outcome of validating one candidate value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validation {
    /// The value to store, canonicalised where the kind requires it.
    Accepted(String),
    /// Why the value was rejected.
    Rejected(String),
}

/// Per-variable collection state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptState {
    Prompting,
    Validating(String),
    Accepted(String),
}

impl VariableDefinition {
    /// Checks `value` against the rules of this variable's kind.
    ///
    /// A validation pattern that does not compile is logged and ignored so that
    /// a template authoring mistake never blocks generation.
    pub fn validate(&self, value: &str) -> Validation {
        match &self.kind {
            VariableKind::String { validation } => {
                if value.is_empty() {
                    return Validation::Rejected("Value is required.".to_string());
                }
                let Some(validation) = validation else {
                    return Validation::Accepted(value.to_string());
                };
                match validation.compile() {
                    Ok(regex) if !regex.is_match(value) => Validation::Rejected(
                        validation.message.clone().unwrap_or_else(|| {
                            format!("Value '{value}' does not match required pattern.")
                        }),
                    ),
                    Ok(_) => Validation::Accepted(value.to_string()),
                    Err(e) => {
                        warn!(
                            "Invalid validation_regex for variable '{}': {}",
                            self.name, e
                        );
                        Validation::Accepted(value.to_string())
                    }
                }
            }
            VariableKind::Select { options } => {
                if options.iter().any(|option| option == value) {
                    Validation::Accepted(value.to_string())
                } else {
                    Validation::Rejected(format!(
                        "Invalid value '{}' for variable '{}'. Allowed options: {}",
                        value,
                        self.name,
                        options.join(", ")
                    ))
                }
            }
            VariableKind::Boolean => match parse_bool(value) {
                Some(flag) => Validation::Accepted(flag.to_string()),
                None => Validation::Rejected(
                    "Please enter yes/no, y/n, true/false.".to_string(),
                ),
            },
        }
    }

    /// Text shown when asking for this variable: prompt, default and options.
    pub fn prompt_text(&self) -> String {
        let mut text = self.prompt.clone();
        if let Some(default) = &self.default {
            text.push_str(&format!(" [{default}]"));
        }
        if let VariableKind::Select { options } = &self.kind {
            text.push_str(&format!(" (options: {})", options.join(", ")));
        }
        text
    }

    /// Applies defaulting to raw input: surrounding whitespace is dropped and
    /// an empty answer selects the default.
    pub fn resolve_input(&self, input: &str) -> String {
        let input = input.trim();
        if input.is_empty() {
            self.default.clone().unwrap_or_default()
        } else {
            input.to_string()
        }
    }
}

/// Performs one transition of the per-variable state machine.
///
/// `Prompting` reads a line, `Validating` either accepts the value or reports
/// the problem and goes back to `Prompting`, and `Accepted` is terminal.
///
/// # Errors
/// * `Error::InputAborted` if the input stream fails while prompting
pub fn step(
    variable: &VariableDefinition,
    state: PromptState,
    prompter: &dyn Prompter,
) -> Result<PromptState> {
    match state {
        PromptState::Prompting => {
            let input = prompter.read_line(&variable.prompt_text()).map_err(|e| {
                error!("Input aborted for variable '{}': {}", variable.name, e);
                Error::InputAborted { variable: variable.name.clone() }
            })?;
            Ok(PromptState::Validating(variable.resolve_input(&input)))
        }
        PromptState::Validating(value) => match variable.validate(&value) {
            Validation::Accepted(value) => Ok(PromptState::Accepted(value)),
            Validation::Rejected(message) => {
                prompter.notify(&message);
                Ok(PromptState::Prompting)
            }
        },
        accepted @ PromptState::Accepted(_) => Ok(accepted),
    }
}

/// Asks for a single variable until a valid value is given.
pub fn prompt_variable(variable: &VariableDefinition, prompter: &dyn Prompter) -> Result<String> {
    let mut state = PromptState::Prompting;
    loop {
        state = step(variable, state, prompter)?;
        if let PromptState::Accepted(value) = state {
            return Ok(value);
        }
    }
}

/// Resolves a variable from its default alone.
///
/// # Errors
/// * `Error::ValidationError` if there is no default or it fails validation
pub fn default_value(variable: &VariableDefinition) -> Result<String> {
    let Some(default) = &variable.default else {
        return Err(Error::ValidationError {
            variable: variable.name.clone(),
            message: "has no default; cannot use --defaults".to_string(),
        });
    };

    match variable.validate(default) {
        Validation::Accepted(value) => Ok(value),
        Validation::Rejected(message) => Err(Error::ValidationError {
            variable: variable.name.clone(),
            message: format!("default '{default}' is invalid: {message}"),
        }),
    }
}

/// Collects a value for every variable of the manifest, in declared order.
///
/// No partial mapping is returned on failure.
///
/// # Errors
/// * `Error::ValidationError` in defaults mode when a default is missing or invalid
/// * `Error::InputAborted` in interactive mode when the input stream fails
pub fn collect_values(
    manifest: &TemplateManifest,
    prompter: &dyn Prompter,
    use_defaults: bool,
) -> Result<ValueMapping> {
    let mut values = ValueMapping::new();

    for variable in &manifest.variables {
        let value = if use_defaults {
            default_value(variable).inspect_err(|e| {
                error!("Collection failed validating defaults: {e}");
            })?
        } else {
            prompt_variable(variable, prompter)?
        };

        debug!("Collected '{}' = '{}'", variable.name, value);
        values.insert(variable.name.clone(), value);
    }

    Ok(values)
}
