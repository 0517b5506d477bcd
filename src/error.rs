//! Error handling for cpp-hub.
//! Defines custom error types and results used throughout the application.

use std::io;
use thiserror::Error;

/// Custom error types for cpp-hub operations.
///
/// Manifest and destination errors are raised before anything is written.
/// Everything else carries the path, variable or field it concerns so that
/// a failure can be diagnosed without re-running.
#[derive(Error, Debug)]
pub enum Error {
    /// Represents errors that occur during file system operations
    #[error("IO error: {0}.")]
    IoError(#[from] io::Error),

    /// The manifest document is not valid JSON
    #[error("Failed to parse manifest '{path}': {source}.")]
    ManifestParseError {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    /// The manifest is valid JSON but violates the manifest schema
    #[error("Manifest error: {0}.")]
    ManifestError(String),

    /// A collected value failed its type, pattern or option constraint
    #[error("Validation error for variable '{variable}': {message}.")]
    ValidationError { variable: String, message: String },

    /// The input stream failed or was closed while a value was requested
    #[error("Input aborted while collecting variable '{variable}'.")]
    InputAborted { variable: String },

    /// Interactive prompt failure unrelated to a particular variable
    #[error("Prompt error: {0}.")]
    PromptError(String),

    #[error("Target path already exists: '{path}'.")]
    DestinationExistsError { path: String },

    /// I/O failure while rendering, carrying the path being read or written
    #[error("Render error at '{path}': {source}.")]
    RenderError {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("Failed to compute relative path for '{path}'.")]
    RelativePathError { path: String },

    #[error("Failed to walk template tree: {0}.")]
    WalkDirError(#[from] walkdir::Error),

    /// Represents errors that occur during hook command execution
    #[error("Hook execution error: {0}.")]
    HookError(String),

    /// The tool's own configuration cannot be resolved
    #[error("Configuration error: {0}.")]
    ConfigError(String),

    #[error("Registry error: {0}.")]
    RegistryError(String),

    #[error("Template not found in registry: '{0}'.")]
    TemplateNotFoundError(String),

    #[error("Template directory does not exist: '{template_dir}'.")]
    TemplateDoesNotExistsError { template_dir: String },

    #[error("Not a git repository URL: '{0}'.")]
    InvalidGitUrlError(String),

    #[error("Git error: {0}.")]
    Git2Error(#[from] git2::Error),
}

/// Convenience type alias for Results with cpp-hub's Error as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Default error handler that prints the error and exits the program.
///
/// Prints the error message to stderr and exits with status code 1.
pub fn default_error_handler(err: Error) -> ! {
    eprintln!("{err}");
    std::process::exit(1);
}
