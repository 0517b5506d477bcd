//! cpp-hub is a manifest-driven project scaffolding tool.
//! A template is a directory tree plus a `hub-manifest.json`; cpp-hub collects
//! the manifest's variables, copies the tree with `{{name}}` tokens substituted
//! in paths and contents, and layers conditional overlays on top.

/// Command-line interface module for the cpp-hub application
pub mod cli;

/// Variable collection from defaults or interactive input
pub mod collector;

/// Registry and cache locations, environment overrides
pub mod config;

/// Common constants shared across modules
pub mod constants;

/// Error types and handling for the cpp-hub application
pub mod error;

/// Project generation: base render followed by overlays
pub mod generator;

/// Git clone and update operations
pub mod git;

/// Post-generation hook commands
pub mod hooks;

/// Template source resolution (registry, git, local path)
pub mod loader;

/// Logger initialisation
pub mod logger;

/// Manifest model and loader
pub mod manifest;

/// Conditional overlay application
pub mod overlay;

/// User input and interaction handling
pub mod prompt;

/// Template registry index
pub mod registry;

/// Tree rendering and token substitution
pub mod renderer;
