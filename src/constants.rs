//! Common constants used throughout cpp-hub.

/// Template manifest file name, skipped at every level of a rendered tree
pub const MANIFEST_FILE: &str = "hub-manifest.json";

/// Version control directory name, never descended into while rendering
pub const GIT_DIR: &str = ".git";

/// Registry index file name at the root of the registry checkout
pub const REGISTRY_INDEX_FILE: &str = "index.json";

/// Fallback project directory name when neither `project_name` nor the manifest id is usable
pub const DEFAULT_PROJECT_NAME: &str = "cpp-project";

/// Variable whose value names the generated project directory by default
pub const PROJECT_NAME_VARIABLE: &str = "project_name";
