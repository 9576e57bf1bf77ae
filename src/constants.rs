//! Common constants used throughout cookiecutter-runner.

/// Template manifest file name
pub const MANIFEST_FILE: &str = "cookiecutter.json";

/// Prefix of the single variable-named project directory
pub const VARIABLE_PREFIX: &str = "{{cookiecutter.";

/// Optional hooks directory at the template root
pub const HOOKS_DIR: &str = "hooks";

/// Ignore file looked up at the root of the project directory
pub const IGNORE_FILE: &str = ".gitignore";

/// Version control metadata removed from installed projects
pub const VCS_DIR: &str = ".git";

/// Default cache root used by the command line
pub const DEFAULT_CACHE_DIR: &str = ".cookiecutter-runner_cache";
