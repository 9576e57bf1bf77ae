//! cookiecutter-runner stages a cookiecutter template into an isolated cache,
//! generates projects from it and installs and tests the result.

/// Command-line interface module
pub mod cli;

/// Common constants
pub mod constants;

/// Error types and handling
pub mod error;

/// Version-control ignore rules
/// Evaluates .gitignore files of the template project directory
pub mod ignore;

/// Template layout configuration
pub mod layout;

/// Logger initialisation
pub mod logger;

/// Full run: stage, generate, clean up and install
pub mod orchestrator;

/// Selection of template paths to stage
pub mod paths;

/// External templating engine and install pipeline
pub mod runner;

/// Isolated cache staging
pub mod stager;

/// Template shape validation
pub mod validator;
