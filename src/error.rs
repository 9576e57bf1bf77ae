//! Error handling for cookiecutter-runner.
//! Defines the error kinds surfaced by staging, generation and installation.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while staging a template or driving the external tools.
///
/// None of these are retried internally: every variant stops the current
/// operation and is handed back to the caller.
#[derive(Error, Debug)]
pub enum Error {
    /// A referenced directory does not exist.
    #[error("Path does not exist: '{path}'.")]
    NotFound { path: PathBuf },

    /// The template root is missing its manifest or has not exactly one
    /// variable-named directory.
    #[error("Invalid template directory '{template_dir}': {reason}.")]
    InvalidTemplate { template_dir: PathBuf, reason: String },

    /// The ignore file could not be read or contains a malformed rule.
    #[error("Ignore rules in '{ignore_file}' could not be loaded: {message}.")]
    IgnoreRuleError { ignore_file: PathBuf, message: String },

    /// A single path could not be copied into the cache.
    #[error("Failed to copy '{source_path}' to '{dest_path}': {source}.")]
    CopyFailure {
        source_path: PathBuf,
        dest_path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A path could not be rebased because it does not live under its root.
    #[error("Path '{path}' is not located under '{root}'.")]
    PathOutsideRoot { path: PathBuf, root: PathBuf },

    /// The templating engine or the install pipeline did not succeed.
    #[error("Command '{command}' failed ({}): {output}", describe_code(.code))]
    ExternalToolFailure { command: String, code: Option<i32>, output: String },

    /// Represents errors that occur during file system operations
    #[error("IO error: {0}.")]
    IoError(#[from] io::Error),

    /// Represents errors raised while walking a directory tree
    #[error("Directory walk error: {0}.")]
    WalkError(#[from] walkdir::Error),
}

fn describe_code(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {code}"),
        None => "terminated without exit code".to_string(),
    }
}

/// Convenience type alias for Results with [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Default error handler that prints the error and exits the program.
///
/// # Behavior
/// Logs the error, prints it to stderr and exits with status code 1
pub fn default_error_handler(err: Error) {
    log::error!("{err}");
    eprintln!("{err}");
    std::process::exit(1);
}
