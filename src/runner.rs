//! External collaborators: the templating engine that expands a staged
//! template and the build tool that installs and checks a generated project.

use indexmap::IndexMap;
use log::{debug, error, info};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::constants::VCS_DIR;
use crate::error::{Error, Result};

/// Expands a staged template into an output directory.
pub trait Generator {
    fn generate(&self, template_dir: &Path, output_dir: &Path) -> Result<()>;
}

/// Installs, lints and tests a generated project.
pub trait Installer {
    fn install(&self, project_dir: &Path) -> Result<()>;
}

fn describe(command: &Command) -> String {
    std::iter::once(command.get_program())
        .chain(command.get_args())
        .map(|part| part.to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Runs a command to completion, turning a spawn failure or non-zero exit into
/// `Error::ExternalToolFailure` carrying the captured stdout and stderr.
pub fn run_command(command: &mut Command) -> Result<String> {
    let description = describe(command);
    debug!("Running '{description}'");

    let output = command.output().map_err(|e| Error::ExternalToolFailure {
        command: description.clone(),
        code: None,
        output: e.to_string(),
    })?;

    let mut captured = String::from_utf8_lossy(&output.stdout).into_owned();
    captured.push_str(&String::from_utf8_lossy(&output.stderr));

    if !output.status.success() {
        error!("{}", captured);
        return Err(Error::ExternalToolFailure {
            command: description,
            code: output.status.code(),
            output: captured,
        });
    }
    Ok(captured)
}

fn absolute(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}

/// Runs the `cookiecutter` command line without prompting.
#[derive(Debug, Clone)]
pub struct CookiecutterGenerator {
    program: String,
    extra_context: IndexMap<String, String>,
}

impl CookiecutterGenerator {
    pub fn new(extra_context: IndexMap<String, String>) -> Self {
        Self { program: "cookiecutter".to_string(), extra_context }
    }

    /// Uses another executable that accepts the cookiecutter arguments.
    pub fn with_program<S: Into<String>>(mut self, program: S) -> Self {
        self.program = program.into();
        self
    }

    /// Builds the command for `template_dir` and `output_dir`, both made absolute.
    pub fn command(&self, template_dir: &Path, output_dir: &Path) -> Result<Command> {
        let mut command = Command::new(&self.program);
        command
            .arg(absolute(template_dir)?)
            .arg("--no-input")
            .arg("--overwrite-if-exists")
            .arg("--output-dir")
            .arg(absolute(output_dir)?);
        for (key, value) in &self.extra_context {
            command.arg(format!("{key}={value}"));
        }
        Ok(command)
    }
}

impl Default for CookiecutterGenerator {
    fn default() -> Self {
        CookiecutterGenerator::new(IndexMap::new())
    }
}

impl Generator for CookiecutterGenerator {
    fn generate(&self, template_dir: &Path, output_dir: &Path) -> Result<()> {
        info!("Creating project based on template: {}", template_dir.display());
        run_command(&mut self.command(template_dir, output_dir)?)?;
        info!("Created project at: {}", output_dir.display());
        Ok(())
    }
}

/// Runs the install, lint, check and test targets of a project in one build
/// tool invocation, then drops the project's version control metadata.
#[derive(Debug, Clone)]
pub struct MakeInstaller {
    program: String,
    targets: Vec<String>,
}

impl MakeInstaller {
    pub fn new<S: Into<String>>(program: S, targets: Vec<String>) -> Self {
        Self { program: program.into(), targets }
    }

    /// Keeps the default targets but runs another executable.
    pub fn with_program<S: Into<String>>(mut self, program: S) -> Self {
        self.program = program.into();
        self
    }
}

impl Default for MakeInstaller {
    fn default() -> Self {
        MakeInstaller::new(
            "make",
            ["install", "lint", "check", "test"].iter().map(|t| t.to_string()).collect(),
        )
    }
}

impl Installer for MakeInstaller {
    fn install(&self, project_dir: &Path) -> Result<()> {
        if !project_dir.is_dir() {
            return Err(Error::NotFound { path: project_dir.to_path_buf() });
        }
        info!("Installing project {}", project_dir.display());

        let mut command = Command::new(&self.program);
        command.args(&self.targets).current_dir(project_dir);
        run_command(&mut command)?;

        let vcs_dir = project_dir.join(VCS_DIR);
        if vcs_dir.is_dir() {
            debug!("Removing {}", vcs_dir.display());
            fs::remove_dir_all(&vcs_dir)?;
        }
        info!("Finished installing project {}", project_dir.display());
        Ok(())
    }
}
