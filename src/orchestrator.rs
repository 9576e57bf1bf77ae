//! Drives a full run: stage the template, expand it, discard the cache and
//! install every generated project.

use log::{info, warn};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::layout::TemplateLayout;
use crate::runner::{Generator, Installer};
use crate::stager::stage;

/// Inputs of a run.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub template_dir: PathBuf,
    pub output_dir: PathBuf,
    pub cache_root: PathBuf,
    pub layout: TemplateLayout,
    /// Stop once the cache is populated and keep it.
    pub stage_only: bool,
    /// Generate projects without running the install pipeline.
    pub skip_install: bool,
}

/// What a run produced.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct RunReport {
    /// Cache directory that was staged; removed again unless staging only
    pub staged_dir: PathBuf,
    /// Generated project directories, in the order they were installed
    pub projects: Vec<PathBuf>,
}

/// Direct child directories of the output directory, sorted by name.
pub fn generated_projects<P: AsRef<Path>>(output_dir: P) -> Result<Vec<PathBuf>> {
    let output_dir = output_dir.as_ref();
    if !output_dir.is_dir() {
        return Ok(Vec::new());
    }
    let mut projects = Vec::new();
    for entry in fs::read_dir(output_dir)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            projects.push(entry.path());
        }
    }
    projects.sort();
    Ok(projects)
}

/// Main application flow.
///
/// # Flow
/// 1. Stages the template into the cache root
/// 2. Expands the staged copy into the output directory
/// 3. Removes the staged copy, whether or not expansion succeeded
/// 4. Installs each generated project, stopping at the first failure
pub fn run(
    options: &RunOptions,
    generator: &dyn Generator,
    installer: &dyn Installer,
) -> Result<RunReport> {
    let staged_dir = stage(&options.template_dir, &options.cache_root, &options.layout)?;
    let mut report = RunReport { staged_dir, projects: Vec::new() };
    if options.stage_only {
        return Ok(report);
    }

    let generated = generator.generate(&report.staged_dir, &options.output_dir);
    info!("Removing isolated template directory cache at {}", report.staged_dir.display());
    if let Err(e) = fs::remove_dir_all(&report.staged_dir) {
        warn!("Could not remove {}: {}", report.staged_dir.display(), e);
    }
    generated?;

    report.projects = generated_projects(&options.output_dir)?;
    if options.skip_install {
        return Ok(report);
    }
    for project in &report.projects {
        info!("Installing and testing {}", project.display());
        installer.install(project)?;
    }
    Ok(report)
}
