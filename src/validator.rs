//! Template shape validation.

use log::debug;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::layout::TemplateLayout;

/// Returns the direct child directories of `template_dir` whose names carry
/// the variable placeholder prefix, sorted by name.
pub fn variable_dirs<P: AsRef<Path>>(
    template_dir: P,
    layout: &TemplateLayout,
) -> Result<Vec<PathBuf>> {
    let template_dir = template_dir.as_ref();
    let mut dirs = Vec::new();
    for entry in fs::read_dir(template_dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        if entry.file_name().to_str().is_some_and(|name| layout.is_variable_name(name)) {
            dirs.push(entry.path());
        }
    }
    dirs.sort();
    Ok(dirs)
}

/// Checks that a directory is shaped like a template.
///
/// # Returns
/// * `Ok(true)` if the manifest exists and exactly one variable-named directory is present
/// * `Ok(false)` otherwise
///
/// # Errors
/// * `Error::NotFound` if `template_dir` does not exist
pub fn is_valid_template<P: AsRef<Path>>(template_dir: P, layout: &TemplateLayout) -> Result<bool> {
    Ok(check_template(template_dir, layout)?.is_none())
}

/// Same as [`is_valid_template`] but explains why a template is rejected.
///
/// Returns `Ok(None)` for a valid template and `Ok(Some(reason))` otherwise.
pub fn check_template<P: AsRef<Path>>(
    template_dir: P,
    layout: &TemplateLayout,
) -> Result<Option<String>> {
    let template_dir = template_dir.as_ref();
    if !template_dir.exists() {
        return Err(Error::NotFound { path: template_dir.to_path_buf() });
    }
    if !template_dir.is_dir() {
        return Ok(Some("not a directory".to_string()));
    }

    if !layout.manifest_path(template_dir).is_file() {
        debug!("'{}' has no {}", template_dir.display(), layout.manifest);
        return Ok(Some(format!("missing {}", layout.manifest)));
    }

    let dirs = variable_dirs(template_dir, layout)?;
    if dirs.len() != 1 {
        debug!(
            "'{}' has {} directories starting with '{}'",
            template_dir.display(),
            dirs.len(),
            layout.variable_prefix
        );
        return Ok(Some(format!(
            "expected exactly one directory starting with '{}', found {}",
            layout.variable_prefix,
            dirs.len()
        )));
    }

    Ok(None)
}

/// Validates the template and returns its single variable-named directory.
///
/// # Errors
/// * `Error::NotFound` if `template_dir` does not exist
/// * `Error::InvalidTemplate` if the template shape is wrong
pub fn project_dir<P: AsRef<Path>>(template_dir: P, layout: &TemplateLayout) -> Result<PathBuf> {
    let template_dir = template_dir.as_ref();
    if let Some(reason) = check_template(template_dir, layout)? {
        return Err(Error::InvalidTemplate { template_dir: template_dir.to_path_buf(), reason });
    }
    variable_dirs(template_dir, layout)?.pop().ok_or_else(|| Error::InvalidTemplate {
        template_dir: template_dir.to_path_buf(),
        reason: "variable-named directory disappeared".to_string(),
    })
}
