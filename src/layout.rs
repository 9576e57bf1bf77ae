//! Names and markers that describe how a template is laid out on disk.

use std::path::{Path, PathBuf};

use crate::constants::{HOOKS_DIR, IGNORE_FILE, MANIFEST_FILE, VARIABLE_PREFIX};

/// Describes the on-disk shape of a template.
///
/// The defaults describe a cookiecutter template. Every core operation receives
/// the layout explicitly so nothing depends on process-wide settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateLayout {
    /// File at the template root declaring the template variables
    pub manifest: String,
    /// Prefix of the single variable-named project directory
    pub variable_prefix: String,
    /// Optional directory of generation hooks at the template root
    pub hooks_dir: String,
    /// Ignore file located at the root of the project directory
    pub ignore_file: String,
}

impl Default for TemplateLayout {
    fn default() -> Self {
        Self {
            manifest: MANIFEST_FILE.to_string(),
            variable_prefix: VARIABLE_PREFIX.to_string(),
            hooks_dir: HOOKS_DIR.to_string(),
            ignore_file: IGNORE_FILE.to_string(),
        }
    }
}

impl TemplateLayout {
    /// Returns a layout that only differs from the default by its placeholder prefix.
    pub fn with_variable_prefix<S: Into<String>>(prefix: S) -> Self {
        Self { variable_prefix: prefix.into(), ..Self::default() }
    }

    pub fn manifest_path<P: AsRef<Path>>(&self, template_dir: P) -> PathBuf {
        template_dir.as_ref().join(&self.manifest)
    }

    pub fn hooks_path<P: AsRef<Path>>(&self, template_dir: P) -> PathBuf {
        template_dir.as_ref().join(&self.hooks_dir)
    }

    pub fn ignore_path<P: AsRef<Path>>(&self, project_dir: P) -> PathBuf {
        project_dir.as_ref().join(&self.ignore_file)
    }

    /// Whether a directory name carries the variable placeholder prefix.
    pub fn is_variable_name(&self, name: &str) -> bool {
        name.starts_with(&self.variable_prefix)
    }
}
