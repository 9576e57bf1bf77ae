//! Selection of the template paths that belong in a staged copy.

use indexmap::IndexSet;
use log::{debug, info};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::error::{Error, Result};
use crate::ignore::resolve_not_ignored;
use crate::layout::TemplateLayout;
use crate::validator::project_dir;

/// Ordered, duplicate-free set of absolute source paths.
pub type PathSet = IndexSet<PathBuf>;

/// Maps `f_path` from `cur_dir` onto `dest_dir`, keeping its relative position.
///
/// `rebase_path("/root/a/b/c", "/root/a", "/root/a/d")` is `/root/a/d/b/c`.
///
/// # Errors
/// * `Error::PathOutsideRoot` if `f_path` is not located under `cur_dir`
pub fn rebase_path<P, C, D>(f_path: P, cur_dir: C, dest_dir: D) -> Result<PathBuf>
where
    P: AsRef<Path>,
    C: AsRef<Path>,
    D: AsRef<Path>,
{
    let f_path = f_path.as_ref();
    let cur_dir = cur_dir.as_ref();
    let relative = f_path.strip_prefix(cur_dir).map_err(|_| Error::PathOutsideRoot {
        path: f_path.to_path_buf(),
        root: cur_dir.to_path_buf(),
    })?;
    Ok(dest_dir.as_ref().join(relative))
}

/// Collects every file below the hooks directory. Ignore rules never apply here.
fn hook_paths(hooks_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for entry in WalkDir::new(hooks_dir).min_depth(1).sort_by_file_name() {
        let entry = entry?;
        if entry.file_type().is_dir() {
            continue;
        }
        paths.push(entry.into_path());
    }
    Ok(paths)
}

/// Builds the set of paths to stage from a template directory.
///
/// # Returns
/// * `Result<PathSet>` - The manifest, then hook files, then the project files
///   that survive the project's ignore file; all absolute and canonical
///
/// # Errors
/// * `Error::NotFound` if `template_dir` does not exist
/// * `Error::InvalidTemplate` if the template is not shaped like a template
/// * `Error::IgnoreRuleError` if the project's ignore file cannot be loaded
pub fn build_path_set<P: AsRef<Path>>(template_dir: P, layout: &TemplateLayout) -> Result<PathSet> {
    let template_dir = template_dir.as_ref();
    let project_dir = project_dir(template_dir, layout)?;
    let template_dir = fs::canonicalize(template_dir)?;
    let project_dir = fs::canonicalize(project_dir)?;

    let mut paths = PathSet::new();
    paths.insert(layout.manifest_path(&template_dir));

    let hooks_dir = layout.hooks_path(&template_dir);
    if hooks_dir.is_dir() {
        let hooks = hook_paths(&hooks_dir)?;
        debug!("Loaded {} hook paths from '{}'", hooks.len(), hooks_dir.display());
        paths.extend(hooks);
    }

    let ignore_file = layout.ignore_path(&project_dir);
    let not_ignored: Vec<PathBuf> = resolve_not_ignored(&project_dir, &ignore_file)?
        .into_iter()
        .filter(|path| path.starts_with(&project_dir))
        .collect();
    info!("Loaded {} paths not ignored by {}", not_ignored.len(), layout.ignore_file);
    paths.extend(not_ignored);

    Ok(paths)
}
