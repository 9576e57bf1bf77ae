//! Isolation of a template into a freshly rebuilt cache directory.
//!
//! Staging always deletes the previous cache for a template before copying,
//! so a failed or interrupted run is erased by the next one. There is no
//! rollback: if a copy fails the cache is left partially populated and must
//! be treated as unusable.

use log::{debug, info};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::error::{Error, Result};
use crate::layout::TemplateLayout;
use crate::paths::{build_path_set, rebase_path};

/// Returns the cache directory used for `template_dir` below `cache_root`.
///
/// The name is the template directory's base name, so two templates sharing a
/// base name share a cache directory.
pub fn cache_dir_for<P: AsRef<Path>, C: AsRef<Path>>(template_dir: P, cache_root: C) -> Result<PathBuf> {
    let template_dir = template_dir.as_ref();
    let name = template_dir.file_name().ok_or_else(|| Error::InvalidTemplate {
        template_dir: template_dir.to_path_buf(),
        reason: "template path has no base name".to_string(),
    })?;
    Ok(absolute(cache_root.as_ref())?.join(name))
}

fn absolute(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}

/// Whether wiping `cache_dir` would also wipe the (canonical) `template_dir`.
fn overlaps_template(template_dir: &Path, cache_dir: &Path) -> bool {
    match fs::canonicalize(cache_dir) {
        Ok(cache_dir) => template_dir.starts_with(cache_dir),
        Err(_) => template_dir.starts_with(cache_dir),
    }
}

/// Removes whatever currently occupies `path`, if anything.
fn remove_existing(path: &Path) -> io::Result<()> {
    match fs::symlink_metadata(path) {
        Ok(metadata) if metadata.is_dir() => fs::remove_dir_all(path),
        Ok(_) => fs::remove_file(path),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}

#[cfg(unix)]
fn copy_symlink(source: &Path, dest: &Path) -> io::Result<()> {
    let target = fs::read_link(source)?;
    std::os::unix::fs::symlink(target, dest)
}

#[cfg(not(unix))]
fn copy_symlink(source: &Path, dest: &Path) -> io::Result<()> {
    fs::copy(source, dest).map(|_| ())
}

/// Copies one non-directory entry, replacing anything already at `dest`.
/// `fs::copy` carries the permission bits over.
fn copy_entry(source: &Path, dest: &Path, is_symlink: bool) -> Result<()> {
    let copy_error = |source_path: &Path, e: io::Error| Error::CopyFailure {
        source_path: source_path.to_path_buf(),
        dest_path: dest.to_path_buf(),
        source: e,
    };

    remove_existing(dest).map_err(|e| copy_error(source, e))?;
    if is_symlink {
        copy_symlink(source, dest).map_err(|e| copy_error(source, e))
    } else {
        fs::copy(source, dest).map(|_| ()).map_err(|e| copy_error(source, e))
    }
}

/// Copies `source` to `dest`, recursively for directories, creating the parent
/// directories of `dest` first.
pub fn copy_path<P: AsRef<Path>, Q: AsRef<Path>>(source: P, dest: Q) -> Result<()> {
    let source = source.as_ref();
    let dest = dest.as_ref();
    let copy_error = |e: io::Error| Error::CopyFailure {
        source_path: source.to_path_buf(),
        dest_path: dest.to_path_buf(),
        source: e,
    };

    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent).map_err(copy_error)?;
    }
    let metadata = fs::symlink_metadata(source).map_err(copy_error)?;
    if !metadata.is_dir() {
        return copy_entry(source, dest, metadata.file_type().is_symlink());
    }

    for entry in WalkDir::new(source) {
        let entry = entry?;
        let target = rebase_path(entry.path(), source, dest)?;
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target).map_err(|e| Error::CopyFailure {
                source_path: entry.path().to_path_buf(),
                dest_path: target.clone(),
                source: e,
            })?;
        } else {
            copy_entry(entry.path(), &target, entry.path_is_symlink())?;
        }
    }
    Ok(())
}

/// Stages `template_dir` into `cache_root/<template name>`.
///
/// # Arguments
/// * `template_dir` - Template root; read only
/// * `cache_root` - Directory holding the caches of all templates
/// * `layout` - Template layout description
///
/// # Returns
/// * `Result<PathBuf>` - The populated cache directory
///
/// # Flow
/// 1. Deletes any existing cache for this template
/// 2. Creates the cache directory
/// 3. Builds the path set of the template
/// 4. Copies every selected path to its rebased location in the cache
///
/// # Errors
/// * `Error::NotFound` if `template_dir` does not exist
/// * `Error::InvalidTemplate` if the cache directory is or contains the template,
///   before anything is deleted
/// * `Error::InvalidTemplate`, `Error::IgnoreRuleError` from path selection
/// * `Error::CopyFailure` on the first path that cannot be copied
pub fn stage<P: AsRef<Path>, C: AsRef<Path>>(
    template_dir: P,
    cache_root: C,
    layout: &TemplateLayout,
) -> Result<PathBuf> {
    let template_dir = template_dir.as_ref();
    if !template_dir.exists() {
        return Err(Error::NotFound { path: template_dir.to_path_buf() });
    }
    let template_dir = fs::canonicalize(template_dir)?;
    let cache_dir = cache_dir_for(&template_dir, cache_root)?;
    if overlaps_template(&template_dir, &cache_dir) {
        return Err(Error::InvalidTemplate {
            template_dir,
            reason: format!("cache directory '{}' overlaps the template", cache_dir.display()),
        });
    }

    if fs::symlink_metadata(&cache_dir).is_ok() {
        info!("Removing existing cache {}", cache_dir.display());
        remove_existing(&cache_dir)?;
    }
    if let Some(parent) = cache_dir.parent() {
        fs::create_dir_all(parent)?;
    }
    // Fails if something recreated the cache since the removal above.
    fs::create_dir(&cache_dir)?;

    let paths = build_path_set(&template_dir, layout)?;
    info!("Loaded {} valid paths", paths.len());

    for path in &paths {
        let dest = rebase_path(path, &template_dir, &cache_dir)?;
        debug!("Copying '{}' to '{}'", path.display(), dest.display());
        copy_path(path, &dest)?;
    }

    info!("Staged '{}' into '{}'", template_dir.display(), cache_dir.display());
    Ok(cache_dir)
}
