//! Version-control ignore rules for the template project directory.
//! This module evaluates .gitignore files in-process, so staging never needs a
//! `git` executable, and lists the files that version control would keep.

use globset::{GlobBuilder, GlobMatcher};
use log::debug;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

use crate::error::{Error, Result};

/// A single compiled line of an ignore file.
#[derive(Debug, Clone)]
struct IgnoreRule {
    pattern: String,
    matcher: GlobMatcher,
    negated: bool,
    dir_only: bool,
}

/// Pattern text of a rule before compilation.
#[derive(Debug, PartialEq, Eq)]
struct RawRule {
    glob: String,
    negated: bool,
    dir_only: bool,
}

/// Ordered set of ignore rules anchored at the directory holding the ignore file.
#[derive(Debug, Clone)]
pub struct IgnoreRules {
    root: PathBuf,
    rules: Vec<IgnoreRule>,
}

impl IgnoreRules {
    /// Rules that ignore nothing.
    pub fn empty<P: AsRef<Path>>(root: P) -> Self {
        Self { root: root.as_ref().to_path_buf(), rules: Vec::new() }
    }

    /// Loads rules from an ignore file; anchored patterns are resolved against
    /// the directory that contains the file.
    ///
    /// # Errors
    /// * `Error::IgnoreRuleError` if the file cannot be read or holds an invalid pattern
    pub fn from_file<P: AsRef<Path>>(ignore_file: P) -> Result<Self> {
        let ignore_file = ignore_file.as_ref();
        let rule_error = |message: String| Error::IgnoreRuleError {
            ignore_file: ignore_file.to_path_buf(),
            message,
        };

        if !ignore_file.is_file() {
            return Err(rule_error("not a regular file".to_string()));
        }
        let contents = fs::read_to_string(ignore_file).map_err(|e| rule_error(e.to_string()))?;
        let canonical = fs::canonicalize(ignore_file).map_err(|e| rule_error(e.to_string()))?;
        let root = canonical.parent().map(Path::to_path_buf).unwrap_or(canonical);

        Self::parse(root, &contents).map_err(|e| match e {
            Error::IgnoreRuleError { message, .. } => rule_error(message),
            other => other,
        })
    }

    /// Compiles the rules held in `contents`, anchored at `root`.
    pub fn parse<P: AsRef<Path>>(root: P, contents: &str) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        let mut rules = Vec::new();
        for line in contents.lines() {
            let Some(raw) = parse_line(line) else {
                continue;
            };
            let matcher = GlobBuilder::new(&raw.glob)
                .literal_separator(true)
                .backslash_escape(true)
                .build()
                .map_err(|e| Error::IgnoreRuleError {
                    ignore_file: root.clone(),
                    message: format!("invalid pattern '{}': {}", line.trim(), e),
                })?
                .compile_matcher();
            rules.push(IgnoreRule {
                pattern: line.trim().to_string(),
                matcher,
                negated: raw.negated,
                dir_only: raw.dir_only,
            });
        }
        debug!("Loaded {} ignore rules anchored at '{}'", rules.len(), root.display());
        Ok(Self { root, rules })
    }

    /// Number of rules, blank lines and comments excluded.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether the rules ignore nothing at all.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Checks an absolute path against the rules. The last matching rule wins;
    /// paths outside the rules root are never ignored.
    ///
    /// Only the path itself is evaluated. Exclusion of a parent directory is
    /// applied by [`resolve_not_ignored`], which prunes ignored directories.
    pub fn is_ignored<P: AsRef<Path>>(&self, path: P, is_dir: bool) -> bool {
        let Ok(relative) = path.as_ref().strip_prefix(&self.root) else {
            return false;
        };
        if relative.as_os_str().is_empty() {
            return false;
        }
        for rule in self.rules.iter().rev() {
            if rule.dir_only && !is_dir {
                continue;
            }
            if rule.matcher.is_match(relative) {
                debug!(
                    "'{}' {} by '{}'",
                    relative.display(),
                    if rule.negated { "re-included" } else { "ignored" },
                    rule.pattern
                );
                return !rule.negated;
            }
        }
        false
    }

    fn is_ignored_entry(&self, entry: &DirEntry) -> bool {
        self.is_ignored(entry.path(), entry.file_type().is_dir())
    }
}

/// Drops unescaped trailing whitespace.
fn trim_trailing_whitespace(line: &str) -> &str {
    let trimmed = line.trim_end_matches([' ', '\t', '\r']);
    if trimmed.ends_with('\\') && trimmed.len() < line.len() {
        &line[..trimmed.len() + 1]
    } else {
        trimmed
    }
}

/// Escapes `{`, `}` and `,` so globset does not read them as alternation,
/// which ignore files do not have. Escaped characters and bracket expressions
/// are left as they are.
fn escape_alternation(pattern: &str) -> String {
    let mut escaped = String::with_capacity(pattern.len());
    let mut chars = pattern.chars();
    let mut in_class = false;
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                escaped.push(c);
                if let Some(next) = chars.next() {
                    escaped.push(next);
                }
            }
            '[' if !in_class => {
                in_class = true;
                escaped.push(c);
            }
            ']' if in_class => {
                in_class = false;
                escaped.push(c);
            }
            '{' | '}' | ',' if !in_class => {
                escaped.push('\\');
                escaped.push(c);
            }
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Turns one line of an ignore file into a glob, or `None` for blanks and comments.
fn parse_line(line: &str) -> Option<RawRule> {
    let line = trim_trailing_whitespace(line);
    if line.is_empty() || line.starts_with('#') {
        return None;
    }

    let (negated, rest) = match line.strip_prefix('!') {
        Some(rest) => (true, rest),
        None => (false, line),
    };
    let rest = if rest.starts_with("\\#") || rest.starts_with("\\!") { &rest[1..] } else { rest };
    let (dir_only, rest) = match rest.strip_suffix('/') {
        Some(rest) => (true, rest),
        None => (false, rest),
    };

    // A separator anywhere but the end anchors the pattern to the ignore file.
    let anchored = rest.contains('/');
    let rest = rest.strip_prefix('/').unwrap_or(rest);
    if rest.is_empty() {
        return None;
    }

    let rest = escape_alternation(rest);
    let glob = if anchored { rest } else { format!("**/{rest}") };
    Some(RawRule { glob, negated, dir_only })
}

/// Lists every file under `project_dir` that version control would not ignore.
///
/// # Arguments
/// * `project_dir` - Directory to walk recursively
/// * `ignore_file` - Ignore file to apply; if it does not exist nothing is excluded
///
/// # Returns
/// * `Result<BTreeSet<PathBuf>>` - Canonical absolute paths of non-directory entries
///
/// # Notes
/// - Symlinks are not followed and are listed like files
/// - An ignored directory is pruned with everything beneath it, so a negated
///   rule cannot re-include a file whose parent directory is excluded
///
/// # Errors
/// * `Error::NotFound` if `project_dir` does not exist
/// * `Error::IgnoreRuleError` if the ignore file cannot be loaded
pub fn resolve_not_ignored<P: AsRef<Path>, Q: AsRef<Path>>(
    project_dir: P,
    ignore_file: Q,
) -> Result<BTreeSet<PathBuf>> {
    let project_dir = project_dir.as_ref();
    if !project_dir.is_dir() {
        return Err(Error::NotFound { path: project_dir.to_path_buf() });
    }
    let project_dir = fs::canonicalize(project_dir)?;

    let ignore_file = ignore_file.as_ref();
    let rules = if ignore_file.exists() {
        IgnoreRules::from_file(ignore_file)?
    } else {
        debug!("{} does not exist, nothing is ignored", ignore_file.display());
        IgnoreRules::empty(&project_dir)
    };

    let mut paths = BTreeSet::new();
    let walker = WalkDir::new(&project_dir)
        .min_depth(1)
        .into_iter()
        .filter_entry(|entry| !rules.is_ignored_entry(entry));
    for entry in walker {
        let entry = entry?;
        if entry.file_type().is_dir() {
            continue;
        }
        paths.insert(entry.into_path());
    }

    debug!("{} paths under '{}' are not ignored", paths.len(), project_dir.display());
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(glob: &str, negated: bool, dir_only: bool) -> Option<RawRule> {
        Some(RawRule { glob: glob.to_string(), negated, dir_only })
    }

    #[test]
    fn test_parse_line_skips_blanks_and_comments() {
        assert_eq!(parse_line(""), None);
        assert_eq!(parse_line("   "), None);
        assert_eq!(parse_line("# comment"), None);
        assert_eq!(parse_line("/"), None);
        assert_eq!(parse_line("!"), None);
    }

    #[test]
    fn test_parse_line_shapes() {
        assert_eq!(parse_line("*.pyc"), raw("**/*.pyc", false, false));
        assert_eq!(parse_line("!keep.log"), raw("**/keep.log", true, false));
        assert_eq!(parse_line("build/"), raw("**/build", false, true));
        assert_eq!(parse_line("/dist"), raw("dist", false, false));
        assert_eq!(parse_line("docs/*.md"), raw("docs/*.md", false, false));
        assert_eq!(parse_line("**/cache/"), raw("**/cache", false, true));
    }

    #[test]
    fn test_parse_line_escapes_and_whitespace() {
        assert_eq!(parse_line("\\#notes"), raw("**/#notes", false, false));
        assert_eq!(parse_line("\\!bang"), raw("**/!bang", false, false));
        assert_eq!(parse_line("trailing.txt   "), raw("**/trailing.txt", false, false));
        assert_eq!(parse_line("space\\ "), raw("**/space\\ ", false, false));
    }

    #[test]
    fn test_last_rule_wins() {
        let rules = IgnoreRules::parse("/p", "*.log\n!keep.log\n").unwrap();
        assert_eq!(rules.len(), 2);
        assert!(rules.is_ignored("/p/build.log", false));
        assert!(!rules.is_ignored("/p/keep.log", false));
        assert!(!rules.is_ignored("/p/src/keep.log", false));

        let rules = IgnoreRules::parse("/p", "!keep.log\n*.log\n").unwrap();
        assert!(rules.is_ignored("/p/keep.log", false));
    }

    #[test]
    fn test_dir_only_and_anchoring() {
        let rules = IgnoreRules::parse("/p", "out/\n/top.txt\nsrc/*.gen\n").unwrap();
        assert!(rules.is_ignored("/p/out", true));
        assert!(rules.is_ignored("/p/nested/out", true));
        assert!(!rules.is_ignored("/p/out", false));

        assert!(rules.is_ignored("/p/top.txt", false));
        assert!(!rules.is_ignored("/p/nested/top.txt", false));

        assert!(rules.is_ignored("/p/src/a.gen", false));
        assert!(!rules.is_ignored("/p/src/deep/a.gen", false));
        assert!(!rules.is_ignored("/p/other/src/a.gen", false));
    }

    #[test]
    fn test_paths_outside_root_are_kept() {
        let rules = IgnoreRules::parse("/p", "*").unwrap();
        assert!(rules.is_ignored("/p/anything", false));
        assert!(!rules.is_ignored("/elsewhere/anything", false));
        assert!(!rules.is_ignored("/p", true));
    }

    #[test]
    fn test_braces_are_literal() {
        assert_eq!(parse_line("{a,b}.txt"), raw("**/\\{a\\,b\\}.txt", false, false));
        assert_eq!(parse_line("[{}].txt"), raw("**/[{}].txt", false, false));
        assert_eq!(parse_line("\\{x"), raw("**/\\{x", false, false));

        let rules = IgnoreRules::parse("/p", "{a,b}.txt\n{{cookiecutter.name}}/\n").unwrap();
        assert!(!rules.is_ignored("/p/a.txt", false));
        assert!(!rules.is_ignored("/p/b.txt", false));
        assert!(rules.is_ignored("/p/{a,b}.txt", false));
        assert!(rules.is_ignored("/p/src/{{cookiecutter.name}}", true));
        assert!(!rules.is_ignored("/p/src/name", true));
    }

    #[test]
    fn test_invalid_pattern() {
        let err = IgnoreRules::parse("/p", "src/[a-").unwrap_err();
        assert!(matches!(err, Error::IgnoreRuleError { .. }));
    }
}
