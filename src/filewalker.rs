use crate::error::{AppError, Result};
use globset::{Glob, GlobMatcher};
use ignore::{DirEntry, WalkBuilder};
use log::{debug, warn};
use std::path::{Path, PathBuf};

/// Solution files embedded in the export.
pub const SOLUTION_GLOB: &str = "**/*.sln";
/// Project files embedded in the export.
pub const PROJECT_GLOB: &str = "**/*.csproj";
/// Dependency trees never searched.
pub const DEPENDENCY_EXCLUDE_GLOB: &str = "**/node_modules/**";

/// Finds every file under `root` whose root-relative path matches `pattern`.
///
/// Ignore files are not consulted: a solution file listed in `.gitignore` is
/// still part of the workspace. Only `.git` and anything matching
/// [`DEPENDENCY_EXCLUDE_GLOB`] is skipped. Returned paths are absolute when
/// `root` is, in file-name order.
pub fn find_by_pattern(root: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
    let matcher = compile(pattern)?;
    let exclude = compile(DEPENDENCY_EXCLUDE_GLOB)?;

    let mut builder = WalkBuilder::new(root);
    builder
        .standard_filters(false)
        .sort_by_file_name(|a, b| a.cmp(b));

    let walk_root = root.to_path_buf();
    builder.filter_entry(move |e| !is_excluded_dir(e, &walk_root, &exclude));

    let mut found = Vec::new();

    for result in builder.build() {
        match result {
            Ok(entry) => {
                if !entry.file_type().is_some_and(|t| t.is_file()) {
                    continue;
                }
                let rel = entry.path().strip_prefix(root).unwrap_or(entry.path());
                if matcher.is_match(rel) {
                    debug!("Matched {} for {}", rel.display(), pattern);
                    found.push(entry.into_path());
                }
            }
            Err(err) => {
                warn!("Error walking path: {err}");
            }
        }
    }

    Ok(found)
}

fn compile(pattern: &str) -> Result<GlobMatcher> {
    Glob::new(pattern)
        .map(|g| g.compile_matcher())
        .map_err(|source| AppError::Pattern {
            pattern: pattern.to_string(),
            source,
        })
}

/// `.git` and dependency directories are pruned before descending into them.
fn is_excluded_dir(entry: &DirEntry, root: &Path, exclude: &GlobMatcher) -> bool {
    if !entry.file_type().is_some_and(|t| t.is_dir()) {
        return false;
    }
    if entry.file_name() == ".git" {
        return true;
    }
    let rel = entry.path().strip_prefix(root).unwrap_or(entry.path());
    // The exclude glob matches entries *inside* the directory, so test a child path.
    exclude.is_match(rel.join("_"))
}
