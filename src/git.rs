//! Tracked-file listing via the `git` executable.
//!
//! The list comes straight from `git ls-files` run inside the workspace root,
//! so it reflects the index (staged and committed paths) rather than the
//! working tree. Untracked and ignored files never appear.
//!
//! # Example
//!
//! ```rust,ignore
//! use ctx2md::git::list_tracked_files;
//!
//! let tracked = list_tracked_files(std::path::Path::new(".")).await?;
//! for path in &tracked {
//!     println!("- {path}");
//! }
//! ```

use crate::error::{AppError, Result};
use log::{debug, info};
use std::path::Path;
use tokio::process::Command;

/// Runs `git ls-files` in `root` and returns the tracked paths in the order git
/// reports them.
///
/// # Errors
///
/// Returns [`AppError::VcsQuery`] if:
/// - `git` cannot be started (not installed, not on `PATH`)
/// - the process exits non-zero, e.g. because `root` is not inside a repository
pub async fn list_tracked_files(root: &Path) -> Result<Vec<String>> {
    info!("Listing tracked files in {}", root.display());

    let output = Command::new("git")
        .arg("ls-files")
        .current_dir(root)
        .output()
        .await
        .map_err(|err| AppError::VcsQuery {
            root: root.to_path_buf(),
            reason: format!("could not run git: {err}"),
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let reason = match stderr.trim() {
            "" => format!("git ls-files exited with {}", output.status),
            msg => msg.to_string(),
        };
        return Err(AppError::VcsQuery {
            root: root.to_path_buf(),
            reason,
        });
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let tracked = parse_ls_files(&stdout);
    debug!("git reported {} tracked files", tracked.len());

    Ok(tracked)
}

/// Splits `git ls-files` output into trimmed, non-empty lines.
pub fn parse_ls_files(output: &str) -> Vec<String> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
