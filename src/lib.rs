//! # ctx2md Library
//!
//! This crate can be used to:
//!
//! - Bundle a repository's tracked file list, its `.sln`/`.csproj` files and
//!   the editor's open buffers into one Markdown document
//! - Scaffold and package the VS Code extension that does the same from inside
//!   the editor (`scaffold` feature)
//!
//! ## Usage
//!
//! ### To export a workspace:
//!
//! ```rust,no_run
//! use ctx2md::{ExportConfig, OutputTarget, run_export};
//! use std::path::PathBuf;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ExportConfig {
//!         project_root: std::env::current_dir()?,
//!         output: OutputTarget::File(PathBuf::from("context.md")),
//!         open_paths: vec![PathBuf::from("src/Program.cs")],
//!         buffers_manifest: None,
//!     };
//!
//!     run_export(&config).await
//! }
//! ```
//!
//! ### To build the document against a custom editor host:
//!
//! ```rust,no_run
//! use ctx2md::documents::{EditorHost, TabGroup};
//! use ctx2md::export_document;
//!
//! struct NoTabs;
//!
//! impl EditorHost for NoTabs {
//!     fn tab_groups(&self) -> Vec<TabGroup> {
//!         Vec::new()
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let doc = export_document(std::path::Path::new("."), &NoTabs).await?;
//!     println!("{doc}");
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod documents;
pub mod error;
pub mod filewalker;
pub mod git;
pub mod host;
#[cfg(feature = "scaffold")]
pub mod scaffold;
pub mod utils;
pub mod writer;

pub use cli::{Config, ExportConfig, OutputTarget, Task};
pub use documents::{EditorHost, OpenDocument, collect_open_documents};
pub use error::AppError;
pub use filewalker::find_by_pattern;
pub use git::list_tracked_files;
pub use writer::{MarkdownDocument, MarkdownWriter, build_markdown};

use anyhow::Result;
use filewalker::{PROJECT_GLOB, SOLUTION_GLOB};
use host::{CombinedHost, FileHost, ManifestHost};
use log::{info, warn};
use std::path::Path;
use tokio::fs::File;

/// Collects everything for `root` and builds the document. Nothing is written.
pub async fn export_document(
    root: &Path,
    host: &dyn EditorHost,
) -> Result<MarkdownDocument, AppError> {
    if !root.is_dir() {
        return Err(AppError::NoWorkspace(root.to_path_buf()));
    }

    let tracked = list_tracked_files(root).await?;

    let solution_files = find_by_pattern(root, SOLUTION_GLOB)?;
    if solution_files.is_empty() {
        warn!("No .sln file found under {}", root.display());
    }
    let project_files = find_by_pattern(root, PROJECT_GLOB)?;
    if project_files.is_empty() {
        warn!("No .csproj file found under {}", root.display());
    }

    let open_docs = collect_open_documents(host);
    info!(
        "Collected {} tracked paths, {} solution files, {} project files, {} open documents",
        tracked.len(),
        solution_files.len(),
        project_files.len(),
        open_docs.len()
    );

    build_markdown(&tracked, &solution_files, &project_files, &open_docs)
}

/// Exports the workspace described by `config` to its output target.
pub async fn run_export(config: &ExportConfig) -> Result<()> {
    let root = &config.project_root;
    // Also checked by `export_document`; repeated here so a missing root is
    // reported before the buffer manifest is read.
    if !root.is_dir() {
        return Err(AppError::NoWorkspace(root.clone()).into());
    }

    let mut host = CombinedHost::new();
    if !config.open_paths.is_empty() {
        host.push(FileHost::new(config.open_paths.iter().cloned()));
    }
    if let Some(manifest) = &config.buffers_manifest {
        host.push(ManifestHost::load(manifest)?);
    }

    let document = export_document(root, &host).await?;

    match &config.output {
        OutputTarget::File(path) => {
            let file = File::create(path).await?;
            MarkdownWriter::new(file).write_document(&document, path).await?;
            info!("Export written to {}", path.display());
        }
        OutputTarget::Stdout => {
            MarkdownWriter::new(tokio::io::stdout())
                .write_document(&document, Path::new("<stdout>"))
                .await?;
        }
    }

    Ok(())
}
