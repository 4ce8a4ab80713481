use crate::documents::OpenDocument;
use crate::error::{AppError, Result};
use anyhow::Context;
use log::debug;
use std::fmt;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncWrite, AsyncWriteExt, BufWriter};

pub const GIT_SECTION_HEADING: &str = "# Git File Structure";
pub const NO_SOLUTION_WARNING: &str = "**No .sln file found**";
pub const NO_PROJECT_WARNING: &str = "**No .csproj file found**";

/// The finished export: an ordered list of lines, rendered joined by `\n`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkdownDocument {
    lines: Vec<String>,
}

impl MarkdownDocument {
    pub fn lines(&self) -> &[String] {
        &self.lines
    }
}

impl fmt::Display for MarkdownDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.lines.join("\n"))
    }
}

/// Assembles the export from its four sources, in this order: tracked paths,
/// solution files, project files, open documents.
///
/// Solution and project files are read from disk here. If any of them cannot
/// be read the whole build fails with [`AppError::FileRead`]. Bytes that are
/// not valid UTF-8 are replaced, not rejected.
pub fn build_markdown(
    tracked: &[String],
    solution_files: &[PathBuf],
    project_files: &[PathBuf],
    open_docs: &[OpenDocument],
) -> Result<MarkdownDocument> {
    let mut lines = Vec::new();

    lines.push(GIT_SECTION_HEADING.to_string());
    lines.extend(tracked.iter().map(|p| format!("- {p}")));
    lines.push(String::new());

    push_discovered(&mut lines, solution_files, NO_SOLUTION_WARNING)?;
    push_discovered(&mut lines, project_files, NO_PROJECT_WARNING)?;

    for doc in open_docs {
        debug!("Embedding open document: {}", doc.file_path.display());
        push_block(
            &mut lines,
            &doc.file_path.display().to_string(),
            &doc.language_label,
            &doc.content,
        );
    }

    Ok(MarkdownDocument { lines })
}

fn push_discovered(lines: &mut Vec<String>, files: &[PathBuf], warning: &str) -> Result<()> {
    if files.is_empty() {
        lines.push(warning.to_string());
        lines.push(String::new());
        return Ok(());
    }

    for path in files {
        debug!("Embedding discovered file: {}", path.display());
        let bytes = std::fs::read(path).map_err(|source| AppError::FileRead {
            path: path.clone(),
            source,
        })?;
        let content = match String::from_utf8(bytes) {
            Ok(text) => text,
            Err(err) => {
                debug!(
                    "Invalid UTF-8 in {}, falling back to lossy decoding",
                    path.display()
                );
                String::from_utf8_lossy(err.as_bytes()).into_owned()
            }
        };
        push_block(lines, &path.display().to_string(), "xml", &content);
    }
    Ok(())
}

fn push_block(lines: &mut Vec<String>, heading: &str, lang: &str, content: &str) {
    let fence = fence_for(content);
    lines.push(format!("# {heading}"));
    lines.push(format!("{fence}{lang}"));
    lines.push(content.to_string());
    lines.push(fence);
    lines.push(String::new());
}

/// Three backticks, or one more than the longest backtick run in `content`.
pub fn fence_for(content: &str) -> String {
    let mut longest = 0;
    let mut current = 0;
    for c in content.chars() {
        if c == '`' {
            current += 1;
            longest = longest.max(current);
        } else {
            current = 0;
        }
    }
    let len = if longest >= 3 { longest + 1 } else { 3 };
    "`".repeat(len)
}

pub struct MarkdownWriter<W: AsyncWrite + Unpin> {
    writer: BufWriter<W>,
}

impl<W: AsyncWrite + Unpin> MarkdownWriter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: BufWriter::new(writer),
        }
    }

    pub async fn write_document(
        &mut self,
        doc: &MarkdownDocument,
        target: &Path,
    ) -> anyhow::Result<()> {
        debug!("Writing {} lines to {}", doc.lines().len(), target.display());

        self.writer
            .write_all(doc.to_string().as_bytes())
            .await
            .with_context(|| format!("Failed to write document to {}", target.display()))?;

        self.flush().await
    }

    pub async fn flush(&mut self) -> anyhow::Result<()> {
        self.writer.flush().await.context("Failed to flush output")
    }
}
