//! Open editor buffers.
//!
//! The editor is an outside collaborator: anything that can enumerate its tab
//! groups implements [`EditorHost`]. [`collect_open_documents`] turns those
//! tabs into the labelled, de-duplicated [`OpenDocument`]s the writer embeds.

use crate::utils::language_label;
use log::debug;
use std::collections::HashSet;
use std::path::PathBuf;

/// Live contents of a text tab, including unsaved edits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenBuffer {
    pub file_path: PathBuf,
    /// Language the editor itself detected, if any.
    pub language_id: Option<String>,
    pub content: String,
}

/// A single tab as reported by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorTab {
    Text(OpenBuffer),
    /// Diff views, images, settings pages: nothing to export.
    Other { label: String },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TabGroup {
    pub tabs: Vec<EditorTab>,
}

impl TabGroup {
    pub fn new(tabs: Vec<EditorTab>) -> Self {
        Self { tabs }
    }
}

/// Source of the editor's currently open tabs.
pub trait EditorHost {
    /// All tab groups, in the host's enumeration order.
    fn tab_groups(&self) -> Vec<TabGroup>;
}

/// An open buffer ready to be embedded in the export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenDocument {
    pub file_path: PathBuf,
    pub language_label: String,
    pub content: String,
}

/// Collects one labelled document per distinct file path across every tab of
/// every group. When the same file is open more than once the first tab in
/// enumeration order wins.
pub fn collect_open_documents(host: &dyn EditorHost) -> Vec<OpenDocument> {
    let mut seen = HashSet::new();
    let mut docs = Vec::new();

    for tab in host.tab_groups().into_iter().flat_map(|g| g.tabs) {
        let buffer = match tab {
            EditorTab::Text(buffer) => buffer,
            EditorTab::Other { label } => {
                debug!("Skipping non-text tab: {label}");
                continue;
            }
        };

        if !seen.insert(buffer.file_path.clone()) {
            debug!("Already collected: {}", buffer.file_path.display());
            continue;
        }

        let language_label = language_label(&buffer.file_path, buffer.language_id.as_deref());
        docs.push(OpenDocument {
            file_path: buffer.file_path,
            language_label,
            content: buffer.content,
        });
    }

    docs
}
