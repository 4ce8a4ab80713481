//! Command-line stand-ins for the editor.
//!
//! - [`FileHost`] treats files named on the command line as open tabs.
//! - [`ManifestHost`] replays a JSON dump of an editor's tab groups, which is
//!   how unsaved buffers reach the tool.
//! - [`CombinedHost`] chains several hosts in order.

use crate::documents::{EditorHost, EditorTab, OpenBuffer, TabGroup};
use crate::error::{AppError, Result};
use crate::utils::detect_language_id;
use log::{debug, warn};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// One group of tabs, one per file given with `--open`.
///
/// Files are read when the tabs are enumerated. A file that cannot be read
/// shows up as a non-text tab.
#[derive(Debug, Clone, Default)]
pub struct FileHost {
    paths: Vec<PathBuf>,
}

impl FileHost {
    pub fn new(paths: impl IntoIterator<Item = PathBuf>) -> Self {
        let paths = paths
            .into_iter()
            .map(|p| std::path::absolute(&p).unwrap_or(p))
            .collect();
        Self { paths }
    }

    fn open_tab(path: &Path) -> EditorTab {
        match std::fs::read_to_string(path) {
            Ok(content) => EditorTab::Text(OpenBuffer {
                file_path: path.to_path_buf(),
                language_id: detect_language_id(path).map(str::to_string),
                content,
            }),
            Err(err) => {
                warn!("Cannot open {} as text: {err}", path.display());
                EditorTab::Other {
                    label: path.display().to_string(),
                }
            }
        }
    }
}

impl EditorHost for FileHost {
    fn tab_groups(&self) -> Vec<TabGroup> {
        if self.paths.is_empty() {
            return Vec::new();
        }
        vec![TabGroup::new(
            self.paths.iter().map(|p| Self::open_tab(p)).collect(),
        )]
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Manifest {
    Groups { groups: Vec<ManifestGroup> },
    Tabs(Vec<ManifestTab>),
}

#[derive(Debug, Deserialize)]
struct ManifestGroup {
    #[serde(default)]
    tabs: Vec<ManifestTab>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ManifestTab {
    path: Option<PathBuf>,
    language_id: Option<String>,
    content: Option<String>,
    label: Option<String>,
}

impl From<ManifestTab> for EditorTab {
    fn from(tab: ManifestTab) -> Self {
        match (tab.path, tab.content) {
            (Some(file_path), Some(content)) => EditorTab::Text(OpenBuffer {
                file_path,
                language_id: tab.language_id,
                content,
            }),
            (path, _) => EditorTab::Other {
                label: tab
                    .label
                    .or_else(|| path.map(|p| p.display().to_string()))
                    .unwrap_or_else(|| "untitled".to_string()),
            },
        }
    }
}

/// Tab groups loaded from a buffer manifest.
///
/// ```json
/// {"groups": [{"tabs": [
///     {"path": "/src/Program.cs", "languageId": "csharp", "content": "..."},
///     {"label": "Program.cs (Working Tree)"}
/// ]}]}
/// ```
///
/// A bare array of tabs is read as a single group.
#[derive(Debug, Clone, Default)]
pub struct ManifestHost {
    groups: Vec<TabGroup>,
}

impl ManifestHost {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|err| AppError::Manifest {
            path: path.to_path_buf(),
            reason: err.to_string(),
        })?;
        Self::parse(&raw).map_err(|err| AppError::Manifest {
            path: path.to_path_buf(),
            reason: err.to_string(),
        })
    }

    pub fn parse(json: &str) -> serde_json::Result<Self> {
        let groups = match serde_json::from_str::<Manifest>(json)? {
            Manifest::Groups { groups } => groups
                .into_iter()
                .map(|g| TabGroup::new(g.tabs.into_iter().map(EditorTab::from).collect()))
                .collect(),
            Manifest::Tabs(tabs) => {
                vec![TabGroup::new(tabs.into_iter().map(EditorTab::from).collect())]
            }
        };
        debug!("Loaded {} tab group(s) from manifest", groups.len());
        Ok(Self { groups })
    }
}

impl EditorHost for ManifestHost {
    fn tab_groups(&self) -> Vec<TabGroup> {
        self.groups.clone()
    }
}

/// Hosts queried in order; their groups are concatenated.
#[derive(Default)]
pub struct CombinedHost {
    hosts: Vec<Box<dyn EditorHost>>,
}

impl CombinedHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, host: impl EditorHost + 'static) {
        self.hosts.push(Box::new(host));
    }
}

impl EditorHost for CombinedHost {
    fn tab_groups(&self) -> Vec<TabGroup> {
        self.hosts.iter().flat_map(|h| h.tab_groups()).collect()
    }
}
