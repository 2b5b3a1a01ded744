//! Core domain types for docbinder.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Page
// ---------------------------------------------------------------------------

/// A documentation page selected for rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page {
    /// Normalized filesystem path; the page's identity.
    pub path: PathBuf,
    /// Display title (only set under TOC traversal, indentation-prefixed).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl Page {
    /// Create an untitled page.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            title: None,
        }
    }

    /// Create a page carrying a display title.
    pub fn titled(path: impl Into<PathBuf>, title: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            title: Some(title.into()),
        }
    }

    /// Label used in progress output: the title if present, else the path.
    pub fn label(&self) -> String {
        match &self.title {
            Some(title) => title.trim_start().to_string(),
            None => self.path.display().to_string(),
        }
    }

    /// Borrow the page path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

// ---------------------------------------------------------------------------
// TOC
// ---------------------------------------------------------------------------

/// A single node of the `toc.json` sidecar. Unknown keys are rejected.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TocNode {
    /// Page link without the `.html` suffix (e.g. `GettingStarted`), or null
    /// for pure grouping nodes.
    #[serde(default)]
    pub link: Option<String>,
    /// Display title.
    #[serde(default)]
    pub title: Option<String>,
    /// Nested child nodes.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TocNode>,
}

/// Root structure of the sidecar: either a single root node (which is itself
/// skipped) or a bare list of top-level nodes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TocDocument {
    /// `{"link": "toc", "title": "toc", "children": [...]}`
    Root(TocNode),
    /// `[{"link": "A", ...}, ...]`
    Nodes(Vec<TocNode>),
}

impl TocDocument {
    /// Top-level entries of the table of contents.
    pub fn entries(&self) -> &[TocNode] {
        match self {
            Self::Root(root) => &root.children,
            Self::Nodes(nodes) => nodes,
        }
    }
}

/// A record emitted by the pre-order TOC walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TocRecord {
    /// Depth in the tree (top-level entries are 0).
    pub level: usize,
    /// Resolved absolute page path.
    pub path: PathBuf,
    /// Node title as declared in the sidecar.
    pub title: Option<String>,
}
