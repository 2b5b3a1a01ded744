//! Ordered traversal of the `toc.json` sidecar.
//!
//! Membership and order come solely from the table of contents; in-page
//! anchors are never consulted.

use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument};

use docbinder_shared::{DocBinderError, Page, Result, TocConfig, TocDocument, TocNode, TocRecord};

use crate::Traversal;
use crate::links::{VisitedSet, normalize_path};

/// Indentation unit applied per nesting level to display titles.
const TITLE_INDENT: &str = "  ";

/// Walks the TOC tree in pre-order and turns it into the page list.
pub struct TocWalker {
    config: TocConfig,
    visited: VisitedSet,
}

impl TocWalker {
    pub fn new(config: TocConfig) -> Self {
        Self {
            config,
            visited: VisitedSet::new(),
        }
    }

    /// Read and parse the sidecar. A missing or malformed file is an error.
    pub fn load(&self) -> Result<TocDocument> {
        let path = &self.config.toc_path;
        let content = std::fs::read_to_string(path)
            .map_err(|e| DocBinderError::toc(path, format!("cannot read sidecar: {e}")))?;
        serde_json::from_str(&content)
            .map_err(|e| DocBinderError::toc(path, format!("malformed sidecar: {e}")))
    }

    /// Keep records that exist on disk and were not seen before, in order.
    fn select(&mut self, records: Vec<TocRecord>) -> Vec<Page> {
        let mut pages = Vec::with_capacity(records.len());

        for record in records {
            if self.visited.contains(&record.path) {
                debug!(path = %record.path.display(), "duplicate toc entry, skipping");
                continue;
            }
            if !record.path.is_file() {
                debug!(path = %record.path.display(), "toc entry has no file, skipping");
                continue;
            }

            let title = display_title(&record);
            self.visited.insert(record.path.clone());
            pages.push(Page::titled(record.path, title));
        }

        pages
    }
}

impl Traversal for TocWalker {
    fn name(&self) -> &str {
        "toc"
    }

    #[instrument(skip_all, fields(toc = %self.config.toc_path.display()))]
    fn collect(&mut self) -> Result<Vec<Page>> {
        let doc = self.load()?;
        let records = walk(&doc, &self.config.docs_root);
        let emitted = records.len();
        let pages = self.select(records);

        info!(emitted, pages = pages.len(), "toc traversal completed");
        Ok(pages)
    }
}

/// Pre-order walk emitting one record per node with a link.
///
/// The root node of an object-shaped sidecar is skipped. Null-link nodes emit
/// nothing but hand their inherited base down to their children.
pub fn walk(doc: &TocDocument, docs_root: &Path) -> Vec<TocRecord> {
    let mut records = Vec::new();
    walk_nodes(doc.entries(), 0, None, docs_root, &mut records);
    records
}

fn walk_nodes(
    nodes: &[TocNode],
    level: usize,
    base: Option<&Path>,
    docs_root: &Path,
    out: &mut Vec<TocRecord>,
) {
    for node in nodes {
        let resolved = node
            .link
            .as_deref()
            .map(str::trim)
            .filter(|link| !link.is_empty())
            .map(|link| resolve_link(link, base, docs_root));

        if let Some(path) = &resolved {
            out.push(TocRecord {
                level,
                path: path.clone(),
                title: node.title.clone(),
            });
        }

        let child_base = resolved.as_deref().or(base);
        walk_nodes(&node.children, level + 1, child_base, docs_root, out);
    }
}

/// Resolve a link relative to the parent page's directory, or the docs root.
fn resolve_link(link: &str, base: Option<&Path>, docs_root: &Path) -> PathBuf {
    let file = if link.ends_with(".html") {
        link.to_string()
    } else {
        format!("{link}.html")
    };
    let dir = base.and_then(Path::parent).unwrap_or(docs_root);
    normalize_path(&dir.join(file))
}

fn display_title(record: &TocRecord) -> String {
    let title = match record.title.as_deref().map(str::trim) {
        Some(t) if !t.is_empty() => t.to_string(),
        _ => record
            .path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default(),
    };
    format!("{}{title}", TITLE_INDENT.repeat(record.level))
}
