//! Local link extraction, path normalization, and the visited set.

use std::collections::HashSet;
use std::ffi::OsStr;
use std::path::{Component, Path, PathBuf};
use std::sync::LazyLock;

use scraper::{Html, Selector};
use tracing::trace;
use url::Url;

use docbinder_shared::CrawlConfig;

static ANCHOR_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("valid selector"));

// ---------------------------------------------------------------------------
// VisitedSet
// ---------------------------------------------------------------------------

/// Normalized paths already enqueued or processed.
#[derive(Debug, Default, Clone)]
pub struct VisitedSet {
    paths: HashSet<PathBuf>,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a path visited. Returns `false` if it already was.
    pub fn insert(&mut self, path: PathBuf) -> bool {
        self.paths.insert(path)
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.paths.contains(path)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

// ---------------------------------------------------------------------------
// LinkExtractor
// ---------------------------------------------------------------------------

/// Finds anchors pointing at other local `.html` pages inside the allowed subtree.
#[derive(Debug, Clone)]
pub struct LinkExtractor {
    include_segments: Vec<String>,
    exclude_segments: Vec<String>,
}

impl LinkExtractor {
    pub fn new(config: &CrawlConfig) -> Self {
        Self {
            include_segments: config.include_segments.clone(),
            exclude_segments: config.exclude_segments.clone(),
        }
    }

    /// Extract new frontier entries from `doc`, which was read from `source`.
    ///
    /// Accepted paths are marked visited before being returned, so a page
    /// linked from several places is only ever enqueued once.
    pub fn extract(&self, doc: &Html, source: &Path, visited: &mut VisitedSet) -> Vec<PathBuf> {
        let base = source.parent().unwrap_or_else(|| Path::new(""));
        let mut links = Vec::new();

        for el in doc.select(&ANCHOR_SEL) {
            let Some(target) = el.value().attr("href").and_then(local_html_target) else {
                continue;
            };

            let resolved = normalize_path(&base.join(target));
            if visited.contains(&resolved) || !self.in_scope(&resolved) || !resolved.is_file() {
                continue;
            }

            trace!(link = %resolved.display(), "accepted link");
            visited.insert(resolved.clone());
            links.push(resolved);
        }

        links
    }

    /// Whether the path lies in an allowed subtree and outside every excluded one.
    pub fn in_scope(&self, path: &Path) -> bool {
        if self.exclude_segments.iter().any(|s| has_segment(path, s)) {
            return false;
        }
        self.include_segments.is_empty()
            || self
                .include_segments
                .iter()
                .any(|s| has_segment(path, s))
    }
}

fn has_segment(path: &Path, segment: &str) -> bool {
    path.components()
        .any(|c| matches!(c, Component::Normal(name) if name == OsStr::new(segment)))
}

/// Reduce an `href` to a relative `.html` file reference, or `None`.
fn local_html_target(href: &str) -> Option<&str> {
    let href = href.trim();
    let end = href.find(['#', '?']).unwrap_or(href.len());
    let target = &href[..end];

    if !target.ends_with(".html") || target.starts_with("//") {
        return None;
    }
    // Anything that parses on its own carries a scheme.
    if Url::parse(target).is_ok() {
        return None;
    }
    Some(target)
}

/// Lexically normalize a path: drop `.`, fold `..` into its parent.
///
/// The filesystem is not consulted, so symlinks are left alone.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();

    for comp in path.components() {
        match comp {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                // `/..` is `/`
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other.as_os_str()),
        }
    }

    if out.as_os_str().is_empty() {
        out.push(".");
    }
    out
}
