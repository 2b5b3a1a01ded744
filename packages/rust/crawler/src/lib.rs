//! Page discovery and ordering for local documentation trees.
//!
//! This crate provides:
//! - [`links`]: local link extraction, path normalization, the visited set
//! - [`engine`]: breadth-first crawl from a root page ([`Crawler`])
//! - [`toc`]: pre-order traversal of a `toc.json` sidecar ([`TocWalker`])
//!
//! Both strategies implement [`Traversal`] and own their visited set, so a
//! path is never emitted twice within one run.

pub mod engine;
pub mod links;
pub mod toc;

use docbinder_shared::{Page, Result};

pub use engine::{CrawlResult, Crawler};
pub use links::{LinkExtractor, VisitedSet, normalize_path};
pub use toc::TocWalker;

/// A policy producing the ordered list of pages to render.
pub trait Traversal {
    /// Human-readable strategy name for tracing.
    fn name(&self) -> &str;

    /// Discover pages in render order.
    fn collect(&mut self) -> Result<Vec<Page>>;
}
