//! Breadth-first crawl over local documentation pages.
//!
//! The crawler starts from the root file, follows in-page anchors to other
//! pages inside the allowed subtree, and stops when the queue drains or the
//! page cap is reached.

use std::collections::VecDeque;

use tracing::{debug, info, instrument, warn};

use docbinder_sanitize::{Sanitizer, load_page};
use docbinder_shared::{CrawlConfig, DocBinderError, Page, Result};

use crate::Traversal;
use crate::links::{LinkExtractor, VisitedSet, normalize_path};

// ---------------------------------------------------------------------------
// CrawlResult
// ---------------------------------------------------------------------------

/// Summary of a completed crawl.
#[derive(Debug, Clone, Default)]
pub struct CrawlResult {
    /// Pages loaded successfully, in discovery order.
    pub pages_loaded: usize,
    /// Pages that failed to load (skipped, never retried).
    pub pages_skipped: usize,
    /// Queue entries left unprocessed because the cap was reached.
    pub pages_remaining: usize,
    /// Whether the page cap stopped the crawl.
    pub capped: bool,
}

// ---------------------------------------------------------------------------
// Crawler
// ---------------------------------------------------------------------------

/// Breadth-first crawler. Owns its visited set for the lifetime of one crawl.
pub struct Crawler {
    config: CrawlConfig,
    sanitizer: Sanitizer,
    extractor: LinkExtractor,
    visited: VisitedSet,
    last_result: CrawlResult,
}

impl Crawler {
    /// Create a new crawler with the given configuration.
    pub fn new(config: CrawlConfig, sanitizer: Sanitizer) -> Self {
        let extractor = LinkExtractor::new(&config);
        Self {
            config,
            sanitizer,
            extractor,
            visited: VisitedSet::new(),
            last_result: CrawlResult::default(),
        }
    }

    /// Paths discovered so far.
    pub fn visited(&self) -> &VisitedSet {
        &self.visited
    }

    /// Statistics from the most recent crawl.
    pub fn last_result(&self) -> &CrawlResult {
        &self.last_result
    }
}

impl Traversal for Crawler {
    fn name(&self) -> &str {
        "crawl"
    }

    #[instrument(
        skip_all,
        fields(root = %self.config.root_file.display(), cap = self.config.max_pages)
    )]
    fn collect(&mut self) -> Result<Vec<Page>> {
        let root = normalize_path(&self.config.root_file);
        if !root.is_file() {
            return Err(DocBinderError::MissingRoot { path: root });
        }

        let cap = self.config.max_pages;
        self.visited.insert(root.clone());
        let mut queue = VecDeque::from([root]);
        let mut pages: Vec<Page> = Vec::new();
        let mut result = CrawlResult::default();

        info!(
            include = ?self.config.include_segments,
            exclude = ?self.config.exclude_segments,
            "starting crawl"
        );

        while let Some(current) = queue.pop_front() {
            if pages.len() >= cap {
                // The popped entry was never processed either.
                result.pages_remaining = queue.len() + 1;
                result.capped = true;
                info!(cap, "page cap reached, stopping crawl");
                break;
            }

            let processed = pages.len();
            info!(
                path = %current.display(),
                processed,
                cap,
                percent = %format!("{:.1}", processed as f64 / cap as f64 * 100.0),
                "processing"
            );

            match load_page(&current, &self.sanitizer) {
                Ok(page) => {
                    let links = self
                        .extractor
                        .extract(&page.document, &current, &mut self.visited);
                    debug!(new_links = links.len(), queued = queue.len(), "links extracted");
                    queue.extend(links);
                    pages.push(Page::new(current));
                }
                Err(e) => {
                    warn!(path = %current.display(), error = %e, "failed to load page, skipping");
                    result.pages_skipped += 1;
                }
            }
        }

        result.pages_loaded = pages.len();
        info!(
            pages_loaded = result.pages_loaded,
            pages_skipped = result.pages_skipped,
            pages_remaining = result.pages_remaining,
            "crawl completed"
        );
        self.last_result = result;

        Ok(pages)
    }
}

#[cfg(test)]
mod crawler_tests {
    use std::path::{Path, PathBuf};

    use docbinder_shared::SanitizeConfig;

    use super::*;

    fn write(path: &Path, body: &str) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, body).unwrap();
    }

    fn page(links: &[&str]) -> String {
        let anchors: String = links
            .iter()
            .map(|l| format!(r#"<a href="{l}">{l}</a>"#))
            .collect();
        format!(
            "<html><body><nav><a href=\"Nav.html\">nav</a></nav><main>{anchors}</main></body></html>"
        )
    }

    /// Manual/Root -> A, B; A -> Root, C; B -> A; C -> ../ScriptReference/Api
    fn fixture(dir: &Path) -> PathBuf {
        let manual = dir.join("Manual");
        write(&manual.join("Root.html"), &page(&["A.html", "B.html"]));
        write(&manual.join("A.html"), &page(&["Root.html", "C.html"]));
        write(&manual.join("B.html"), &page(&["A.html"]));
        write(&manual.join("C.html"), &page(&["../ScriptReference/Api.html"]));
        write(&manual.join("Nav.html"), &page(&[]));
        write(&manual.join("Orphan.html"), &page(&[]));
        write(&dir.join("ScriptReference/Api.html"), &page(&[]));
        manual
    }

    fn crawler(root: PathBuf, max_pages: usize) -> Crawler {
        let config = CrawlConfig {
            root_file: root,
            max_pages,
            include_segments: vec!["Manual".into()],
            exclude_segments: vec!["ScriptReference".into()],
        };
        Crawler::new(config, Sanitizer::new(&SanitizeConfig::default()).unwrap())
    }

    fn paths(pages: &[Page]) -> Vec<PathBuf> {
        pages.iter().map(|p| p.path.clone()).collect()
    }

    #[test]
    fn crawl_is_breadth_first_and_deduplicated() {
        let dir = tempfile::tempdir().unwrap();
        let manual = fixture(dir.path());

        let mut crawler = crawler(manual.join("Root.html"), 100);
        let pages = crawler.collect().unwrap();

        assert_eq!(
            paths(&pages),
            vec![
                manual.join("Root.html"),
                manual.join("A.html"),
                manual.join("B.html"),
                manual.join("C.html"),
            ]
        );
        // Nav links are stripped before extraction; orphans are unreachable.
        assert!(!crawler.visited().contains(&manual.join("Nav.html")));
        assert!(!crawler.visited().contains(&manual.join("Orphan.html")));
        assert!(pages.iter().all(|p| p.title.is_none()));
    }

    #[test]
    fn crawl_respects_page_cap() {
        let dir = tempfile::tempdir().unwrap();
        let manual = fixture(dir.path());

        let mut crawler = crawler(manual.join("Root.html"), 2);
        let pages = crawler.collect().unwrap();

        assert_eq!(paths(&pages), vec![manual.join("Root.html"), manual.join("A.html")]);
        assert!(crawler.last_result().capped);
        assert_eq!(crawler.last_result().pages_remaining, 2);
    }

    #[test]
    fn crawl_skips_unreadable_pages() {
        let dir = tempfile::tempdir().unwrap();
        let manual = fixture(dir.path());
        std::fs::write(manual.join("B.html"), b"<p>\xff\xfe</p>").unwrap();

        let mut crawler = crawler(manual.join("Root.html"), 100);
        let pages = crawler.collect().unwrap();

        assert_eq!(
            paths(&pages),
            vec![manual.join("Root.html"), manual.join("A.html"), manual.join("C.html")]
        );
        assert_eq!(crawler.last_result().pages_skipped, 1);
    }

    #[test]
    fn crawl_missing_root_errors() {
        let dir = tempfile::tempdir().unwrap();
        let mut crawler = crawler(dir.path().join("Manual/Root.html"), 100);

        let err = crawler.collect().unwrap_err();
        assert!(matches!(err, DocBinderError::MissingRoot { .. }));
    }
}
