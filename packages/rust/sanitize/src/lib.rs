//! Page loading, markup sanitizing, and staging for the renderer.
//!
//! A page is read from disk as UTF-8, passed through the [`Sanitizer`]
//! (forced text color, chrome removal, main-region extraction) and kept as a
//! transient [`scraper::Html`] tree. [`stage_html`] serializes that tree back
//! into a standalone document the external renderer can open from a
//! different directory.

mod sanitizer;
mod staging;

use std::path::{Path, PathBuf};

use scraper::Html;
use tracing::{debug, instrument};

use docbinder_shared::{DocBinderError, Result};

pub use sanitizer::Sanitizer;
pub use staging::stage_html;

/// A page read from disk and sanitized. Never persisted.
#[derive(Debug)]
pub struct LoadedPage {
    /// Normalized path the page was read from.
    pub path: PathBuf,
    /// Sanitized document tree.
    pub document: Html,
}

/// Read and sanitize a single page.
///
/// Returns an error for unreadable or non-UTF-8 files; callers decide whether
/// that is fatal (it never is during traversal).
#[instrument(skip(sanitizer), fields(path = %path.display()))]
pub fn load_page(path: &Path, sanitizer: &Sanitizer) -> Result<LoadedPage> {
    let bytes = std::fs::read(path).map_err(|e| DocBinderError::io(path, e))?;
    let text = String::from_utf8(bytes).map_err(|e| {
        DocBinderError::parse(format!("{} is not valid UTF-8: {e}", path.display()))
    })?;

    let document = sanitizer.sanitize(&text)?;
    debug!(bytes = text.len(), "page loaded");

    Ok(LoadedPage {
        path: path.to_path_buf(),
        document,
    })
}
