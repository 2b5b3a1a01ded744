//! Serialize a sanitized page into a standalone document for the renderer.

use lol_html::html_content::ContentType;
use lol_html::{RewriteStrSettings, element, rewrite_str};
use tracing::debug;
use url::Url;

use docbinder_shared::{DocBinderError, Result};

use crate::LoadedPage;

/// Render the sanitized tree to markup, pinning charset and base URL.
///
/// Staged copies live in the work directory, so a `<base>` pointing at the
/// original page's directory keeps relative images and stylesheets working.
pub fn stage_html(page: &LoadedPage) -> Result<String> {
    let html = page.document.html();

    let mut head = String::from(r#"<meta charset="utf-8">"#);
    match base_href(page) {
        Some(base) => head.push_str(&format!(r#"<base href="{base}">"#)),
        None => debug!(path = %page.path.display(), "no base URL for staged page"),
    }

    rewrite_str(
        &html,
        RewriteStrSettings {
            element_content_handlers: vec![element!("head", |el| {
                el.prepend(&head, ContentType::Html);
                Ok(())
            })],
            ..RewriteStrSettings::default()
        },
    )
    .map_err(|e| DocBinderError::parse(format!("staging {} failed: {e}", page.path.display())))
}

fn base_href(page: &LoadedPage) -> Option<Url> {
    let absolute = std::path::absolute(&page.path).ok()?;
    let dir = absolute.parent()?;
    Url::from_directory_path(dir).ok()
}
