//! Markup sanitizer: neutralize theme colors, strip page chrome, keep the main region.
//!
//! Forcing the text style and removing blocked elements run as a single
//! streaming rewrite; main-region extraction runs on the parsed tree.

use lol_html::{RewriteStrSettings, element, rewrite_str};
use scraper::{Html, Selector};
use tracing::trace;

use docbinder_shared::{DocBinderError, Result, SanitizeConfig};

/// Validated sanitizer settings, reusable across pages.
#[derive(Debug, Clone)]
pub struct Sanitizer {
    force_style: String,
    text_selectors: Vec<String>,
    block_selectors: Vec<String>,
    main_selector: Option<Selector>,
}

impl Sanitizer {
    /// Build a sanitizer, rejecting any selector the rewriter cannot handle.
    pub fn new(config: &SanitizeConfig) -> Result<Self> {
        for sel in config.text_selectors.iter().chain(&config.block_selectors) {
            validate_rewrite_selector(sel)?;
        }

        let main_selector = if config.main_selectors.is_empty() {
            None
        } else {
            let joined = config.main_selectors.join(", ");
            let selector = Selector::parse(&joined).map_err(|e| {
                DocBinderError::config(format!("invalid main-content selector '{joined}': {e:?}"))
            })?;
            Some(selector)
        };

        Ok(Self {
            force_style: config.force_color_style.clone(),
            text_selectors: config.text_selectors.clone(),
            block_selectors: config.block_selectors.clone(),
            main_selector,
        })
    }

    /// Sanitize raw page markup into a document tree.
    pub fn sanitize(&self, html: &str) -> Result<Html> {
        let rewritten = self.rewrite(html)?;
        let doc = Html::parse_document(&rewritten);
        Ok(self.keep_main_region(doc))
    }

    /// Force the text style and drop blocked elements.
    fn rewrite(&self, html: &str) -> Result<String> {
        let style = self.force_style.as_str();
        let mut handlers =
            Vec::with_capacity(self.text_selectors.len() + self.block_selectors.len());

        for sel in &self.text_selectors {
            handlers.push(element!(sel, move |el| {
                el.set_attribute("style", style)?;
                Ok(())
            }));
        }
        for sel in &self.block_selectors {
            handlers.push(element!(sel, |el| {
                el.remove();
                Ok(())
            }));
        }

        rewrite_str(
            html,
            RewriteStrSettings {
                element_content_handlers: handlers,
                ..RewriteStrSettings::default()
            },
        )
        .map_err(|e| DocBinderError::parse(format!("markup rewrite failed: {e}")))
    }

    /// Replace the document with its main-content region when one exists.
    fn keep_main_region(&self, doc: Html) -> Html {
        let Some(selector) = &self.main_selector else {
            return doc;
        };

        match doc.select(selector).next() {
            Some(region) => {
                trace!(tag = region.value().name(), "keeping main-content region");
                Html::parse_document(&region.html())
            }
            None => doc,
        }
    }
}

fn validate_rewrite_selector(sel: &str) -> Result<()> {
    sel.parse::<lol_html::Selector>()
        .map(|_| ())
        .map_err(|e| DocBinderError::config(format!("invalid selector '{sel}': {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sanitizer() -> Sanitizer {
        Sanitizer::new(&SanitizeConfig::default()).expect("default config is valid")
    }

    #[test]
    fn forces_black_text_on_textual_elements() {
        let html = r#"<html><body><p style="color: red">Hi</p><h2>T</h2><div>x</div></body></html>"#;
        let out = sanitizer().sanitize(html).unwrap().html();

        assert!(out.contains(r#"<p style="color: #000000 !important;">Hi</p>"#));
        assert!(out.contains(r#"<h2 style="color: #000000 !important;">T</h2>"#));
        assert!(out.contains("<div>x</div>"));
        assert!(!out.contains("color: red"));
    }

    #[test]
    fn removes_blocked_elements() {
        let html = r#"<html><body>
            <nav><a href="a.html">Nav</a></nav>
            <div class="search-bar">Search</div>
            <div class="unnecessary-class">Junk</div>
            <p>Body text</p>
            <footer>Copyright</footer>
        </body></html>"#;
        let out = sanitizer().sanitize(html).unwrap().html();

        assert!(out.contains("Body text"));
        assert!(!out.contains("Nav"));
        assert!(!out.contains("Search"));
        assert!(!out.contains("Junk"));
        assert!(!out.contains("Copyright"));
    }

    #[test]
    fn keeps_only_main_region() {
        let html = r#"<html><head><title>T</title></head><body>
            <div class="sidebar">Sidebar</div>
            <div class="main-content"><h1>Guide</h1><p>Text</p></div>
        </body></html>"#;
        let out = sanitizer().sanitize(html).unwrap().html();

        assert!(out.contains("Guide"));
        assert!(!out.contains("Sidebar"));
        assert!(!out.contains("<title>"));
    }

    #[test]
    fn first_region_in_document_order_wins() {
        let html = r#"<html><body>
            <article>First</article>
            <main>Second</main>
        </body></html>"#;
        let out = sanitizer().sanitize(html).unwrap().html();

        assert!(out.contains("First"));
        assert!(!out.contains("Second"));
    }

    #[test]
    fn falls_back_to_full_document_without_region() {
        let html = r#"<html><body><div>Loose</div><div>Content</div></body></html>"#;
        let out = sanitizer().sanitize(html).unwrap().html();

        assert!(out.contains("Loose"));
        assert!(out.contains("Content"));
    }

    #[test]
    fn invalid_block_selector_rejected() {
        let config = SanitizeConfig {
            block_selectors: vec!["nav[".into()],
            ..SanitizeConfig::default()
        };
        let err = Sanitizer::new(&config).unwrap_err();
        assert!(err.to_string().contains("nav["));
    }

    #[test]
    fn empty_main_selectors_keep_document() {
        let config = SanitizeConfig {
            main_selectors: vec![],
            ..SanitizeConfig::default()
        };
        let html = r#"<html><body><div>Outside</div><main>Inside</main></body></html>"#;
        let out = Sanitizer::new(&config).unwrap().sanitize(html).unwrap().html();

        assert!(out.contains("Outside"));
        assert!(out.contains("Inside"));
    }
}
