//! Application configuration for docbinder.
//!
//! User config lives at `~/.docbinder/docbinder.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{DocBinderError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "docbinder.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".docbinder";

// ---------------------------------------------------------------------------
// Config structs (matching docbinder.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Traversal settings.
    #[serde(default)]
    pub crawl: CrawlSection,

    /// Markup sanitizer settings.
    #[serde(default)]
    pub sanitize: SanitizeConfig,

    /// Renderer and batching settings.
    #[serde(default)]
    pub render: RenderSection,
}

/// How the ordered page list is discovered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TraversalMode {
    /// Breadth-first crawl over in-page anchors from the root file.
    #[default]
    Crawl,
    /// Pre-order walk of the `toc.json` sidecar.
    Toc,
}

/// `[crawl]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlSection {
    /// Traversal mode.
    #[serde(default)]
    pub mode: TraversalMode,

    /// Root page, relative to the docs folder.
    #[serde(default = "default_root_file")]
    pub root_file: String,

    /// TOC sidecar, relative to the docs folder.
    #[serde(default = "default_toc_file")]
    pub toc_file: String,

    /// Hard cap on pages processed in crawl mode.
    #[serde(default = "default_max_pages")]
    pub max_pages: usize,

    /// Path components a link must contain (empty = allow everything).
    #[serde(default = "default_include_segments")]
    pub include_segments: Vec<String>,

    /// Path components that exclude a link.
    #[serde(default = "default_exclude_segments")]
    pub exclude_segments: Vec<String>,
}

impl Default for CrawlSection {
    fn default() -> Self {
        Self {
            mode: TraversalMode::default(),
            root_file: default_root_file(),
            toc_file: default_toc_file(),
            max_pages: default_max_pages(),
            include_segments: default_include_segments(),
            exclude_segments: default_exclude_segments(),
        }
    }
}

fn default_root_file() -> String {
    "UnityManual.html".into()
}
fn default_toc_file() -> String {
    "toc.json".into()
}
fn default_max_pages() -> usize {
    35_000
}
fn default_include_segments() -> Vec<String> {
    vec!["Manual".into()]
}
fn default_exclude_segments() -> Vec<String> {
    vec!["ScriptReference".into()]
}

/// `[sanitize]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SanitizeConfig {
    /// Render sanitized staged copies instead of the original files.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Inline style forced onto every textual element.
    #[serde(default = "default_force_color_style")]
    pub force_color_style: String,

    /// Elements that receive the forced style.
    #[serde(default = "default_text_selectors")]
    pub text_selectors: Vec<String>,

    /// Elements removed from every page.
    #[serde(default = "default_block_selectors")]
    pub block_selectors: Vec<String>,

    /// Candidate main-content regions, first match in document order wins.
    #[serde(default = "default_main_selectors")]
    pub main_selectors: Vec<String>,
}

impl Default for SanitizeConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            force_color_style: default_force_color_style(),
            text_selectors: default_text_selectors(),
            block_selectors: default_block_selectors(),
            main_selectors: default_main_selectors(),
        }
    }
}

fn default_true() -> bool {
    true
}
fn default_force_color_style() -> String {
    "color: #000000 !important;".into()
}
fn default_text_selectors() -> Vec<String> {
    ["p", "h1", "h2", "h3", "h4", "h5", "h6", "span", "a", "li"]
        .into_iter()
        .map(String::from)
        .collect()
}
fn default_block_selectors() -> Vec<String> {
    ["nav", "footer", ".search-bar", ".unnecessary-class"]
        .into_iter()
        .map(String::from)
        .collect()
}
fn default_main_selectors() -> Vec<String> {
    ["main", ".main-content", "article"]
        .into_iter()
        .map(String::from)
        .collect()
}

/// `[render]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderSection {
    /// Path to the `wkhtmltopdf` binary (`None` = look it up on `PATH`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wkhtmltopdf: Option<String>,

    /// Pages per intermediate document.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Pause between renderer invocations.
    #[serde(default = "default_batch_delay_ms")]
    pub batch_delay_ms: u64,

    /// Paper size passed to the renderer.
    #[serde(default = "default_page_size")]
    pub page_size: String,

    /// Margin applied to all four sides.
    #[serde(default = "default_margin")]
    pub margin: String,

    /// Script settle delay per page.
    #[serde(default = "default_javascript_delay_ms")]
    pub javascript_delay_ms: u64,
}

impl Default for RenderSection {
    fn default() -> Self {
        Self {
            wkhtmltopdf: None,
            batch_size: default_batch_size(),
            batch_delay_ms: default_batch_delay_ms(),
            page_size: default_page_size(),
            margin: default_margin(),
            javascript_delay_ms: default_javascript_delay_ms(),
        }
    }
}

fn default_batch_size() -> usize {
    3
}
fn default_batch_delay_ms() -> u64 {
    500
}
fn default_page_size() -> String {
    "A4".into()
}
fn default_margin() -> String {
    "0.75in".into()
}
fn default_javascript_delay_ms() -> u64 {
    1000
}

impl AppConfig {
    /// Reject values that would make the pipeline meaningless.
    pub fn validate(&self) -> Result<()> {
        if self.render.batch_size == 0 {
            return Err(DocBinderError::config("render.batch_size must be at least 1"));
        }
        if self.crawl.max_pages == 0 {
            return Err(DocBinderError::config("crawl.max_pages must be at least 1"));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Traversal configs (runtime, merged from config + CLI flags)
// ---------------------------------------------------------------------------

/// Runtime crawl configuration.
#[derive(Debug, Clone)]
pub struct CrawlConfig {
    /// Absolute or cwd-relative root page.
    pub root_file: PathBuf,
    /// Hard cap on processed pages.
    pub max_pages: usize,
    /// Allowed-subtree path components.
    pub include_segments: Vec<String>,
    /// Excluded-subtree path components.
    pub exclude_segments: Vec<String>,
}

impl CrawlConfig {
    /// Build the runtime crawl config for the given docs folder.
    pub fn new(docs_root: &Path, section: &CrawlSection) -> Self {
        Self {
            root_file: docs_root.join(&section.root_file),
            max_pages: section.max_pages,
            include_segments: section.include_segments.clone(),
            exclude_segments: section.exclude_segments.clone(),
        }
    }
}

/// Runtime TOC traversal configuration.
#[derive(Debug, Clone)]
pub struct TocConfig {
    /// Base directory for top-level links.
    pub docs_root: PathBuf,
    /// Sidecar location.
    pub toc_path: PathBuf,
}

impl TocConfig {
    /// Build the runtime TOC config; `toc_override` replaces the configured file.
    pub fn new(docs_root: &Path, section: &CrawlSection, toc_override: Option<&Path>) -> Self {
        let toc_path = match toc_override {
            Some(path) => path.to_path_buf(),
            None => docs_root.join(&section.toc_file),
        };
        Self {
            docs_root: docs_root.to_path_buf(),
            toc_path,
        }
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.docbinder/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| DocBinderError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.docbinder/docbinder.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = match config_file_path() {
        Ok(path) => path,
        Err(e) => {
            tracing::debug!(error = %e, "no home directory, using default config");
            return Ok(AppConfig::default());
        }
    };

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| DocBinderError::io(path, e))?;

    let config: AppConfig = toml::from_str(&content).map_err(|e| {
        DocBinderError::config(format!("failed to parse {}: {e}", path.display()))
    })?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("UnityManual.html"));
        assert!(toml_str.contains("batch_size = 3"));
    }

    #[test]
    fn config_roundtrip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let parsed: AppConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.crawl.max_pages, 35_000);
        assert_eq!(parsed.crawl.mode, TraversalMode::Crawl);
        assert_eq!(parsed.render.batch_delay_ms, 500);
        assert_eq!(parsed.sanitize.block_selectors.len(), 4);
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let toml_str = r#"
[crawl]
mode = "toc"
include_segments = []

[render]
batch_size = 5
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.crawl.mode, TraversalMode::Toc);
        assert!(config.crawl.include_segments.is_empty());
        assert_eq!(config.crawl.exclude_segments, vec!["ScriptReference"]);
        assert_eq!(config.render.batch_size, 5);
        assert_eq!(config.render.margin, "0.75in");
    }

    #[test]
    fn zero_batch_size_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("docbinder.toml");
        std::fs::write(&path, "[render]\nbatch_size = 0\n").expect("write config");

        let err = load_config_from(&path).unwrap_err();
        assert!(err.to_string().contains("batch_size"));
    }

    #[test]
    fn crawl_config_joins_root_file() {
        let section = CrawlSection::default();
        let crawl = CrawlConfig::new(Path::new("/docs/Manual"), &section);
        assert_eq!(crawl.root_file, PathBuf::from("/docs/Manual/UnityManual.html"));
        assert_eq!(crawl.max_pages, 35_000);
    }

    #[test]
    fn toc_config_override_wins() {
        let section = CrawlSection::default();
        let toc = TocConfig::new(Path::new("/docs"), &section, None);
        assert_eq!(toc.toc_path, PathBuf::from("/docs/toc.json"));

        let toc = TocConfig::new(Path::new("/docs"), &section, Some(Path::new("/tmp/t.json")));
        assert_eq!(toc.toc_path, PathBuf::from("/tmp/t.json"));
    }
}
