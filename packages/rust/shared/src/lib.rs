//! Shared types, error model, and configuration for docbinder.
//!
//! This crate is the foundation depended on by all other docbinder crates.
//! It provides:
//! - [`DocBinderError`]: the unified error type
//! - Domain types ([`Page`], [`TocNode`], [`TocRecord`])
//! - Configuration ([`AppConfig`], [`CrawlConfig`], [`TocConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, CrawlConfig, CrawlSection, RenderSection, SanitizeConfig, TocConfig,
    TraversalMode, config_dir, config_file_path, load_config, load_config_from,
};
pub use error::{DocBinderError, Result};
pub use types::{Page, TocDocument, TocNode, TocRecord};
