//! Core pipeline orchestration for DocBinder.
//!
//! Ties traversal, sanitizing, batch rendering and merging into a single
//! end-to-end workflow ([`build_pdf`]).

pub mod pipeline;

pub use pipeline::{
    BuildConfig, BuildResult, ProgressReporter, SilentProgress, build_pdf, collect_pages,
};
