//! Batched PDF rendering and merging.
//!
//! - [`batch`]: partition the ordered page list into fixed-size batches
//! - [`renderer`]: the [`Renderer`] seam and the `wkhtmltopdf` implementation
//! - [`merge`]: concatenate intermediate PDFs with `lopdf`
//! - [`temp`]: ownership and cleanup of intermediate files

pub mod batch;
pub mod merge;
pub mod renderer;
pub mod temp;

pub use batch::{Batch, batch_count, batch_path, partition, staged_page_path};
pub use merge::merge_documents;
pub use renderer::{DEFAULT_BINARY, RenderOptions, Renderer, Wkhtmltopdf};
pub use temp::TempFiles;
