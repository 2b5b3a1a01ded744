//! Fixed-size batching of the ordered page list.

use std::path::{Path, PathBuf};

use docbinder_shared::Page;

/// A contiguous slice of the ordered page list rendered into one document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Batch<'a> {
    /// 1-based position among all batches.
    pub ordinal: usize,
    /// Index of the first page in the full list; keys the intermediate file.
    pub start: usize,
    /// Pages in this batch, in render order.
    pub pages: &'a [Page],
}

/// Split `pages` into consecutive batches of `size` (the last may be shorter).
///
/// Concatenating the batches in order reproduces `pages` exactly. A `size`
/// of zero is treated as one.
pub fn partition(pages: &[Page], size: usize) -> Vec<Batch<'_>> {
    let size = size.max(1);
    pages
        .chunks(size)
        .enumerate()
        .map(|(i, chunk)| Batch {
            ordinal: i + 1,
            start: i * size,
            pages: chunk,
        })
        .collect()
}

/// Number of batches `partition` would produce.
pub fn batch_count(page_count: usize, size: usize) -> usize {
    page_count.div_ceil(size.max(1))
}

/// Intermediate document for the batch starting at `start`.
pub fn batch_path(work_dir: &Path, start: usize) -> PathBuf {
    work_dir.join(format!("temp_batch_{start}.pdf"))
}

/// Staged sanitized copy of the page at `index` in the full list.
pub fn staged_page_path(work_dir: &Path, index: usize) -> PathBuf {
    work_dir.join(format!("temp_page_{index}.html"))
}
