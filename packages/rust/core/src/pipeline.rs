//! End-to-end build pipeline: traverse → stage → render in batches → merge → clean up.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tracing::{debug, error, info, instrument, warn};

use docbinder_crawler::{Crawler, TocWalker, Traversal, normalize_path};
use docbinder_render::{
    Batch, Renderer, TempFiles, batch_path, merge_documents, partition, staged_page_path,
};
use docbinder_sanitize::{Sanitizer, load_page, stage_html};
use docbinder_shared::{
    AppConfig, CrawlConfig, DocBinderError, Page, Result, SanitizeConfig, TocConfig,
    TraversalMode,
};

/// Configuration for one `build_pdf` run.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Documentation root folder.
    pub docs_root: PathBuf,
    /// Final PDF location.
    pub output: PathBuf,
    /// Directory for intermediate documents and staged pages.
    pub work_dir: PathBuf,
    /// Discovery strategy.
    pub mode: TraversalMode,
    /// Crawl-mode settings.
    pub crawl: CrawlConfig,
    /// TOC-mode settings.
    pub toc: TocConfig,
    /// Sanitizer settings (also decides whether staged copies are rendered).
    pub sanitize: SanitizeConfig,
    /// Pages per intermediate document.
    pub batch_size: usize,
    /// Pause between renderer invocations.
    pub batch_delay: Duration,
}

impl BuildConfig {
    /// Resolve a run configuration from the loaded app config.
    pub fn from_app(
        app: &AppConfig,
        docs_root: &Path,
        output: PathBuf,
        work_dir: PathBuf,
        toc_override: Option<&Path>,
    ) -> Self {
        Self {
            docs_root: docs_root.to_path_buf(),
            output,
            work_dir,
            mode: app.crawl.mode,
            crawl: CrawlConfig::new(docs_root, &app.crawl),
            toc: TocConfig::new(docs_root, &app.crawl, toc_override),
            sanitize: app.sanitize.clone(),
            batch_size: app.render.batch_size,
            batch_delay: Duration::from_millis(app.render.batch_delay_ms),
        }
    }
}

/// Result of a `build_pdf` run.
#[derive(Debug)]
pub struct BuildResult {
    /// The written PDF, or `None` when there was nothing to render.
    pub output: Option<PathBuf>,
    /// Pages rendered into the PDF.
    pub page_count: usize,
    /// Pages selected by the traversal but dropped because they could not be staged.
    pub pages_skipped: usize,
    /// Intermediate documents rendered.
    pub batch_count: usize,
    /// Pages in the merged PDF.
    pub pdf_pages: usize,
    /// Total elapsed time.
    pub elapsed: Duration,
}

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called once the ordered page list is known.
    fn pages_collected(&self, count: usize);
    /// Called after each batch document is rendered.
    fn batch_rendered(&self, current: usize, total: usize);
    /// Called when the pipeline completes.
    fn done(&self, result: &BuildResult);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn pages_collected(&self, _count: usize) {}
    fn batch_rendered(&self, _current: usize, _total: usize) {}
    fn done(&self, _result: &BuildResult) {}
}

/// Discover the ordered page list with the configured strategy.
///
/// The root manual file must exist in either mode.
#[instrument(skip_all, fields(mode = ?config.mode))]
pub fn collect_pages(config: &BuildConfig) -> Result<Vec<Page>> {
    let root = normalize_path(&config.crawl.root_file);
    if !root.is_file() {
        return Err(DocBinderError::MissingRoot { path: root });
    }

    let mut traversal: Box<dyn Traversal> = match config.mode {
        TraversalMode::Crawl => {
            let sanitizer = Sanitizer::new(&config.sanitize)?;
            Box::new(Crawler::new(config.crawl.clone(), sanitizer))
        }
        TraversalMode::Toc => Box::new(TocWalker::new(config.toc.clone())),
    };

    debug!(strategy = traversal.name(), "collecting pages");
    traversal.collect()
}

/// Run the full pipeline.
///
/// 1. Traverse the docs tree (crawl or TOC)
/// 2. Partition pages into batches
/// 3. Stage and render each batch into an intermediate PDF
/// 4. Merge intermediates into the output
/// 5. Remove every temporary file, on success and on failure
#[instrument(
    skip_all,
    fields(docs_root = %config.docs_root.display(), output = %config.output.display())
)]
pub async fn build_pdf<R: Renderer>(
    config: &BuildConfig,
    renderer: &R,
    progress: &dyn ProgressReporter,
) -> Result<BuildResult> {
    let start = Instant::now();

    // --- Phase 1: Traversal ---
    progress.phase("Collecting pages");
    let pages = collect_pages(config)?;
    progress.pages_collected(pages.len());

    if pages.is_empty() {
        warn!("no pages to render, output not written");
        let result = BuildResult {
            output: None,
            page_count: 0,
            pages_skipped: 0,
            batch_count: 0,
            pdf_pages: 0,
            elapsed: start.elapsed(),
        };
        progress.done(&result);
        return Ok(result);
    }

    // --- Phase 2: Batch rendering ---
    progress.phase("Rendering batches");
    let RenderedBatches {
        mut intermediates,
        pages_rendered,
        pages_skipped,
    } = match render_batches(config, &pages, renderer, progress).await {
        Ok(rendered) => rendered,
        Err(e) => {
            error!(error = %e, "rendering failed, intermediates removed");
            return Err(e);
        }
    };

    if intermediates.is_empty() {
        warn!("no batch produced a document, output not written");
        let result = BuildResult {
            output: None,
            page_count: 0,
            pages_skipped,
            batch_count: 0,
            pdf_pages: 0,
            elapsed: start.elapsed(),
        };
        progress.done(&result);
        return Ok(result);
    }

    // --- Phase 3: Merge ---
    progress.phase("Merging PDF files");
    info!(documents = intermediates.len(), "merging PDF files");
    let merged = merge_documents(intermediates.files(), &config.output);
    let batch_count = intermediates.len();
    intermediates.cleanup();

    let pdf_pages = match merged {
        Ok(count) => count,
        Err(e) => {
            error!(error = %e, "merge failed, intermediates removed");
            return Err(e);
        }
    };

    let result = BuildResult {
        output: Some(config.output.clone()),
        page_count: pages_rendered,
        pages_skipped,
        batch_count,
        pdf_pages,
        elapsed: start.elapsed(),
    };
    info!(
        output = %config.output.display(),
        pages = result.page_count,
        skipped = result.pages_skipped,
        batches = result.batch_count,
        pdf_pages,
        elapsed_ms = result.elapsed.as_millis(),
        "PDF successfully created"
    );
    progress.done(&result);
    Ok(result)
}

/// Intermediates produced by [`render_batches`] and the page tally.
struct RenderedBatches {
    intermediates: TempFiles,
    pages_rendered: usize,
    pages_skipped: usize,
}

/// Render every batch into an intermediate PDF, in order.
///
/// The returned set owns the intermediates; on error it is dropped and every
/// intermediate produced so far is deleted.
async fn render_batches<R: Renderer>(
    config: &BuildConfig,
    pages: &[Page],
    renderer: &R,
    progress: &dyn ProgressReporter,
) -> Result<RenderedBatches> {
    let sanitizer = Sanitizer::new(&config.sanitize)?;
    let batches = partition(pages, config.batch_size);
    let total = batches.len();
    let mut intermediates = TempFiles::new();
    let mut pages_rendered = 0;

    for batch in &batches {
        info!(
            batch = batch.ordinal,
            total,
            pages = batch.pages.len(),
            "generating batch"
        );

        let mut staged = TempFiles::new();
        let inputs = batch_inputs(config, batch, &sanitizer, &mut staged)?;
        pages_rendered += inputs.len();
        if inputs.is_empty() {
            warn!(batch = batch.ordinal, "no renderable pages in batch, skipping");
            continue;
        }

        let target = batch_path(&config.work_dir, batch.start);
        intermediates.register(target.clone());
        renderer.render(&inputs, &target).await?;
        staged.cleanup();

        progress.batch_rendered(batch.ordinal, total);

        if batch.ordinal < total && !config.batch_delay.is_zero() {
            tokio::time::sleep(config.batch_delay).await;
        }
    }

    Ok(RenderedBatches {
        intermediates,
        pages_rendered,
        pages_skipped: pages.len() - pages_rendered,
    })
}

/// Files handed to the renderer for one batch.
///
/// With sanitizing enabled each page is re-loaded, sanitized and written as a
/// staged copy; pages that fail to load are skipped. Otherwise the original
/// files are rendered as-is.
fn batch_inputs(
    config: &BuildConfig,
    batch: &Batch<'_>,
    sanitizer: &Sanitizer,
    staged: &mut TempFiles,
) -> Result<Vec<PathBuf>> {
    if !config.sanitize.enabled {
        return Ok(batch.pages.iter().map(|p| p.path.clone()).collect());
    }

    let mut inputs = Vec::with_capacity(batch.pages.len());
    for (offset, page) in batch.pages.iter().enumerate() {
        let html = match load_page(&page.path, sanitizer).and_then(|loaded| stage_html(&loaded)) {
            Ok(html) => html,
            Err(e) => {
                warn!(page = %page.label(), error = %e, "failed to stage page, skipping");
                continue;
            }
        };

        let path = staged_page_path(&config.work_dir, batch.start + offset);
        staged.register(path.clone());
        std::fs::write(&path, html).map_err(|e| DocBinderError::io(&path, e))?;
        debug!(page = %page.label(), staged = %path.display(), "page staged");
        inputs.push(path);
    }

    Ok(inputs)
}
