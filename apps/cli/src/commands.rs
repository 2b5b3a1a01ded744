//! CLI definition, config resolution, and tracing setup.

use std::path::{Path, PathBuf};

use clap::Parser;
use color_eyre::eyre::{Result, eyre};
use docbinder_core::{BuildConfig, BuildResult, ProgressReporter, build_pdf, collect_pages};
use docbinder_render::{DEFAULT_BINARY, RenderOptions, Wkhtmltopdf};
use docbinder_shared::{AppConfig, TraversalMode, load_config, load_config_from};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// DocBinder: bind a local HTML documentation tree into one PDF.
#[derive(Parser)]
#[command(
    name = "docbinder",
    version,
    about = "Bind a locally mirrored HTML documentation tree into a single PDF.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Documentation root folder.
    #[arg(long)]
    pub docs_folder: PathBuf,

    /// Output PDF path.
    #[arg(short, long, default_value = "unity_manual.pdf")]
    pub output: PathBuf,

    /// Page discovery mode.
    #[arg(long)]
    pub mode: Option<Mode>,

    /// TOC sidecar path (defaults to <docs-folder>/toc.json).
    #[arg(long)]
    pub toc: Option<PathBuf>,

    /// Root page, relative to the docs folder.
    #[arg(long)]
    pub root_file: Option<String>,

    /// Maximum pages processed in crawl mode.
    #[arg(long)]
    pub max_pages: Option<usize>,

    /// Pages per intermediate PDF.
    #[arg(long)]
    pub batch_size: Option<usize>,

    /// Pause between renderer invocations, in milliseconds.
    #[arg(long)]
    pub batch_delay_ms: Option<u64>,

    /// Directory for intermediate files (defaults to the current directory).
    #[arg(long)]
    pub work_dir: Option<PathBuf>,

    /// Renderer binary.
    #[arg(long, env = "DOCBINDER_WKHTMLTOPDF")]
    pub wkhtmltopdf: Option<String>,

    /// Render original files instead of sanitized copies.
    #[arg(long)]
    pub raw: bool,

    /// Explicit config file.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Print the ordered page list and exit without rendering.
    #[arg(long)]
    pub dry_run: bool,

    /// Log format: text (default) or json.
    #[arg(long, default_value = "text")]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Page discovery mode.
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub(crate) enum Mode {
    Crawl,
    Toc,
}

impl From<Mode> for TraversalMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Crawl => TraversalMode::Crawl,
            Mode::Toc => TraversalMode::Toc,
        }
    }
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags. Logs go to stderr.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "docbinder=info",
        1 => "docbinder=debug",
        _ => "docbinder=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command
// ---------------------------------------------------------------------------

/// Resolve configuration and run the build (or the dry run).
pub(crate) async fn run(cli: Cli) -> Result<()> {
    if !cli.docs_folder.is_dir() {
        return Err(eyre!(
            "docs folder '{}' is not a directory",
            cli.docs_folder.display()
        ));
    }

    let app = resolve_config(&cli)?;
    let work_dir = match &cli.work_dir {
        Some(dir) => dir.clone(),
        None => std::env::current_dir()
            .map_err(|e| eyre!("cannot determine working directory: {e}"))?,
    };
    let config = BuildConfig::from_app(
        &app,
        &cli.docs_folder,
        cli.output.clone(),
        work_dir,
        cli.toc.as_deref(),
    );

    if cli.dry_run {
        return dry_run(&config);
    }

    let binary = app
        .render
        .wkhtmltopdf
        .clone()
        .unwrap_or_else(|| DEFAULT_BINARY.to_string());
    let renderer = Wkhtmltopdf::new(binary, RenderOptions::from(&app.render));

    info!(
        docs = %config.docs_root.display(),
        output = %config.output.display(),
        mode = ?config.mode,
        batch_size = config.batch_size,
        "binding documentation"
    );

    let reporter = CliProgress::new();
    let result = build_pdf(&config, &renderer, &reporter).await?;

    println!();
    match &result.output {
        Some(path) => {
            println!("  PDF written!");
            println!("  Path:    {}", path.display());
        }
        None => println!("  No pages found, nothing written."),
    }
    println!("  Pages:   {}", result.page_count);
    if result.pages_skipped > 0 {
        println!("  Skipped: {}", result.pages_skipped);
    }
    println!("  Batches: {}", result.batch_count);
    println!("  PDF:     {} pages", result.pdf_pages);
    println!("  Time:    {:.1}s", result.elapsed.as_secs_f64());
    println!();

    Ok(())
}

/// Config file (explicit or default location), then CLI flag overrides.
fn resolve_config(cli: &Cli) -> Result<AppConfig> {
    let mut app = match &cli.config {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    };

    if let Some(mode) = cli.mode {
        app.crawl.mode = mode.into();
    }
    if let Some(root_file) = &cli.root_file {
        app.crawl.root_file = root_file.clone();
    }
    if let Some(max_pages) = cli.max_pages {
        app.crawl.max_pages = max_pages;
    }
    if let Some(batch_size) = cli.batch_size {
        app.render.batch_size = batch_size;
    }
    if let Some(delay) = cli.batch_delay_ms {
        app.render.batch_delay_ms = delay;
    }
    if let Some(binary) = &cli.wkhtmltopdf {
        app.render.wkhtmltopdf = Some(binary.clone());
    }
    if cli.raw {
        app.sanitize.enabled = false;
    }

    app.validate()?;
    Ok(app)
}

fn dry_run(config: &BuildConfig) -> Result<()> {
    let pages = collect_pages(config)?;
    for page in &pages {
        let title = match &page.title {
            Some(title) => title.clone(),
            None => page
                .path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default(),
        };
        println!("{title}\t{}", relative(&page.path, &config.docs_root));
    }
    info!(pages = pages.len(), "dry run complete, nothing rendered");
    Ok(())
}

fn relative(path: &Path, root: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .display()
        .to_string()
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn pages_collected(&self, count: usize) {
        self.spinner.set_message(format!("Collected {count} pages"));
    }

    fn batch_rendered(&self, current: usize, total: usize) {
        self.spinner
            .set_message(format!("Rendered batch [{current}/{total}]"));
    }

    fn done(&self, _result: &BuildResult) {
        self.spinner.finish_and_clear();
    }
}

/// Clears the spinner on every exit path, so an error report starts on a clean line.
impl Drop for CliProgress {
    fn drop(&mut self) {
        if !self.spinner.is_finished() {
            self.spinner.finish_and_clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spinner_is_cleared_when_dropped_without_done() {
        let progress = CliProgress::new();
        let spinner = progress.spinner.clone();
        progress.phase("Rendering batches");

        drop(progress);

        assert!(spinner.is_finished());
    }

    #[test]
    fn flags_override_config_values() {
        let cli = Cli::parse_from([
            "docbinder",
            "--docs-folder",
            "docs",
            "--mode",
            "toc",
            "--batch-size",
            "5",
            "--raw",
        ]);
        assert_eq!(cli.output, PathBuf::from("unity_manual.pdf"));

        let app = resolve_config(&cli).unwrap();
        assert_eq!(app.crawl.mode, TraversalMode::Toc);
        assert_eq!(app.render.batch_size, 5);
        assert!(!app.sanitize.enabled);
    }
}
