//! External HTML-to-PDF renderer.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::process::Command;
use tracing::{debug, instrument};

use docbinder_shared::{DocBinderError, RenderSection, Result};

/// Default renderer binary, looked up on `PATH`.
pub const DEFAULT_BINARY: &str = "wkhtmltopdf";

/// Page layout and engine switches passed to every renderer invocation.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub page_size: String,
    /// Applied to all four sides.
    pub margin: String,
    pub encoding: String,
    pub outline: bool,
    pub local_file_access: bool,
    pub javascript: bool,
    /// Settle time for scripts before a page is captured.
    pub javascript_delay_ms: u64,
    pub images: bool,
    pub background: bool,
    pub print_media_type: bool,
    /// Extra request headers as `(name, value)`.
    pub custom_headers: Vec<(String, String)>,
    pub quiet: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            page_size: "A4".into(),
            margin: "0.75in".into(),
            encoding: "UTF-8".into(),
            outline: false,
            local_file_access: true,
            javascript: true,
            javascript_delay_ms: 1000,
            images: true,
            background: false,
            print_media_type: true,
            custom_headers: vec![("Accept-Encoding".into(), "gzip".into())],
            quiet: true,
        }
    }
}

impl From<&RenderSection> for RenderOptions {
    fn from(section: &RenderSection) -> Self {
        Self {
            page_size: section.page_size.clone(),
            margin: section.margin.clone(),
            javascript_delay_ms: section.javascript_delay_ms,
            ..Self::default()
        }
    }
}

/// Turns a group of HTML files into one PDF document.
#[allow(async_fn_in_trait)]
pub trait Renderer {
    /// Render `inputs`, in order, into `output`.
    async fn render(&self, inputs: &[PathBuf], output: &Path) -> Result<()>;
}

/// Renderer backed by the `wkhtmltopdf` command-line tool.
#[derive(Debug, Clone)]
pub struct Wkhtmltopdf {
    binary: PathBuf,
    options: RenderOptions,
}

impl Wkhtmltopdf {
    pub fn new(binary: impl Into<PathBuf>, options: RenderOptions) -> Self {
        Self {
            binary: binary.into(),
            options,
        }
    }

    /// Full argument list for one invocation.
    pub fn args(&self, inputs: &[PathBuf], output: &Path) -> Vec<OsString> {
        let o = &self.options;
        let mut args: Vec<OsString> = Vec::new();
        let mut push = |s: &str| args.push(s.into());

        push("--page-size");
        push(&o.page_size);
        for side in ["top", "right", "bottom", "left"] {
            push(&format!("--margin-{side}"));
            push(&o.margin);
        }
        push("--encoding");
        push(&o.encoding);
        push(if o.outline { "--outline" } else { "--no-outline" });
        if o.local_file_access {
            push("--enable-local-file-access");
        }
        if o.javascript {
            push("--enable-javascript");
            push("--javascript-delay");
            push(&o.javascript_delay_ms.to_string());
        } else {
            push("--disable-javascript");
        }
        push(if o.images { "--images" } else { "--no-images" });
        push(if o.background { "--background" } else { "--no-background" });
        if o.print_media_type {
            push("--print-media-type");
        }
        for (name, value) in &o.custom_headers {
            push("--custom-header");
            push(name);
            push(value);
        }
        if o.quiet {
            push("--quiet");
        }

        args.extend(inputs.iter().map(|p| p.as_os_str().to_owned()));
        args.push(output.as_os_str().to_owned());
        args
    }
}

impl Renderer for Wkhtmltopdf {
    #[instrument(skip_all, fields(inputs = inputs.len(), output = %output.display()))]
    async fn render(&self, inputs: &[PathBuf], output: &Path) -> Result<()> {
        let args = self.args(inputs, output);
        debug!(binary = %self.binary.display(), ?args, "invoking renderer");

        let result = Command::new(&self.binary)
            .args(&args)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| {
                DocBinderError::Render(format!(
                    "failed to run {}: {e}",
                    self.binary.display()
                ))
            })?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            return Err(DocBinderError::Render(format!(
                "{} exited with {}: {}",
                self.binary.display(),
                result.status,
                stderr.trim()
            )));
        }

        if !output.is_file() {
            return Err(DocBinderError::Render(format!(
                "{} reported success but wrote no {}",
                self.binary.display(),
                output.display()
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(args: &[OsString]) -> Vec<String> {
        args.iter().map(|a| a.to_string_lossy().into_owned()).collect()
    }

    #[test]
    fn default_args_match_layout_contract() {
        let renderer = Wkhtmltopdf::new(DEFAULT_BINARY, RenderOptions::default());
        let inputs = vec![PathBuf::from("a.html"), PathBuf::from("b.html")];
        let args = strings(&renderer.args(&inputs, Path::new("temp_batch_0.pdf")));

        let expected: Vec<String> = "--page-size A4 \
            --margin-top 0.75in --margin-right 0.75in \
            --margin-bottom 0.75in --margin-left 0.75in \
            --encoding UTF-8 --no-outline --enable-local-file-access \
            --enable-javascript --javascript-delay 1000 \
            --images --no-background --print-media-type \
            --custom-header Accept-Encoding gzip --quiet \
            a.html b.html temp_batch_0.pdf"
            .split_whitespace()
            .map(String::from)
            .collect();
        assert_eq!(args, expected);
    }

    #[test]
    fn options_follow_render_section() {
        let section = RenderSection {
            page_size: "Letter".into(),
            margin: "1in".into(),
            javascript_delay_ms: 250,
            ..RenderSection::default()
        };
        let renderer = Wkhtmltopdf::new(DEFAULT_BINARY, RenderOptions::from(&section));
        let args = strings(&renderer.args(&[], Path::new("out.pdf")));

        assert_eq!(&args[..2], ["--page-size", "Letter"]);
        assert!(args.windows(2).any(|w| w == ["--margin-left", "1in"]));
        assert!(args.windows(2).any(|w| w == ["--javascript-delay", "250"]));
        assert_eq!(args.last().map(String::as_str), Some("out.pdf"));
    }

    #[tokio::test]
    async fn missing_binary_is_a_render_error() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = Wkhtmltopdf::new(
            dir.path().join("no-such-wkhtmltopdf"),
            RenderOptions::default(),
        );

        let err = renderer
            .render(&[dir.path().join("a.html")], &dir.path().join("out.pdf"))
            .await
            .unwrap_err();
        assert!(matches!(err, DocBinderError::Render(_)));
    }
}
