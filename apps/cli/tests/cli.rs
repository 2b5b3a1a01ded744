//! End-to-end checks of the `docbinder` binary that need no renderer.

use std::path::Path;
use std::process::{Command, Output};

fn docbinder(home: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_docbinder"))
        .args(args)
        .env("HOME", home)
        .env_remove("DOCBINDER_WKHTMLTOPDF")
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run docbinder")
}

fn write(path: &Path, contents: &str) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, contents).unwrap();
}

#[test]
fn missing_root_file_exits_with_error_and_no_output() {
    let dir = tempfile::tempdir().unwrap();
    let docs = dir.path().join("docs");
    std::fs::create_dir_all(&docs).unwrap();
    let output = dir.path().join("manual.pdf");

    let result = docbinder(
        dir.path(),
        &[
            "--docs-folder",
            docs.to_str().unwrap(),
            "--output",
            output.to_str().unwrap(),
            "--work-dir",
            dir.path().to_str().unwrap(),
        ],
    );

    assert_eq!(result.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&result.stderr);
    assert!(stderr.contains("starting file not found"), "stderr: {stderr}");
    assert!(!output.exists());
}

#[test]
fn dry_run_lists_crawl_order() {
    let dir = tempfile::tempdir().unwrap();
    let docs = dir.path().join("docs");
    write(
        &docs.join("Manual/Index.html"),
        r#"<html><body><main>
            <a href="B.html">B</a>
            <a href="../ScriptReference/X.html">X</a>
            <a href="A.html#top">A</a>
        </main></body></html>"#,
    );
    write(&docs.join("Manual/A.html"), "<html><body><main>A</main></body></html>");
    write(&docs.join("Manual/B.html"), "<html><body><main>B</main></body></html>");
    write(&docs.join("ScriptReference/X.html"), "<html></html>");

    let result = docbinder(
        dir.path(),
        &[
            "--docs-folder",
            docs.to_str().unwrap(),
            "--root-file",
            "Manual/Index.html",
            "--dry-run",
        ],
    );

    assert!(result.status.success(), "stderr: {}", String::from_utf8_lossy(&result.stderr));
    let stdout = String::from_utf8_lossy(&result.stdout);
    let listed: Vec<&str> = stdout
        .lines()
        .filter_map(|line| line.split('\t').nth(1))
        .collect();
    assert_eq!(listed, vec!["Manual/Index.html", "Manual/B.html", "Manual/A.html"]);
}

#[test]
fn dry_run_lists_toc_titles_with_indent() {
    let dir = tempfile::tempdir().unwrap();
    let docs = dir.path().join("docs");
    write(&docs.join("A.html"), "<html></html>");
    write(&docs.join("B.html"), "<html></html>");
    write(
        &docs.join("toc.json"),
        r#"[{"link":"A","title":"Intro","children":[{"link":"B","title":"Sub"}]}]"#,
    );

    let result = docbinder(
        dir.path(),
        &[
            "--docs-folder",
            docs.to_str().unwrap(),
            "--mode",
            "toc",
            "--root-file",
            "A.html",
            "--dry-run",
        ],
    );

    assert!(result.status.success(), "stderr: {}", String::from_utf8_lossy(&result.stderr));
    let stdout = String::from_utf8_lossy(&result.stdout);
    assert_eq!(
        stdout.lines().collect::<Vec<_>>(),
        vec!["Intro\tA.html", "  Sub\tB.html"]
    );
}

#[test]
fn zero_batch_size_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let docs = dir.path().join("docs");
    std::fs::create_dir_all(&docs).unwrap();

    let result = docbinder(
        dir.path(),
        &[
            "--docs-folder",
            docs.to_str().unwrap(),
            "--batch-size",
            "0",
            "--dry-run",
        ],
    );

    assert_eq!(result.status.code(), Some(1));
}

#[test]
fn toc_mode_without_root_file_exits_with_error_and_no_output() {
    let dir = tempfile::tempdir().unwrap();
    let docs = dir.path().join("docs");
    write(&docs.join("A.html"), "<html></html>");
    write(&docs.join("toc.json"), r#"[{"link":"A","title":"Intro"}]"#);
    let output = dir.path().join("unity_manual.pdf");

    let result = docbinder(
        dir.path(),
        &[
            "--docs-folder",
            docs.to_str().unwrap(),
            "--mode",
            "toc",
            "--output",
            output.to_str().unwrap(),
            "--work-dir",
            dir.path().to_str().unwrap(),
        ],
    );

    assert_eq!(result.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&result.stderr);
    assert!(stderr.contains("starting file not found"), "stderr: {stderr}");
    assert!(!output.exists());
}
