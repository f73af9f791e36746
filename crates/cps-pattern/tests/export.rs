//! Integration tests for SVG export.

#![expect(
    clippy::expect_used,
    reason = "test code uses expect for clear failure messages"
)]

use std::fs;

use camino::{Utf8Path, Utf8PathBuf};
use cps_pattern::{PatternError, export_svg, render, render_default};
use rstest::{fixture, rstest};
use tempfile::TempDir;

#[fixture]
fn export_dir() -> TempDir {
    tempfile::tempdir().expect("create temp dir")
}

fn utf8(dir: &TempDir) -> &Utf8Path {
    Utf8Path::from_path(dir.path()).expect("temp dir path is UTF-8")
}

#[rstest]
fn writes_markup_under_identifier_file_name(export_dir: TempDir) {
    let image = render_default("CPS00000000").expect("default size renders");
    let path = export_svg(utf8(&export_dir), &image).expect("export succeeds");

    assert_eq!(
        path.file_name(),
        Some("chakula-poa-qr-CPS00000000.svg"),
        "export should use the identifier file name"
    );
    let written = fs::read_to_string(&path).expect("read exported file");
    assert_eq!(written, image.svg());
}

#[rstest]
fn re_export_replaces_previous_file(export_dir: TempDir) {
    let small = render("CPS00000000", 21).expect("minimum size renders");
    let large = render("CPS00000000", 420).expect("large size renders");

    export_svg(utf8(&export_dir), &small).expect("first export");
    let path = export_svg(utf8(&export_dir), &large).expect("second export");

    let written = fs::read_to_string(&path).expect("read exported file");
    assert_eq!(written, large.svg());
    let entries = fs::read_dir(export_dir.path())
        .expect("list export dir")
        .count();
    assert_eq!(entries, 1, "temporary files must not be left behind");
}

#[rstest]
fn missing_directory_is_reported(export_dir: TempDir) {
    let missing: Utf8PathBuf = utf8(&export_dir).join("missing");
    let image = render_default("CPS00000000").expect("default size renders");

    let error = export_svg(&missing, &image).expect_err("export should fail");
    assert!(
        matches!(error, PatternError::OpenDirError { ref path, .. } if *path == missing),
        "unexpected error: {error:?}"
    );
}
