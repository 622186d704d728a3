//! End-to-end parsing pipeline tests

use std::fs;
use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

fn clipkit() -> Command {
    Command::new(env!("CARGO_BIN_EXE_clipkit"))
}

const ENGLISH_CLIPPINGS: &str = "\
The Stranger (Albert Camus)
- Your Highlight on page 5 | Location 64-65 | Added on Friday, May 30, 2014 12:05:42 AM

Mother died today.
==========
The Stranger (Albert Camus)
- Your Note on page 6 | Location 70 | Added on Friday, May 30, 2014 12:10:00 AM

Opening line, worth rereading.
==========
";

fn write_fixture(dir: &Path) -> std::path::PathBuf {
    let path = dir.join("My Clippings.txt");
    fs::write(&path, ENGLISH_CLIPPINGS).unwrap();
    path
}

#[test]
fn test_parse_with_explicit_language() {
    let temp_dir = TempDir::new().unwrap();
    let clippings = write_fixture(temp_dir.path());
    let json_path = temp_dir.path().join("out.json");

    let output = clipkit()
        .args([
            "parse",
            clippings.to_str().unwrap(),
            "--lang",
            "english",
            "--json",
            json_path.to_str().unwrap(),
        ])
        .output()
        .expect("Failed to run parse");

    assert!(
        output.status.success(),
        "Parse should succeed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("2 clippings parsed"),
        "Should report both entries: {stdout}"
    );

    let json = fs::read_to_string(&json_path).unwrap();
    assert!(json.contains("The Stranger"), "JSON should carry the title");
    assert!(json.contains("Albert Camus"), "JSON should carry the author");
    assert!(
        json.contains("highlight") && json.contains("note"),
        "JSON should carry both kinds"
    );
}

#[test]
fn test_parse_detects_language_when_omitted() {
    let temp_dir = TempDir::new().unwrap();
    let clippings = write_fixture(temp_dir.path());

    let output = clipkit()
        .args(["parse", clippings.to_str().unwrap()])
        .output()
        .expect("Failed to run parse");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("english"),
        "Should report the detected language: {stdout}"
    );
}

#[test]
fn test_wrong_language_is_rejected_without_force() {
    let temp_dir = TempDir::new().unwrap();
    let clippings = write_fixture(temp_dir.path());

    let output = clipkit()
        .args(["parse", clippings.to_str().unwrap(), "--lang", "spanish"])
        .output()
        .expect("Failed to run parse");

    assert!(
        !output.status.success(),
        "Incompatible language should be rejected"
    );
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("--force"),
        "Should point at the override: {stderr}"
    );
}

#[test]
fn test_wrong_language_with_force_parses_and_removes() {
    let temp_dir = TempDir::new().unwrap();
    let clippings = write_fixture(temp_dir.path());

    let output = clipkit()
        .args([
            "parse",
            clippings.to_str().unwrap(),
            "--lang",
            "spanish",
            "--force",
        ])
        .output()
        .expect("Failed to run parse");

    assert!(
        output.status.success(),
        "--force should allow the parse: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    // Spanish grammar matches nothing in an English file: everything counted,
    // nothing kept.
    assert!(stdout.contains("2 clippings parsed"), "{stdout}");
    assert!(stdout.contains("2 empty or malformed"), "{stdout}");
}

#[test]
fn test_parse_into_database() {
    let temp_dir = TempDir::new().unwrap();
    let clippings = write_fixture(temp_dir.path());
    let db_path = temp_dir.path().join("clippings.db");

    let output = clipkit()
        .args([
            "parse",
            clippings.to_str().unwrap(),
            "--lang",
            "english",
            "--database",
            db_path.to_str().unwrap(),
        ])
        .output()
        .expect("Failed to run parse");

    assert!(
        output.status.success(),
        "{}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("2 clippings added to database"),
        "{stdout}"
    );
    assert!(db_path.exists(), "Database file should be created");
}

#[test]
fn test_detect_command_reports_english() {
    let temp_dir = TempDir::new().unwrap();
    let clippings = write_fixture(temp_dir.path());

    let output = clipkit()
        .args(["detect", clippings.to_str().unwrap()])
        .output()
        .expect("Failed to run detect");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("Detected language: english"),
        "{stdout}"
    );
}

#[test]
fn test_detect_command_on_plain_prose_is_unknown() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("prose.txt");
    fs::write(&path, "Just some text.\nNothing clipping-like here.\n").unwrap();

    let output = clipkit()
        .args(["detect", path.to_str().unwrap()])
        .output()
        .expect("Failed to run detect");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("unknown"), "{stdout}");
}

#[test]
fn test_preview_is_line_bounded() {
    let temp_dir = TempDir::new().unwrap();
    let clippings = write_fixture(temp_dir.path());

    let output = clipkit()
        .args(["preview", clippings.to_str().unwrap(), "--lines", "2"])
        .output()
        .expect("Failed to run preview");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("The Stranger"), "{stdout}");
    assert!(
        !stdout.contains("Mother died today."),
        "Line 4 must be outside a 2-line preview: {stdout}"
    );
}

#[test]
fn test_empty_file_parses_to_zero_counts() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("empty.txt");
    fs::write(&path, "").unwrap();

    let output = clipkit()
        .args([
            "parse",
            path.to_str().unwrap(),
            "--lang",
            "english",
            "--force",
        ])
        .output()
        .expect("Failed to run parse");

    assert!(
        output.status.success(),
        "Empty files are not unreadable: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("0 clippings parsed"), "{stdout}");
}
