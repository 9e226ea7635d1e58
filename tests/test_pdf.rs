//! Tests for PDF text replacement.

mod common;

use textswap::dispatch;
use textswap::pdf::{extract_page_texts, replace_in_pdf};
use textswap::ReplacementSpec;

#[test]
fn test_replaces_text_on_page() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("doc.pdf");
    common::build_pdf(&input, &["Hello foo world", "second line"]);

    let spec = ReplacementSpec::new("foo", "qux").unwrap();
    let output = replace_in_pdf(&input, &spec).unwrap();

    assert!(output.exists());
    let pages = extract_page_texts(&output).unwrap();
    assert_eq!(pages.len(), 1);
    assert!(pages[0].contains("Hello qux world"), "got: {}", pages[0]);
    assert!(!pages[0].contains("foo"));
    assert!(pages[0].contains("second line"));
}

#[test]
fn test_no_match_leaves_text_unchanged() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("doc.pdf");
    common::build_pdf(&input, &["nothing to see here"]);

    let spec = ReplacementSpec::new("absent", "x").unwrap();
    let output = replace_in_pdf(&input, &spec).unwrap();

    assert_eq!(
        extract_page_texts(&output).unwrap(),
        extract_page_texts(&input).unwrap()
    );
}

#[test]
fn test_page_count_and_untouched_pages_preserved() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("doc.pdf");
    common::build_pdf_pages(&input, &[&["replace foo here"], &["leave this page alone"]]);

    let spec = ReplacementSpec::new("foo", "bar").unwrap();
    let output = replace_in_pdf(&input, &spec).unwrap();

    let pages = extract_page_texts(&output).unwrap();
    assert_eq!(pages.len(), 2);
    assert!(pages.iter().any(|p| p.contains("replace bar here")));
    assert!(pages.iter().any(|p| p == "leave this page alone"));
}

#[test]
fn test_unparseable_pdf_fails_without_output() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("broken.pdf");
    std::fs::write(&input, b"this is not a pdf at all").unwrap();

    let spec = ReplacementSpec::new("foo", "bar").unwrap();
    assert!(replace_in_pdf(&input, &spec).is_err());
    assert!(!dir.path().join("broken_modified.pdf").exists());
}

#[test]
fn test_replacement_through_dispatcher() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("report.pdf");
    common::build_pdf(&input, &["confidential foo data"]);

    let spec = ReplacementSpec::new("foo", "").unwrap();
    let processed = dispatch::replace_in_file(&input, &spec).unwrap();

    assert_eq!(processed.display_name, "modified_report.pdf");
    let pages = extract_page_texts(&processed.output_path).unwrap();
    assert!(pages[0].contains("confidential  data"));
}
