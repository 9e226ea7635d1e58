//! Tests for markup-tree replacement.

use std::path::Path;

use quick_xml::events::Event;
use quick_xml::Reader;
use textswap::markup::replace_in_markup;
use textswap::ReplacementSpec;

/// Count start/empty element events in a document.
fn count_elements(path: &Path) -> usize {
    let content = std::fs::read_to_string(path).unwrap();
    let mut reader = Reader::from_str(&content);
    let mut count = 0;
    loop {
        match reader.read_event().unwrap() {
            Event::Start(_) | Event::Empty(_) => count += 1,
            Event::Eof => break,
            _ => {}
        }
    }
    count
}

#[test]
fn test_replaces_attribute_values_and_text() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("doc.xml");
    std::fs::write(&input, r#"<a b="foo">foo text</a>"#).unwrap();

    let spec = ReplacementSpec::new("foo", "X").unwrap();
    let output = replace_in_markup(&input, &spec).unwrap();

    let content = std::fs::read_to_string(&output).unwrap();
    assert!(content.contains(r#"b="X""#), "got: {content}");
    assert!(content.contains(">X text<"), "got: {content}");
}

#[test]
fn test_tail_text_is_replaced() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("doc.xml");
    std::fs::write(&input, "<r><c>inner foo</c>tail foo here</r>").unwrap();

    let spec = ReplacementSpec::new("foo", "bar").unwrap();
    let output = replace_in_markup(&input, &spec).unwrap();

    let content = std::fs::read_to_string(&output).unwrap();
    assert!(content.contains("inner bar"));
    assert!(content.contains("tail bar here"));
}

#[test]
fn test_element_and_attribute_names_never_altered() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("doc.xml");
    std::fs::write(&input, r#"<foo foo="foo">foo</foo>"#).unwrap();

    let spec = ReplacementSpec::new("foo", "bar").unwrap();
    let output = replace_in_markup(&input, &spec).unwrap();

    let content = std::fs::read_to_string(&output).unwrap();
    assert!(content.contains(r#"<foo foo="bar">bar</foo>"#), "got: {content}");
}

#[test]
fn test_element_count_preserved() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("doc.xml");
    std::fs::write(
        &input,
        "<root><a x=\"foo\"/><b>foo</b><c><d>deep foo</d></c></root>",
    )
    .unwrap();

    let spec = ReplacementSpec::new("foo", "a longer replacement").unwrap();
    let output = replace_in_markup(&input, &spec).unwrap();

    assert_eq!(count_elements(&output), count_elements(&input));
}

#[test]
fn test_no_match_preserves_content() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("doc.xml");
    std::fs::write(&input, r#"<a b="one">two</a>"#).unwrap();

    let spec = ReplacementSpec::new("absent", "x").unwrap();
    let output = replace_in_markup(&input, &spec).unwrap();

    let content = std::fs::read_to_string(&output).unwrap();
    assert!(content.contains(r#"<a b="one">two</a>"#), "got: {content}");
}

#[test]
fn test_output_has_standard_declaration() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("doc.xml");
    // Input with no declaration at all
    std::fs::write(&input, "<a>x</a>").unwrap();

    let spec = ReplacementSpec::new("x", "y").unwrap();
    let output = replace_in_markup(&input, &spec).unwrap();

    let content = std::fs::read_to_string(&output).unwrap();
    assert!(content.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
    // Only one declaration even when the input carries its own
    let input2 = dir.path().join("doc2.xml");
    std::fs::write(&input2, "<?xml version=\"1.0\" encoding=\"UTF-8\"?><a>x</a>").unwrap();
    let output2 = replace_in_markup(&input2, &spec).unwrap();
    let content2 = std::fs::read_to_string(&output2).unwrap();
    assert_eq!(content2.matches("<?xml").count(), 1);
}

#[test]
fn test_malformed_markup_fails() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("bad.xml");
    std::fs::write(&input, "<a><b></a>").unwrap();

    let spec = ReplacementSpec::new("foo", "bar").unwrap();
    assert!(replace_in_markup(&input, &spec).is_err());
}
