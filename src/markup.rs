//! Markup-tree (XML) replacement.
//!
//! Rewrites the document event-for-event: substitution is applied to text
//! content, CDATA sections, and attribute values; element tag names and
//! attribute names are never altered. Because the event stream is
//! order-preserving, element text and trailing (tail) text are both plain
//! text events, and element ordering, nesting, and attribute ordering all
//! survive the rewrite. The output always opens with a standard UTF-8
//! declaration; comments and processing instructions pass through
//! unchanged.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use quick_xml::events::{BytesCData, BytesDecl, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

use crate::dispatch::modified_path;
use crate::error::Result;
use crate::substitution::ReplacementSpec;

/// Replace text in element content, tail text, and attribute values of an
/// XML file, writing the result next to the input as `<stem>_modified.xml`.
pub fn replace_in_markup(path: &Path, spec: &ReplacementSpec) -> Result<PathBuf> {
    let mut reader = Reader::from_reader(BufReader::new(File::open(path)?));
    let output = modified_path(path);
    let mut writer = Writer::new(BufWriter::new(File::create(&output)?));

    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(element) => {
                writer.write_event(Event::Start(rewrite_element(&element, spec)?))?;
            }
            Event::Empty(element) => {
                writer.write_event(Event::Empty(rewrite_element(&element, spec)?))?;
            }
            Event::Text(text) => {
                let content = text.unescape()?;
                writer.write_event(Event::Text(BytesText::new(&spec.apply(&content))))?;
            }
            Event::CData(cdata) => {
                let content = String::from_utf8_lossy(&cdata.into_inner()).into_owned();
                writer.write_event(Event::CData(BytesCData::new(spec.apply(&content))))?;
            }
            // The input declaration is superseded by the one already written
            Event::Decl(_) => {}
            Event::Eof => break,
            other => writer.write_event(other)?,
        }
        buf.clear();
    }

    writer.into_inner().flush()?;
    Ok(output)
}

/// Rebuild a start/empty tag with the substitution applied to attribute
/// values only. The tag name and attribute names are copied verbatim.
fn rewrite_element(element: &BytesStart<'_>, spec: &ReplacementSpec) -> Result<BytesStart<'static>> {
    let name = String::from_utf8_lossy(element.name().as_ref()).into_owned();
    let mut rebuilt = BytesStart::new(name);
    for attribute in element.attributes() {
        let attribute = attribute.map_err(quick_xml::Error::from)?;
        let key = String::from_utf8_lossy(attribute.key.as_ref()).into_owned();
        let value = attribute.unescape_value()?;
        rebuilt.push_attribute((key.as_str(), spec.apply(&value).as_str()));
    }
    Ok(rebuilt)
}
