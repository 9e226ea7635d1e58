//! Two-phase content-stream text replacement.
//!
//! Phase one walks a page's operators with a small text-state tracker
//! (font size from `Tf`, baseline from `Td`/`TD`/`Tm`/`T*`) and records an
//! [`Occurrence`] for every text-showing operator whose decoded text
//! contains the target. Phase two rebuilds the stream: matched operators
//! are dropped (erasing their glyphs), a white rectangle is painted over
//! each erased region, and the operator's full text, with the substitution
//! applied, is re-rendered at the recorded baseline in Times-Roman at the
//! inferred size. The phases never interleave, because mutation would
//! invalidate the positions the scan relies on.
//!
//! Limitations, by design: the replacement face is always Times-Roman
//! (font family is not preserved, only approximate size), and matches do
//! not span show-operator boundaries, so text fragmented across operators
//! is not found.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use log::debug;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId};

use crate::dispatch::modified_path;
use crate::error::Result;
use crate::substitution::ReplacementSpec;

/// Fallback typeface used for every re-rendered region.
const FALLBACK_FONT: &str = "Times-Roman";
/// Display size used when no `Tf` operator precedes the match.
const DEFAULT_FONT_SIZE: f32 = 12.0;
/// Resource name the fallback font is registered under on touched pages.
const FONT_RESOURCE_NAME: &str = "FSwap0";
/// Approximate advance width per character, as a fraction of the size.
const GLYPH_WIDTH_FACTOR: f32 = 0.5;

/// A located match: the operator it occurred in, the text baseline, the
/// inferred display size, and the operator's text after substitution.
struct Occurrence {
    operator_index: usize,
    x: f32,
    y: f32,
    font_size: f32,
    erased_chars: usize,
    replacement: String,
}

/// Minimal text-state tracker: enough of the PDF text machinery to place
/// simple page text (translation-only text matrices).
struct TextState {
    font_size: f32,
    leading: f32,
    line_x: f32,
    line_y: f32,
}

impl TextState {
    fn new() -> Self {
        Self {
            font_size: DEFAULT_FONT_SIZE,
            leading: 0.0,
            line_x: 0.0,
            line_y: 0.0,
        }
    }

    fn begin_text(&mut self) {
        self.line_x = 0.0;
        self.line_y = 0.0;
    }

    fn translate(&mut self, tx: f32, ty: f32) {
        self.line_x += tx;
        self.line_y += ty;
    }

    fn set_origin(&mut self, x: f32, y: f32) {
        self.line_x = x;
        self.line_y = y;
    }

    fn next_line(&mut self) {
        self.line_y -= self.leading;
    }
}

/// Replace every visible occurrence of the target text in a PDF, writing
/// the result next to the input as `<stem>_modified.pdf`.
///
/// Page count and geometry are preserved; pages without a match are left
/// untouched. Fails without partial output if the document cannot be
/// opened or re-serialized.
pub fn replace_in_pdf(path: &Path, spec: &ReplacementSpec) -> Result<PathBuf> {
    let mut doc = Document::load(path)?;
    let pages: Vec<ObjectId> = doc.get_pages().into_values().collect();
    let mut fallback_font: Option<ObjectId> = None;

    for page_id in pages {
        let data = doc.get_page_content(page_id)?;
        let content = Content::decode(&data)?;

        // Phase one: immutable scan
        let occurrences = scan_operations(&content.operations, spec);
        if occurrences.is_empty() {
            continue;
        }
        debug!(
            "page {:?}: {} matching text operator(s)",
            page_id,
            occurrences.len()
        );

        // Phase two: rebuild the stream from the scan results
        let operations = rebuild_operations(content.operations, &occurrences);
        doc.change_page_content(page_id, Content { operations }.encode()?)?;

        let font_id = *fallback_font.get_or_insert_with(|| {
            doc.add_object(dictionary! {
                "Type" => "Font",
                "Subtype" => "Type1",
                "BaseFont" => FALLBACK_FONT,
            })
        });
        register_fallback_font(&mut doc, page_id, font_id)?;
    }

    let output = modified_path(path);
    doc.save(&output)?;
    Ok(output)
}

/// Extract the text shown on each page, in operator order.
///
/// Decodes text-showing operators the same way the replacement scan does,
/// joining operator texts with single spaces. Intended for verifying
/// replacement results; this is not a layout-aware extractor.
pub fn extract_page_texts(path: &Path) -> Result<Vec<String>> {
    let doc = Document::load(path)?;
    let mut pages = Vec::new();
    for (_number, page_id) in doc.get_pages() {
        let content = Content::decode(&doc.get_page_content(page_id)?)?;
        let mut text = String::new();
        for operation in &content.operations {
            if let Some(shown) = operator_text(operation) {
                if !text.is_empty() {
                    text.push(' ');
                }
                text.push_str(&shown);
            }
        }
        pages.push(text);
    }
    Ok(pages)
}

fn scan_operations(operations: &[Operation], spec: &ReplacementSpec) -> Vec<Occurrence> {
    let mut state = TextState::new();
    let mut occurrences = Vec::new();

    for (index, operation) in operations.iter().enumerate() {
        match operation.operator.as_str() {
            "BT" => state.begin_text(),
            "Tf" => {
                if let Some(size) = operation.operands.get(1).and_then(number) {
                    state.font_size = size;
                }
            }
            "TL" => {
                if let Some(leading) = operation.operands.first().and_then(number) {
                    state.leading = leading;
                }
            }
            "Td" => {
                if let (Some(tx), Some(ty)) = operand_pair(operation) {
                    state.translate(tx, ty);
                }
            }
            "TD" => {
                if let (Some(tx), Some(ty)) = operand_pair(operation) {
                    state.leading = -ty;
                    state.translate(tx, ty);
                }
            }
            "Tm" => {
                let e = operation.operands.get(4).and_then(number);
                let f = operation.operands.get(5).and_then(number);
                if let (Some(e), Some(f)) = (e, f) {
                    state.set_origin(e, f);
                }
            }
            "T*" => state.next_line(),
            "'" | "\"" => {
                state.next_line();
                record_match(index, operation, &state, spec, &mut occurrences);
            }
            "Tj" | "TJ" => {
                record_match(index, operation, &state, spec, &mut occurrences);
            }
            _ => {}
        }
    }
    occurrences
}

fn record_match(
    index: usize,
    operation: &Operation,
    state: &TextState,
    spec: &ReplacementSpec,
    occurrences: &mut Vec<Occurrence>,
) {
    if let Some(text) = operator_text(operation) {
        if spec.matches(&text) {
            occurrences.push(Occurrence {
                operator_index: index,
                x: state.line_x,
                y: state.line_y,
                font_size: state.font_size,
                erased_chars: text.chars().count(),
                replacement: spec.apply(&text),
            });
        }
    }
}

fn rebuild_operations(operations: Vec<Operation>, occurrences: &[Occurrence]) -> Vec<Operation> {
    let erased: HashSet<usize> = occurrences.iter().map(|o| o.operator_index).collect();
    let mut rebuilt: Vec<Operation> = operations
        .into_iter()
        .enumerate()
        .filter(|(index, _)| !erased.contains(index))
        .map(|(_, operation)| operation)
        .collect();
    for occurrence in occurrences {
        rebuilt.extend(overlay_operations(occurrence));
    }
    rebuilt
}

/// Paint over the erased region, then draw the substituted text at the
/// recorded baseline in the fallback face.
fn overlay_operations(occurrence: &Occurrence) -> Vec<Operation> {
    let size = occurrence.font_size;
    let width = occurrence.erased_chars as f32 * size * GLYPH_WIDTH_FACTOR;
    let height = size * 1.2;
    let rect_bottom = occurrence.y - size * 0.25;
    vec![
        Operation::new("q", vec![]),
        Operation::new("rg", vec![1.0_f32.into(), 1.0_f32.into(), 1.0_f32.into()]),
        Operation::new(
            "re",
            vec![
                occurrence.x.into(),
                rect_bottom.into(),
                width.into(),
                height.into(),
            ],
        ),
        Operation::new("f", vec![]),
        Operation::new("Q", vec![]),
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec![FONT_RESOURCE_NAME.into(), size.into()]),
        Operation::new("Td", vec![occurrence.x.into(), occurrence.y.into()]),
        Operation::new(
            "Tj",
            vec![Object::string_literal(encode_simple(&occurrence.replacement))],
        ),
        Operation::new("ET", vec![]),
    ]
}

/// Decode the text shown by a text-showing operator, if it is one.
///
/// `TJ` arrays are concatenated across their string elements (kerning
/// adjustments are ignored). Bytes are decoded one-per-character, which
/// covers simple single-byte fonts; composite-font text is matched on its
/// raw byte interpretation.
fn operator_text(operation: &Operation) -> Option<String> {
    match operation.operator.as_str() {
        "Tj" | "'" => operation.operands.last().and_then(string_bytes).map(decode_simple),
        "\"" => operation.operands.get(2).and_then(string_bytes).map(decode_simple),
        "TJ" => {
            let items = match operation.operands.first() {
                Some(Object::Array(items)) => items,
                _ => return None,
            };
            let mut text = String::new();
            for item in items {
                if let Some(bytes) = string_bytes(item) {
                    text.push_str(&decode_simple(bytes));
                }
            }
            Some(text)
        }
        _ => None,
    }
}

fn string_bytes(object: &Object) -> Option<&[u8]> {
    match object {
        Object::String(bytes, _) => Some(bytes),
        _ => None,
    }
}

fn decode_simple(bytes: &[u8]) -> String {
    bytes.iter().map(|&byte| byte as char).collect()
}

fn encode_simple(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| if (c as u32) < 256 { c as u8 } else { b'?' })
        .collect()
}

fn number(object: &Object) -> Option<f32> {
    match object {
        Object::Integer(value) => Some(*value as f32),
        Object::Real(value) => Some(*value as f32),
        _ => None,
    }
}

fn operand_pair(operation: &Operation) -> (Option<f32>, Option<f32>) {
    (
        operation.operands.first().and_then(number),
        operation.operands.get(1).and_then(number),
    )
}

/// Register the fallback font in the page's resources under
/// [`FONT_RESOURCE_NAME`], creating the resources or font dictionaries if
/// the page has none. Both may be inline or indirect.
fn register_fallback_font(doc: &mut Document, page_id: ObjectId, font_id: ObjectId) -> Result<()> {
    let resources_location = {
        let page = doc.get_object(page_id)?.as_dict()?;
        match page.get(b"Resources") {
            Ok(Object::Reference(id)) => Some(Some(*id)),
            Ok(_) => Some(None),
            Err(_) => None,
        }
    };
    let resources_id = match resources_location {
        Some(location) => location,
        None => {
            doc.get_object_mut(page_id)?
                .as_dict_mut()?
                .set("Resources", Object::Dictionary(Dictionary::new()));
            None
        }
    };

    let fonts_location = {
        let resources = resources_mut(doc, page_id, resources_id)?;
        match resources.get(b"Font") {
            Ok(Object::Reference(id)) => Some(*id),
            Ok(_) => None,
            Err(_) => {
                resources.set("Font", Object::Dictionary(Dictionary::new()));
                None
            }
        }
    };
    let fonts = match fonts_location {
        Some(id) => doc.get_object_mut(id)?.as_dict_mut()?,
        None => resources_mut(doc, page_id, resources_id)?
            .get_mut(b"Font")?
            .as_dict_mut()?,
    };
    fonts.set(FONT_RESOURCE_NAME, Object::Reference(font_id));
    Ok(())
}

fn resources_mut(
    doc: &mut Document,
    page_id: ObjectId,
    resources_id: Option<ObjectId>,
) -> Result<&mut Dictionary> {
    match resources_id {
        Some(id) => Ok(doc.get_object_mut(id)?.as_dict_mut()?),
        None => Ok(doc
            .get_object_mut(page_id)?
            .as_dict_mut()?
            .get_mut(b"Resources")?
            .as_dict_mut()?),
    }
}
