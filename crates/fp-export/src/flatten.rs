//! The flattening engine.
//!
//! Loads the source PDF, draws every field's content into the matching
//! page as ordinary content-stream operators, and serializes the
//! result. Field geometry is stored y-down from the page's top-left
//! corner, while PDF user space is y-up from the bottom-left, so every
//! draw goes through a `page_height - y - height` flip.
//!
//! Export never fails because of one bad field: a field whose content
//! cannot be drawn (undecodable signature image, kind/content mismatch)
//! degrades to a muted placeholder label and is logged.

use crate::image_embed::{decode_data_uri, EmbeddedImage};
use crate::metrics::wrap_text;
use crate::{ExportError, Result};
use fp_core::validate::validate_fields;
use fp_core::{Field, FieldContent, FieldKind};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};

/// Resource name under which the overlay font is registered on each
/// touched page. Prefixed to avoid colliding with existing resources.
const FONT_NAME: &str = "FpF1";

/// Inner padding between a field's frame and its text, in page units.
const TEXT_PAD: f32 = 2.0;

/// Line height multiplier for wrapped text.
const LINE_SPACING: f32 = 1.2;

// ─── Entry points ────────────────────────────────────────────────────────

/// Validate the field list, then flatten. This is the export gate the
/// UI calls; `flatten` itself never checks validity.
pub fn export_document(pdf_bytes: &[u8], fields: &[Field]) -> Result<Vec<u8>> {
    let report = validate_fields(fields);
    if !report.is_valid() {
        return Err(ExportError::Invalid(report));
    }
    flatten(pdf_bytes, fields)
}

/// Burn `fields` into a copy of `pdf_bytes` and return the new
/// document. Untouched pages pass through byte-for-byte semantics;
/// touched pages get one appended content stream wrapped in `q`/`Q` so
/// inherited graphics state cannot leak either way.
pub fn flatten(pdf_bytes: &[u8], fields: &[Field]) -> Result<Vec<u8>> {
    let mut doc =
        Document::load_mem(pdf_bytes).map_err(|e| ExportError::Parse(e.to_string()))?;
    let pages: Vec<(u32, ObjectId)> = doc.get_pages().into_iter().collect();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });

    for (page_no, page_id) in pages {
        let page_fields: Vec<&Field> = fields.iter().filter(|f| f.page == page_no).collect();
        if page_fields.is_empty() {
            continue;
        }
        let height = page_height(&doc, page_id)?;

        let mut ops = vec![Operation::new("q", vec![])];
        let mut xobjects: Vec<(String, ObjectId)> = Vec::new();
        for field in &page_fields {
            draw_field(&mut doc, &mut ops, &mut xobjects, field, height);
        }
        ops.push(Operation::new("Q", vec![]));

        let encoded = Content { operations: ops }.encode()?;
        append_page_content(&mut doc, page_id, encoded)?;
        merge_page_resources(&mut doc, page_id, font_id, &xobjects)?;
        log::debug!("flattened {} field(s) onto page {page_no}", page_fields.len());
    }

    doc.compress();
    let mut out = Vec::new();
    doc.save_to(&mut out)
        .map_err(|e| ExportError::Save(e.to_string()))?;
    Ok(out)
}

/// Number of pages in a PDF, for page navigation bounds.
pub fn page_count(pdf_bytes: &[u8]) -> Result<u32> {
    let doc = Document::load_mem(pdf_bytes).map_err(|e| ExportError::Parse(e.to_string()))?;
    Ok(doc.get_pages().len() as u32)
}

// ─── Page plumbing ───────────────────────────────────────────────────────

/// Height of a page in user-space units. `MediaBox` may live on the
/// page itself or be inherited from an ancestor `Pages` node.
fn page_height(doc: &Document, page_id: ObjectId) -> Result<f32> {
    let mut current = page_id;
    for _ in 0..32 {
        let dict = doc.get_dictionary(current)?;
        if let Ok(media_box) = dict.get(b"MediaBox") {
            let media_box = match media_box {
                Object::Reference(r) => doc.get_object(*r)?,
                other => other,
            };
            let rect = media_box.as_array()?;
            if rect.len() == 4 {
                return Ok((as_number(&rect[3]) - as_number(&rect[1])).abs());
            }
        }
        match dict.get(b"Parent") {
            Ok(Object::Reference(r)) => current = *r,
            _ => break,
        }
    }
    log::warn!("page {page_id:?} has no MediaBox, assuming US Letter");
    Ok(792.0)
}

fn as_number(obj: &Object) -> f32 {
    match obj {
        Object::Integer(i) => *i as f32,
        Object::Real(r) => *r,
        _ => 0.0,
    }
}

/// Register an encoded content stream after the page's existing
/// content so the overlay draws on top.
fn append_page_content(doc: &mut Document, page_id: ObjectId, encoded: Vec<u8>) -> Result<()> {
    let stream_id = doc.add_object(Stream::new(dictionary! {}, encoded));
    let current = doc.get_dictionary(page_id)?.get(b"Contents").ok().cloned();
    let contents = match current {
        Some(Object::Array(mut streams)) => {
            streams.push(stream_id.into());
            Object::Array(streams)
        }
        Some(existing @ Object::Reference(_)) => Object::Array(vec![existing, stream_id.into()]),
        // Inline stream: promote it to an indirect object first.
        Some(inline) => {
            let moved = doc.add_object(inline);
            Object::Array(vec![moved.into(), stream_id.into()])
        }
        None => stream_id.into(),
    };
    doc.get_object_mut(page_id)?
        .as_dict_mut()?
        .set("Contents", contents);
    Ok(())
}

/// Add the overlay font (and any image XObjects) to the page's
/// resource dictionary, preserving whatever was already there. The
/// merged dictionary is written inline on the page, so pages sharing a
/// resource dictionary are forked rather than mutated in place.
fn merge_page_resources(
    doc: &mut Document,
    page_id: ObjectId,
    font_id: ObjectId,
    xobjects: &[(String, ObjectId)],
) -> Result<()> {
    let mut resources = resolved_resources(doc, page_id)?;

    let mut fonts = subdict(doc, &resources, b"Font");
    fonts.set(FONT_NAME, font_id);
    resources.set("Font", Object::Dictionary(fonts));

    if !xobjects.is_empty() {
        let mut xs = subdict(doc, &resources, b"XObject");
        for (name, id) in xobjects {
            xs.set(name.as_str(), *id);
        }
        resources.set("XObject", Object::Dictionary(xs));
    }

    doc.get_object_mut(page_id)?
        .as_dict_mut()?
        .set("Resources", Object::Dictionary(resources));
    Ok(())
}

/// Page resources, resolving both page-level inheritance and an
/// indirect dictionary. Missing resources yield an empty dictionary.
fn resolved_resources(doc: &Document, page_id: ObjectId) -> Result<Dictionary> {
    let mut current = page_id;
    for _ in 0..32 {
        let dict = doc.get_dictionary(current)?;
        match dict.get(b"Resources") {
            Ok(Object::Dictionary(d)) => return Ok(d.clone()),
            Ok(Object::Reference(r)) => return Ok(doc.get_dictionary(*r)?.clone()),
            _ => {}
        }
        match dict.get(b"Parent") {
            Ok(Object::Reference(r)) => current = *r,
            _ => break,
        }
    }
    Ok(Dictionary::new())
}

fn subdict(doc: &Document, resources: &Dictionary, key: &[u8]) -> Dictionary {
    match resources.get(key) {
        Ok(Object::Dictionary(d)) => d.clone(),
        Ok(Object::Reference(r)) => doc.get_dictionary(*r).cloned().unwrap_or_default(),
        _ => Dictionary::new(),
    }
}

// ─── Field drawing ───────────────────────────────────────────────────────

fn draw_field(
    doc: &mut Document,
    ops: &mut Vec<Operation>,
    xobjects: &mut Vec<(String, ObjectId)>,
    field: &Field,
    page_height: f32,
) {
    match (field.kind, &field.content) {
        // Blank non-checkbox fields leave no mark.
        (kind, content) if content.is_blank() && kind != FieldKind::Checkbox => {}

        (FieldKind::Text, FieldContent::Text(text)) => {
            draw_text_block(ops, field, text, page_height);
        }
        (FieldKind::Date | FieldKind::Timestamp, FieldContent::Text(text)) => {
            draw_centered_line(ops, field, text, page_height);
        }
        (FieldKind::Checkbox, FieldContent::Empty | FieldContent::Checked(_)) => {
            draw_checkbox(ops, field, field.content.is_checked(), page_height);
        }
        (FieldKind::Signature, FieldContent::ImageData(uri)) => {
            match decode_data_uri(uri) {
                Some(image) => draw_signature(doc, ops, xobjects, field, &image, page_height),
                None => {
                    log::warn!("field {} has an undecodable signature image", field.id);
                    draw_placeholder(ops, field, page_height);
                }
            }
        }
        (kind, content) => {
            log::warn!(
                "field {} has content {content:?} incompatible with kind {}",
                field.id,
                kind.name()
            );
            draw_placeholder(ops, field, page_height);
        }
    }
}

/// Drawn font size: the configured size, capped so one line always
/// fits the field's height.
fn effective_font_size(field: &Field) -> f32 {
    field.font_size.min(field.height * 0.8)
}

fn num(v: f32) -> Object {
    Object::Real(v)
}

fn show_text(ops: &mut Vec<Operation>, size: f32, x: f32, baseline: f32, text: &str) {
    ops.push(Operation::new("BT", vec![]));
    ops.push(Operation::new("Tf", vec![FONT_NAME.into(), num(size)]));
    ops.push(Operation::new(
        "Tm",
        vec![num(1.0), num(0.0), num(0.0), num(1.0), num(x), num(baseline)],
    ));
    ops.push(Operation::new(
        "Tj",
        vec![Object::string_literal(winansi(text))],
    ));
    ops.push(Operation::new("ET", vec![]));
}

fn set_fill_color(ops: &mut Vec<Operation>, r: f32, g: f32, b: f32) {
    ops.push(Operation::new("rg", vec![num(r), num(g), num(b)]));
}

/// Multi-line text: greedy wrap to the field width, top-aligned,
/// clipped to the lines that fit the field height.
fn draw_text_block(ops: &mut Vec<Operation>, field: &Field, text: &str, page_height: f32) {
    let size = effective_font_size(field);
    let line_height = size * LINE_SPACING;
    let max_lines = ((field.height / line_height).floor() as usize).max(1);
    let wrap_width = (field.width - 2.0 * TEXT_PAD).max(size);

    set_fill_color(ops, field.color.r, field.color.g, field.color.b);
    for (i, line) in wrap_text(text, wrap_width, size)
        .iter()
        .take(max_lines)
        .enumerate()
    {
        let baseline = page_height - field.y - TEXT_PAD - size - i as f32 * line_height;
        show_text(ops, size, field.x + TEXT_PAD, baseline, line);
    }
}

/// Date and timestamp values: a single vertically centered line.
fn draw_centered_line(ops: &mut Vec<Operation>, field: &Field, text: &str, page_height: f32) {
    let size = effective_font_size(field);
    let pdf_y = page_height - field.y - field.height;
    let baseline = pdf_y + (field.height - size) / 2.0;
    set_fill_color(ops, field.color.r, field.color.g, field.color.b);
    show_text(ops, size, field.x + TEXT_PAD, baseline, text);
}

/// Checkbox: a stroked border always, plus an inset fill and a stroked
/// check polyline when checked. The check is drawn as line segments
/// rather than a glyph so it renders identically everywhere.
fn draw_checkbox(ops: &mut Vec<Operation>, field: &Field, checked: bool, page_height: f32) {
    let pdf_y = page_height - field.y - field.height;

    ops.push(Operation::new("w", vec![num(1.0)]));
    ops.push(Operation::new("RG", vec![num(0.0), num(0.0), num(0.0)]));
    ops.push(Operation::new(
        "re",
        vec![num(field.x), num(pdf_y), num(field.width), num(field.height)],
    ));
    ops.push(Operation::new("S", vec![]));

    if !checked {
        return;
    }

    let inset = 2.0;
    set_fill_color(ops, field.color.r, field.color.g, field.color.b);
    ops.push(Operation::new(
        "re",
        vec![
            num(field.x + inset),
            num(pdf_y + inset),
            num(field.width - 2.0 * inset),
            num(field.height - 2.0 * inset),
        ],
    ));
    ops.push(Operation::new("f", vec![]));

    let s = (field.width * 0.8).min(16.0);
    let cx = field.x + field.width / 2.0;
    let cy = pdf_y + field.height / 2.0;
    ops.push(Operation::new("RG", vec![num(1.0), num(1.0), num(1.0)]));
    ops.push(Operation::new("w", vec![num(1.5)]));
    ops.push(Operation::new(
        "m",
        vec![num(cx - 0.35 * s), num(cy + 0.05 * s)],
    ));
    ops.push(Operation::new(
        "l",
        vec![num(cx - 0.10 * s), num(cy - 0.25 * s)],
    ));
    ops.push(Operation::new(
        "l",
        vec![num(cx + 0.35 * s), num(cy + 0.30 * s)],
    ));
    ops.push(Operation::new("S", vec![]));
}

/// Signature: embed the decoded pixels as a DeviceRGB image XObject
/// and place it aspect-fit, centered in the field frame.
fn draw_signature(
    doc: &mut Document,
    ops: &mut Vec<Operation>,
    xobjects: &mut Vec<(String, ObjectId)>,
    field: &Field,
    image: &EmbeddedImage,
    page_height: f32,
) {
    let xobject_id = doc.add_object(Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => image.width as i64,
            "Height" => image.height as i64,
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8i64,
        },
        image.rgb.clone(),
    ));
    let name = format!("FpIm{}", xobjects.len());
    xobjects.push((name.clone(), xobject_id));

    let scale = image.fit_scale(field.width, field.height);
    let draw_w = image.width as f32 * scale;
    let draw_h = image.height as f32 * scale;
    let pdf_y = page_height - field.y - field.height;
    let tx = field.x + (field.width - draw_w) / 2.0;
    let ty = pdf_y + (field.height - draw_h) / 2.0;

    ops.push(Operation::new("q", vec![]));
    ops.push(Operation::new(
        "cm",
        vec![num(draw_w), num(0.0), num(0.0), num(draw_h), num(tx), num(ty)],
    ));
    ops.push(Operation::new("Do", vec![name.as_str().into()]));
    ops.push(Operation::new("Q", vec![]));
}

/// Muted label naming the field kind, for content that cannot be drawn.
fn draw_placeholder(ops: &mut Vec<Operation>, field: &Field, page_height: f32) {
    let size = effective_font_size(field).min(10.0);
    let pdf_y = page_height - field.y - field.height;
    let baseline = pdf_y + (field.height - size) / 2.0;
    set_fill_color(ops, 0.6, 0.6, 0.6);
    show_text(ops, size, field.x + TEXT_PAD, baseline, field.kind.name());
}

// ─── Text encoding ───────────────────────────────────────────────────────

/// Encode to WinAnsi (the registered font encoding). ASCII and the
/// Latin-1 upper range map directly; the CP-1252 punctuation block is
/// mapped explicitly; anything else degrades to `?`.
fn winansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            ' '..='~' => c as u8,
            '\u{A0}'..='\u{FF}' => c as u8,
            '€' => 0x80,
            '‚' => 0x82,
            '„' => 0x84,
            '…' => 0x85,
            '†' => 0x86,
            '‡' => 0x87,
            '‘' => 0x91,
            '’' => 0x92,
            '“' => 0x93,
            '”' => 0x94,
            '•' => 0x95,
            '–' => 0x96,
            '—' => 0x97,
            '™' => 0x99,
            _ => b'?',
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn winansi_maps_ascii_latin1_and_cp1252() {
        assert_eq!(winansi("Hi"), b"Hi".to_vec());
        assert_eq!(winansi("é"), vec![0xE9]);
        assert_eq!(winansi("€"), vec![0x80]);
        assert_eq!(winansi("✓"), vec![b'?']);
    }

    #[test]
    fn font_size_is_capped_by_field_height() {
        let mut f = Field::new(FieldKind::Text, 1, 0.0, 0.0);
        f.height = 10.0;
        f.font_size = 24.0;
        assert_eq!(effective_font_size(&f), 8.0);

        f.height = 28.0;
        f.font_size = 12.0;
        assert_eq!(effective_font_size(&f), 12.0);
    }

    #[test]
    fn checkbox_unchecked_draws_border_only() {
        let f = Field::new(FieldKind::Checkbox, 1, 50.0, 50.0);
        let mut ops = Vec::new();
        draw_checkbox(&mut ops, &f, false, 792.0);
        let operators: Vec<&str> = ops.iter().map(|o| o.operator.as_str()).collect();
        assert_eq!(operators, vec!["w", "RG", "re", "S"]);
    }

    #[test]
    fn checkbox_checked_adds_fill_and_check() {
        let f = Field::new(FieldKind::Checkbox, 1, 50.0, 50.0);
        let mut ops = Vec::new();
        draw_checkbox(&mut ops, &f, true, 792.0);
        let operators: Vec<&str> = ops.iter().map(|o| o.operator.as_str()).collect();
        assert!(operators.contains(&"f"));
        assert!(operators.contains(&"m"));
        assert_eq!(operators.iter().filter(|o| **o == "S").count(), 2);
    }

    #[test]
    fn text_block_flips_y_for_first_baseline() {
        let mut f = Field::new(FieldKind::Text, 1, 50.0, 50.0);
        f.content = FieldContent::Text("Hello".into());
        let mut ops = Vec::new();
        draw_text_block(&mut ops, &f, "Hello", 842.0);
        let tm = ops.iter().find(|o| o.operator == "Tm").unwrap();
        // baseline = 842 - 50 - pad(2) - size(12)
        assert_eq!(tm.operands[5], Object::Real(778.0));
        assert_eq!(tm.operands[4], Object::Real(52.0));
    }

    #[test]
    fn mismatched_content_degrades_to_placeholder() {
        let mut doc = Document::with_version("1.5");
        let mut f = Field::new(FieldKind::Text, 1, 0.0, 0.0);
        f.content = FieldContent::Checked(true);
        let mut ops = Vec::new();
        let mut xobjects = Vec::new();
        draw_field(&mut doc, &mut ops, &mut xobjects, &f, 792.0);
        let tj = ops.iter().find(|o| o.operator == "Tj").unwrap();
        assert_eq!(tj.operands[0], Object::string_literal("text"));
    }

    #[test]
    fn blank_fields_draw_nothing() {
        let mut doc = Document::with_version("1.5");
        let f = Field::new(FieldKind::Signature, 1, 0.0, 0.0);
        let mut ops = Vec::new();
        let mut xobjects = Vec::new();
        draw_field(&mut doc, &mut ops, &mut xobjects, &f, 792.0);
        assert!(ops.is_empty());
        assert!(xobjects.is_empty());
    }
}
