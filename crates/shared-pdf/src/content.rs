//! Content-stream primitives and page resource management.
//!
//! Drawing goes through small op builders (`text_ops`, `rect_ops`,
//! `image_ops`) that produce `lopdf` operations, and `append_ops` which
//! stamps them onto an existing page inside a `q`/`Q` pair. Resource aliases
//! are caller-chosen; callers should namespace them to avoid colliding with
//! resources already on the page.

use std::io::Write;

use flate2::write::ZlibEncoder;
use flate2::Compression;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};

use crate::error::PdfError;

/// Parse a hex color string (e.g. "#FF0000" or "FF0000") to RGB floats
/// in the 0-1 range. Malformed input falls back to black.
pub fn parse_hex_color(color: &str) -> (f32, f32, f32) {
    let hex = color.trim_start_matches('#');
    if hex.len() >= 6 {
        let r = u8::from_str_radix(&hex[0..2], 16).unwrap_or(0) as f32 / 255.0;
        let g = u8::from_str_radix(&hex[2..4], 16).unwrap_or(0) as f32 / 255.0;
        let b = u8::from_str_radix(&hex[4..6], 16).unwrap_or(0) as f32 / 255.0;
        (r, g, b)
    } else {
        (0.0, 0.0, 0.0)
    }
}

/// A single text run at a point-space position.
pub fn text_ops(
    font_alias: &str,
    font_size: f64,
    x: f64,
    y: f64,
    color: (f32, f32, f32),
    text: &str,
) -> Vec<Operation> {
    vec![
        Operation::new("BT", vec![]),
        Operation::new(
            "Tf",
            vec![
                Object::Name(font_alias.as_bytes().to_vec()),
                Object::Real(font_size as f32),
            ],
        ),
        Operation::new(
            "rg",
            vec![
                Object::Real(color.0),
                Object::Real(color.1),
                Object::Real(color.2),
            ],
        ),
        Operation::new(
            "Td",
            vec![Object::Real(x as f32), Object::Real(y as f32)],
        ),
        Operation::new("Tj", vec![Object::string_literal(text)]),
        Operation::new("ET", vec![]),
    ]
}

/// A rectangle, filled or stroked.
pub fn rect_ops(
    x: f64,
    y: f64,
    width: f64,
    height: f64,
    color: (f32, f32, f32),
    filled: bool,
) -> Vec<Operation> {
    let color_op = if filled { "rg" } else { "RG" };
    vec![
        Operation::new(
            color_op,
            vec![
                Object::Real(color.0),
                Object::Real(color.1),
                Object::Real(color.2),
            ],
        ),
        Operation::new(
            "re",
            vec![
                Object::Real(x as f32),
                Object::Real(y as f32),
                Object::Real(width as f32),
                Object::Real(height as f32),
            ],
        ),
        Operation::new(if filled { "f" } else { "S" }, vec![]),
    ]
}

/// Place an image XObject into the given point-space rectangle, optionally
/// through a named ExtGState (for translucency).
pub fn image_ops(
    xobject_alias: &str,
    x: f64,
    y: f64,
    width: f64,
    height: f64,
    gs_alias: Option<&str>,
) -> Vec<Operation> {
    let mut ops = vec![Operation::new("q", vec![])];
    if let Some(gs) = gs_alias {
        ops.push(Operation::new(
            "gs",
            vec![Object::Name(gs.as_bytes().to_vec())],
        ));
    }
    ops.push(Operation::new(
        "cm",
        vec![
            Object::Real(width as f32),
            Object::Real(0.0),
            Object::Real(0.0),
            Object::Real(height as f32),
            Object::Real(x as f32),
            Object::Real(y as f32),
        ],
    ));
    ops.push(Operation::new(
        "Do",
        vec![Object::Name(xobject_alias.as_bytes().to_vec())],
    ));
    ops.push(Operation::new("Q", vec![]));
    ops
}

/// Append drawing operations to an existing page as a fresh content stream,
/// isolated in a `q`/`Q` pair.
pub fn append_ops(
    doc: &mut Document,
    page_id: ObjectId,
    ops: Vec<Operation>,
) -> Result<(), PdfError> {
    let mut operations = Vec::with_capacity(ops.len() + 2);
    operations.push(Operation::new("q", vec![]));
    operations.extend(ops);
    operations.push(Operation::new("Q", vec![]));

    let encoded = Content { operations }
        .encode()
        .map_err(|e| PdfError::Write(e.to_string()))?;
    let stream_id = doc.add_object(Stream::new(Dictionary::new(), encoded));

    let page_dict = doc
        .get_object_mut(page_id)
        .and_then(Object::as_dict_mut)
        .map_err(|e| PdfError::Malformed(format!("page {:?}: {}", page_id, e)))?;

    let existing = match page_dict.get(b"Contents") {
        Ok(Object::Array(arr)) => Some(arr.clone()),
        Ok(Object::Reference(id)) => Some(vec![Object::Reference(*id)]),
        _ => None,
    };
    match existing {
        Some(mut arr) => {
            arr.push(Object::Reference(stream_id));
            page_dict.set("Contents", Object::Array(arr));
        }
        None => page_dict.set("Contents", Object::Reference(stream_id)),
    }
    Ok(())
}

/// Register a standard-14 font under `alias` in the page's Font resources.
pub fn ensure_font(
    doc: &mut Document,
    page_id: ObjectId,
    alias: &str,
    base_font: &str,
) -> Result<(), PdfError> {
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => Object::Name(base_font.as_bytes().to_vec()),
    });
    set_resource(doc, page_id, b"Font", alias, Object::Reference(font_id))
}

/// Register an ExtGState with constant fill/stroke alpha under `alias`.
pub fn ensure_alpha_gstate(
    doc: &mut Document,
    page_id: ObjectId,
    alias: &str,
    alpha: f64,
) -> Result<(), PdfError> {
    let gs_id = doc.add_object(dictionary! {
        "Type" => "ExtGState",
        "ca" => Object::Real(alpha as f32),
        "CA" => Object::Real(alpha as f32),
    });
    set_resource(doc, page_id, b"ExtGState", alias, Object::Reference(gs_id))
}

/// Register an already-embedded XObject under `alias` on the page.
pub fn ensure_xobject(
    doc: &mut Document,
    page_id: ObjectId,
    alias: &str,
    xobject_id: ObjectId,
) -> Result<(), PdfError> {
    set_resource(
        doc,
        page_id,
        b"XObject",
        alias,
        Object::Reference(xobject_id),
    )
}

/// Embed raw 8-bit RGB pixels as a FlateDecode image XObject.
pub fn embed_rgb_image(
    doc: &mut Document,
    width: u32,
    height: u32,
    rgb: &[u8],
) -> Result<ObjectId, PdfError> {
    if rgb.len() != width as usize * height as usize * 3 {
        return Err(PdfError::Write(format!(
            "image data length {} does not match {}x{} RGB",
            rgb.len(),
            width,
            height
        )));
    }
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(rgb)
        .and_then(|_| encoder.finish())
        .map(|data| {
            doc.add_object(Stream::new(
                dictionary! {
                    "Type" => "XObject",
                    "Subtype" => "Image",
                    "Width" => width as i64,
                    "Height" => height as i64,
                    "ColorSpace" => "DeviceRGB",
                    "BitsPerComponent" => 8,
                    "Filter" => "FlateDecode",
                },
                data,
            ))
        })
        .map_err(|e| PdfError::Write(e.to_string()))
}

/// Where the page's Resources live.
enum ResourceSlot {
    InlineOnPage,
    Indirect(ObjectId),
}

fn set_resource(
    doc: &mut Document,
    page_id: ObjectId,
    category: &[u8],
    alias: &str,
    value: Object,
) -> Result<(), PdfError> {
    let slot = {
        let page_dict = doc
            .get_object_mut(page_id)
            .and_then(Object::as_dict_mut)
            .map_err(|e| PdfError::Malformed(format!("page {:?}: {}", page_id, e)))?;
        let known = match page_dict.get(b"Resources") {
            Ok(Object::Reference(id)) => Some(ResourceSlot::Indirect(*id)),
            Ok(Object::Dictionary(_)) => Some(ResourceSlot::InlineOnPage),
            _ => None,
        };
        match known {
            Some(slot) => slot,
            None => {
                page_dict.set("Resources", Object::Dictionary(Dictionary::new()));
                ResourceSlot::InlineOnPage
            }
        }
    };

    // A category entry may itself be indirect; chase it once.
    let mut category_ref: Option<ObjectId> = None;
    {
        let resources = match slot {
            ResourceSlot::Indirect(id) => doc
                .get_object_mut(id)
                .and_then(Object::as_dict_mut)
                .map_err(|e| PdfError::Malformed(format!("resources {:?}: {}", id, e)))?,
            ResourceSlot::InlineOnPage => {
                let page_dict = doc
                    .get_object_mut(page_id)
                    .and_then(Object::as_dict_mut)
                    .map_err(|e| PdfError::Malformed(format!("page {:?}: {}", page_id, e)))?;
                match page_dict.get_mut(b"Resources") {
                    Ok(Object::Dictionary(dict)) => dict,
                    _ => return Err(PdfError::Malformed("Resources vanished".into())),
                }
            }
        };
        let mut category_dict = match resources.get(category) {
            Ok(Object::Dictionary(cat)) => cat.clone(),
            Ok(Object::Reference(id)) => {
                category_ref = Some(*id);
                Dictionary::new()
            }
            _ => Dictionary::new(),
        };
        if category_ref.is_none() {
            category_dict.set(alias, value.clone());
            resources.set(category, Object::Dictionary(category_dict));
        }
    }
    if let Some(id) = category_ref {
        let cat = doc
            .get_object_mut(id)
            .and_then(Object::as_dict_mut)
            .map_err(|e| PdfError::Malformed(format!("resource dict {:?}: {}", id, e)))?;
        cat.set(alias, value);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::Document;

    fn single_page_pdf() -> (Document, ObjectId) {
        let mut doc = Document::with_version("1.7");
        let pages_id = doc.new_object_id();
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => Object::Reference(pages_id),
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Count" => 1,
                "Kids" => vec![Object::Reference(page_id)],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => Object::Reference(pages_id),
        });
        doc.trailer.set("Root", Object::Reference(catalog_id));
        (doc, page_id)
    }

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(parse_hex_color("#FF0000"), (1.0, 0.0, 0.0));
        assert_eq!(parse_hex_color("00FF00"), (0.0, 1.0, 0.0));
        assert_eq!(parse_hex_color("bad"), (0.0, 0.0, 0.0));
    }

    #[test]
    fn test_append_ops_sets_then_grows_contents() {
        let (mut doc, page_id) = single_page_pdf();

        append_ops(&mut doc, page_id, text_ops("F1", 12.0, 50.0, 700.0, (0.0, 0.0, 0.0), "one"))
            .unwrap();
        let dict = doc.get_object(page_id).unwrap().as_dict().unwrap();
        assert!(matches!(dict.get(b"Contents"), Ok(Object::Reference(_))));

        append_ops(&mut doc, page_id, rect_ops(0.0, 0.0, 10.0, 10.0, (1.0, 0.0, 0.0), true))
            .unwrap();
        let dict = doc.get_object(page_id).unwrap().as_dict().unwrap();
        match dict.get(b"Contents") {
            Ok(Object::Array(arr)) => assert_eq!(arr.len(), 2),
            other => panic!("expected Contents array, got {:?}", other),
        }
    }

    #[test]
    fn test_ensure_font_creates_resource_entry() {
        let (mut doc, page_id) = single_page_pdf();
        ensure_font(&mut doc, page_id, "PdxF0", "Helvetica").unwrap();

        let dict = doc.get_object(page_id).unwrap().as_dict().unwrap();
        let resources = dict.get(b"Resources").unwrap().as_dict().unwrap();
        let fonts = resources.get(b"Font").unwrap().as_dict().unwrap();
        assert!(fonts.get(b"PdxF0").is_ok());
    }

    #[test]
    fn test_ensure_alpha_gstate_registers_extgstate() {
        let (mut doc, page_id) = single_page_pdf();
        ensure_alpha_gstate(&mut doc, page_id, "PdxGs0", 0.3).unwrap();

        let dict = doc.get_object(page_id).unwrap().as_dict().unwrap();
        let resources = dict.get(b"Resources").unwrap().as_dict().unwrap();
        assert!(resources.get(b"ExtGState").is_ok());
    }

    #[test]
    fn test_embed_rgb_image_validates_length() {
        let mut doc = Document::with_version("1.7");
        assert!(embed_rgb_image(&mut doc, 2, 2, &[0u8; 11]).is_err());
        assert!(embed_rgb_image(&mut doc, 2, 2, &[0u8; 12]).is_ok());
    }

    #[test]
    fn test_stamped_document_round_trips() {
        let (mut doc, page_id) = single_page_pdf();
        ensure_font(&mut doc, page_id, "PdxF0", "Helvetica").unwrap();
        append_ops(
            &mut doc,
            page_id,
            text_ops("PdxF0", 14.0, 100.0, 400.0, (0.2, 0.2, 0.2), "stamped"),
        )
        .unwrap();

        let mut buffer = Vec::new();
        doc.save_to(&mut buffer).unwrap();
        let reloaded = Document::load_mem(&buffer).unwrap();
        assert_eq!(reloaded.get_pages().len(), 1);
    }
}
