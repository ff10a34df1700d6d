//! Watermarks and page numbering.
//!
//! Both are the same operation underneath: a primitive (text run or image)
//! drawn at one anchored position, or tiled across a mosaic grid, on every
//! selected page. Placement math comes from `shared-geom`; nothing here does
//! its own coordinate arithmetic.

use lopdf::content::Operation;
use lopdf::Object;
use serde::{Deserialize, Serialize};
use shared_geom::{anchor_position, Anchor, MosaicGrid};
use shared_pdf::content::{
    append_ops, embed_rgb_image, ensure_alpha_gstate, ensure_font, ensure_xobject, image_ops,
};
use shared_pdf::{load, page_ids, page_size, parse_hex_color, save, text_ops};
use tracing::warn;

use crate::error::PdfDeskError;
use crate::selection::PageSelection;

/// What gets drawn at each placement.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StampContent {
    Text {
        text: String,
        font_size: f64,
        color: String,
    },
    Image {
        pixel_width: u32,
        pixel_height: u32,
        rgb: Vec<u8>,
        display_width: f64,
        display_height: f64,
    },
}

/// Where the primitive goes on each page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum Placement {
    Anchored { anchor: Anchor, margin: f64 },
    Mosaic { pitch_x: f64, pitch_y: f64 },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StampSpec {
    pub content: StampContent,
    pub placement: Placement,
    /// 1.0 = opaque; anything lower draws through an ExtGState.
    pub opacity: f64,
}

/// Tunables for stamping; explicit so tests can vary them.
#[derive(Debug, Clone)]
pub struct StampConfig {
    pub font: String,
    /// Width-per-character heuristic for sizing text footprints.
    pub char_width_factor: f64,
}

impl Default for StampConfig {
    fn default() -> Self {
        Self {
            font: "Helvetica".to_string(),
            char_width_factor: 0.5,
        }
    }
}

const FONT_ALIAS: &str = "PdxF0";
const IMAGE_ALIAS: &str = "PdxIm0";
const GS_ALIAS: &str = "PdxGs0";

/// Content resolved once per stamp call, shared by every selected page.
enum Prepared {
    Text {
        text: String,
        font_size: f64,
        color: (f32, f32, f32),
    },
    Image {
        xobject_id: lopdf::ObjectId,
        width: f64,
        height: f64,
    },
}

/// Draw the stamp's primitive at its placements on every selected page.
pub fn stamp(
    bytes: &[u8],
    selection: &PageSelection,
    spec: &StampSpec,
    config: &StampConfig,
) -> Result<Vec<u8>, PdfDeskError> {
    let mut doc = load(bytes)?;
    let ids = page_ids(&doc);
    let selected = selection.resolve(ids.len())?;

    // Image stamps embed the XObject once, shared by every page.
    let prepared = match &spec.content {
        StampContent::Image {
            pixel_width,
            pixel_height,
            rgb,
            display_width,
            display_height,
        } => Prepared::Image {
            xobject_id: embed_rgb_image(&mut doc, *pixel_width, *pixel_height, rgb)?,
            width: *display_width,
            height: *display_height,
        },
        StampContent::Text {
            text,
            font_size,
            color,
        } => Prepared::Text {
            text: text.clone(),
            font_size: *font_size,
            color: parse_hex_color(color),
        },
    };

    let translucent = spec.opacity < 1.0;
    let mut stamped = 0usize;
    for &index in &selected {
        let page_id = ids[index];
        let (page_w, page_h) = page_size(&doc, page_id)?;

        let (obj_w, obj_h) = footprint(&spec.content, config);
        let placements = placements_for(&spec.placement, page_w, page_h, obj_w, obj_h)?;

        let mut ops: Vec<Operation> = Vec::new();
        if translucent {
            ensure_alpha_gstate(&mut doc, page_id, GS_ALIAS, spec.opacity)?;
            ops.push(Operation::new(
                "gs",
                vec![Object::Name(GS_ALIAS.as_bytes().to_vec())],
            ));
        }

        match &prepared {
            Prepared::Text {
                text,
                font_size,
                color,
            } => {
                ensure_font(&mut doc, page_id, FONT_ALIAS, &config.font)?;
                for (x, y) in &placements {
                    ops.extend(text_ops(FONT_ALIAS, *font_size, *x, *y, *color, text));
                }
            }
            Prepared::Image {
                xobject_id,
                width,
                height,
            } => {
                ensure_xobject(&mut doc, page_id, IMAGE_ALIAS, *xobject_id)?;
                for (x, y) in &placements {
                    ops.extend(image_ops(IMAGE_ALIAS, *x, *y, *width, *height, None));
                }
            }
        }

        match append_ops(&mut doc, page_id, ops) {
            Ok(()) => stamped += 1,
            Err(e) => warn!(page = index, error = %e, "skipping page that failed to stamp"),
        }
    }

    if stamped == 0 {
        return Err(PdfDeskError::NoContent("no page could be stamped".into()));
    }
    save(&mut doc).map_err(Into::into)
}

/// Stamp a page-number label onto every selected page. The template may
/// reference `{page}` (1-based) and `{total}`.
pub fn add_page_numbers(
    bytes: &[u8],
    selection: &PageSelection,
    anchor: Anchor,
    margin: f64,
    font_size: f64,
    color: &str,
    template: &str,
    config: &StampConfig,
) -> Result<Vec<u8>, PdfDeskError> {
    let mut doc = load(bytes)?;
    let ids = page_ids(&doc);
    let selected = selection.resolve(ids.len())?;
    let color = parse_hex_color(color);

    for &index in &selected {
        let page_id = ids[index];
        let (page_w, page_h) = page_size(&doc, page_id)?;

        let label = template
            .replace("{page}", &(index + 1).to_string())
            .replace("{total}", &ids.len().to_string());
        let obj_w = label.chars().count() as f64 * config.char_width_factor * font_size;
        let (x, y) = anchor_position(page_w, page_h, obj_w, font_size, anchor, margin);

        ensure_font(&mut doc, page_id, FONT_ALIAS, &config.font)?;
        append_ops(
            &mut doc,
            page_id,
            text_ops(FONT_ALIAS, font_size, x, y, color, &label),
        )?;
    }

    save(&mut doc).map_err(Into::into)
}

fn footprint(content: &StampContent, config: &StampConfig) -> (f64, f64) {
    match content {
        StampContent::Text {
            text, font_size, ..
        } => (
            text.chars().count() as f64 * config.char_width_factor * font_size,
            *font_size,
        ),
        StampContent::Image {
            display_width,
            display_height,
            ..
        } => (*display_width, *display_height),
    }
}

fn placements_for(
    placement: &Placement,
    page_w: f64,
    page_h: f64,
    obj_w: f64,
    obj_h: f64,
) -> Result<Vec<(f64, f64)>, PdfDeskError> {
    match placement {
        Placement::Anchored { anchor, margin } => {
            Ok(vec![anchor_position(page_w, page_h, obj_w, obj_h, *anchor, *margin)])
        }
        Placement::Mosaic { pitch_x, pitch_y } => {
            let grid = MosaicGrid::covering(page_w, page_h, *pitch_x, *pitch_y)?;
            Ok(grid.placements().collect())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::sample_pdf;

    fn text_spec(placement: Placement, opacity: f64) -> StampSpec {
        StampSpec {
            content: StampContent::Text {
                text: "CONFIDENTIAL".to_string(),
                font_size: 24.0,
                color: "#888888".to_string(),
            },
            placement,
            opacity,
        }
    }

    #[test]
    fn test_anchored_text_stamp() {
        let pdf = sample_pdf(2, 612.0, 792.0);
        let spec = text_spec(
            Placement::Anchored {
                anchor: Anchor::BottomRight,
                margin: 20.0,
            },
            1.0,
        );
        let out = stamp(&pdf, &PageSelection::All, &spec, &StampConfig::default()).unwrap();
        assert_eq!(shared_pdf::page_count(&out).unwrap(), 2);
    }

    #[test]
    fn test_mosaic_stamp_is_translucent() {
        let pdf = sample_pdf(1, 612.0, 792.0);
        let spec = text_spec(
            Placement::Mosaic {
                pitch_x: 200.0,
                pitch_y: 150.0,
            },
            0.25,
        );
        let out = stamp(&pdf, &PageSelection::All, &spec, &StampConfig::default()).unwrap();

        let doc = load(&out).unwrap();
        let has_gstate = doc.objects.values().any(|obj| {
            obj.as_dict()
                .map(|d| matches!(d.get(b"Type"), Ok(Object::Name(n)) if n == b"ExtGState"))
                .unwrap_or(false)
        });
        assert!(has_gstate);
    }

    #[test]
    fn test_image_stamp_embeds_one_xobject_for_all_pages() {
        let pdf = sample_pdf(3, 612.0, 792.0);
        let spec = StampSpec {
            content: StampContent::Image {
                pixel_width: 2,
                pixel_height: 2,
                rgb: vec![128u8; 12],
                display_width: 80.0,
                display_height: 80.0,
            },
            placement: Placement::Anchored {
                anchor: Anchor::Center,
                margin: 0.0,
            },
            opacity: 1.0,
        };
        let out = stamp(&pdf, &PageSelection::All, &spec, &StampConfig::default()).unwrap();

        let doc = load(&out).unwrap();
        let image_streams = doc
            .objects
            .values()
            .filter(|obj| {
                obj.as_stream()
                    .map(|s| matches!(s.dict.get(b"Subtype"), Ok(Object::Name(n)) if n == b"Image"))
                    .unwrap_or(false)
            })
            .count();
        assert_eq!(image_streams, 1);
    }

    #[test]
    fn test_invalid_mosaic_pitch_rejected() {
        let pdf = sample_pdf(1, 612.0, 792.0);
        let spec = text_spec(
            Placement::Mosaic {
                pitch_x: 0.0,
                pitch_y: 100.0,
            },
            1.0,
        );
        assert!(stamp(&pdf, &PageSelection::All, &spec, &StampConfig::default()).is_err());
    }

    #[test]
    fn test_page_numbers_substitute_template() {
        let pdf = sample_pdf(3, 612.0, 792.0);
        let out = add_page_numbers(
            &pdf,
            &PageSelection::All,
            Anchor::BottomCenter,
            15.0,
            10.0,
            "#333333",
            "{page} / {total}",
            &StampConfig::default(),
        )
        .unwrap();

        // "2 / 3" must appear in some content stream of the output.
        let doc = load(&out).unwrap();
        let mut found = false;
        for obj in doc.objects.values() {
            if let Ok(stream) = obj.as_stream() {
                let mut stream = stream.clone();
                stream.decompress();
                if String::from_utf8_lossy(&stream.content).contains("2 / 3") {
                    found = true;
                    break;
                }
            }
        }
        assert!(found, "page number label not found in content streams");
    }

    #[test]
    fn test_stamp_selection_subset_only() {
        let pdf = sample_pdf(3, 612.0, 792.0);
        let spec = text_spec(
            Placement::Anchored {
                anchor: Anchor::TopLeft,
                margin: 10.0,
            },
            1.0,
        );
        let sel = PageSelection::Expression {
            expr: "2".to_string(),
        };
        let out = stamp(&pdf, &sel, &spec, &StampConfig::default()).unwrap();

        let doc = load(&out).unwrap();
        let ids = page_ids(&doc);
        // Only page 2 (index 1) gained a second content stream.
        let contents_len = |doc: &lopdf::Document, id: lopdf::ObjectId| {
            let dict = doc.get_object(id).unwrap().as_dict().unwrap();
            match dict.get(b"Contents") {
                Ok(Object::Array(arr)) => arr.len(),
                Ok(_) => 1,
                Err(_) => 0,
            }
        };
        assert_eq!(contents_len(&doc, ids[0]), 1);
        assert_eq!(contents_len(&doc, ids[1]), 2);
        assert_eq!(contents_len(&doc, ids[2]), 1);
    }
}
