//! Click-placed page edits.
//!
//! Edits arrive as a closed, tagged descriptor set; an unknown `type` tag is
//! rejected during deserialization instead of being silently ignored. Click
//! positions are editor-canvas pixels and go through the shared coordinate
//! mapper; rectangles arrive in percent space.

use serde::{Deserialize, Serialize};
use shared_geom::{canvas_to_point, percent_to_points, PercentRect};
use shared_pdf::content::{append_ops, embed_rgb_image, ensure_font, ensure_xobject, image_ops};
use shared_pdf::{load, page_ids, page_size, parse_hex_color, rect_ops, save, text_ops};
use tracing::warn;

use crate::error::PdfDeskError;

/// Where on the editor canvas the user clicked, with the canvas dimensions
/// the click was measured against.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CanvasClick {
    pub x: f64,
    pub y: f64,
    pub canvas_width: f64,
    pub canvas_height: f64,
}

/// One edit primitive. The tag is closed: descriptors with an unrecognized
/// `type` fail to deserialize.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum EditPrimitive {
    Text {
        page: usize,
        click: CanvasClick,
        text: String,
        font_size: f64,
        color: String,
    },
    Rect {
        page: usize,
        rect: PercentRect,
        color: String,
        filled: bool,
    },
    Image {
        page: usize,
        click: CanvasClick,
        pixel_width: u32,
        pixel_height: u32,
        rgb: Vec<u8>,
        display_width: f64,
        display_height: f64,
    },
}

impl EditPrimitive {
    fn page(&self) -> usize {
        match self {
            EditPrimitive::Text { page, .. }
            | EditPrimitive::Rect { page, .. }
            | EditPrimitive::Image { page, .. } => *page,
        }
    }
}

/// Tunables for edit application; explicit so tests can vary them.
#[derive(Debug, Clone)]
pub struct EditConfig {
    /// Clamp band keeping click-placed objects inside the page.
    pub safe_margin: f64,
    pub default_font: String,
}

impl Default for EditConfig {
    fn default() -> Self {
        Self {
            safe_margin: 10.0,
            default_font: "Helvetica".to_string(),
        }
    }
}

const FONT_ALIAS: &str = "PdxF0";

/// Apply a batch of edits and return the rebuilt document bytes.
///
/// All edits are validated up front; nothing is drawn if any descriptor is
/// invalid. Individual image-embed failures after that point are logged and
/// skipped, unless every edit fails.
pub fn apply_edits(
    bytes: &[u8],
    edits: &[EditPrimitive],
    config: &EditConfig,
) -> Result<Vec<u8>, PdfDeskError> {
    if edits.is_empty() {
        return Ok(bytes.to_vec());
    }

    let mut doc = load(bytes)?;
    let ids = page_ids(&doc);

    for edit in edits {
        if edit.page() >= ids.len() {
            return Err(PdfDeskError::InvalidSelection(format!(
                "page index {} out of range (document has {} pages)",
                edit.page(),
                ids.len()
            )));
        }
        if let EditPrimitive::Rect { rect, .. } = edit {
            rect.validate()?;
        }
    }

    let mut applied = 0usize;
    for (n, edit) in edits.iter().enumerate() {
        let page_id = ids[edit.page()];
        let (page_w, page_h) = page_size(&doc, page_id)?;

        let outcome = match edit {
            EditPrimitive::Text {
                click,
                text,
                font_size,
                color,
                ..
            } => {
                let (x, y) = canvas_to_point(
                    click.x,
                    click.y,
                    click.canvas_width,
                    click.canvas_height,
                    page_w,
                    page_h,
                    config.safe_margin,
                );
                ensure_font(&mut doc, page_id, FONT_ALIAS, &config.default_font).and_then(|_| {
                    append_ops(
                        &mut doc,
                        page_id,
                        text_ops(FONT_ALIAS, *font_size, x, y, parse_hex_color(color), text),
                    )
                })
            }
            EditPrimitive::Rect {
                rect,
                color,
                filled,
                ..
            } => {
                let point_rect = percent_to_points(rect, page_w, page_h);
                append_ops(
                    &mut doc,
                    page_id,
                    rect_ops(
                        point_rect.x,
                        point_rect.y,
                        point_rect.width,
                        point_rect.height,
                        parse_hex_color(color),
                        *filled,
                    ),
                )
            }
            EditPrimitive::Image {
                click,
                pixel_width,
                pixel_height,
                rgb,
                display_width,
                display_height,
                ..
            } => {
                let (x, y) = canvas_to_point(
                    click.x,
                    click.y,
                    click.canvas_width,
                    click.canvas_height,
                    page_w,
                    page_h,
                    config.safe_margin,
                );
                let alias = format!("PdxIm{}", n);
                embed_rgb_image(&mut doc, *pixel_width, *pixel_height, rgb).and_then(|xobj_id| {
                    ensure_xobject(&mut doc, page_id, &alias, xobj_id).and_then(|_| {
                        append_ops(
                            &mut doc,
                            page_id,
                            image_ops(&alias, x, y, *display_width, *display_height, None),
                        )
                    })
                })
            }
        };

        match outcome {
            Ok(()) => applied += 1,
            Err(e) => warn!(edit = n, error = %e, "skipping edit that failed to apply"),
        }
    }

    if applied == 0 {
        return Err(PdfDeskError::NoContent(
            "every edit failed to apply".into(),
        ));
    }

    save(&mut doc).map_err(Into::into)
}
