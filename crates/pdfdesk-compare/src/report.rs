//! Rendering comparison results into report documents.

use shared_pdf::ReportBuilder;

use crate::diff::{DiffKind, DiffUnit};
use crate::error::CompareError;
use crate::CompareConfig;

const DIFF_FONT: &str = "Courier";
const LABEL_FONT: &str = "Helvetica";

const UNCHANGED_COLOR: (f32, f32, f32) = (0.35, 0.35, 0.35);
const ADDED_COLOR: (f32, f32, f32) = (0.0, 0.55, 0.1);
const REMOVED_COLOR: (f32, f32, f32) = (0.75, 0.1, 0.1);

/// Render semantic diff units as a flowing, paginated text report.
pub fn render_semantic(
    units: &[DiffUnit],
    config: &CompareConfig,
) -> Result<Vec<u8>, CompareError> {
    let mut builder = ReportBuilder::new(config.page_width, config.page_height);
    let line_height = config.font_size * 1.4;
    let top = config.page_height - config.margin;

    builder.start_page();
    let mut cursor = top;
    let mut drawn = 0usize;

    for unit in units {
        let (prefix, color) = match unit.kind {
            DiffKind::Unchanged => ("  ", UNCHANGED_COLOR),
            DiffKind::Added => ("+ ", ADDED_COLOR),
            DiffKind::Removed => ("- ", REMOVED_COLOR),
        };
        for line in unit.text.split('\n') {
            if line.is_empty() {
                continue;
            }
            if cursor - line_height < config.margin {
                builder.start_page();
                cursor = top;
            }
            cursor -= line_height;

            let mut text = format!("{}{}", prefix, line);
            if text.chars().count() > config.line_char_budget {
                text = text.chars().take(config.line_char_budget).collect();
            }
            builder.text(DIFF_FONT, config.font_size, config.margin, cursor, color, &text);
            drawn += 1;
        }
    }

    if drawn == 0 {
        builder.text(
            LABEL_FONT,
            config.font_size,
            config.margin,
            top - line_height,
            UNCHANGED_COLOR,
            "(no text content)",
        );
    }

    builder.finish().map_err(Into::into)
}

/// One composited page pair, ready to embed.
pub struct VisualPageImage {
    /// Zero-based page pair index.
    pub index: usize,
    pub width: u32,
    pub height: u32,
    pub rgb: Vec<u8>,
    pub changed_pixels: u64,
}

/// Render composited page pairs, one report page per pair, with a label
/// under each image.
pub fn render_visual(
    pages: &[VisualPageImage],
    config: &CompareConfig,
) -> Result<Vec<u8>, CompareError> {
    if pages.is_empty() {
        return Err(CompareError::NoContent("no page pairs to render".into()));
    }

    let mut builder = ReportBuilder::new(config.page_width, config.page_height);
    let label_strip = config.font_size + 12.0;

    for page in pages {
        let handle = builder.add_image(page.width, page.height, page.rgb.clone())?;
        builder.start_page();

        let box_w = config.page_width - 2.0 * config.margin;
        let box_h = config.page_height - 2.0 * config.margin - label_strip;
        let scale = (box_w / page.width as f64).min(box_h / page.height as f64);
        let draw_w = page.width as f64 * scale;
        let draw_h = page.height as f64 * scale;
        let x = config.margin + (box_w - draw_w) / 2.0;
        let y = config.page_height - config.margin - draw_h;

        builder.image(handle, x, y, draw_w, draw_h, None);
        builder.text(
            LABEL_FONT,
            config.font_size,
            config.margin,
            config.margin,
            UNCHANGED_COLOR,
            &format!(
                "Page {} - {} changed pixels",
                page.index + 1,
                page.changed_pixels
            ),
        );
    }

    builder.finish().map_err(Into::into)
}
