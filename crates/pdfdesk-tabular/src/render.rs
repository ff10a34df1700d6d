//! Drawing a laid-out table through the shared report builder.

use shared_pdf::ReportBuilder;

use crate::error::TabularError;
use crate::layout::{layout, TableConfig};
use crate::model::TableModel;

const BODY_FONT: &str = "Helvetica";
const HEADER_FONT: &str = "Helvetica-Bold";

const BANNER_COLOR: (f32, f32, f32) = (0.25, 0.25, 0.25);
const HEADER_COLOR: (f32, f32, f32) = (0.0, 0.0, 0.0);
const BODY_COLOR: (f32, f32, f32) = (0.1, 0.1, 0.1);

/// Lay the table out and render it to PDF bytes.
pub fn render(table: &TableModel, config: &TableConfig) -> Result<Vec<u8>, TabularError> {
    let pages = layout(table, config)?;
    tracing::debug!(
        rows = table.row_count(),
        pages = pages.len(),
        "rendering table export"
    );
    let mut builder = ReportBuilder::new(config.page_width, config.page_height);

    for page in &pages {
        builder.start_page();
        builder.text(
            HEADER_FONT,
            config.banner_font_size,
            config.margin,
            config.page_height - config.margin - config.banner_font_size,
            BANNER_COLOR,
            &page.banner,
        );
        for cell in &page.cells {
            if cell.text.is_empty() {
                continue;
            }
            let (font, color) = if cell.header {
                (HEADER_FONT, HEADER_COLOR)
            } else {
                (BODY_FONT, BODY_COLOR)
            };
            builder.text(
                font,
                config.font_size,
                cell.x + config.cell_padding,
                cell.y,
                color,
                &cell.text,
            );
        }
    }

    builder.finish().map_err(Into::into)
}
