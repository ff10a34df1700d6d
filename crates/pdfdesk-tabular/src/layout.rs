//! Column sizing and pagination.
//!
//! Widths come from a bounded sample of the content (header plus the first
//! `sample_rows` data rows) so a million-row sheet costs the same to plan as
//! a small one. The whole plan is then scaled by a single factor so the
//! table never overflows the printable width; columns are never scaled
//! individually.

use crate::error::TabularError;
use crate::model::TableModel;

/// Layout tunables. Everything that was a process-wide constant upstream is
/// an explicit field here so tests can vary it per case.
#[derive(Debug, Clone)]
pub struct TableConfig {
    pub page_width: f64,
    pub page_height: f64,
    pub margin: f64,
    pub font_size: f64,
    pub banner_font_size: f64,
    /// Width-per-character heuristic, as a fraction of the font size.
    pub char_width_factor: f64,
    pub cell_padding: f64,
    pub min_column_width: f64,
    pub max_column_width: f64,
    pub row_height: f64,
    /// Data rows sampled (beyond the header) when sizing columns.
    pub sample_rows: usize,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            page_width: 612.0,
            page_height: 792.0,
            margin: 40.0,
            font_size: 9.0,
            banner_font_size: 11.0,
            char_width_factor: 0.5,
            cell_padding: 6.0,
            min_column_width: 36.0,
            max_column_width: 180.0,
            row_height: 14.0,
            sample_rows: 49,
        }
    }
}

impl TableConfig {
    pub fn printable_width(&self) -> f64 {
        self.page_width - 2.0 * self.margin
    }

    fn banner_height(&self) -> f64 {
        self.banner_font_size + 10.0
    }

    fn char_width(&self) -> f64 {
        self.char_width_factor * self.font_size
    }
}

/// One width per column plus the single page-wide scale factor.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnWidthPlan {
    pub widths: Vec<f64>,
    pub scale: f64,
}

impl ColumnWidthPlan {
    pub fn compute(table: &TableModel, config: &TableConfig) -> Self {
        let sample_len = (1 + config.sample_rows).min(table.row_count());
        let mut widths = vec![0.0f64; table.column_count()];

        for row in &table.rows()[..sample_len] {
            for (col, cell) in row.iter().enumerate() {
                let candidate = cell.chars().count() as f64 * config.char_width()
                    + 2.0 * config.cell_padding;
                if candidate > widths[col] {
                    widths[col] = candidate;
                }
            }
        }
        for width in &mut widths {
            *width = width.clamp(config.min_column_width, config.max_column_width);
        }

        let total: f64 = widths.iter().sum();
        let scale = if total > config.printable_width() {
            config.printable_width() / total
        } else {
            1.0
        };
        Self { widths, scale }
    }

    /// Final on-page column widths.
    pub fn scaled_widths(&self) -> Vec<f64> {
        self.widths.iter().map(|w| w * self.scale).collect()
    }
}

/// A cell placed on a page, in point space.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionedCell {
    /// Source row in the table (headers repeat row 0).
    pub row: usize,
    pub col: usize,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub text: String,
    pub header: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TablePage {
    /// Running page number, starting at 1.
    pub number: usize,
    pub banner: String,
    pub cells: Vec<PositionedCell>,
}

/// Paginate the table into positioned pages.
pub fn layout(table: &TableModel, config: &TableConfig) -> Result<Vec<TablePage>, TabularError> {
    let plan = ColumnWidthPlan::compute(table, config);
    let widths = plan.scaled_widths();
    let repeat_header = table.row_count() > 1;

    let mut pages: Vec<TablePage> = Vec::new();
    let mut cursor_y = 0.0;

    let new_page = |pages: &mut Vec<TablePage>, cursor_y: &mut f64| {
        let number = pages.len() + 1;
        pages.push(TablePage {
            number,
            banner: format!("{} - page {}", table.sheet_name(), number),
            cells: Vec::new(),
        });
        *cursor_y = config.page_height - config.margin - config.banner_height();
    };

    let place_row =
        |pages: &mut Vec<TablePage>, cursor_y: &mut f64, row_index: usize, header: bool| {
            *cursor_y -= config.row_height;
            let page = pages.last_mut().unwrap();
            let mut x = config.margin;
            for (col, cell) in table.rows()[row_index].iter().enumerate() {
                let width = widths[col];
                page.cells.push(PositionedCell {
                    row: row_index,
                    col,
                    x,
                    y: *cursor_y,
                    width,
                    text: truncate_to_budget(cell, width, config),
                    header,
                });
                x += width;
            }
        };

    new_page(&mut pages, &mut cursor_y);
    place_row(&mut pages, &mut cursor_y, 0, true);

    for row_index in 1..table.row_count() {
        if cursor_y - config.row_height < config.margin {
            new_page(&mut pages, &mut cursor_y);
            if repeat_header {
                place_row(&mut pages, &mut cursor_y, 0, true);
            }
        }
        place_row(&mut pages, &mut cursor_y, row_index, false);
    }

    Ok(pages)
}

/// Truncate cell text to the column's character budget with a trailing
/// ellipsis. Lossy on purpose: print fit beats completeness here.
fn truncate_to_budget(text: &str, column_width: f64, config: &TableConfig) -> String {
    let budget = ((column_width - 2.0 * config.cell_padding) / config.char_width())
        .floor()
        .max(4.0) as usize;
    if text.chars().count() <= budget {
        return text.to_string();
    }
    let keep: String = text.chars().take(budget - 3).collect();
    format!("{}...", keep)
}
