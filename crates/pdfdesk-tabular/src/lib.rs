//! Tabular PDF export
//!
//! Turns a rectangular grid of cell values (a flattened spreadsheet) into a
//! paginated PDF: column widths are derived from a bounded sample of the
//! content, scaled as a whole to the printable width, and rows flow
//! top-to-bottom with a banner and header-row repetition on every
//! continuation page.

pub mod error;
pub mod layout;
pub mod model;
pub mod render;

pub use error::TabularError;
pub use layout::{layout, ColumnWidthPlan, PositionedCell, TableConfig, TablePage};
pub use model::TableModel;
pub use render::render;
