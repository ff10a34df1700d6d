//! Core PDF document operations
//!
//! This crate provides the request-scoped document operations behind the
//! editor: page selection, click-placed edits, crop/rotate/reorder/extract/
//! merge transforms, watermark and page-number stamping, and the external
//! encryption-tool contract. Everything takes bytes in and returns bytes
//! out; no state outlives a single call.

pub mod edit;
pub mod encrypt;
pub mod error;
pub mod selection;
pub mod stamp;
pub mod transform;

#[cfg(test)]
pub(crate) mod test_fixtures;

pub use edit::{apply_edits, CanvasClick, EditConfig, EditPrimitive};
pub use encrypt::EncryptTool;
pub use error::PdfDeskError;
pub use selection::{parse_expression, PageSelection};
pub use stamp::{add_page_numbers, stamp, Placement, StampConfig, StampContent, StampSpec};
pub use transform::{crop, extract, merge, reorder, rotate};

/// Parse PDF bytes and return the page count.
pub fn page_count(bytes: &[u8]) -> Result<usize, PdfDeskError> {
    shared_pdf::page_count(bytes).map_err(Into::into)
}
