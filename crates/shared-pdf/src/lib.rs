//! Shared PDF handling utilities
//!
//! This crate wraps the document-object layer (`lopdf`) with the page and
//! primitive helpers used across the workspace: loading/saving, page
//! enumeration and sizing, content-stream stamping onto existing pages, and
//! a report builder for documents generated from scratch (tabular exports,
//! comparison reports).

pub mod builder;
pub mod content;
pub mod document;
pub mod error;

pub use builder::{ImageHandle, ReportBuilder};
pub use content::{parse_hex_color, rect_ops, text_ops};
pub use document::{load, page_count, page_ids, page_size, save};
pub use error::PdfError;
