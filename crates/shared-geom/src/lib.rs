//! Shared page geometry
//!
//! This crate owns every coordinate conversion in the workspace: percentage
//! crop rects, editor canvas clicks, anchored placements, and mosaic tiling
//! all go through here. Call sites never do their own origin-flip or scaling
//! arithmetic.
//!
//! Three coordinate spaces are involved:
//! - **percent space**: `{x, y, width, height}` as percentages of the page,
//!   origin top-left, y grows downward (what the editor UI sends)
//! - **canvas space**: pixel coordinates on the rendered preview,
//!   origin top-left
//! - **point space**: the document's native space, origin bottom-left,
//!   y grows upward

pub mod anchor;
pub mod coords;
pub mod error;
pub mod mosaic;

pub use anchor::{anchor_position, Anchor};
pub use coords::{canvas_to_point, percent_to_points, PercentRect, PointRect};
pub use error::GeomError;
pub use mosaic::MosaicGrid;
