//! Rect types and conversions between percent, canvas, and point space.

use serde::{Deserialize, Serialize};

use crate::error::GeomError;

/// A crop/placement rectangle in percentage-of-page units.
///
/// Origin is top-left, `y` grows downward (the editor UI convention).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PercentRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl PercentRect {
    /// Reject zero- or negative-area rects before any transform work begins.
    pub fn validate(&self) -> Result<(), GeomError> {
        if self.width <= 0.0 || self.height <= 0.0 {
            return Err(GeomError::InvalidRect(format!(
                "width and height must be positive, got {}x{}",
                self.width, self.height
            )));
        }
        Ok(())
    }
}

/// A rectangle in document point space, origin bottom-left, `y` grows upward.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PointRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Convert a percent rect to point space for a page of the given size.
///
/// The vertical flip is mandatory: percent rects measure `y` downward from
/// the top edge, point space measures upward from the bottom edge, so the
/// rect's bottom edge lands at `H - y%·H - height`.
pub fn percent_to_points(rect: &PercentRect, page_width: f64, page_height: f64) -> PointRect {
    let width = rect.width / 100.0 * page_width;
    let height = rect.height / 100.0 * page_height;
    let x = rect.x / 100.0 * page_width;
    let y = page_height - (rect.y / 100.0 * page_height) - height;
    PointRect {
        x,
        y,
        width,
        height,
    }
}

/// Map an editor canvas click to document point space.
///
/// Scales pixel coordinates to the document size, flips the vertical axis,
/// and clamps the result into a safe interior band so a primitive placed at
/// the click never falls off-page.
pub fn canvas_to_point(
    canvas_x: f64,
    canvas_y: f64,
    canvas_width: f64,
    canvas_height: f64,
    doc_width: f64,
    doc_height: f64,
    safe_margin: f64,
) -> (f64, f64) {
    let x = canvas_x / canvas_width * doc_width;
    let y = doc_height - (canvas_y / canvas_height * doc_height);
    (
        x.clamp(safe_margin, (doc_width - safe_margin).max(safe_margin)),
        y.clamp(safe_margin, (doc_height - safe_margin).max(safe_margin)),
    )
}
