//! Anchored placement: 9-way compass keys relative to page bounds.

use serde::{Deserialize, Serialize};

use crate::error::GeomError;

/// A 9-way compass position label used to place an object relative to the
/// page bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Anchor {
    TopLeft,
    TopCenter,
    TopRight,
    CenterLeft,
    Center,
    CenterRight,
    BottomLeft,
    BottomCenter,
    BottomRight,
}

#[derive(Clone, Copy, PartialEq)]
enum Horizontal {
    Left,
    Center,
    Right,
}

#[derive(Clone, Copy, PartialEq)]
enum Vertical {
    Top,
    Center,
    Bottom,
}

impl Anchor {
    /// Parse a free-form position key by substring match: the horizontal
    /// component comes from `left`/`right`, the vertical from `top`/`bottom`,
    /// with `center` filling either missing axis. A key carrying no
    /// recognized token at all is rejected with the offending value.
    pub fn parse(key: &str) -> Result<Self, GeomError> {
        let lower = key.to_lowercase();

        let horizontal = if lower.contains("left") {
            Some(Horizontal::Left)
        } else if lower.contains("right") {
            Some(Horizontal::Right)
        } else if lower.contains("center") || lower.contains("middle") {
            Some(Horizontal::Center)
        } else {
            None
        };
        let vertical = if lower.contains("top") {
            Some(Vertical::Top)
        } else if lower.contains("bottom") {
            Some(Vertical::Bottom)
        } else if lower.contains("center") || lower.contains("middle") {
            Some(Vertical::Center)
        } else {
            None
        };

        match (horizontal, vertical) {
            (None, None) => Err(GeomError::UnknownAnchor(key.to_string())),
            (h, v) => Ok(Self::from_axes(
                h.unwrap_or(Horizontal::Center),
                v.unwrap_or(Vertical::Center),
            )),
        }
    }

    fn from_axes(h: Horizontal, v: Vertical) -> Self {
        match (v, h) {
            (Vertical::Top, Horizontal::Left) => Anchor::TopLeft,
            (Vertical::Top, Horizontal::Center) => Anchor::TopCenter,
            (Vertical::Top, Horizontal::Right) => Anchor::TopRight,
            (Vertical::Center, Horizontal::Left) => Anchor::CenterLeft,
            (Vertical::Center, Horizontal::Center) => Anchor::Center,
            (Vertical::Center, Horizontal::Right) => Anchor::CenterRight,
            (Vertical::Bottom, Horizontal::Left) => Anchor::BottomLeft,
            (Vertical::Bottom, Horizontal::Center) => Anchor::BottomCenter,
            (Vertical::Bottom, Horizontal::Right) => Anchor::BottomRight,
        }
    }

    fn horizontal(self) -> Horizontal {
        match self {
            Anchor::TopLeft | Anchor::CenterLeft | Anchor::BottomLeft => Horizontal::Left,
            Anchor::TopCenter | Anchor::Center | Anchor::BottomCenter => Horizontal::Center,
            Anchor::TopRight | Anchor::CenterRight | Anchor::BottomRight => Horizontal::Right,
        }
    }

    fn vertical(self) -> Vertical {
        match self {
            Anchor::TopLeft | Anchor::TopCenter | Anchor::TopRight => Vertical::Top,
            Anchor::CenterLeft | Anchor::Center | Anchor::CenterRight => Vertical::Center,
            Anchor::BottomLeft | Anchor::BottomCenter | Anchor::BottomRight => Vertical::Bottom,
        }
    }
}

/// Compute the lower-left point at which to draw an object of the given size
/// so it sits at the anchor, with `margin` applied at the outer edges.
pub fn anchor_position(
    page_width: f64,
    page_height: f64,
    obj_width: f64,
    obj_height: f64,
    anchor: Anchor,
    margin: f64,
) -> (f64, f64) {
    let x = match anchor.horizontal() {
        Horizontal::Left => margin,
        Horizontal::Center => (page_width - obj_width) / 2.0,
        Horizontal::Right => page_width - obj_width - margin,
    };
    let y = match anchor.vertical() {
        Vertical::Top => page_height - obj_height - margin,
        Vertical::Center => (page_height - obj_height) / 2.0,
        Vertical::Bottom => margin,
    };
    (x, y)
}
