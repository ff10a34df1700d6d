//! Mosaic tiling: repeat one primitive across a grid covering the page.

use crate::error::GeomError;

/// A fixed-pitch placement grid that over-covers the page in every
/// direction, so rotated or differently-sized primitives never leave a gap
/// at the edges.
#[derive(Debug, Clone, PartialEq)]
pub struct MosaicGrid {
    pub cols: u32,
    pub rows: u32,
    pub pitch_x: f64,
    pub pitch_y: f64,
    pub origin_x: f64,
    pub origin_y: f64,
}

impl MosaicGrid {
    /// Build a grid for a page of the given size. The origin starts one full
    /// pitch before the page corner and the last column/row lands past the
    /// far edge.
    pub fn covering(
        page_width: f64,
        page_height: f64,
        pitch_x: f64,
        pitch_y: f64,
    ) -> Result<Self, GeomError> {
        if pitch_x <= 0.0 || pitch_y <= 0.0 {
            return Err(GeomError::InvalidPitch(format!(
                "pitch must be positive, got {}x{}",
                pitch_x, pitch_y
            )));
        }
        let cols = (page_width / pitch_x).ceil() as u32 + 2;
        let rows = (page_height / pitch_y).ceil() as u32 + 2;
        Ok(Self {
            cols,
            rows,
            pitch_x,
            pitch_y,
            origin_x: -pitch_x,
            origin_y: -pitch_y,
        })
    }

    /// Yield all `cols * rows` placements, row by row.
    pub fn placements(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        (0..self.rows).flat_map(move |row| {
            (0..self.cols).map(move |col| {
                (
                    self.origin_x + col as f64 * self.pitch_x,
                    self.origin_y + row as f64 * self.pitch_y,
                )
            })
        })
    }

    pub fn tile_count(&self) -> usize {
        self.cols as usize * self.rows as usize
    }
}
