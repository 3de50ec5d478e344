//! Bounding box over a coordinate selection

use crate::{
    error::{PartCropError, Result},
    types::{BoundingBox, PixelCoordinate},
};

impl BoundingBox {
    /// Minimal box enclosing every coordinate
    ///
    /// Depends only on the set of coordinates, not their order.
    ///
    /// # Errors
    /// - `EmptySelection` if `coordinates` is empty
    pub fn from_coordinates(coordinates: &[PixelCoordinate]) -> Result<Self> {
        let (first, rest) = coordinates
            .split_first()
            .ok_or_else(|| PartCropError::empty_selection(None))?;

        let seed = Self {
            x_min: first.x,
            x_max: first.x,
            y_min: first.y,
            y_max: first.y,
        };

        Ok(rest.iter().fold(seed, |bbox, c| Self {
            x_min: bbox.x_min.min(c.x),
            x_max: bbox.x_max.max(c.x),
            y_min: bbox.y_min.min(c.y),
            y_max: bbox.y_max.max(c.y),
        }))
    }
}
