//! Linear index to (x, y) conversion

use crate::{
    error::{PartCropError, Result},
    types::PixelCoordinate,
};

/// Convert row-major indices into coordinates for the given row width
///
/// `y = index / width`, `x = index % width`. Indices beyond the image are
/// mapped rather than rejected; the pixel sampler refuses the resulting
/// coordinates. A row that does not fit in `u32` saturates to `u32::MAX`.
///
/// # Errors
/// - `InvalidWidth` if `width == 0`
pub fn map_coordinates(indices: &[usize], width: u32) -> Result<Vec<PixelCoordinate>> {
    if width == 0 {
        return Err(PartCropError::InvalidWidth);
    }
    let row_width = width as usize;

    Ok(indices
        .iter()
        .map(|&index| {
            let y = u32::try_from(index / row_width).unwrap_or(u32::MAX);
            // remainder is < width, which came from a u32
            let x = (index % row_width) as u32;
            PixelCoordinate::new(x, y)
        })
        .collect())
}
