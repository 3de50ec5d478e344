//! Label mask decoding
//!
//! Segmentation collaborators hand masks over as RGBA image data with the
//! part label repeated in the red channel of every pixel. Only that channel
//! is read; green, blue and alpha are ignored.

use crate::{
    error::{PartCropError, Result},
    types::{LabelMask, MaskImageData, RGBA_STRIDE},
};

/// Channel that carries the label in each 4-byte pixel
const LABEL_CHANNEL: usize = 0;

/// Flatten an RGBA mask buffer into one label per pixel, row-major
///
/// # Errors
/// - `InvalidMaskFormat` if `data.len() != width * height * 4`
pub fn read_labels(data: &[u8], width: u32, height: u32) -> Result<LabelMask> {
    let expected = (width as usize)
        .checked_mul(height as usize)
        .and_then(|pixels| pixels.checked_mul(RGBA_STRIDE));

    if expected != Some(data.len()) {
        return Err(PartCropError::InvalidMaskFormat {
            width,
            height,
            expected: expected.unwrap_or(usize::MAX),
            actual: data.len(),
        });
    }

    let labels: Vec<u32> = data
        .chunks_exact(RGBA_STRIDE)
        .map(|pixel| pixel.get(LABEL_CHANNEL).copied().map_or(0, u32::from))
        .collect();

    tracing::trace!(width, height, pixels = labels.len(), "decoded label mask");
    Ok(LabelMask::from_parts(width, height, labels))
}

impl LabelMask {
    /// Decode the labels of a collaborator-provided mask
    ///
    /// # Errors
    /// - `InvalidMaskFormat` if the buffer does not hold `width * height` RGBA pixels
    pub fn from_mask_image(mask: &MaskImageData) -> Result<Self> {
        read_labels(&mask.data, mask.width, mask.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_only_red_channel() {
        // Other channels carry noise that must not leak into labels
        let data = vec![
            3, 99, 42, 255, //
            7, 1, 1, 0, //
            0, 255, 255, 255, //
            23, 0, 0, 128,
        ];
        let mask = read_labels(&data, 2, 2).unwrap();
        assert_eq!(mask.labels(), &[3, 7, 0, 23]);
        assert_eq!(mask.dimensions(), (2, 2));
    }

    #[test]
    fn test_row_major_order() {
        let mut data = vec![0u8; 3 * 2 * 4];
        // (x=2, y=1) -> index 5
        if let Some(px) = data.get_mut(5 * 4) {
            *px = 9;
        }
        let mask = read_labels(&data, 3, 2).unwrap();
        assert_eq!(mask.label_at(2, 1), Some(9));
        assert_eq!(mask.labels().iter().filter(|&&l| l == 9).count(), 1);
    }

    #[test]
    fn test_invalid_length() {
        let data = vec![0u8; 15];
        let err = read_labels(&data, 2, 2).unwrap_err();
        assert!(matches!(
            err,
            PartCropError::InvalidMaskFormat {
                expected: 16,
                actual: 15,
                ..
            }
        ));

        // Length that matches width*height but not the 4-byte stride
        assert!(read_labels(&[0u8; 4], 2, 2).is_err());
    }

    #[test]
    fn test_empty_mask() {
        let mask = read_labels(&[], 0, 0).unwrap();
        assert!(mask.is_empty());
        assert!(read_labels(&[], 0, 5).unwrap().is_empty());
    }

    #[test]
    fn test_from_mask_image() {
        let mask = MaskImageData::new(1, 2, vec![4, 0, 0, 0, 5, 0, 0, 0]);
        let labels = LabelMask::from_mask_image(&mask).unwrap();
        assert_eq!(labels.labels(), &[4, 5]);

        let bad = MaskImageData::new(2, 2, vec![0; 8]);
        assert!(LabelMask::from_mask_image(&bad).is_err());
    }
}
