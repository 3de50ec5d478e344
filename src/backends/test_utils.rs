//! Test utilities and mock backends for testing segmentation functionality
//!
//! The mock produces a synthetic part mask sized to whatever image it is
//! given, so processor tests run without model files.

use crate::{
    error::{PartCropError, Result},
    segmentation::{Segmentation, SegmentationBackend, SegmentationConfig, SegmenterConfig},
    types::MaskImageData,
};
use async_trait::async_trait;
use image::{DynamicImage, GenericImageView};
use instant::Duration;
use std::sync::{Arc, Mutex};

/// Label written outside the synthetic figure
pub const MOCK_BACKGROUND_LABEL: u8 = 255;

/// Mock segmentation backend for testing
#[derive(Debug, Clone, Default)]
pub struct MockSegmentationBackend {
    /// Whether the backend has been initialized
    initialized: bool,
    /// Call history for verification in tests
    call_history: Arc<Mutex<Vec<String>>>,
    /// Whether to simulate initialization failure
    should_fail_init: bool,
    /// Whether to simulate segmentation failure
    should_fail_segment: bool,
    /// Whether to return no instances at all
    return_empty: bool,
    /// Fixed mask resolution instead of the image's own
    mask_size: Option<(u32, u32)>,
}

impl MockSegmentationBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock backend that will fail during initialization
    #[must_use]
    pub fn new_failing_init() -> Self {
        Self {
            should_fail_init: true,
            ..Self::default()
        }
    }

    /// Create a mock backend that will fail during segmentation
    #[must_use]
    pub fn new_failing_segment() -> Self {
        Self {
            should_fail_segment: true,
            ..Self::default()
        }
    }

    /// Create a mock backend that detects nobody
    #[must_use]
    pub fn new_empty() -> Self {
        Self {
            return_empty: true,
            ..Self::default()
        }
    }

    /// Create a mock backend whose masks ignore the image resolution
    #[must_use]
    pub fn new_with_mask_size(width: u32, height: u32) -> Self {
        Self {
            mask_size: Some((width, height)),
            ..Self::default()
        }
    }

    /// Shared handle to the call history, usable after the backend is boxed
    pub fn call_history_handle(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.call_history)
    }

    pub fn get_call_history(&self) -> Vec<String> {
        self.call_history.lock().unwrap().clone()
    }

    fn record_call(&self, method: &str) {
        if let Ok(mut history) = self.call_history.lock() {
            history.push(method.to_string());
        }
    }

    /// Synthetic figure: face band (0), torso band (12), leg band (18)
    /// inside the middle half of the columns; background elsewhere
    #[must_use]
    pub fn synthetic_mask(width: u32, height: u32) -> MaskImageData {
        let mut data = Vec::with_capacity(width as usize * height as usize * 4);
        for y in 0..height {
            for x in 0..width {
                let inside = x >= width / 4 && x < width - width / 4;
                let label = if !inside {
                    MOCK_BACKGROUND_LABEL
                } else if y < height / 3 {
                    0
                } else if y < 2 * height / 3 {
                    12
                } else {
                    18
                };
                data.extend_from_slice(&[label, 0, 0, 255]);
            }
        }
        MaskImageData::new(width, height, data)
    }
}

#[async_trait]
impl SegmentationBackend for MockSegmentationBackend {
    fn name(&self) -> &str {
        "mock"
    }

    async fn initialize(&mut self, config: &SegmenterConfig) -> Result<Option<Duration>> {
        self.record_call("initialize");

        if self.should_fail_init {
            return Err(PartCropError::segmentation(
                "Mock backend initialization failed",
            ));
        }
        config.validate()?;

        self.initialized = true;
        Ok(Some(Duration::from_millis(150)))
    }

    async fn segment(
        &mut self,
        image: &DynamicImage,
        _config: &SegmentationConfig,
    ) -> Result<Vec<Segmentation>> {
        self.record_call("segment");

        if !self.initialized {
            return Err(PartCropError::segmentation("Mock backend not initialized"));
        }
        if self.should_fail_segment {
            return Err(PartCropError::segmentation("Mock segmentation failed"));
        }
        if self.return_empty {
            return Ok(Vec::new());
        }

        let (width, height) = self.mask_size.unwrap_or_else(|| image.dimensions());
        Ok(vec![Segmentation {
            mask: Self::synthetic_mask(width, height),
            score: Some(0.9),
        }])
    }

    fn is_initialized(&self) -> bool {
        self.initialized
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::{count_label, read_labels};

    #[tokio::test]
    async fn test_mock_lifecycle() {
        let mut backend = MockSegmentationBackend::new();
        assert!(!backend.is_initialized());

        let image = DynamicImage::new_rgba8(8, 6);
        assert!(backend
            .segment(&image, &SegmentationConfig::default())
            .await
            .is_err());

        backend.initialize(&SegmenterConfig::default()).await.unwrap();
        let result = backend
            .segment(&image, &SegmentationConfig::default())
            .await
            .unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].mask.dimensions(), (8, 6));
        assert_eq!(
            backend.get_call_history(),
            vec!["segment", "initialize", "segment"]
        );
    }

    #[test]
    fn test_synthetic_mask_layout() {
        let mask = MockSegmentationBackend::synthetic_mask(8, 6);
        let labels = read_labels(&mask.data, 8, 6).unwrap();
        // middle half of 8 columns = 4 columns, 2 rows per band
        assert_eq!(count_label(labels.labels(), 0), 8);
        assert_eq!(count_label(labels.labels(), 12), 8);
        assert_eq!(count_label(labels.labels(), 18), 8);
        assert_eq!(count_label(labels.labels(), u32::from(MOCK_BACKGROUND_LABEL)), 24);
    }

    #[tokio::test]
    async fn test_failure_modes() {
        let mut backend = MockSegmentationBackend::new_failing_init();
        assert!(backend.initialize(&SegmenterConfig::default()).await.is_err());

        let mut backend = MockSegmentationBackend::new_failing_segment();
        backend.initialize(&SegmenterConfig::default()).await.unwrap();
        let image = DynamicImage::new_rgba8(2, 2);
        assert!(backend
            .segment(&image, &SegmentationConfig::default())
            .await
            .is_err());
    }
}
