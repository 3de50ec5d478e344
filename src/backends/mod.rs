//! Segmentation backend implementations
//!
//! - Precomputed backend (serves a mask exported by an external segmenter)
//! - Mock backend for tests

pub mod precomputed;

// Test utilities for backend testing
#[cfg(test)]
pub mod test_utils;

pub use self::precomputed::{MaskSource, PrecomputedMaskBackend};
