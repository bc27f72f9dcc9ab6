// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Inference configuration.
//!
//! This module defines the [`InferenceConfig`] struct, which controls input
//! sizing, resampling, tensor layout and ONNX Runtime threading.

use crate::preprocessing::{Interpolation, TensorLayout};

/// Configuration for classifier inference.
///
/// Uses a builder pattern for convenient construction. Fields left as `None`
/// are filled in from the model's declared input shape at load time.
///
/// # Example
///
/// ```rust
/// use waste_classifier::InferenceConfig;
/// use waste_classifier::preprocessing::{Interpolation, TensorLayout};
///
/// let config = InferenceConfig::new()
///     .with_imgsz(224, 224)
///     .with_interpolation(Interpolation::Bilinear)
///     .with_layout(TensorLayout::Nhwc)
///     .with_threads(2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct InferenceConfig {
    /// Explicit input image size (height, width).
    /// If `None`, the model's input shape decides, falling back to 224x224.
    pub imgsz: Option<(usize, usize)>,
    /// Number of intra-op threads for ONNX Runtime.
    /// Setting this to `0` allows ONNX Runtime to choose.
    pub num_threads: usize,
    /// Resize filter applied before normalization.
    pub interpolation: Interpolation,
    /// Explicit tensor layout. If `None`, detected from the model input.
    pub layout: Option<TensorLayout>,
}

impl InferenceConfig {
    /// Create a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the input image size.
    ///
    /// # Arguments
    ///
    /// * `height` - The target image height.
    /// * `width` - The target image width.
    #[must_use]
    pub const fn with_imgsz(mut self, height: usize, width: usize) -> Self {
        self.imgsz = Some((height, width));
        self
    }

    /// Set the number of threads for inference. `0` means auto.
    #[must_use]
    pub const fn with_threads(mut self, threads: usize) -> Self {
        self.num_threads = threads;
        self
    }

    /// Set the resize filter.
    #[must_use]
    pub const fn with_interpolation(mut self, interpolation: Interpolation) -> Self {
        self.interpolation = interpolation;
        self
    }

    /// Force a tensor layout instead of detecting it from the model.
    #[must_use]
    pub const fn with_layout(mut self, layout: TensorLayout) -> Self {
        self.layout = Some(layout);
        self
    }
}
