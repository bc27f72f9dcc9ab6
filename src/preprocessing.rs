// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Image preprocessing for classification.
//!
//! Images are stretched to the model input size (no letterbox, no crop),
//! normalized to [0, 1] and packed into a batch-of-one tensor in either
//! NHWC or NCHW order.

#![allow(clippy::cast_possible_truncation)]

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use half::f16;
use image::{DynamicImage, GenericImageView, RgbImage};
use ndarray::Array4;

use crate::error::{ClassifierError, Result};

/// Default classifier input size (height, width).
pub const DEFAULT_IMGSZ: (usize, usize) = (224, 224);

/// Reciprocal of 255 for normalization.
const INV_255: f32 = 1.0 / 255.0;

/// Resampling filter used when resizing to the model input size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Interpolation {
    /// Nearest neighbour, matching Keras `load_img` defaults.
    #[default]
    Nearest,
    /// Bilinear convolution.
    Bilinear,
}

impl fmt::Display for Interpolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nearest => write!(f, "nearest"),
            Self::Bilinear => write!(f, "bilinear"),
        }
    }
}

impl FromStr for Interpolation {
    type Err = ParseOptionError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "nearest" => Ok(Self::Nearest),
            "bilinear" | "linear" => Ok(Self::Bilinear),
            _ => Err(ParseOptionError::new("interpolation", s, "nearest, bilinear")),
        }
    }
}

/// Memory order of the input tensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TensorLayout {
    /// `(1, H, W, 3)`, the Keras/TensorFlow convention.
    #[default]
    Nhwc,
    /// `(1, 3, H, W)`, the PyTorch convention.
    Nchw,
}

impl fmt::Display for TensorLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nhwc => write!(f, "nhwc"),
            Self::Nchw => write!(f, "nchw"),
        }
    }
}

impl FromStr for TensorLayout {
    type Err = ParseOptionError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "nhwc" | "channels_last" => Ok(Self::Nhwc),
            "nchw" | "channels_first" => Ok(Self::Nchw),
            _ => Err(ParseOptionError::new("layout", s, "nhwc, nchw")),
        }
    }
}

/// Error returned when parsing an invalid option value.
#[derive(Debug, Clone)]
pub struct ParseOptionError {
    option: &'static str,
    value: String,
    expected: &'static str,
}

impl ParseOptionError {
    fn new(option: &'static str, value: &str, expected: &'static str) -> Self {
        Self {
            option,
            value: value.to_string(),
            expected,
        }
    }
}

impl fmt::Display for ParseOptionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid {} '{}', expected one of: {}",
            self.option, self.value, self.expected
        )
    }
}

impl std::error::Error for ParseOptionError {}

/// Result of preprocessing an image.
#[derive(Debug, Clone)]
pub struct PreprocessResult {
    /// Normalized tensor with a batch dimension of 1.
    pub tensor: Array4<f32>,
    /// Original image dimensions (height, width).
    pub orig_shape: (u32, u32),
    /// Layout of `tensor`.
    pub layout: TensorLayout,
}

/// Load an image from disk.
///
/// # Errors
///
/// Returns an error if the file can't be read or decoded.
pub fn load_image<P: AsRef<Path>>(path: P) -> Result<DynamicImage> {
    Ok(image::open(path)?)
}

/// Preprocess an image for classification.
///
/// # Arguments
///
/// * `image` - Input image, any pixel format.
/// * `target_size` - Model input size as (height, width).
/// * `interpolation` - Resize filter.
/// * `layout` - Tensor memory order.
///
/// # Errors
///
/// Returns an error if the image or target size is empty or resizing fails.
pub fn preprocess_image(
    image: &DynamicImage,
    target_size: (usize, usize),
    interpolation: Interpolation,
    layout: TensorLayout,
) -> Result<PreprocessResult> {
    let (orig_width, orig_height) = image.dimensions();
    if orig_width == 0 || orig_height == 0 {
        return Err(ClassifierError::ImageError("Image has no pixels".to_string()));
    }
    if target_size.0 == 0 || target_size.1 == 0 {
        return Err(ClassifierError::ConfigError(format!(
            "Invalid input size {}x{}",
            target_size.0, target_size.1
        )));
    }

    let resized = resize_rgb(image, target_size, interpolation)?;
    let tensor = match layout {
        TensorLayout::Nhwc => rgb_to_nhwc(&resized)?,
        TensorLayout::Nchw => rgb_to_nchw(&resized)?,
    };

    Ok(PreprocessResult {
        tensor,
        orig_shape: (orig_height, orig_width),
        layout,
    })
}

/// Resize to exactly `target_size`, ignoring aspect ratio.
fn resize_rgb(
    image: &DynamicImage,
    target_size: (usize, usize),
    interpolation: Interpolation,
) -> Result<RgbImage> {
    use fast_image_resize::{FilterType, PixelType, ResizeAlg, ResizeOptions, Resizer, images::Image};

    let (src_w, src_h) = image.dimensions();
    let (Ok(dst_h), Ok(dst_w)) = (u32::try_from(target_size.0), u32::try_from(target_size.1)) else {
        return Err(ClassifierError::ConfigError(format!(
            "Input size {}x{} is too large",
            target_size.0, target_size.1
        )));
    };
    let src_rgb = image.to_rgb8();

    if (src_w, src_h) == (dst_w, dst_h) {
        return Ok(src_rgb);
    }

    let src_image = Image::from_vec_u8(src_w, src_h, src_rgb.into_raw(), PixelType::U8x3)
        .map_err(|e| ClassifierError::ImageError(format!("Failed to wrap source image: {e}")))?;
    let mut dst_image = Image::new(dst_w, dst_h, PixelType::U8x3);

    let alg = match interpolation {
        Interpolation::Nearest => ResizeAlg::Nearest,
        Interpolation::Bilinear => ResizeAlg::Convolution(FilterType::Bilinear),
    };
    let options = ResizeOptions::new().resize_alg(alg);

    Resizer::new()
        .resize(&src_image, &mut dst_image, Some(&options))
        .map_err(|e| ClassifierError::ImageError(format!("Failed to resize image: {e}")))?;

    RgbImage::from_raw(dst_w, dst_h, dst_image.into_vec())
        .ok_or_else(|| ClassifierError::ImageError("Failed to create resized buffer".to_string()))
}

/// Convert an RGB image to a normalized `(1, H, W, 3)` tensor.
fn rgb_to_nhwc(image: &RgbImage) -> Result<Array4<f32>> {
    let (w, h) = (image.width() as usize, image.height() as usize);
    let data: Vec<f32> = image.as_raw().iter().map(|&p| f32::from(p) * INV_255).collect();

    Array4::from_shape_vec((1, h, w, 3), data)
        .map_err(|e| ClassifierError::ImageError(format!("Failed to build tensor: {e}")))
}

/// Convert an RGB image to a normalized `(1, 3, H, W)` tensor.
fn rgb_to_nchw(image: &RgbImage) -> Result<Array4<f32>> {
    let (w, h) = (image.width() as usize, image.height() as usize);
    let plane = h * w;
    let mut data = vec![0.0f32; 3 * plane];

    for (i, chunk) in image.as_raw().chunks_exact(3).enumerate() {
        data[i] = f32::from(chunk[0]) * INV_255;
        data[plane + i] = f32::from(chunk[1]) * INV_255;
        data[2 * plane + i] = f32::from(chunk[2]) * INV_255;
    }

    Array4::from_shape_vec((1, 3, h, w), data)
        .map_err(|e| ClassifierError::ImageError(format!("Failed to build tensor: {e}")))
}

/// Convert an FP32 tensor to FP16 for half-precision models.
#[must_use]
pub fn tensor_f32_to_f16(tensor: &Array4<f32>) -> Array4<f16> {
    tensor.mapv(f16::from_f32)
}
