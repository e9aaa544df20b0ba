//! Individual preprocessing steps

pub mod blur;
pub mod contrast;
pub mod denoise;
pub mod grayscale;
pub mod morphology;
pub mod scale;
pub mod threshold;

use image::{ColorType, DynamicImage, GrayImage};
use thiserror::Error;

/// Why a single step could not be applied
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StepError {
    #[error("expected a single-channel image, got {0:?}")]
    NotGrayscale(ColorType),

    #[error("image has degenerate dimensions {width}x{height}")]
    EmptyImage { width: u32, height: u32 },

    #[error("scaled size {width}x{height} by {factor} overflows")]
    TooLarge { width: u32, height: u32, factor: u32 },

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}

/// Unwrap a single-channel image without converting it
pub fn require_luma(image: DynamicImage) -> Result<GrayImage, StepError> {
    match image {
        DynamicImage::ImageLuma8(gray) => Ok(gray),
        other => Err(StepError::NotGrayscale(other.color())),
    }
}

/// OpenCV's sigma for a Gaussian kernel of the given size when none is given
pub(crate) fn sigma_for_kernel(size: u32) -> f32 {
    0.3 * ((size as f32 - 1.0) * 0.5 - 1.0) + 0.8
}

pub(crate) fn check_odd_kernel(name: &str, size: u32) -> Result<(), StepError> {
    if size == 0 || size % 2 == 0 {
        return Err(StepError::InvalidParameter(format!(
            "{name} must be a positive odd number, got {size}"
        )));
    }
    Ok(())
}
