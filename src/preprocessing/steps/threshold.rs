use super::{blur::gaussian_window, check_odd_kernel, StepError};
use image::{GrayImage, Luma};
use imageproc::contrast::{otsu_level, threshold, ThresholdType};

const WHITE: Luma<u8> = Luma([255]);
const BLACK: Luma<u8> = Luma([0]);

/// Binary threshold at the level chosen by Otsu's method
pub fn otsu(image: &GrayImage) -> GrayImage {
    let level = otsu_level(image);
    binary(image, level)
}

/// Binary threshold: pixels strictly above `cutoff` become white
pub fn binary(image: &GrayImage, cutoff: u8) -> GrayImage {
    threshold(image, cutoff, ThresholdType::Binary)
}

/// Gaussian-weighted adaptive threshold
///
/// Each pixel is compared against the Gaussian-weighted mean of its
/// `block_size` neighbourhood minus `offset`; brighter pixels become white.
/// Copes with uneven lighting where a single global cutoff cannot.
pub fn adaptive_gaussian(
    image: &GrayImage,
    block_size: u32,
    offset: i32,
) -> Result<GrayImage, StepError> {
    check_odd_kernel("adaptive threshold block size", block_size)?;
    if block_size < 3 {
        return Err(StepError::InvalidParameter(
            "adaptive threshold block size must be at least 3".to_string(),
        ));
    }

    let local_mean = gaussian_window(image, block_size);

    Ok(GrayImage::from_fn(image.width(), image.height(), |x, y| {
        let pixel = image.get_pixel(x, y).0[0] as i32;
        let cutoff = local_mean.get_pixel(x, y).0[0] as i32 - offset;
        if pixel > cutoff {
            WHITE
        } else {
            BLACK
        }
    }))
}
