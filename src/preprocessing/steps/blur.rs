use super::{check_odd_kernel, sigma_for_kernel, StepError};
use image::GrayImage;
use imageproc::filter::separable_filter_equal;

/// Gaussian blur with a square kernel of the given (odd) size.
/// Sigma is derived from the kernel size.
pub fn apply(image: &GrayImage, kernel: u32) -> Result<GrayImage, StepError> {
    check_odd_kernel("blur kernel", kernel)?;
    Ok(gaussian_window(image, kernel))
}

/// Gaussian smoothing confined to exactly `size`x`size` pixels.
///
/// `gaussian_blur_f32` sizes its support from sigma alone, so a 5x5 blur
/// would reach past the named window. Edges replicate the border pixel.
pub(crate) fn gaussian_window(image: &GrayImage, size: u32) -> GrayImage {
    separable_filter_equal(image, &gaussian_weights(size))
}

/// Normalized 1-D Gaussian taps, OpenCV `getGaussianKernel` style
fn gaussian_weights(size: u32) -> Vec<f32> {
    let sigma = sigma_for_kernel(size);
    let centre = (size as f32 - 1.0) / 2.0;
    let raw: Vec<f32> = (0..size)
        .map(|i| {
            let d = i as f32 - centre;
            (-(d * d) / (2.0 * sigma * sigma)).exp()
        })
        .collect();
    let total: f32 = raw.iter().sum();
    raw.into_iter().map(|w| w / total).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    #[test]
    fn test_blur_softens_isolated_pixel() {
        let mut img = GrayImage::from_pixel(15, 15, Luma([0]));
        img.put_pixel(7, 7, Luma([255]));

        let blurred = apply(&img, 5).unwrap();

        assert!(blurred.get_pixel(7, 7).0[0] < 255);
        assert!(blurred.get_pixel(8, 7).0[0] > 0);
    }

    #[test]
    fn test_blur_stays_inside_kernel_window() {
        let mut img = GrayImage::from_pixel(15, 15, Luma([0]));
        img.put_pixel(7, 7, Luma([255]));

        let blurred = apply(&img, 5).unwrap();

        // Two pixels out is the window edge, three is beyond it
        assert!(blurred.get_pixel(9, 7).0[0] > 0);
        assert_eq!(blurred.get_pixel(10, 7).0[0], 0);
        assert_eq!(blurred.get_pixel(7, 4).0[0], 0);
    }

    #[test]
    fn test_weights_are_normalized_and_symmetric() {
        let weights = gaussian_weights(11);
        assert_eq!(weights.len(), 11);
        assert!((weights.iter().sum::<f32>() - 1.0).abs() < 1e-5);
        assert!((weights[0] - weights[10]).abs() < 1e-7);
        assert!(weights[5] > weights[4]);
    }

    #[test]
    fn test_flat_image_is_unchanged() {
        let img = GrayImage::from_pixel(8, 8, Luma([200]));
        let blurred = apply(&img, 5).unwrap();
        assert!(blurred.pixels().all(|p| p.0[0] >= 199));
    }

    #[test]
    fn test_blur_rejects_even_kernel() {
        let img = GrayImage::new(4, 4);
        assert!(apply(&img, 4).is_err());
    }
}
