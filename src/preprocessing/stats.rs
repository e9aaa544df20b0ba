use image::DynamicImage;
use serde::Serialize;

use super::steps::grayscale;

/// Brightness statistics of the grayscale view of an image
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ImageStatistics {
    pub mean_brightness: f64,
    pub std_brightness: f64,
}

/// Compute mean and population standard deviation of luma intensities.
///
/// Works on a Rec.601 grayscale copy, the same conversion the pipelines
/// use; the caller's image is left untouched.
pub fn estimate(image: &DynamicImage) -> ImageStatistics {
    let gray = grayscale::luma(image);
    let count = gray.pixels().len();

    if count == 0 {
        return ImageStatistics {
            mean_brightness: 0.0,
            std_brightness: 0.0,
        };
    }

    let n = count as f64;
    let mean = gray.pixels().map(|p| p.0[0] as f64).sum::<f64>() / n;
    let variance = gray
        .pixels()
        .map(|p| (p.0[0] as f64 - mean).powi(2))
        .sum::<f64>()
        / n;

    ImageStatistics {
        mean_brightness: mean,
        std_brightness: variance.sqrt(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preprocessing::{selector, Mode};
    use image::{GrayImage, Luma, Rgb, RgbImage};

    #[test]
    fn test_uniform_image_has_zero_deviation() {
        let img = GrayImage::from_pixel(10, 10, Luma([180]));
        let stats = estimate(&DynamicImage::ImageLuma8(img));
        assert_eq!(stats.mean_brightness, 180.0);
        assert_eq!(stats.std_brightness, 0.0);
    }

    #[test]
    fn test_half_black_half_white() {
        let img = GrayImage::from_fn(10, 10, |x, _| if x < 5 { Luma([0]) } else { Luma([255]) });
        let stats = estimate(&DynamicImage::ImageLuma8(img));
        assert!((stats.mean_brightness - 127.5).abs() < 1e-9);
        // Population deviation of {0, 255} is 127.5
        assert!((stats.std_brightness - 127.5).abs() < 1e-9);
    }

    #[test]
    fn test_color_input_is_measured_on_grayscale_view() {
        let rgb = DynamicImage::ImageRgb8(RgbImage::from_pixel(4, 4, Rgb([255, 255, 255])));
        let stats = estimate(&rgb);
        assert_eq!(stats.mean_brightness, 255.0);
        // Caller's image keeps its channels
        assert!(matches!(rgb, DynamicImage::ImageRgb8(_)));
    }

    #[test]
    fn test_saturated_color_uses_rec601_luma() {
        // Pure green at 130 is luma 76 under Rec.601 (Rec.709 would give 93)
        let rgb = RgbImage::from_fn(20, 20, |x, _| {
            if x < 10 {
                Rgb([0, 130, 0])
            } else {
                Rgb([0, 0, 0])
            }
        });
        let stats = estimate(&DynamicImage::ImageRgb8(rgb));
        assert!((stats.mean_brightness - 38.0).abs() < 1e-9);
        assert!((stats.std_brightness - 38.0).abs() < 1e-9);
        assert_eq!(selector::select(&stats), Mode::Aggressive);
    }

    #[test]
    fn test_empty_image() {
        let stats = estimate(&DynamicImage::ImageLuma8(GrayImage::new(0, 0)));
        assert_eq!(stats.mean_brightness, 0.0);
        assert_eq!(stats.std_brightness, 0.0);
    }
}
