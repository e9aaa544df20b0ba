use image::{DynamicImage, GrayImage, Luma, Rgb};
use imageproc::map::map_colors;

/// Convert image to single-channel luma
/// This is the explicit conversion every mode performs before filtering
pub fn apply(image: DynamicImage) -> GrayImage {
    match image {
        DynamicImage::ImageLuma8(gray) => gray,
        other => luma(&other),
    }
}

/// Rec.601 luma (0.299 R + 0.587 G + 0.114 B), rounded; alpha is dropped.
///
/// `DynamicImage::to_luma8` weighs channels by Rec.709 instead, which shifts
/// saturated colours by tens of levels and would move the mode selector's
/// brightness cutoffs.
pub fn luma(image: &DynamicImage) -> GrayImage {
    if let DynamicImage::ImageLuma8(gray) = image {
        return gray.clone();
    }
    map_colors(&image.to_rgb8(), |Rgb([r, g, b])| {
        let y = 0.299 * f32::from(r) + 0.587 * f32::from(g) + 0.114 * f32::from(b);
        Luma([y.round().clamp(0.0, 255.0) as u8])
    })
}
