use super::StepError;
use image::{GrayImage, Luma};

/// Patch half-size (3x3 patches)
const PATCH_RADIUS: i64 = 1;
/// Search window half-size (7x7 window)
const SEARCH_RADIUS: i64 = 3;

/// Non-local means denoising for grayscale images
///
/// Each pixel becomes a weighted average of the pixels in its search window,
/// weighted by how similar their surrounding patches are. `strength` is the
/// filter parameter h: larger values smooth more, and also smear more detail.
///
/// OpenCV's `fastNlMeansDenoising` defaults to 7x7 templates over a 21x21
/// search. The smaller 3x3 / 7x7 pair here costs about 1/49th of that per
/// pixel, at the price of weaker smoothing on large flat areas and more
/// sensitivity to single-pixel noise when judging patch similarity.
pub fn apply(image: &GrayImage, strength: f32) -> Result<GrayImage, StepError> {
    if strength.is_nan() || strength <= 0.0 {
        return Err(StepError::InvalidParameter(format!(
            "denoise strength must be positive, got {strength}"
        )));
    }

    let (width, height) = image.dimensions();
    let h2 = (strength as f64).powi(2);
    let patch_area = ((2 * PATCH_RADIUS + 1) * (2 * PATCH_RADIUS + 1)) as f64;

    let at = |x: i64, y: i64| -> f64 {
        let cx = x.clamp(0, width as i64 - 1) as u32;
        let cy = y.clamp(0, height as i64 - 1) as u32;
        image.get_pixel(cx, cy).0[0] as f64
    };

    let denoised = GrayImage::from_fn(width, height, |x, y| {
        let (x, y) = (x as i64, y as i64);
        let mut weight_sum = 0.0;
        let mut value_sum = 0.0;

        for sy in (y - SEARCH_RADIUS)..=(y + SEARCH_RADIUS) {
            for sx in (x - SEARCH_RADIUS)..=(x + SEARCH_RADIUS) {
                let mut distance = 0.0;
                for py in -PATCH_RADIUS..=PATCH_RADIUS {
                    for px in -PATCH_RADIUS..=PATCH_RADIUS {
                        let d = at(x + px, y + py) - at(sx + px, sy + py);
                        distance += d * d;
                    }
                }
                let weight = (-(distance / patch_area) / h2).exp();
                weight_sum += weight;
                value_sum += weight * at(sx, sy);
            }
        }

        // The centre pixel always contributes weight 1, so weight_sum >= 1
        Luma([(value_sum / weight_sum).round().clamp(0.0, 255.0) as u8])
    });

    Ok(denoised)
}
