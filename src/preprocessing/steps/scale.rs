use super::StepError;
use image::{imageops::FilterType, DynamicImage, GenericImageView};

/// Upscale by an integer factor with bicubic (Catmull-Rom) interpolation.
/// Channel layout is preserved.
pub fn apply(image: DynamicImage, factor: u32) -> Result<DynamicImage, StepError> {
    let (width, height) = image.dimensions();

    if width == 0 || height == 0 {
        return Err(StepError::EmptyImage { width, height });
    }
    if factor == 0 {
        return Err(StepError::InvalidParameter(
            "scale factor must be at least 1".to_string(),
        ));
    }

    let too_large = StepError::TooLarge {
        width,
        height,
        factor,
    };
    let new_width = width.checked_mul(factor).ok_or_else(|| too_large.clone())?;
    let new_height = height.checked_mul(factor).ok_or(too_large)?;

    if factor == 1 {
        return Ok(image);
    }

    Ok(image.resize_exact(new_width, new_height, FilterType::CatmullRom))
}
