use crate::error::OcrError;
use image::{DynamicImage, GenericImageView};
use serde::Serialize;

use super::pipeline::{Pipeline, StepTiming};
use super::{selector, stats, Mode};

/// Width and height of an image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn of(image: &DynamicImage) -> Self {
        let (width, height) = image.dimensions();
        Self { width, height }
    }
}

/// Everything a caller needs after preprocessing one image
#[derive(Debug, Clone, Serialize)]
pub struct PreprocessOutcome {
    #[serde(skip)]
    pub image: DynamicImage,
    /// Concrete mode that ran; never `auto`
    pub mode: Mode,
    pub original_dimensions: Dimensions,
    pub processed_dimensions: Dimensions,
    pub preprocessing_steps: Vec<String>,
    pub timings: Vec<StepTiming>,
    pub total_time_ms: u64,
}

/// Resolve `mode` (selecting one from image statistics for `auto`) and run
/// its pipeline.
pub fn preprocess(image: DynamicImage, mode: Mode) -> Result<PreprocessOutcome, OcrError> {
    let original_dimensions = Dimensions::of(&image);

    let mode = match mode {
        Mode::Auto => {
            let stats = stats::estimate(&image);
            let selected = selector::select(&stats);
            tracing::info!(
                "Auto-selected {} mode (mean brightness {:.1}, std {:.1})",
                selected,
                stats.mean_brightness,
                stats.std_brightness
            );
            selected
        }
        explicit => explicit,
    };

    let result = Pipeline::for_mode(mode)?.run(image)?;

    tracing::info!(
        "Preprocessed {}x{} -> {}x{} with {} mode in {}ms",
        original_dimensions.width,
        original_dimensions.height,
        result.image.width(),
        result.image.height(),
        mode,
        result.total_time_ms
    );

    Ok(PreprocessOutcome {
        processed_dimensions: Dimensions::of(&result.image),
        image: result.image,
        mode,
        original_dimensions,
        preprocessing_steps: result.steps,
        timings: result.timings,
        total_time_ms: result.total_time_ms,
    })
}
