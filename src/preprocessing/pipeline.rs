use crate::error::OcrError;
use image::{DynamicImage, GrayImage};
use serde::Serialize;
use std::time::Instant;

use super::registry::{self, PipelineStep, ThresholdMethod};
use super::steps::{self, morphology::Kernel, StepError};
use super::Mode;

/// Timing information for a single preprocessing step
#[derive(Debug, Clone, Serialize)]
pub struct StepTiming {
    pub name: String,
    pub time_ms: u64,
}

/// Result of running a pipeline
#[derive(Debug, Clone, Serialize)]
pub struct PreprocessingResult {
    /// Processed image (not serialized)
    #[serde(skip)]
    pub image: DynamicImage,
    /// Total preprocessing time in milliseconds
    pub total_time_ms: u64,
    /// Human-readable description of every executed step, in order
    pub steps: Vec<String>,
    /// Individual step timings
    pub timings: Vec<StepTiming>,
}

/// Applies an ordered step sequence to an image
pub struct Pipeline<'a> {
    steps: &'a [PipelineStep],
}

impl<'a> Pipeline<'a> {
    pub fn new(steps: &'a [PipelineStep]) -> Self {
        Self { steps }
    }

    pub fn steps(&self) -> &'a [PipelineStep] {
        self.steps
    }
}

impl Pipeline<'static> {
    /// Pipeline for a concrete mode; `Mode::Auto` is rejected
    pub fn for_mode(mode: Mode) -> Result<Self, OcrError> {
        registry::resolve(mode).map(Self::new)
    }
}

impl Pipeline<'_> {
    /// Run every step in order, each on the previous step's output.
    ///
    /// The first failing step aborts the run; no partial image is returned.
    pub fn run(&self, image: DynamicImage) -> Result<PreprocessingResult, OcrError> {
        let start = Instant::now();
        let mut timings = Vec::with_capacity(self.steps.len());
        let mut descriptions = Vec::with_capacity(self.steps.len());

        let mut img = image;
        for (index, step) in self.steps.iter().enumerate() {
            img = self.run_step(index, step, img, &mut timings)?;
            descriptions.push(step.to_string());
        }

        Ok(PreprocessingResult {
            image: img,
            total_time_ms: start.elapsed().as_millis() as u64,
            steps: descriptions,
            timings,
        })
    }

    fn run_step(
        &self,
        index: usize,
        step: &PipelineStep,
        img: DynamicImage,
        timings: &mut Vec<StepTiming>,
    ) -> Result<DynamicImage, OcrError> {
        let step_start = Instant::now();
        let result = apply(step, img).map_err(|e| OcrError::StepExecutionFailure {
            index,
            operation: step.operation(),
            reason: e.to_string(),
        })?;

        let time_ms = step_start.elapsed().as_millis() as u64;
        tracing::debug!(
            "Step {} ({}) done in {}ms -> {}x{}",
            index,
            step.operation(),
            time_ms,
            result.width(),
            result.height()
        );
        timings.push(StepTiming {
            name: step.operation().to_string(),
            time_ms,
        });
        Ok(result)
    }
}

fn apply(step: &PipelineStep, img: DynamicImage) -> Result<DynamicImage, StepError> {
    match *step {
        PipelineStep::Scale { factor } => steps::scale::apply(img, factor),
        PipelineStep::Grayscale => Ok(DynamicImage::ImageLuma8(steps::grayscale::apply(img))),
        PipelineStep::GaussianBlur { kernel } => on_luma(img, |g| steps::blur::apply(g, kernel)),
        PipelineStep::Threshold { method } => on_luma(img, |g| {
            Ok(match method {
                ThresholdMethod::Otsu => steps::threshold::otsu(g),
                ThresholdMethod::Fixed { cutoff } => steps::threshold::binary(g, cutoff),
            })
        }),
        PipelineStep::AdaptiveThreshold { block_size, offset } => on_luma(img, |g| {
            steps::threshold::adaptive_gaussian(g, block_size, offset)
        }),
        PipelineStep::Denoise { strength } => {
            on_luma(img, |g| steps::denoise::apply(g, strength))
        }
        PipelineStep::ContrastEnhance {
            clip_limit,
            tile_grid,
        } => on_luma(img, |g| steps::contrast::clahe(g, clip_limit, tile_grid)),
        PipelineStep::Dilate { kernel, iterations } => on_luma(img, |g| {
            Ok(steps::morphology::dilate(g, &Kernel::new(kernel)?, iterations))
        }),
        PipelineStep::Open { kernel } => on_luma(img, |g| {
            Ok(steps::morphology::open(g, &Kernel::new(kernel)?))
        }),
    }
}

/// Run a single-channel operation; colour input is a precondition failure
fn on_luma<F>(img: DynamicImage, op: F) -> Result<DynamicImage, StepError>
where
    F: FnOnce(&GrayImage) -> Result<GrayImage, StepError>,
{
    let gray = steps::require_luma(img)?;
    op(&gray).map(DynamicImage::ImageLuma8)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma, Rgb, RgbImage};

    fn solid_color(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([200, 180, 160])))
    }

    #[test]
    fn test_standard_on_solid_image() {
        let result = Pipeline::for_mode(Mode::Standard)
            .unwrap()
            .run(solid_color(10, 10))
            .unwrap();

        assert!(matches!(result.image, DynamicImage::ImageLuma8(_)));
        assert_eq!(result.image.width(), 20);
        assert_eq!(result.image.height(), 20);
        assert_eq!(result.steps.len(), 6);
        assert_eq!(result.timings.len(), 6);
    }

    #[test]
    fn test_receipt_triples_dimensions() {
        let result = Pipeline::for_mode(Mode::Receipt)
            .unwrap()
            .run(solid_color(12, 8))
            .unwrap();

        assert_eq!(result.image.width(), 36);
        assert_eq!(result.image.height(), 24);
        assert!(matches!(result.image, DynamicImage::ImageLuma8(_)));
    }

    #[test]
    fn test_every_mode_ends_single_channel() {
        for mode in [Mode::Standard, Mode::Aggressive, Mode::Minimal, Mode::Receipt] {
            let result = Pipeline::for_mode(mode).unwrap().run(solid_color(6, 5)).unwrap();
            assert!(
                matches!(result.image, DynamicImage::ImageLuma8(_)),
                "{} did not end single-channel",
                mode
            );
        }
    }

    #[test]
    fn test_trail_mirrors_registry() {
        let pipeline = Pipeline::for_mode(Mode::Aggressive).unwrap();
        let result = pipeline.run(solid_color(4, 4)).unwrap();
        let expected: Vec<String> = pipeline.steps().iter().map(|s| s.to_string()).collect();
        assert_eq!(result.steps, expected);
    }

    #[test]
    fn test_minimal_output_is_binary() {
        let img = GrayImage::from_fn(8, 8, |x, _| if x < 4 { Luma([30]) } else { Luma([220]) });
        let result = Pipeline::for_mode(Mode::Minimal)
            .unwrap()
            .run(DynamicImage::ImageLuma8(img))
            .unwrap();

        let gray = result.image.to_luma8();
        assert!(gray.pixels().all(|p| p.0[0] == 0 || p.0[0] == 255));
        assert_eq!(gray.get_pixel(0, 0).0[0], 0);
        assert_eq!(gray.get_pixel(15, 0).0[0], 255);
    }

    #[test]
    fn test_threshold_on_color_is_precondition_failure() {
        let steps = [PipelineStep::Threshold {
            method: ThresholdMethod::Otsu,
        }];
        let err = Pipeline::new(&steps).run(solid_color(4, 4)).unwrap_err();

        match err {
            OcrError::StepExecutionFailure {
                index, operation, ..
            } => {
                assert_eq!(index, 0);
                assert_eq!(operation, "threshold");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_degenerate_image_fails_at_scale() {
        let empty = DynamicImage::ImageRgb8(RgbImage::new(0, 0));
        let err = Pipeline::for_mode(Mode::Standard)
            .unwrap()
            .run(empty)
            .unwrap_err();

        assert!(matches!(
            err,
            OcrError::StepExecutionFailure {
                index: 0,
                operation: "scale",
                ..
            }
        ));
    }

    #[test]
    fn test_failure_names_later_step() {
        let steps = [
            PipelineStep::Scale { factor: 2 },
            PipelineStep::Grayscale,
            PipelineStep::GaussianBlur { kernel: 4 },
        ];
        let err = Pipeline::new(&steps).run(solid_color(4, 4)).unwrap_err();
        assert!(matches!(
            err,
            OcrError::StepExecutionFailure {
                index: 2,
                operation: "gaussian-blur",
                ..
            }
        ));
    }
}
