//! Mode → step table
//!
//! Every mode is plain data: adding a mode means adding a row here, not a
//! new code path in the executor. The parameters are tuned values and are
//! reproduced exactly.

use crate::error::OcrError;
use std::fmt;

use super::mode::Mode;

/// Global threshold selection
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ThresholdMethod {
    /// Otsu's method picks the cutoff from the histogram
    Otsu,
    /// Pixels strictly above `cutoff` become white
    Fixed { cutoff: u8 },
}

/// A single transformation with its parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PipelineStep {
    Scale { factor: u32 },
    Grayscale,
    GaussianBlur { kernel: u32 },
    Threshold { method: ThresholdMethod },
    AdaptiveThreshold { block_size: u32, offset: i32 },
    Denoise { strength: f32 },
    ContrastEnhance { clip_limit: f32, tile_grid: (u32, u32) },
    Dilate { kernel: (u32, u32), iterations: u32 },
    Open { kernel: (u32, u32) },
}

impl PipelineStep {
    /// Short operation name, used in errors and timing records
    pub fn operation(&self) -> &'static str {
        match self {
            Self::Scale { .. } => "scale",
            Self::Grayscale => "grayscale",
            Self::GaussianBlur { .. } => "gaussian-blur",
            Self::Threshold { .. } => "threshold",
            Self::AdaptiveThreshold { .. } => "adaptive-threshold",
            Self::Denoise { .. } => "denoise",
            Self::ContrastEnhance { .. } => "contrast-enhance",
            Self::Dilate { .. } => "dilate",
            Self::Open { .. } => "morphological-open",
        }
    }

    /// Whether the step needs a single-channel input
    pub fn requires_grayscale(&self) -> bool {
        !matches!(self, Self::Scale { .. } | Self::Grayscale)
    }
}

impl fmt::Display for PipelineStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scale { factor } => write!(f, "{factor}x Image Scaling (cubic)"),
            Self::Grayscale => write!(f, "Grayscale conversion"),
            Self::GaussianBlur { kernel } => write!(f, "Gaussian Blur ({kernel}x{kernel} kernel)"),
            Self::Threshold {
                method: ThresholdMethod::Otsu,
            } => write!(f, "Otsu's Thresholding"),
            Self::Threshold {
                method: ThresholdMethod::Fixed { cutoff },
            } => write!(f, "Simple Binary Thresholding (cutoff {cutoff})"),
            Self::AdaptiveThreshold { block_size, offset } => write!(
                f,
                "Adaptive Thresholding (Gaussian, block {block_size}, C {offset})"
            ),
            Self::Denoise { strength } => write!(f, "Non-local Means Denoising (h={strength})"),
            Self::ContrastEnhance {
                clip_limit,
                tile_grid: (tx, ty),
            } => write!(
                f,
                "CLAHE Contrast Enhancement (clip {clip_limit:.1}, {tx}x{ty} tiles)"
            ),
            Self::Dilate {
                kernel: (kw, kh),
                iterations,
            } => {
                let plural = if *iterations == 1 { "" } else { "s" };
                write!(
                    f,
                    "Dilation ({kw}x{kh} kernel, {iterations} iteration{plural})"
                )
            }
            Self::Open { kernel: (kw, kh) } => {
                write!(f, "Morphological Opening ({kw}x{kh} kernel, noise removal)")
            }
        }
    }
}

const STANDARD: &[PipelineStep] = &[
    PipelineStep::Scale { factor: 2 },
    PipelineStep::Grayscale,
    PipelineStep::GaussianBlur { kernel: 5 },
    PipelineStep::Threshold {
        method: ThresholdMethod::Otsu,
    },
    PipelineStep::Dilate {
        kernel: (2, 2),
        iterations: 1,
    },
    PipelineStep::Open { kernel: (2, 2) },
];

const AGGRESSIVE: &[PipelineStep] = &[
    PipelineStep::Scale { factor: 2 },
    PipelineStep::Grayscale,
    PipelineStep::Denoise { strength: 10.0 },
    PipelineStep::AdaptiveThreshold {
        block_size: 11,
        offset: 2,
    },
    PipelineStep::Dilate {
        kernel: (3, 3),
        iterations: 2,
    },
];

const MINIMAL: &[PipelineStep] = &[
    PipelineStep::Scale { factor: 2 },
    PipelineStep::Grayscale,
    PipelineStep::Threshold {
        method: ThresholdMethod::Fixed { cutoff: 127 },
    },
];

// Receipt print is small, hence the 3x scale
const RECEIPT: &[PipelineStep] = &[
    PipelineStep::Scale { factor: 3 },
    PipelineStep::Grayscale,
    PipelineStep::ContrastEnhance {
        clip_limit: 2.0,
        tile_grid: (8, 8),
    },
    PipelineStep::Threshold {
        method: ThresholdMethod::Otsu,
    },
    PipelineStep::Dilate {
        kernel: (3, 3),
        iterations: 2,
    },
];

/// Resolve a concrete mode to its ordered step list.
///
/// `Mode::Auto` must be resolved by the selector first.
pub fn resolve(mode: Mode) -> Result<&'static [PipelineStep], OcrError> {
    match mode {
        Mode::Standard => Ok(STANDARD),
        Mode::Aggressive => Ok(AGGRESSIVE),
        Mode::Minimal => Ok(MINIMAL),
        Mode::Receipt => Ok(RECEIPT),
        Mode::Auto => Err(OcrError::InvalidMode(
            "auto (must be resolved before pipeline lookup)".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn operations(mode: Mode) -> Vec<&'static str> {
        resolve(mode).unwrap().iter().map(|s| s.operation()).collect()
    }

    #[test]
    fn test_standard_steps() {
        assert_eq!(
            operations(Mode::Standard),
            vec![
                "scale",
                "grayscale",
                "gaussian-blur",
                "threshold",
                "dilate",
                "morphological-open"
            ]
        );
        let steps = resolve(Mode::Standard).unwrap();
        assert_eq!(steps[0], PipelineStep::Scale { factor: 2 });
        assert_eq!(steps[2], PipelineStep::GaussianBlur { kernel: 5 });
        assert_eq!(
            steps[4],
            PipelineStep::Dilate {
                kernel: (2, 2),
                iterations: 1
            }
        );
    }

    #[test]
    fn test_aggressive_steps() {
        assert_eq!(
            operations(Mode::Aggressive),
            vec!["scale", "grayscale", "denoise", "adaptive-threshold", "dilate"]
        );
        let steps = resolve(Mode::Aggressive).unwrap();
        assert_eq!(steps[2], PipelineStep::Denoise { strength: 10.0 });
        assert_eq!(
            steps[3],
            PipelineStep::AdaptiveThreshold {
                block_size: 11,
                offset: 2
            }
        );
        assert_eq!(
            steps[4],
            PipelineStep::Dilate {
                kernel: (3, 3),
                iterations: 2
            }
        );
    }

    #[test]
    fn test_minimal_steps() {
        let steps = resolve(Mode::Minimal).unwrap();
        assert_eq!(
            steps,
            &[
                PipelineStep::Scale { factor: 2 },
                PipelineStep::Grayscale,
                PipelineStep::Threshold {
                    method: ThresholdMethod::Fixed { cutoff: 127 }
                },
            ]
        );
    }

    #[test]
    fn test_receipt_steps() {
        assert_eq!(
            operations(Mode::Receipt),
            vec!["scale", "grayscale", "contrast-enhance", "threshold", "dilate"]
        );
        let steps = resolve(Mode::Receipt).unwrap();
        assert_eq!(steps[0], PipelineStep::Scale { factor: 3 });
        assert_eq!(
            steps[2],
            PipelineStep::ContrastEnhance {
                clip_limit: 2.0,
                tile_grid: (8, 8)
            }
        );
    }

    #[test]
    fn test_lookup_is_stable() {
        for mode in [Mode::Standard, Mode::Aggressive, Mode::Minimal, Mode::Receipt] {
            let first = resolve(mode).unwrap();
            let second = resolve(mode).unwrap();
            assert!(!first.is_empty());
            assert_eq!(first, second);
        }
    }

    #[test]
    fn test_auto_is_rejected() {
        assert!(matches!(resolve(Mode::Auto), Err(OcrError::InvalidMode(_))));
    }

    #[test]
    fn test_descriptions() {
        let steps = resolve(Mode::Standard).unwrap();
        let described: Vec<String> = steps.iter().map(|s| s.to_string()).collect();
        assert_eq!(described[0], "2x Image Scaling (cubic)");
        assert_eq!(described[3], "Otsu's Thresholding");
        assert_eq!(described[4], "Dilation (2x2 kernel, 1 iteration)");

        let receipt = resolve(Mode::Receipt).unwrap();
        assert_eq!(receipt[4].to_string(), "Dilation (3x3 kernel, 2 iterations)");
    }
}
