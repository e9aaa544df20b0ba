//! Image preprocessing module for OCR enhancement
//!
//! A closed set of modes, each a fixed sequence of image operations,
//! plus the brightness heuristic that picks one when the caller asks for
//! `auto`.

pub mod mode;
pub mod pipeline;
pub mod preprocess;
pub mod registry;
pub mod selector;
pub mod stats;
pub mod steps;

pub use mode::Mode;
pub use pipeline::{Pipeline, PreprocessingResult, StepTiming};
pub use preprocess::{preprocess, Dimensions, PreprocessOutcome};
pub use registry::{PipelineStep, ThresholdMethod};
pub use stats::ImageStatistics;
