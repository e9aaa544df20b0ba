//! Document image preprocessing and OCR
//!
//! Images are cleaned up by one of several fixed preprocessing pipelines
//! (optionally chosen automatically from brightness statistics), then handed
//! to an OCR engine whose word tokens are folded into a single summary.

pub mod config;
pub mod engine;
pub mod engines;
pub mod error;
pub mod imageio;
pub mod ocr;
pub mod preprocessing;
pub mod report;
pub mod server;
pub mod summary;

pub use config::Config;
pub use error::OcrError;
pub use preprocessing::{preprocess, Mode, PreprocessOutcome};
