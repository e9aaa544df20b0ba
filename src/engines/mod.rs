//! OCR engine implementations
//!
//! Engines implement the `OcrEngine` trait; the backend is built once from
//! the startup configuration.

pub mod tesseract;

use crate::config::Config;
use crate::engine::OcrEngine;
use std::sync::Arc;

/// Build the configured OCR engine
pub fn from_config(config: &Config) -> Arc<dyn OcrEngine> {
    tracing::info!(
        "Using tesseract engine at {}",
        config.tesseract_cmd.display()
    );
    Arc::new(tesseract::TesseractEngine::new(config.tesseract_cmd.clone()))
}
