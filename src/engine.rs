use crate::error::OcrError;
use crate::summary::OcrToken;
use image::DynamicImage;

/// Trait that all OCR engines must implement
pub trait OcrEngine: Send + Sync {
    /// Returns the engine identifier (e.g., "tesseract")
    fn name(&self) -> &'static str;

    /// Version string of the underlying engine.
    /// Fails with `OcrEngineUnavailable` when the engine cannot be reached.
    fn version(&self) -> Result<String, OcrError>;

    /// Recognize an image and return the raw tokens, in reading order
    fn recognize(&self, image: &DynamicImage, language: &str) -> Result<Vec<OcrToken>, OcrError>;
}
