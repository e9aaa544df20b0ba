use crate::config::Config;
use crate::engine::OcrEngine;
use crate::engines;
use crate::error::OcrError;
use crate::summary::{summarize, OcrSummary};
use image::DynamicImage;
use std::sync::Arc;
use std::time::Instant;

/// Runs an OCR engine and aggregates its tokens
pub struct OcrProcessor {
    engine: Arc<dyn OcrEngine>,
}

impl OcrProcessor {
    pub fn new(engine: Arc<dyn OcrEngine>) -> Self {
        Self { engine }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(engines::from_config(config))
    }

    pub fn engine_name(&self) -> &'static str {
        self.engine.name()
    }

    /// Recognize `image` and summarize the result.
    ///
    /// The engine version is queried first so a missing engine is reported
    /// as unavailable rather than as a failed recognition.
    pub fn extract(&self, image: &DynamicImage, language: &str) -> Result<OcrSummary, OcrError> {
        let start = Instant::now();
        let version = self.engine.version()?;
        let tokens = self.engine.recognize(image, language)?;
        let summary = summarize(&tokens, language, &version);

        tracing::info!(
            "OCR completed in {}ms with {} {}: {} words, average confidence {:.2}",
            start.elapsed().as_millis(),
            self.engine.name(),
            version,
            summary.word_count,
            summary.average_confidence
        );

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::summary::OcrToken;
    use image::GrayImage;

    struct FixedEngine {
        tokens: Vec<OcrToken>,
    }

    impl OcrEngine for FixedEngine {
        fn name(&self) -> &'static str {
            "fixed"
        }

        fn version(&self) -> Result<String, OcrError> {
            Ok("1.0".to_string())
        }

        fn recognize(&self, _: &DynamicImage, _: &str) -> Result<Vec<OcrToken>, OcrError> {
            Ok(self.tokens.clone())
        }
    }

    struct MissingEngine;

    impl OcrEngine for MissingEngine {
        fn name(&self) -> &'static str {
            "missing"
        }

        fn version(&self) -> Result<String, OcrError> {
            Err(OcrError::OcrEngineUnavailable("not installed".to_string()))
        }

        fn recognize(&self, _: &DynamicImage, _: &str) -> Result<Vec<OcrToken>, OcrError> {
            panic!("recognize must not run when the engine is unavailable")
        }
    }

    fn blank() -> DynamicImage {
        DynamicImage::ImageLuma8(GrayImage::new(4, 4))
    }

    #[test]
    fn test_extract_summarizes_engine_tokens() {
        let processor = OcrProcessor::new(Arc::new(FixedEngine {
            tokens: vec![
                OcrToken::new("Hello", 90.0),
                OcrToken::new("", -1.0),
                OcrToken::new("World", 80.0),
            ],
        }));

        let summary = processor.extract(&blank(), "eng").unwrap();

        assert_eq!(summary.word_count, 2);
        assert_eq!(summary.average_confidence, 85.0);
        assert_eq!(summary.engine_version, "1.0");
        assert_eq!(processor.engine_name(), "fixed");
    }

    #[test]
    fn test_unavailable_engine_short_circuits() {
        let processor = OcrProcessor::new(Arc::new(MissingEngine));
        let err = processor.extract(&blank(), "eng").unwrap_err();
        assert!(matches!(err, OcrError::OcrEngineUnavailable(_)));
    }
}
