//! Structured success / failure documents
//!
//! Every invocation ends in exactly one of these, serialized as JSON.

use crate::error::OcrError;
use crate::preprocessing::{Dimensions, Mode, PreprocessOutcome};
use crate::summary::OcrSummary;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct PreprocessReport {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processed_image: Option<String>,
    pub original_dimensions: Dimensions,
    pub processed_dimensions: Dimensions,
    pub mode: Mode,
    pub preprocessing_steps: Vec<String>,
    pub processing_time_ms: u64,
}

impl PreprocessReport {
    pub fn new(outcome: &PreprocessOutcome) -> Self {
        Self {
            success: true,
            original_image: None,
            processed_image: None,
            original_dimensions: outcome.original_dimensions,
            processed_dimensions: outcome.processed_dimensions,
            mode: outcome.mode,
            preprocessing_steps: outcome.preprocessing_steps.clone(),
            processing_time_ms: outcome.total_time_ms,
        }
    }

    pub fn with_paths(mut self, original: impl Into<String>, processed: impl Into<String>) -> Self {
        self.original_image = Some(original.into());
        self.processed_image = Some(processed.into());
        self
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct OcrMetadata {
    pub word_count: usize,
    pub average_confidence: f64,
    pub language: String,
    pub tesseract_version: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct OcrReport {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_path: Option<String>,
    /// Mode the image was preprocessed with, when it was
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<Mode>,
    pub text: String,
    pub metadata: OcrMetadata,
}

impl OcrReport {
    pub fn new(summary: OcrSummary) -> Self {
        Self {
            success: true,
            image_path: None,
            mode: None,
            text: summary.text,
            metadata: OcrMetadata {
                word_count: summary.word_count,
                average_confidence: summary.average_confidence,
                language: summary.language,
                tesseract_version: summary.engine_version,
            },
        }
    }

    pub fn with_image_path(mut self, path: impl Into<String>) -> Self {
        self.image_path = Some(path.into());
        self
    }

    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = Some(mode);
        self
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FailureReport {
    pub success: bool,
    pub error: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub solution: Option<&'static str>,
}

impl From<&OcrError> for FailureReport {
    fn from(err: &OcrError) -> Self {
        Self {
            success: false,
            error: err.category(),
            message: err.to_string(),
            solution: err.solution(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_failure_report_shape() {
        let err = OcrError::InputNotFound("scan.png".to_string());
        let value = serde_json::to_value(FailureReport::from(&err)).unwrap();
        assert_eq!(
            value,
            json!({
                "success": false,
                "error": "file-not-found",
                "message": "Input file not found: scan.png",
            })
        );
    }

    #[test]
    fn test_failure_report_carries_solution() {
        let err = OcrError::OcrEngineUnavailable("gone".to_string());
        let value = serde_json::to_value(FailureReport::from(&err)).unwrap();
        assert_eq!(value["error"], "ocr-engine-unavailable");
        assert!(value["solution"].as_str().unwrap().contains("Tesseract"));
    }

    #[test]
    fn test_ocr_report_shape() {
        let summary = OcrSummary {
            text: "Hello World".to_string(),
            word_count: 2,
            average_confidence: 85.0,
            language: "eng".to_string(),
            engine_version: "5.3.4".to_string(),
        };
        let value = serde_json::to_value(OcrReport::new(summary).with_image_path("a.png")).unwrap();

        assert_eq!(value["success"], true);
        assert_eq!(value["image_path"], "a.png");
        assert_eq!(value["text"], "Hello World");
        assert_eq!(value["metadata"]["word_count"], 2);
        assert_eq!(value["metadata"]["average_confidence"], 85.0);
        assert_eq!(value["metadata"]["tesseract_version"], "5.3.4");
        assert!(value.get("mode").is_none());
    }
}
