use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::report::FailureReport;

#[derive(Error, Debug)]
pub enum OcrError {
    #[error("Input file not found: {0}")]
    InputNotFound(String),

    #[error("Failed to read image: {0}")]
    InvalidImage(String),

    #[error("Invalid mode '{0}' (expected one of: auto, standard, aggressive, minimal, receipt)")]
    InvalidMode(String),

    #[error("Step {index} ({operation}) failed: {reason}")]
    StepExecutionFailure {
        index: usize,
        operation: &'static str,
        reason: String,
    },

    #[error("OCR engine unavailable: {0}")]
    OcrEngineUnavailable(String),

    #[error("OCR failed: {0}")]
    OcrFailure(String),

    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl OcrError {
    /// Stable category string reported in failure documents
    pub fn category(&self) -> &'static str {
        match self {
            OcrError::InputNotFound(_) => "file-not-found",
            OcrError::InvalidImage(_) => "invalid-image",
            OcrError::InvalidMode(_) | OcrError::InvalidArguments(_) => "invalid-arguments",
            OcrError::StepExecutionFailure { .. } | OcrError::Internal(_) => "processing-failed",
            OcrError::OcrEngineUnavailable(_) => "ocr-engine-unavailable",
            OcrError::OcrFailure(_) => "ocr-failed",
        }
    }

    /// Remediation hint, where one is known
    pub fn solution(&self) -> Option<&'static str> {
        match self {
            OcrError::OcrEngineUnavailable(_) => Some(
                "Install Tesseract (e.g. `brew install tesseract` or `apt install tesseract-ocr`) \
                 or point --tesseract-cmd / TESSERACT_CMD at the executable",
            ),
            OcrError::InvalidMode(_) => {
                Some("Use one of: auto, standard, aggressive, minimal, receipt")
            }
            _ => None,
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            OcrError::InputNotFound(_)
            | OcrError::InvalidImage(_)
            | OcrError::InvalidMode(_)
            | OcrError::InvalidArguments(_) => StatusCode::BAD_REQUEST,
            OcrError::StepExecutionFailure { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            OcrError::OcrEngineUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            OcrError::OcrFailure(_) | OcrError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for OcrError {
    fn into_response(self) -> Response {
        let status = self.status();
        (status, Json(FailureReport::from(&self))).into_response()
    }
}
