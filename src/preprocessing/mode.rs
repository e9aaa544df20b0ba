use crate::error::OcrError;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Preprocessing mode names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Pick a concrete mode from image statistics.
    /// Never survives past mode selection.
    #[default]
    Auto,
    /// Works well for most documents
    /// Steps: 2x scale, grayscale, blur, Otsu threshold, dilate, open
    Standard,
    /// Faded or low-contrast documents, uneven lighting
    /// Steps: 2x scale, grayscale, denoise, adaptive threshold, dilate
    Aggressive,
    /// Clean, high-quality scans
    /// Steps: 2x scale, grayscale, fixed threshold
    Minimal,
    /// Receipts with small, thin print. Only reachable by explicit request.
    /// Steps: 3x scale, grayscale, CLAHE, Otsu threshold, dilate
    Receipt,
}

impl Mode {
    pub const ALL: [Mode; 5] = [
        Mode::Auto,
        Mode::Standard,
        Mode::Aggressive,
        Mode::Minimal,
        Mode::Receipt,
    ];

    /// Get the mode name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Standard => "standard",
            Self::Aggressive => "aggressive",
            Self::Minimal => "minimal",
            Self::Receipt => "receipt",
        }
    }

    pub fn is_concrete(&self) -> bool {
        *self != Self::Auto
    }
}

impl FromStr for Mode {
    type Err = OcrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "standard" => Ok(Self::Standard),
            "aggressive" => Ok(Self::Aggressive),
            "minimal" => Ok(Self::Minimal),
            "receipt" => Ok(Self::Receipt),
            _ => Err(OcrError::InvalidMode(s.to_string())),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
