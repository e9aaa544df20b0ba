//! Tesseract engine implementation
//!
//! Drives the `tesseract` command-line program. The executable path comes
//! from configuration; nothing here knows where it is installed.

use crate::engine::OcrEngine;
use crate::error::OcrError;
use crate::summary::{BoundingBox, LineKey, OcrToken};
use image::{DynamicImage, ImageFormat};
use std::ffi::OsStr;
use std::io::{self, Cursor, Write};
use std::path::PathBuf;
use std::process::{Command, Output};

/// Columns of `tesseract ... tsv` output
const TSV_COLUMNS: usize = 12;

/// Tesseract OCR Engine
pub struct TesseractEngine {
    command: PathBuf,
}

impl TesseractEngine {
    pub fn new(command: impl Into<PathBuf>) -> Self {
        Self {
            command: command.into(),
        }
    }

    fn run<I, S>(&self, args: I) -> Result<Output, OcrError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        Command::new(&self.command)
            .args(args)
            .output()
            .map_err(|e| match e.kind() {
                io::ErrorKind::NotFound | io::ErrorKind::PermissionDenied => {
                    OcrError::OcrEngineUnavailable(format!(
                        "Tesseract is not installed or not found at {} ({})",
                        self.command.display(),
                        e
                    ))
                }
                _ => OcrError::OcrFailure(format!(
                    "Failed to run {}: {}",
                    self.command.display(),
                    e
                )),
            })
    }
}

impl OcrEngine for TesseractEngine {
    fn name(&self) -> &'static str {
        "tesseract"
    }

    fn version(&self) -> Result<String, OcrError> {
        let output = self.run(["--version"])?;
        if !output.status.success() {
            return Err(OcrError::OcrEngineUnavailable(format!(
                "{} --version exited with {}",
                self.command.display(),
                output.status
            )));
        }

        // Older releases print the banner on stderr
        let banner = if output.stdout.is_empty() {
            String::from_utf8_lossy(&output.stderr).into_owned()
        } else {
            String::from_utf8_lossy(&output.stdout).into_owned()
        };

        parse_version(&banner).ok_or_else(|| {
            OcrError::OcrEngineUnavailable(format!(
                "Unrecognized version banner from {}: {:?}",
                self.command.display(),
                banner.lines().next().unwrap_or_default()
            ))
        })
    }

    fn recognize(&self, image: &DynamicImage, language: &str) -> Result<Vec<OcrToken>, OcrError> {
        validate_language(language)?;

        let mut png = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
            .map_err(|e| OcrError::Internal(format!("Failed to encode image: {}", e)))?;

        let mut temp_file = tempfile::Builder::new()
            .prefix("documind-")
            .suffix(".png")
            .tempfile()
            .map_err(|e| OcrError::Internal(format!("Failed to create temp file: {}", e)))?;
        temp_file
            .write_all(&png)
            .and_then(|_| temp_file.flush())
            .map_err(|e| OcrError::Internal(format!("Failed to write temp file: {}", e)))?;

        tracing::debug!(
            "Running tesseract on {}x{} image ({} bytes), language {}",
            image.width(),
            image.height(),
            png.len(),
            language
        );

        // OEM 3 = default engine mode, PSM 3 = fully automatic page segmentation
        let output = self.run([
            temp_file.path().as_os_str(),
            OsStr::new("stdout"),
            OsStr::new("-l"),
            OsStr::new(language),
            OsStr::new("--oem"),
            OsStr::new("3"),
            OsStr::new("--psm"),
            OsStr::new("3"),
            OsStr::new("tsv"),
        ])?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(OcrError::OcrFailure(format!(
                "tesseract exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        parse_tsv(&String::from_utf8_lossy(&output.stdout))
    }
}

/// Language codes look like `eng`, `chi_sim` or `eng+deu`
fn validate_language(language: &str) -> Result<(), OcrError> {
    let valid = !language.is_empty()
        && language
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '+');
    if valid {
        Ok(())
    } else {
        Err(OcrError::InvalidArguments(format!(
            "Invalid language code: {:?}",
            language
        )))
    }
}

/// `tesseract 5.3.4` / `tesseract v5.0.0-alpha` -> version token
fn parse_version(banner: &str) -> Option<String> {
    let first = banner.lines().find(|l| !l.trim().is_empty())?;
    let mut parts = first.split_whitespace();
    if !parts.next()?.eq_ignore_ascii_case("tesseract") {
        return None;
    }
    let version = parts.next()?.trim_start_matches('v');
    Some(version.to_string())
}

/// Parse `tsv` output into tokens, one per row including layout rows
fn parse_tsv(tsv: &str) -> Result<Vec<OcrToken>, OcrError> {
    let mut tokens = Vec::new();

    for (number, row) in tsv.lines().enumerate() {
        if row.trim().is_empty() || (number == 0 && row.starts_with("level")) {
            continue;
        }

        let fields: Vec<&str> = row.splitn(TSV_COLUMNS, '\t').collect();
        if fields.len() < TSV_COLUMNS - 1 {
            return Err(OcrError::OcrFailure(format!(
                "Malformed TSV row {}: expected {} columns, got {}",
                number + 1,
                TSV_COLUMNS,
                fields.len()
            )));
        }

        let int = |i: usize| -> Result<u32, OcrError> {
            fields[i].trim().parse::<u32>().map_err(|e| {
                OcrError::OcrFailure(format!(
                    "Malformed TSV row {} column {}: {:?} ({})",
                    number + 1,
                    i + 1,
                    fields[i],
                    e
                ))
            })
        };

        let confidence = fields[10].trim().parse::<f32>().map_err(|e| {
            OcrError::OcrFailure(format!(
                "Malformed TSV row {} confidence {:?} ({})",
                number + 1,
                fields[10],
                e
            ))
        })?;

        let line = LineKey {
            page: int(1)?,
            block: int(2)?,
            paragraph: int(3)?,
            line: int(4)?,
        };
        let bbox = BoundingBox {
            left: int(6)?,
            top: int(7)?,
            width: int(8)?,
            height: int(9)?,
        };
        let text = fields.get(11).copied().unwrap_or_default();

        tokens.push(
            OcrToken::new(text, confidence)
                .with_line(line)
                .with_bbox(bbox),
        );
    }

    Ok(tokens)
}
