//! Reduction of raw OCR tokens to summary metadata

use serde::Serialize;

/// Pixel rectangle of a token in the recognized image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct BoundingBox {
    pub left: u32,
    pub top: u32,
    pub width: u32,
    pub height: u32,
}

/// Layout position of a token as reported by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct LineKey {
    pub page: u32,
    pub block: u32,
    pub paragraph: u32,
    pub line: u32,
}

impl LineKey {
    fn same_paragraph(&self, other: &LineKey) -> bool {
        self.page == other.page && self.block == other.block && self.paragraph == other.paragraph
    }
}

/// One unit of engine output.
/// `confidence` is 0-100; a negative value means "no text detected here".
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OcrToken {
    pub text: String,
    pub confidence: f32,
    pub bbox: BoundingBox,
    pub line: LineKey,
}

impl OcrToken {
    pub fn new(text: impl Into<String>, confidence: f32) -> Self {
        Self {
            text: text.into(),
            confidence,
            bbox: BoundingBox::default(),
            line: LineKey::default(),
        }
    }

    pub fn with_line(mut self, line: LineKey) -> Self {
        self.line = line;
        self
    }

    pub fn with_bbox(mut self, bbox: BoundingBox) -> Self {
        self.bbox = bbox;
        self
    }
}

/// Summary metadata for one OCR invocation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OcrSummary {
    pub text: String,
    pub word_count: usize,
    /// Mean of positive confidences, 0-100, two decimals
    pub average_confidence: f64,
    pub language: String,
    pub engine_version: String,
}

/// Reduce tokens to text, word count and average confidence.
///
/// Words on the same line are joined by a space, lines by a newline and
/// paragraphs by a blank line. Zero and negative confidences are
/// placeholders and do not count towards the average.
pub fn summarize(tokens: &[OcrToken], language: &str, engine_version: &str) -> OcrSummary {
    let mut text = String::new();
    let mut previous: Option<LineKey> = None;
    let mut word_count = 0;

    for token in tokens {
        let word = token.text.trim();
        if word.is_empty() {
            continue;
        }
        word_count += 1;

        if let Some(prev) = previous {
            let separator = if !prev.same_paragraph(&token.line) {
                "\n\n"
            } else if prev.line != token.line.line {
                "\n"
            } else {
                " "
            };
            text.push_str(separator);
        }
        text.push_str(word);
        previous = Some(token.line);
    }

    let confidences: Vec<f64> = tokens
        .iter()
        .map(|t| t.confidence as f64)
        .filter(|c| *c > 0.0)
        .collect();
    let average = if confidences.is_empty() {
        0.0
    } else {
        confidences.iter().sum::<f64>() / confidences.len() as f64
    };

    OcrSummary {
        text: text.trim().to_string(),
        word_count,
        average_confidence: round2(average),
        language: language.to_string(),
        engine_version: engine_version.to_string(),
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(block: u32, paragraph: u32, line: u32) -> LineKey {
        LineKey {
            page: 1,
            block,
            paragraph,
            line,
        }
    }

    #[test]
    fn test_placeholders_are_skipped() {
        let tokens = vec![
            OcrToken::new("Hello", 90.0),
            OcrToken::new("", -1.0),
            OcrToken::new("World", 80.0),
        ];

        let summary = summarize(&tokens, "eng", "5.3.4");

        assert_eq!(summary.word_count, 2);
        assert_eq!(summary.average_confidence, 85.0);
        assert!(summary.text.contains("Hello"));
        assert!(summary.text.contains("World"));
        assert_eq!(summary.text, "Hello World");
        assert_eq!(summary.language, "eng");
        assert_eq!(summary.engine_version, "5.3.4");
    }

    #[test]
    fn test_empty_input() {
        let summary = summarize(&[], "eng", "5.3.4");
        assert_eq!(summary.word_count, 0);
        assert_eq!(summary.average_confidence, 0.0);
        assert_eq!(summary.text, "");
    }

    #[test]
    fn test_no_positive_confidence_averages_to_zero() {
        let tokens = vec![OcrToken::new("", -1.0), OcrToken::new("?", 0.0)];
        let summary = summarize(&tokens, "eng", "5");
        assert_eq!(summary.average_confidence, 0.0);
        assert_eq!(summary.word_count, 1);
    }

    #[test]
    fn test_confidence_rounded_to_two_decimals() {
        let tokens = vec![
            OcrToken::new("a", 90.0),
            OcrToken::new("b", 91.0),
            OcrToken::new("c", 93.0),
        ];
        let summary = summarize(&tokens, "eng", "5");
        assert_eq!(summary.average_confidence, 91.33);
    }

    #[test]
    fn test_whitespace_only_tokens_are_not_words() {
        let tokens = vec![OcrToken::new("  ", 50.0), OcrToken::new(" TOTAL ", 70.0)];
        let summary = summarize(&tokens, "eng", "5");
        assert_eq!(summary.word_count, 1);
        assert_eq!(summary.text, "TOTAL");
        // Whitespace token still carries a real confidence
        assert_eq!(summary.average_confidence, 60.0);
    }

    #[test]
    fn test_layout_drives_separators() {
        let tokens = vec![
            OcrToken::new("", -1.0).with_line(line(1, 1, 1)),
            OcrToken::new("ACME", 95.0).with_line(line(1, 1, 1)),
            OcrToken::new("Store", 94.0).with_line(line(1, 1, 1)),
            OcrToken::new("Milk", 88.0).with_line(line(1, 1, 2)),
            OcrToken::new("2.49", 87.0).with_line(line(1, 1, 2)),
            OcrToken::new("TOTAL", 91.0).with_line(line(2, 1, 1)),
        ];

        let summary = summarize(&tokens, "eng", "5");

        assert_eq!(summary.text, "ACME Store\nMilk 2.49\n\nTOTAL");
        assert_eq!(summary.word_count, 5);
    }
}
