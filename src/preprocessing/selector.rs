use super::mode::Mode;
use super::stats::ImageStatistics;

/// Below this deviation the page is treated as faded / low contrast
const LOW_CONTRAST_STD: f64 = 40.0;
/// Bright page ...
const CLEAN_SCAN_MEAN: f64 = 200.0;
/// ... with crisp dark text on it
const CLEAN_SCAN_STD: f64 = 50.0;

/// Map image statistics to a concrete preprocessing mode.
///
/// First match wins. `Receipt` is never chosen here: nothing in the
/// brightness histogram tells a receipt apart from any other faded page.
pub fn select(stats: &ImageStatistics) -> Mode {
    if stats.std_brightness < LOW_CONTRAST_STD {
        return Mode::Aggressive;
    }

    if stats.mean_brightness > CLEAN_SCAN_MEAN && stats.std_brightness > CLEAN_SCAN_STD {
        return Mode::Minimal;
    }

    Mode::Standard
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(mean: f64, std: f64) -> ImageStatistics {
        ImageStatistics {
            mean_brightness: mean,
            std_brightness: std,
        }
    }

    #[test]
    fn test_low_deviation_selects_aggressive() {
        assert_eq!(select(&stats(128.0, 0.0)), Mode::Aggressive);
        assert_eq!(select(&stats(250.0, 39.99)), Mode::Aggressive);
        assert_eq!(select(&stats(10.0, 12.0)), Mode::Aggressive);
    }

    #[test]
    fn test_bright_high_contrast_selects_minimal() {
        assert_eq!(select(&stats(200.01, 50.01)), Mode::Minimal);
        assert_eq!(select(&stats(230.0, 90.0)), Mode::Minimal);
    }

    #[test]
    fn test_boundaries_fall_through_to_standard() {
        // Exactly 40 is no longer low contrast
        assert_eq!(select(&stats(128.0, 40.0)), Mode::Standard);
        // Strict comparisons on both minimal thresholds
        assert_eq!(select(&stats(200.0, 80.0)), Mode::Standard);
        assert_eq!(select(&stats(240.0, 50.0)), Mode::Standard);
        // Bright but mid-contrast
        assert_eq!(select(&stats(220.0, 45.0)), Mode::Standard);
    }

    #[test]
    fn test_never_returns_receipt_or_auto() {
        for mean in (0..=255).step_by(5) {
            for std in (0..=130).step_by(5) {
                let mode = select(&stats(mean as f64, std as f64));
                assert!(mode.is_concrete());
                assert_ne!(mode, Mode::Receipt);
            }
        }
    }
}
