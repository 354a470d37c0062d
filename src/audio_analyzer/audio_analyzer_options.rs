/// Configuration of an [`AudioLevelAnalyzer`](super::AudioLevelAnalyzer).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AudioAnalyzerOptions {
    /// Level in [0, 1] at or above which an alert fires.
    pub alert_threshold: f32,
    /// Minimum milliseconds between two alerts.
    pub alert_cooldown_ms: u64,
    /// Apply the A-weighting curve to the spectrum before the RMS.
    pub use_weighting: bool,
    /// Transform size requested from the analysis node.
    pub fft_size: usize,
    /// Multiplier from weighted RMS to display level. Tuned by ear on laptop
    /// microphones; recalibrate for other hardware.
    pub display_gain: f32,
}

impl Default for AudioAnalyzerOptions {
    fn default() -> Self {
        Self {
            alert_threshold: 0.6,
            alert_cooldown_ms: 3_000,
            use_weighting: true,
            fft_size: 512,
            display_gain: 2.5,
        }
    }
}

/// Clamps an alert threshold to [0, 1]; NaN yields `fallback`.
#[must_use]
pub fn clamp_alert_threshold(value: f32, fallback: f32) -> f32 {
    if value.is_nan() {
        fallback
    } else {
        value.clamp(0.0, 1.0)
    }
}
