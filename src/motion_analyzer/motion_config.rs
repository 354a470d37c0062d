/// Lowest accepted motion threshold; below it sensor noise alerts every tick.
pub const MIN_THRESHOLD: f32 = 0.01;
/// Highest accepted motion threshold; above it nothing short of a cut fires.
pub const MAX_THRESHOLD: f32 = 0.5;

/// Configuration of a [`MotionAnalyzer`](super::MotionAnalyzer).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionConfig {
    /// Sample resolution frames are downsampled to.
    pub width: u32,
    pub height: u32,
    /// Process one animation tick out of `frame_skip`.
    pub frame_skip: u32,
    /// Processed frames spent only recording a baseline after (re)start.
    pub stabilization_frames: u32,
    pub alert_cooldown_ms: u64,
    /// Motion score above which an alert fires; clamped to
    /// [`MIN_THRESHOLD`, `MAX_THRESHOLD`].
    pub threshold: f32,
    /// Multiplier from motion score to display level.
    pub display_gain: f32,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            width: 160,
            height: 120,
            frame_skip: 2,
            stabilization_frames: 10,
            alert_cooldown_ms: 2_000,
            threshold: 0.02,
            display_gain: 10.0,
        }
    }
}

/// Clamps into the accepted range; NaN keeps `fallback`.
#[must_use]
pub fn clamp_threshold(value: f32, fallback: f32) -> f32 {
    if value.is_nan() {
        fallback
    } else {
        value.clamp(MIN_THRESHOLD, MAX_THRESHOLD)
    }
}
