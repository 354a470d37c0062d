/// Tuning for a [`DecayingMeter`](super::DecayingMeter).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeterOptions {
    /// Milliseconds for a full-scale value to decay to zero.
    pub decay_resistance_ms: u64,
    /// Milliseconds a fresh peak is held before decay starts.
    pub sustain_period_ms: u64,
    pub warning_threshold: f32,
    pub danger_threshold: f32,
    /// Period of the background decay timer.
    pub tick_interval_ms: u64,
}

impl Default for MeterOptions {
    fn default() -> Self {
        Self {
            decay_resistance_ms: 500,
            sustain_period_ms: 250,
            warning_threshold: 0.5,
            danger_threshold: 0.8,
            tick_interval_ms: 16,
        }
    }
}
