/// Smallest base delay accepted from configuration.
pub const MIN_BASE_DELAY_MS: u64 = 5_000;
/// Largest base delay accepted from configuration (ten minutes).
pub const MAX_BASE_DELAY_MS: u64 = 600_000;

/// Jittered retry delay: `base + jitter * factor * base`.
///
/// The base must stay above the transport's call-negotiation timeout (about
/// 5 s for the WebRTC stack this was tuned against) so a retry never races
/// an attempt that is still negotiating.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    pub base_delay_ms: u64,
    pub jitter_factor: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            base_delay_ms: 5_000,
            jitter_factor: 0.5,
        }
    }
}

impl RetryPolicy {
    /// Delay for a jitter sample in `[0, 1)`. Samples outside that range count as 0.
    #[must_use]
    pub fn delay_ms(&self, jitter: f64) -> u64 {
        let jitter = if (0.0..1.0).contains(&jitter) { jitter } else { 0.0 };
        let factor = self.jitter_factor.max(0.0);
        let extra = (jitter * factor * self.base_delay_ms as f64).floor() as u64;
        self.base_delay_ms.saturating_add(extra)
    }

    /// Upper bound (exclusive when `jitter_factor > 0`) of [`delay_ms`](Self::delay_ms).
    #[must_use]
    pub fn max_delay_ms(&self) -> u64 {
        self.base_delay_ms
            .saturating_add((self.jitter_factor.max(0.0) * self.base_delay_ms as f64) as u64)
    }
}

/// Keeps a configured base delay within [`MIN_BASE_DELAY_MS`, `MAX_BASE_DELAY_MS`].
#[must_use]
pub fn clamp_base_delay(base_delay_ms: u64) -> u64 {
    base_delay_ms.clamp(MIN_BASE_DELAY_MS, MAX_BASE_DELAY_MS)
}
