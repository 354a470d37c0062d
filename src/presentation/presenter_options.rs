/// Presentation settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PresenterOptions {
    /// How long an alert toast stays up before it is dismissed.
    pub toast_duration_ms: u64,
}

impl Default for PresenterOptions {
    fn default() -> Self {
        Self {
            toast_duration_ms: 3_000,
        }
    }
}
