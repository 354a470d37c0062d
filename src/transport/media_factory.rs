use super::media_error::MediaError;

/// The outgoing placeholder stream: a silent oscillator track plus a 1×1
/// canvas-captured video track. The call primitive refuses to negotiate
/// without at least one local track.
///
/// Exclusively owned by the session and recreated for every attempt.
pub trait PlaceholderStream {
    fn track_count(&self) -> usize;

    /// Stops the synthetic tracks and closes the audio context behind them.
    /// Idempotent.
    fn release(&mut self);
}

/// Builds placeholder streams.
pub trait MediaFactory {
    type Placeholder: PlaceholderStream;

    /// # Errors
    /// [`MediaError`] when the host cannot produce the synthetic tracks.
    fn create_placeholder(&mut self) -> Result<Self::Placeholder, MediaError>;
}
