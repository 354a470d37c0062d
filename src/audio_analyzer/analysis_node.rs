/// An analysis graph attached to a live audio track.
///
/// The analyzer owns the node (and the processing context behind it) but not
/// the track it listens to: closing the node must never stop the track.
pub trait AudioAnalysisNode {
    fn sample_rate(&self) -> f32;

    /// Transform size in samples; the spectrum has `fft_size / 2` bins.
    fn fft_size(&self) -> usize;

    fn frequency_bin_count(&self) -> usize {
        self.fft_size() / 2
    }

    /// Writes the current byte magnitude spectrum into `out` and returns how
    /// many bins were written.
    fn byte_frequency_data(&mut self, out: &mut [u8]) -> usize;

    /// Disconnects the graph and closes the processing context. Idempotent.
    fn close(&mut self);
}
