use super::frame_error::FrameError;

/// A playing video sink the motion analyzer can sample.
///
/// Lent to the analyzer: sampling never stops or detaches the underlying
/// stream.
pub trait VideoFrameSource {
    /// Draws the current frame downsampled to `width × height` as packed RGBA
    /// into `out`, replacing its contents.
    ///
    /// # Errors
    /// [`FrameError::NotReady`] when no frame is available yet.
    fn draw_rgba(&mut self, width: u32, height: u32, out: &mut Vec<u8>) -> Result<(), FrameError>;
}
