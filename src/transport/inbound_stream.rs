use crate::{audio_analyzer::AudioAnalysisNode, motion_analyzer::VideoFrameSource};

/// Remote media received on a call.
///
/// Owned by the session for the call's lifetime and lent to the analyzers:
/// the views handed out here never stop the stream's tracks.
pub trait InboundStream {
    /// Opens an analyzer-owned analysis graph on the audio track, if there is one.
    fn open_audio_analysis(&self, fft_size: usize) -> Option<Box<dyn AudioAnalysisNode>>;

    /// The video sink the stream is attached to, if it carries video.
    fn video_source(&self) -> Option<Box<dyn VideoFrameSource>>;

    /// Stops every track. Only the session calls this.
    fn stop_tracks(&mut self);
}
