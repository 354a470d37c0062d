use std::{cell::Cell, rc::Rc};

use crate::{
    audio_analyzer::{AudioAnalysisNode, PcmAnalyserNode, PcmSource},
    motion_analyzer::{FrameError, VideoFrameSource},
    transport::InboundStream,
};

use super::synthetic_scene::SyntheticScene;

/// Remote stream whose tracks are views of a [`SyntheticScene`].
pub struct SyntheticInbound {
    scene: SyntheticScene,
    audio: bool,
    video: bool,
    stopped: Rc<Cell<bool>>,
}

impl SyntheticInbound {
    /// A stream with one audio and one video track.
    #[must_use]
    pub fn new(scene: SyntheticScene) -> Self {
        Self {
            scene,
            audio: true,
            video: true,
            stopped: Rc::new(Cell::new(false)),
        }
    }

    #[must_use]
    pub fn video_only(scene: SyntheticScene) -> Self {
        Self {
            audio: false,
            ..Self::new(scene)
        }
    }

    /// Shared flag that turns `true` once the tracks are stopped.
    #[must_use]
    pub fn stop_flag(&self) -> Rc<Cell<bool>> {
        self.stopped.clone()
    }
}

impl InboundStream for SyntheticInbound {
    fn open_audio_analysis(&self, fft_size: usize) -> Option<Box<dyn AudioAnalysisNode>> {
        if !self.audio || self.stopped.get() {
            return None;
        }
        let mic = SceneMicrophone {
            scene: self.scene.clone(),
            stopped: self.stopped.clone(),
        };
        Some(Box::new(PcmAnalyserNode::new(
            Box::new(mic),
            self.scene.sample_rate(),
            fft_size,
        )))
    }

    fn video_source(&self) -> Option<Box<dyn VideoFrameSource>> {
        if !self.video {
            return None;
        }
        Some(Box::new(SceneCamera {
            scene: self.scene.clone(),
            stopped: self.stopped.clone(),
        }))
    }

    fn stop_tracks(&mut self) {
        self.stopped.set(true);
    }
}

struct SceneCamera {
    scene: SyntheticScene,
    stopped: Rc<Cell<bool>>,
}

impl VideoFrameSource for SceneCamera {
    fn draw_rgba(&mut self, width: u32, height: u32, out: &mut Vec<u8>) -> Result<(), FrameError> {
        if self.stopped.get() {
            return Err(FrameError::NotReady);
        }
        self.scene.render(width, height, out);
        Ok(())
    }
}

struct SceneMicrophone {
    scene: SyntheticScene,
    stopped: Rc<Cell<bool>>,
}

impl PcmSource for SceneMicrophone {
    fn fill_latest(&mut self, out: &mut [f32]) {
        if self.stopped.get() {
            out.fill(0.0);
        } else {
            self.scene.fill_pcm(out);
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;

    #[test]
    fn stopped_stream_yields_no_frames() {
        let mut inbound = SyntheticInbound::new(SyntheticScene::default());
        let mut camera = inbound.video_source().unwrap();
        let mut buf = Vec::new();
        assert!(camera.draw_rgba(4, 4, &mut buf).is_ok());

        inbound.stop_tracks();
        assert_eq!(camera.draw_rgba(4, 4, &mut buf), Err(FrameError::NotReady));
        assert!(inbound.stop_flag().get());
    }

    #[test]
    fn video_only_stream_has_no_audio() {
        let inbound = SyntheticInbound::video_only(SyntheticScene::default());
        assert!(inbound.open_audio_analysis(512).is_none());
        assert!(inbound.video_source().is_some());
    }

    #[test]
    fn closing_analysis_leaves_tracks_running() {
        let inbound = SyntheticInbound::new(SyntheticScene::default());
        let mut node = inbound.open_audio_analysis(512).unwrap();
        assert_eq!(node.frequency_bin_count(), 256);
        node.close();
        assert!(!inbound.stop_flag().get());
    }
}
