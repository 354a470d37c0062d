use crate::{
    audio_analyzer::{AudioAnalyzerOptions, audio_analyzer_options::clamp_alert_threshold},
    detector::AlertChannel,
    motion_analyzer::{MotionConfig, motion_config::clamp_threshold},
};

/// Detector configuration that outlives any single call.
///
/// Analyzers are rebuilt on every inbound stream; the thresholds and pause
/// flags the user set on the previous ones carry over from here.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DetectorSettings {
    pub audio: AudioAnalyzerOptions,
    pub motion: MotionConfig,
    pub audio_paused: bool,
    pub motion_paused: bool,
}

impl DetectorSettings {
    #[must_use]
    pub fn new(audio: AudioAnalyzerOptions, motion: MotionConfig) -> Self {
        Self {
            audio,
            motion,
            ..Self::default()
        }
    }

    /// Records a threshold with the same clamping the analyzer applies.
    pub fn set_threshold(&mut self, channel: AlertChannel, threshold: f32) {
        match channel {
            AlertChannel::Audio => {
                self.audio.alert_threshold =
                    clamp_alert_threshold(threshold, self.audio.alert_threshold);
            }
            AlertChannel::Motion => {
                self.motion.threshold = clamp_threshold(threshold, self.motion.threshold);
            }
        }
    }

    pub fn set_paused(&mut self, channel: AlertChannel, paused: bool) {
        match channel {
            AlertChannel::Audio => self.audio_paused = paused,
            AlertChannel::Motion => self.motion_paused = paused,
        }
    }

    #[must_use]
    pub fn is_paused(&self, channel: AlertChannel) -> bool {
        match channel {
            AlertChannel::Audio => self.audio_paused,
            AlertChannel::Motion => self.motion_paused,
        }
    }
}
