use std::sync::{Arc, mpsc::Sender};

use crate::{
    audio_analyzer::AudioLevelAnalyzer,
    clock::Clock,
    core::events::MonitorEvent,
    detector::{AlertChannel, AnalyzerCallbacks},
    log::log_sink::LogSink,
    motion_analyzer::MotionAnalyzer,
    sink_debug,
    transport::InboundStream,
};

use super::detector_settings::DetectorSettings;

/// The analyzers currently attached to an inbound stream.
///
/// Either side may be absent when the stream lacks that kind of track.
#[derive(Default)]
pub struct AnalyzerBindings {
    audio: Option<AudioLevelAnalyzer>,
    motion: Option<MotionAnalyzer>,
}

impl AnalyzerBindings {
    /// Replaces any current analyzers with fresh ones on `inbound`.
    ///
    /// Returns `true` when at least one analyzer was attached.
    pub fn bind(
        &mut self,
        inbound: &dyn InboundStream,
        settings: &DetectorSettings,
        tx: &Sender<MonitorEvent>,
        clock: &Arc<dyn Clock>,
        logger: &Arc<dyn LogSink>,
    ) -> bool {
        self.unbind();

        self.audio = inbound
            .open_audio_analysis(settings.audio.fft_size)
            .map(|node| {
                let mut a = AudioLevelAnalyzer::new(
                    node,
                    AnalyzerCallbacks::forward_to(tx.clone(), AlertChannel::Audio),
                    settings.audio,
                    clock.clone(),
                    logger.clone(),
                );
                a.set_paused(settings.audio_paused);
                a
            });

        self.motion = inbound.video_source().map(|source| {
            let mut m = MotionAnalyzer::new(
                source,
                AnalyzerCallbacks::forward_to(tx.clone(), AlertChannel::Motion),
                settings.motion,
                clock.clone(),
                logger.clone(),
            );
            m.set_paused(settings.motion_paused);
            m.start();
            m
        });

        sink_debug!(
            logger,
            "[Session] analyzers bound (audio: {}, motion: {})",
            self.audio.is_some(),
            self.motion.is_some()
        );
        self.is_bound()
    }

    /// Stops and drops both analyzers. Idempotent.
    pub fn unbind(&mut self) {
        if let Some(mut audio) = self.audio.take() {
            audio.stop();
        }
        if let Some(mut motion) = self.motion.take() {
            motion.stop();
        }
    }

    /// Runs one animation tick on each bound analyzer, audio first.
    pub fn tick(&mut self) {
        if let Some(audio) = self.audio.as_mut() {
            audio.tick();
        }
        if let Some(motion) = self.motion.as_mut() {
            motion.tick();
        }
    }

    pub fn set_threshold(&mut self, channel: AlertChannel, threshold: f32) {
        match channel {
            AlertChannel::Audio => {
                if let Some(a) = self.audio.as_mut() {
                    a.set_threshold(threshold);
                }
            }
            AlertChannel::Motion => {
                if let Some(m) = self.motion.as_mut() {
                    m.set_threshold(threshold);
                }
            }
        }
    }

    pub fn set_paused(&mut self, channel: AlertChannel, paused: bool) {
        match channel {
            AlertChannel::Audio => {
                if let Some(a) = self.audio.as_mut() {
                    a.set_paused(paused);
                }
            }
            AlertChannel::Motion => {
                if let Some(m) = self.motion.as_mut() {
                    m.set_paused(paused);
                }
            }
        }
    }

    #[must_use]
    pub fn is_bound(&self) -> bool {
        self.audio.is_some() || self.motion.is_some()
    }

    #[must_use]
    pub fn audio(&self) -> Option<&AudioLevelAnalyzer> {
        self.audio.as_ref()
    }

    #[must_use]
    pub fn motion(&self) -> Option<&MotionAnalyzer> {
        self.motion.as_ref()
    }
}
