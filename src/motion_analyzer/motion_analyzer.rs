use std::sync::Arc;

use crate::{
    clock::Clock,
    detector::{alert_gate::AlertGate, analyzer_callbacks::AnalyzerCallbacks},
    log::log_sink::LogSink,
    sink_debug, sink_info, sink_trace, sink_warn,
};

use super::{
    frame_source::VideoFrameSource,
    gray_frame::GrayFrame,
    laplacian::motion_score,
    motion_config::{MotionConfig, clamp_threshold},
};

/// Outcome of one processed tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionReading {
    /// Raw motion score compared against the threshold.
    pub score: f32,
    /// Display level emitted through the level callback.
    pub level: f32,
    pub alerted: bool,
}

/// Samples a playing video sink and reports a motion level, raising a
/// debounced alert when the motion score exceeds the threshold.
pub struct MotionAnalyzer {
    source: Box<dyn VideoFrameSource>,
    callbacks: AnalyzerCallbacks,
    config: MotionConfig,
    threshold: f32,
    gate: AlertGate,
    paused: bool,
    running: bool,
    tick_count: u64,
    settled_frames: u32,
    previous: Option<GrayFrame>,
    rgba: Vec<u8>,
    clock: Arc<dyn Clock>,
    logger: Arc<dyn LogSink>,
}

impl MotionAnalyzer {
    /// Builds a stopped analyzer; call [`start`](Self::start) to begin sampling.
    pub fn new(
        source: Box<dyn VideoFrameSource>,
        callbacks: AnalyzerCallbacks,
        config: MotionConfig,
        clock: Arc<dyn Clock>,
        logger: Arc<dyn LogSink>,
    ) -> Self {
        let defaults = MotionConfig::default();
        let config = MotionConfig {
            frame_skip: config.frame_skip.max(1),
            width: if config.width == 0 { defaults.width } else { config.width },
            height: if config.height == 0 { defaults.height } else { config.height },
            ..config
        };
        Self {
            source,
            callbacks,
            threshold: clamp_threshold(config.threshold, defaults.threshold),
            gate: AlertGate::new(config.alert_cooldown_ms),
            config,
            paused: false,
            running: false,
            tick_count: 0,
            settled_frames: 0,
            previous: None,
            rgba: Vec::new(),
            clock,
            logger,
        }
    }

    /// Starts (or restarts) the sampling loop with a fresh baseline. Idempotent
    /// while running.
    pub fn start(&mut self) {
        if self.running {
            return;
        }
        self.running = true;
        self.tick_count = 0;
        self.reset_baseline();
        sink_debug!(
            self.logger,
            "[Motion] analyzer started at {}x{}, skip {}",
            self.config.width,
            self.config.height,
            self.config.frame_skip
        );
    }

    /// One animation tick. Returns a reading on ticks that were processed.
    pub fn tick(&mut self) -> Option<MotionReading> {
        if !self.running {
            return None;
        }
        self.tick_count += 1;
        if self.paused || self.tick_count % u64::from(self.config.frame_skip) != 0 {
            return None;
        }

        let (w, h) = (self.config.width, self.config.height);
        let frame = self
            .source
            .draw_rgba(w, h, &mut self.rgba)
            .and_then(|()| GrayFrame::from_rgba(w as usize, h as usize, &self.rgba));
        let frame = match frame {
            Ok(frame) => frame,
            Err(e) => {
                sink_warn!(self.logger, "[Motion] frame skipped: {e}");
                self.callbacks.level(0.0);
                return Some(MotionReading {
                    score: 0.0,
                    level: 0.0,
                    alerted: false,
                });
            }
        };

        let Some(previous) = self.previous.replace(frame) else {
            self.settled_frames = 1;
            return Some(self.emit_settling());
        };
        if self.settled_frames < self.config.stabilization_frames {
            self.settled_frames += 1;
            return Some(self.emit_settling());
        }

        let score = self
            .previous
            .as_ref()
            .map_or(0.0, |current| motion_score(&previous, current));
        let level = (score * self.config.display_gain).clamp(0.0, 1.0);
        sink_trace!(self.logger, "[Motion] score {score:.4} level {level:.3}");
        self.callbacks.level(level);

        let alerted = score > self.threshold && self.gate.try_fire(self.clock.now_ms());
        if alerted {
            sink_info!(
                self.logger,
                "[Motion] alert: score {score:.4} > {:.4}",
                self.threshold
            );
            self.callbacks.alert();
        }
        Some(MotionReading {
            score,
            level,
            alerted,
        })
    }

    /// Stops sampling and drops the baseline frame. Safe to call repeatedly.
    pub fn stop(&mut self) {
        if self.running {
            sink_debug!(self.logger, "[Motion] analyzer stopped");
        }
        self.running = false;
        self.reset_baseline();
        self.rgba = Vec::new();
    }

    /// Stores the threshold clamped to [0.01, 0.5]; NaN keeps the current value.
    pub fn set_threshold(&mut self, threshold: f32) {
        self.threshold = clamp_threshold(threshold, self.threshold);
    }

    #[must_use]
    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Pausing drops the baseline so that resuming re-stabilizes instead of
    /// comparing against a stale frame. The loop itself keeps running.
    pub fn set_paused(&mut self, paused: bool) {
        if paused && !self.paused {
            self.reset_baseline();
        }
        self.paused = paused;
    }

    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running
    }

    fn reset_baseline(&mut self) {
        self.previous = None;
        self.settled_frames = 0;
    }

    fn emit_settling(&mut self) -> MotionReading {
        self.callbacks.level(0.0);
        MotionReading {
            score: 0.0,
            level: 0.0,
            alerted: false,
        }
    }
}
