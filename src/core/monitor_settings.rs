use std::str::FromStr;

use crate::{
    audio_analyzer::{AudioAnalyzerOptions, audio_analyzer_options::clamp_alert_threshold},
    config::Config,
    log::log_sink::LogSink,
    meter::MeterOptions,
    motion_analyzer::{MotionConfig, motion_config::clamp_threshold},
    presentation::PresenterOptions,
    session::{DetectorSettings, RetryPolicy, retry_policy::clamp_base_delay},
    sink_warn,
};

const DEFAULT_ROOM: &str = "roomwatch";

/// Everything a [`Monitor`](super::monitor::Monitor) is tuned by.
#[derive(Debug, Clone, PartialEq)]
pub struct MonitorSettings {
    /// Id of the room the monitored peer listens on.
    pub room_id: String,
    pub retry: RetryPolicy,
    pub detectors: DetectorSettings,
    pub meter: MeterOptions,
    pub presenter: PresenterOptions,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            room_id: DEFAULT_ROOM.to_owned(),
            retry: RetryPolicy::default(),
            detectors: DetectorSettings::default(),
            meter: MeterOptions::default(),
            presenter: PresenterOptions::default(),
        }
    }
}

impl MonitorSettings {
    /// Reads the `[Session]`, `[Audio]`, `[Motion]`, `[Meter]` and `[Alerts]`
    /// sections.
    ///
    /// Missing keys keep their defaults. Values that do not parse are logged
    /// and ignored; values out of range are clamped.
    #[must_use]
    pub fn from_config(config: &Config, logger: &dyn LogSink) -> Self {
        let mut s = Self::default();
        let r = Reader { config, logger };

        if let Some(room) = config.get_non_empty("Session", "room_id") {
            s.room_id = room.to_owned();
        }
        r.set("Session", "retry_base_ms", &mut s.retry.base_delay_ms);
        let base = clamp_base_delay(s.retry.base_delay_ms);
        if base != s.retry.base_delay_ms {
            sink_warn!(
                logger,
                "[Config] Session.retry_base_ms = {} is out of range, using {base}",
                s.retry.base_delay_ms
            );
            s.retry.base_delay_ms = base;
        }
        r.set("Session", "retry_jitter", &mut s.retry.jitter_factor);
        s.retry.jitter_factor = s.retry.jitter_factor.clamp(0.0, 1.0);

        let audio = &mut s.detectors.audio;
        r.set("Audio", "threshold", &mut audio.alert_threshold);
        audio.alert_threshold = clamp_alert_threshold(
            audio.alert_threshold,
            AudioAnalyzerOptions::default().alert_threshold,
        );
        r.set("Audio", "cooldown_ms", &mut audio.alert_cooldown_ms);
        r.set_bool("Audio", "weighting", &mut audio.use_weighting);
        r.set("Audio", "fft_size", &mut audio.fft_size);
        audio.fft_size = audio.fft_size.clamp(32, 32_768).next_power_of_two();
        r.set("Audio", "display_gain", &mut audio.display_gain);
        audio.display_gain = audio.display_gain.max(0.0);
        r.set_bool("Audio", "paused", &mut s.detectors.audio_paused);

        let motion = &mut s.detectors.motion;
        r.set("Motion", "width", &mut motion.width);
        r.set("Motion", "height", &mut motion.height);
        motion.width = motion.width.max(3);
        motion.height = motion.height.max(3);
        r.set("Motion", "frame_skip", &mut motion.frame_skip);
        motion.frame_skip = motion.frame_skip.max(1);
        r.set("Motion", "stabilization_frames", &mut motion.stabilization_frames);
        r.set("Motion", "cooldown_ms", &mut motion.alert_cooldown_ms);
        r.set("Motion", "threshold", &mut motion.threshold);
        motion.threshold = clamp_threshold(motion.threshold, MotionConfig::default().threshold);
        r.set("Motion", "display_gain", &mut motion.display_gain);
        motion.display_gain = motion.display_gain.max(0.0);
        r.set_bool("Motion", "paused", &mut s.detectors.motion_paused);

        r.set("Meter", "decay_resistance_ms", &mut s.meter.decay_resistance_ms);
        r.set("Meter", "sustain_period_ms", &mut s.meter.sustain_period_ms);
        r.set("Meter", "warning_threshold", &mut s.meter.warning_threshold);
        r.set("Meter", "danger_threshold", &mut s.meter.danger_threshold);
        r.set("Meter", "tick_interval_ms", &mut s.meter.tick_interval_ms);
        s.meter.warning_threshold = s.meter.warning_threshold.clamp(0.0, 1.0);
        s.meter.danger_threshold = s.meter.danger_threshold.clamp(s.meter.warning_threshold, 1.0);

        r.set("Alerts", "toast_ms", &mut s.presenter.toast_duration_ms);

        s
    }
}

struct Reader<'a> {
    config: &'a Config,
    logger: &'a dyn LogSink,
}

impl Reader<'_> {
    fn set<T: FromStr>(&self, section: &str, key: &str, slot: &mut T) {
        match self.config.parsed::<T>(section, key) {
            Some(Ok(v)) => *slot = v,
            Some(Err(raw)) => {
                sink_warn!(self.logger, "[Config] {section}.{key} = {raw:?} is not valid, keeping default");
            }
            None => {}
        }
    }

    fn set_bool(&self, section: &str, key: &str, slot: &mut bool) {
        match self.config.parsed_bool(section, key) {
            Some(Ok(v)) => *slot = v,
            Some(Err(raw)) => {
                sink_warn!(self.logger, "[Config] {section}.{key} = {raw:?} is not a boolean, keeping default");
            }
            None => {}
        }
    }
}
