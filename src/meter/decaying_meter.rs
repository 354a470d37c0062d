use std::sync::Arc;

use crate::clock::Clock;

use super::{meter_class::MeterClass, meter_options::MeterOptions, meter_sink::MeterSink};

/// Turns instantaneous level samples into a visually stable meter value.
///
/// New peaks are shown immediately. A peak is held for the sustain period,
/// then the value falls linearly so that full scale empties in
/// `decay_resistance_ms`. The host calls [`tick`](Self::tick) from a periodic
/// timer; ticks closer together than `tick_interval_ms` are ignored.
pub struct DecayingMeter<S: MeterSink> {
    sink: S,
    options: MeterOptions,
    clock: Arc<dyn Clock>,
    level: f32,
    peak_at_ms: u64,
    last_tick_ms: Option<u64>,
    running: bool,
}

impl<S: MeterSink> DecayingMeter<S> {
    pub fn new(sink: S, options: MeterOptions, clock: Arc<dyn Clock>) -> Self {
        let now = clock.now_ms();
        Self {
            sink,
            options,
            clock,
            level: 0.0,
            peak_at_ms: now,
            last_tick_ms: None,
            running: true,
        }
    }

    /// Feeds a new sample. Only values above the current level are taken.
    pub fn update(&mut self, level: f32) {
        if !self.running {
            return;
        }
        let level = if level.is_nan() { 0.0 } else { level.clamp(0.0, 1.0) };
        if level > self.level {
            self.level = level;
            self.peak_at_ms = self.clock.now_ms();
            self.render();
        }
    }

    /// Background decay step.
    pub fn tick(&mut self) {
        if !self.running {
            return;
        }
        let now = self.clock.now_ms();
        let last = match self.last_tick_ms {
            Some(last) if now.saturating_sub(last) < self.options.tick_interval_ms => return,
            Some(last) => last,
            None => now,
        };
        self.last_tick_ms = Some(now);

        if self.level <= 0.0 {
            return;
        }
        let hold_until = self.peak_at_ms.saturating_add(self.options.sustain_period_ms);
        if now < hold_until {
            return;
        }

        let decay_from = last.max(hold_until);
        let elapsed = now.saturating_sub(decay_from) as f32;
        let resistance = self.options.decay_resistance_ms.max(1) as f32;
        let next = (self.level - elapsed / resistance).max(0.0);
        if next != self.level {
            self.level = next;
            self.render();
        }
    }

    /// Cancels the background timer. Idempotent.
    pub fn stop(&mut self) {
        self.running = false;
    }

    #[must_use]
    pub fn level(&self) -> f32 {
        self.level
    }

    #[must_use]
    pub fn class(&self) -> MeterClass {
        MeterClass::classify(self.level, &self.options)
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running
    }

    #[must_use]
    pub fn sink(&self) -> &S {
        &self.sink
    }

    fn render(&mut self) {
        let class = self.class();
        self.sink.render(self.level, class);
    }
}
