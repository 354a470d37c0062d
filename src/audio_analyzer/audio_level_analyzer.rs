use std::sync::Arc;

use crate::{
    clock::Clock,
    detector::{alert_gate::AlertGate, analyzer_callbacks::AnalyzerCallbacks},
    log::log_sink::LogSink,
    sink_debug, sink_info, sink_trace, sink_warn,
};

use super::{
    a_weighting::{bin_weights, flat_weights},
    analysis_node::AudioAnalysisNode,
    audio_analyzer_options::{AudioAnalyzerOptions, clamp_alert_threshold},
};

/// Weighted RMS of a byte spectrum, scaled by `gain` and clamped to [0, 1].
///
/// `level = sqrt(Σ(m² · w) / Σw) · gain`, with `m = byte / 255`. Returns 0
/// when the spectrum and weights disagree in length or all weights are zero.
#[must_use]
pub fn weighted_level(spectrum: &[u8], weights: &[f32], gain: f32) -> f32 {
    if spectrum.len() != weights.len() {
        return 0.0;
    }
    let (sum, weight_sum) = spectrum
        .iter()
        .zip(weights)
        .fold((0.0f32, 0.0f32), |(sum, ws), (&b, &w)| {
            let m = f32::from(b) / 255.0;
            (sum + m * m * w, ws + w)
        });
    if weight_sum <= 0.0 {
        return 0.0;
    }
    ((sum / weight_sum).sqrt() * gain).clamp(0.0, 1.0)
}

/// Samples an audio analysis node once per animation tick and reports a
/// loudness level, raising a debounced alert when it crosses the threshold.
///
/// The analyzer starts sampling as soon as it is built. Threshold and pause
/// changes apply from the next tick.
pub struct AudioLevelAnalyzer {
    node: Option<Box<dyn AudioAnalysisNode>>,
    callbacks: AnalyzerCallbacks,
    weights: Vec<f32>,
    spectrum: Vec<u8>,
    threshold: f32,
    display_gain: f32,
    gate: AlertGate,
    paused: bool,
    clock: Arc<dyn Clock>,
    logger: Arc<dyn LogSink>,
}

impl AudioLevelAnalyzer {
    pub fn new(
        node: Box<dyn AudioAnalysisNode>,
        callbacks: AnalyzerCallbacks,
        options: AudioAnalyzerOptions,
        clock: Arc<dyn Clock>,
        logger: Arc<dyn LogSink>,
    ) -> Self {
        let bins = node.frequency_bin_count();
        // Computed once: the curve only depends on the node geometry.
        let weights = if options.use_weighting {
            bin_weights(bins, node.sample_rate(), node.fft_size())
        } else {
            flat_weights(bins)
        };
        sink_debug!(
            logger,
            "[Audio] analyzer started: {bins} bins @ {} Hz, weighting={}",
            node.sample_rate(),
            options.use_weighting
        );
        Self {
            node: Some(node),
            callbacks,
            weights,
            spectrum: vec![0; bins],
            threshold: clamp_alert_threshold(options.alert_threshold, 0.0),
            display_gain: options.display_gain,
            gate: AlertGate::new(options.alert_cooldown_ms),
            paused: false,
            clock,
            logger,
        }
    }

    /// One sampling pass. Returns the emitted level, or `None` once stopped.
    pub fn tick(&mut self) -> Option<f32> {
        let node = self.node.as_mut()?;
        let written = node.byte_frequency_data(&mut self.spectrum);

        let level = if written == self.spectrum.len() {
            weighted_level(&self.spectrum, &self.weights, self.display_gain)
        } else {
            sink_warn!(
                self.logger,
                "[Audio] spectrum size mismatch: got {written}, expected {}",
                self.spectrum.len()
            );
            0.0
        };
        sink_trace!(self.logger, "[Audio] level {level:.3}");

        self.callbacks.level(level);

        if !self.paused && level >= self.threshold && self.gate.try_fire(self.clock.now_ms()) {
            sink_info!(
                self.logger,
                "[Audio] alert: level {level:.2} >= {:.2}",
                self.threshold
            );
            self.callbacks.alert();
        }
        Some(level)
    }

    /// Stops sampling and closes the analysis graph. Safe to call repeatedly.
    pub fn stop(&mut self) {
        if let Some(mut node) = self.node.take() {
            node.close();
            sink_debug!(self.logger, "[Audio] analyzer stopped");
        }
    }

    /// Out-of-range values are clamped to [0, 1]; NaN keeps the current value.
    pub fn set_threshold(&mut self, threshold: f32) {
        self.threshold = clamp_alert_threshold(threshold, self.threshold);
    }

    #[must_use]
    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.node.is_some()
    }
}

impl Drop for AudioLevelAnalyzer {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;
    use crate::{clock::ManualClock, log::NoopLogSink};
    use std::{cell::RefCell, rc::Rc};

    /// Node that replays a fixed spectrum and counts closes.
    struct FixedNode {
        spectrum: Rc<RefCell<Vec<u8>>>,
        closes: Rc<RefCell<usize>>,
    }

    impl AudioAnalysisNode for FixedNode {
        fn sample_rate(&self) -> f32 {
            48_000.0
        }
        fn fft_size(&self) -> usize {
            512
        }
        fn byte_frequency_data(&mut self, out: &mut [u8]) -> usize {
            let src = self.spectrum.borrow();
            let n = src.len().min(out.len());
            out[..n].copy_from_slice(&src[..n]);
            n
        }
        fn close(&mut self) {
            *self.closes.borrow_mut() += 1;
        }
    }

    struct Harness {
        clock: Arc<ManualClock>,
        spectrum: Rc<RefCell<Vec<u8>>>,
        closes: Rc<RefCell<usize>>,
        levels: Rc<RefCell<Vec<f32>>>,
        alerts: Rc<RefCell<usize>>,
        analyzer: AudioLevelAnalyzer,
    }

    fn harness(options: AudioAnalyzerOptions) -> Harness {
        let clock = Arc::new(ManualClock::new(10_000));
        let spectrum = Rc::new(RefCell::new(vec![0u8; 256]));
        let closes = Rc::new(RefCell::new(0));
        let levels = Rc::new(RefCell::new(Vec::new()));
        let alerts = Rc::new(RefCell::new(0));
        let (l, a) = (levels.clone(), alerts.clone());
        let analyzer = AudioLevelAnalyzer::new(
            Box::new(FixedNode {
                spectrum: spectrum.clone(),
                closes: closes.clone(),
            }),
            AnalyzerCallbacks::new(move |v| l.borrow_mut().push(v), move || *a.borrow_mut() += 1),
            options,
            clock.clone(),
            Arc::new(NoopLogSink),
        );
        Harness {
            clock,
            spectrum,
            closes,
            levels,
            alerts,
            analyzer,
        }
    }

    fn loud(h: &Harness) {
        h.spectrum.borrow_mut().fill(255);
    }

    #[test]
    fn flat_full_scale_spectrum_reads_full_level() {
        let weights = flat_weights(4);
        assert_eq!(weighted_level(&[255, 255, 255, 255], &weights, 1.0), 1.0);
        assert_eq!(weighted_level(&[0, 0, 0, 0], &weights, 2.5), 0.0);
    }

    #[test]
    fn level_grows_with_spectrum_energy() {
        let weights = bin_weights(256, 48_000.0, 512);
        let mut previous = -1.0;
        for scale in [0u32, 10, 20, 40, 60, 80, 100] {
            let spectrum: Vec<u8> = (0..256u32)
                .map(|i| ((i % 3 + 1) * scale / 3) as u8)
                .collect();
            let level = weighted_level(&spectrum, &weights, 2.5);
            assert!(level >= previous, "level {level} dropped below {previous}");
            previous = level;
        }
    }

    #[test]
    fn mismatched_spectrum_reads_zero() {
        assert_eq!(weighted_level(&[255; 3], &flat_weights(4), 1.0), 0.0);
    }

    #[test]
    fn level_is_emitted_every_tick_and_alert_is_debounced() {
        let mut h = harness(AudioAnalyzerOptions {
            alert_cooldown_ms: 2_000,
            ..AudioAnalyzerOptions::default()
        });
        loud(&h);
        for _ in 0..10 {
            h.analyzer.tick();
            h.clock.advance(100);
        }
        assert_eq!(h.levels.borrow().len(), 10);
        assert_eq!(*h.alerts.borrow(), 1);

        h.clock.advance(2_000);
        h.analyzer.tick();
        assert_eq!(*h.alerts.borrow(), 2);
    }

    #[test]
    fn paused_analyzer_reports_level_without_alerting() {
        let mut h = harness(AudioAnalyzerOptions::default());
        loud(&h);
        h.analyzer.set_paused(true);
        let level = h.analyzer.tick().unwrap();

        assert!(level >= h.analyzer.threshold());
        assert_eq!(h.levels.borrow().len(), 1);
        assert_eq!(*h.alerts.borrow(), 0);

        h.analyzer.set_paused(false);
        h.analyzer.tick();
        assert_eq!(*h.alerts.borrow(), 1);
    }

    #[test]
    fn threshold_change_applies_on_next_tick() {
        let mut h = harness(AudioAnalyzerOptions::default());
        h.spectrum.borrow_mut().fill(40);
        h.analyzer.tick();
        assert_eq!(*h.alerts.borrow(), 0);

        h.analyzer.set_threshold(0.01);
        h.analyzer.tick();
        assert_eq!(*h.alerts.borrow(), 1);
    }

    #[test]
    fn threshold_is_clamped() {
        let mut h = harness(AudioAnalyzerOptions::default());
        h.analyzer.set_threshold(7.0);
        assert_eq!(h.analyzer.threshold(), 1.0);
        h.analyzer.set_threshold(-3.0);
        assert_eq!(h.analyzer.threshold(), 0.0);
        h.analyzer.set_threshold(f32::NAN);
        assert_eq!(h.analyzer.threshold(), 0.0);
    }

    #[test]
    fn short_read_degrades_to_zero() {
        let mut h = harness(AudioAnalyzerOptions::default());
        *h.spectrum.borrow_mut() = vec![255; 100];
        assert_eq!(h.analyzer.tick(), Some(0.0));
        assert_eq!(*h.alerts.borrow(), 0);
    }

    #[test]
    fn stop_is_idempotent_and_closes_node_once() {
        let mut h = harness(AudioAnalyzerOptions::default());
        h.analyzer.stop();
        h.analyzer.stop();
        assert_eq!(*h.closes.borrow(), 1);
        assert_eq!(h.analyzer.tick(), None);
        assert!(!h.analyzer.is_running());
        drop(h.analyzer);
        assert_eq!(*h.closes.borrow(), 1);
    }
}
