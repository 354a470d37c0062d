use std::{f32::consts::PI, sync::Arc};

use rustfft::{Fft, FftPlanner, num_complex::Complex};

use super::analysis_node::AudioAnalysisNode;

const MIN_DECIBELS: f32 = -100.0;
const MAX_DECIBELS: f32 = -30.0;
const SMOOTHING: f32 = 0.8;

/// Supplier of the most recent PCM samples of a track (mono, [-1, 1]).
pub trait PcmSource {
    /// Fills `out` with the latest `out.len()` samples, oldest first.
    fn fill_latest(&mut self, out: &mut [f32]);
}

/// Byte-spectrum analyser over a PCM source, with the same output scale as a
/// Web Audio analyser: Blackman window, time smoothing, and a dB range of
/// [-100, -30] mapped onto 0..=255.
pub struct PcmAnalyserNode {
    source: Option<Box<dyn PcmSource>>,
    sample_rate: f32,
    fft_size: usize,
    fft: Arc<dyn Fft<f32>>,
    window: Vec<f32>,
    samples: Vec<f32>,
    buffer: Vec<Complex<f32>>,
    smoothed: Vec<f32>,
}

impl PcmAnalyserNode {
    /// `fft_size` is rounded up to a power of two, minimum 32.
    pub fn new(source: Box<dyn PcmSource>, sample_rate: f32, fft_size: usize) -> Self {
        let fft_size = fft_size.max(32).next_power_of_two();
        let fft = FftPlanner::<f32>::new().plan_fft_forward(fft_size);
        Self {
            source: Some(source),
            sample_rate,
            fft_size,
            fft,
            window: blackman(fft_size),
            samples: vec![0.0; fft_size],
            buffer: vec![Complex::new(0.0, 0.0); fft_size],
            smoothed: vec![0.0; fft_size / 2],
        }
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.source.is_none()
    }
}

impl AudioAnalysisNode for PcmAnalyserNode {
    fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    fn fft_size(&self) -> usize {
        self.fft_size
    }

    fn byte_frequency_data(&mut self, out: &mut [u8]) -> usize {
        let Some(source) = self.source.as_mut() else {
            return 0;
        };
        source.fill_latest(&mut self.samples);

        for ((slot, &s), &w) in self.buffer.iter_mut().zip(&self.samples).zip(&self.window) {
            *slot = Complex::new(s * w, 0.0);
        }
        self.fft.process(&mut self.buffer);

        let scale = 1.0 / self.fft_size as f32;
        let range = MAX_DECIBELS - MIN_DECIBELS;
        let n = out.len().min(self.smoothed.len());
        for (k, byte) in out.iter_mut().enumerate().take(n) {
            let magnitude = self.buffer[k].norm() * scale;
            let smoothed = SMOOTHING * self.smoothed[k] + (1.0 - SMOOTHING) * magnitude;
            self.smoothed[k] = smoothed;

            let db = if smoothed > 0.0 {
                20.0 * smoothed.log10()
            } else {
                MIN_DECIBELS
            };
            *byte = (255.0 * (db - MIN_DECIBELS) / range).clamp(0.0, 255.0) as u8;
        }
        n
    }

    fn close(&mut self) {
        self.source = None;
    }
}

fn blackman(n: usize) -> Vec<f32> {
    let (a0, a1, a2) = (0.42, 0.5, 0.08);
    (0..n)
        .map(|i| {
            let x = i as f32 / n as f32;
            a0 - a1 * (2.0 * PI * x).cos() + a2 * (4.0 * PI * x).cos()
        })
        .collect()
}
