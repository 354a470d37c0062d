//! IEC 61672 A-weighting, used to emphasise the 1–6 kHz band where cries and
//! alarms sit and to suppress rumble and hiss.

const F1: f64 = 20.598_997;
const F2: f64 = 107.652_65;
const F3: f64 = 737.862_23;
const F4: f64 = 12_194.217;
/// Normalises the curve to 0 dB at 1 kHz.
const A1000_DB: f64 = 2.0;

/// Linear amplitude gain of the A-curve at `freq_hz`. Zero at DC.
#[must_use]
pub fn a_weighting_gain(freq_hz: f64) -> f64 {
    if freq_hz <= 0.0 || !freq_hz.is_finite() {
        return 0.0;
    }
    let f2 = freq_hz * freq_hz;
    let num = F4 * F4 * f2 * f2;
    let den = (f2 + F1 * F1) * ((f2 + F2 * F2) * (f2 + F3 * F3)).sqrt() * (f2 + F4 * F4);
    let ra = num / den;
    ra * 10f64.powf(A1000_DB / 20.0)
}

/// Per-bin weights for a spectrum of `bin_count` bins, where bin `i` is
/// centred on `i * sample_rate / fft_size`.
#[must_use]
pub fn bin_weights(bin_count: usize, sample_rate: f32, fft_size: usize) -> Vec<f32> {
    let bin_hz = f64::from(sample_rate) / fft_size.max(1) as f64;
    (0..bin_count)
        .map(|i| a_weighting_gain(i as f64 * bin_hz) as f32)
        .collect()
}

/// Flat weights, for when perceptual weighting is disabled.
#[must_use]
pub fn flat_weights(bin_count: usize) -> Vec<f32> {
    vec![1.0; bin_count]
}
