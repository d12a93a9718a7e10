//! The spectral transform engine.
//!
//! Wraps a cached rustfft plan behind the small surface the feature engine
//! consumes: in-place windowing, in-place DC removal, forward transform
//! with magnitude conversion over `fft_length/2` bins, and the transform's
//! own estimate of the dominant peak. All working storage is allocated at
//! construction and reused; transforming a frame allocates nothing.

use std::collections::TryReserveError;
use std::sync::Arc;

use rustfft::num_complex::Complex;
use rustfft::FftPlanner;

use aural_core::Window;

/// Forward real-input FFT with preallocated working buffers.
pub struct FftEngine {
    fft: Arc<dyn rustfft::Fft<f32>>,
    fft_length: usize,
    bin_resolution: f32,
    window: Window,
    /// Complex working buffer, `fft_length` entries.
    buffer: Vec<Complex<f32>>,
    /// Scratch storage sized to the plan's requirement.
    scratch: Vec<Complex<f32>>,
}

impl FftEngine {
    /// Plan a transform of the given length.
    ///
    /// # Arguments
    /// * `fft_length` - transform length in samples (power of two)
    /// * `sample_rate` - sampling frequency in Hz, for bin-to-frequency
    ///   conversion in [`FftEngine::peak`]
    /// * `window` - window function applied by [`FftEngine::apply_window`]
    pub fn new(
        fft_length: usize,
        sample_rate: f32,
        window: Window,
    ) -> Result<Self, TryReserveError> {
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(fft_length);

        let mut buffer = Vec::new();
        buffer.try_reserve_exact(fft_length)?;
        buffer.resize(fft_length, Complex::new(0.0, 0.0));

        let scratch_len = fft.get_inplace_scratch_len();
        let mut scratch = Vec::new();
        scratch.try_reserve_exact(scratch_len)?;
        scratch.resize(scratch_len, Complex::new(0.0, 0.0));

        Ok(Self {
            fft,
            fft_length,
            bin_resolution: sample_rate / fft_length as f32,
            window,
            buffer,
            scratch,
        })
    }

    /// Transform length in samples.
    pub fn fft_length(&self) -> usize {
        self.fft_length
    }

    /// Number of magnitude bins produced, `fft_length/2`.
    pub fn num_bins(&self) -> usize {
        self.fft_length / 2
    }

    /// Apply the configured window to a frame in place.
    pub fn apply_window(&self, frame: &mut [f32]) {
        self.window.apply(frame);
    }

    /// Remove the mean (DC component) from a frame in place.
    pub fn remove_dc(&self, frame: &mut [f32]) {
        if frame.is_empty() {
            return;
        }
        let mean = frame.iter().sum::<f32>() / frame.len() as f32;
        for sample in frame.iter_mut() {
            *sample -= mean;
        }
    }

    /// Forward-transform a frame and write bin magnitudes into `out`.
    ///
    /// Only the first `num_bins` (DC to just below Nyquist) magnitudes are
    /// produced; `out` beyond that, or a shorter `out`, is handled by the
    /// zip below. The frame is not modified.
    pub fn magnitudes(&mut self, frame: &[f32], out: &mut [f32]) {
        for (slot, &sample) in self.buffer.iter_mut().zip(frame.iter()) {
            *slot = Complex::new(sample, 0.0);
        }
        // zero-pad a short frame
        for slot in self.buffer.iter_mut().skip(frame.len()) {
            *slot = Complex::new(0.0, 0.0);
        }

        self.fft
            .process_with_scratch(&mut self.buffer, &mut self.scratch);

        for (mag, bin) in out.iter_mut().zip(self.buffer.iter()) {
            *mag = bin.norm();
        }
    }

    /// The transform's own dominant-peak estimate: `(frequency_hz,
    /// magnitude)` of the largest non-DC bin, refined by parabolic
    /// interpolation against its neighbors when the peak is interior.
    pub fn peak(&self, magnitudes: &[f32]) -> (f32, f32) {
        let mut peak_bin = 0usize;
        let mut peak_mag = 0.0f32;
        for (bin, &mag) in magnitudes.iter().enumerate().skip(1) {
            if mag > peak_mag {
                peak_mag = mag;
                peak_bin = bin;
            }
        }

        if peak_bin == 0 {
            return (0.0, 0.0);
        }

        if peak_bin + 1 < magnitudes.len() {
            let y1 = magnitudes[peak_bin - 1];
            let y2 = magnitudes[peak_bin];
            let y3 = magnitudes[peak_bin + 1];
            let denom = y1 - 2.0 * y2 + y3;
            if denom != 0.0 {
                let delta = 0.5 * (y1 - y3) / denom;
                let freq = (peak_bin as f32 + delta) * self.bin_resolution;
                let mag = y2 - 0.25 * (y1 - y3) * delta;
                return (freq, mag);
            }
        }

        (peak_bin as f32 * self.bin_resolution, peak_mag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    fn sine(freq: f32, sample_rate: f32, len: usize) -> Vec<f32> {
        (0..len)
            .map(|i| (2.0 * PI * freq * i as f32 / sample_rate).sin())
            .collect()
    }

    #[test]
    fn test_peak_matches_input_frequency() {
        let sample_rate = 8192.0;
        let fft_length = 512;
        let freq = 1024.0; // lands exactly on bin 64

        let mut engine = FftEngine::new(fft_length, sample_rate, Window::Rectangular).unwrap();
        let signal = sine(freq, sample_rate, fft_length);
        let mut magnitudes = vec![0.0f32; fft_length / 2];
        engine.magnitudes(&signal, &mut magnitudes);

        let (peak_freq, peak_mag) = engine.peak(&magnitudes);
        assert!(
            (peak_freq - freq).abs() < 16.0,
            "Peak {} Hz should be near {} Hz",
            peak_freq,
            freq
        );
        assert!(peak_mag > 0.0);
    }

    #[test]
    fn test_windowed_peak_still_found() {
        let sample_rate = 8192.0;
        let fft_length = 512;
        let freq = 1000.0; // off-bin, leaks without a window

        let mut engine = FftEngine::new(fft_length, sample_rate, Window::Hamming).unwrap();
        let mut signal = sine(freq, sample_rate, fft_length);
        engine.apply_window(&mut signal);
        let mut magnitudes = vec![0.0f32; fft_length / 2];
        engine.magnitudes(&signal, &mut magnitudes);

        let (peak_freq, _) = engine.peak(&magnitudes);
        assert!(
            (peak_freq - freq).abs() < 16.0,
            "Peak {} Hz should be near {} Hz",
            peak_freq,
            freq
        );
    }

    #[test]
    fn test_remove_dc_zeroes_mean() {
        let engine = FftEngine::new(64, 8000.0, Window::Rectangular).unwrap();
        let mut frame = vec![1.5f32; 64];
        for (i, v) in frame.iter_mut().enumerate() {
            *v += (i as f32 * 0.1).sin();
        }
        engine.remove_dc(&mut frame);
        let mean: f32 = frame.iter().sum::<f32>() / 64.0;
        assert!(mean.abs() < 1e-5, "mean after DC removal: {}", mean);
    }

    #[test]
    fn test_dc_signal_concentrates_in_bin_zero() {
        let mut engine = FftEngine::new(256, 8000.0, Window::Rectangular).unwrap();
        let frame = vec![1.0f32; 256];
        let mut magnitudes = vec![0.0f32; 128];
        engine.magnitudes(&frame, &mut magnitudes);

        let non_dc: f32 = magnitudes[1..].iter().sum();
        assert!(
            magnitudes[0] > non_dc * 10.0,
            "DC bin {} should dominate the rest ({})",
            magnitudes[0],
            non_dc
        );
    }

    #[test]
    fn test_short_frame_zero_padded() {
        let mut engine = FftEngine::new(128, 8000.0, Window::Rectangular).unwrap();
        let frame = vec![1.0f32; 32];
        let mut magnitudes = vec![0.0f32; 64];
        engine.magnitudes(&frame, &mut magnitudes);
        // energy present, nothing NaN
        assert!(magnitudes.iter().all(|m| m.is_finite()));
        assert!(magnitudes[0] > 0.0);
    }

    #[test]
    fn test_peak_of_silence_is_zero() {
        let engine = FftEngine::new(128, 8000.0, Window::Rectangular).unwrap();
        let magnitudes = vec![0.0f32; 64];
        assert_eq!(engine.peak(&magnitudes), (0.0, 0.0));
    }
}
