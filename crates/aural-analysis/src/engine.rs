//! The per-frame analysis engine.
//!
//! [`FeatureEngine`] owns every working buffer and the analysis components,
//! and is the only type the host application talks to. The per-frame call
//! sequence is: [`FeatureEngine::transform`] to produce the magnitude
//! spectrum, then any of [`FeatureEngine::spectral_statistics`],
//! [`FeatureEngine::cepstral_coefficients`], [`FeatureEngine::fingerprint`],
//! plus the time-domain measures [`FeatureEngine::rms`],
//! [`FeatureEngine::decibel_level`], and [`FeatureEngine::pitch`].
//!
//! Results are returned as borrows of engine-owned storage; the borrow
//! checker enforces that a view is dropped before the next mutating call
//! overwrites it.
//!
//! Buffers are reallocated only when a configuration change affects their
//! sizing — transform length, sample rate, range count, or coefficient
//! count. Any other change is applied in place, preserving buffer identity.

use aural_core::{decibel_spl, rms, PitchEstimator, Sample, Window};

use crate::config::{EngineConfig, EngineError};
use crate::features::{FeatureVector, SpectralFeature};
use crate::fft::FftEngine;
use crate::fingerprint::FingerprintGenerator;
use crate::mfcc::CepstrumComputer;
use crate::try_zeroed;

/// Configuration-driven audio feature and fingerprint engine.
pub struct FeatureEngine {
    config: EngineConfig,
    /// Hz per spectral bin, `sample_rate / fft_length`.
    bin_resolution: f32,
    num_bins: usize,
    /// Working copy of the incoming frame; windowing alters it.
    signal: Vec<f32>,
    /// Magnitude spectrum of the last transformed frame.
    spectrum: Vec<f32>,
    features: FeatureVector,
    fft: FftEngine,
    cepstrum: Option<CepstrumComputer>,
    fingerprint: Option<FingerprintGenerator>,
    pitch_estimator: PitchEstimator,
}

impl FeatureEngine {
    /// Build an engine for the given configuration, allocating every
    /// buffer it will use.
    ///
    /// On allocation failure no engine is produced; there is no partially
    /// initialized state.
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        let bin_resolution = config.bin_resolution();
        let num_bins = config.num_bins();

        let signal = try_zeroed::<f32>(config.fft_length)?;
        let spectrum = try_zeroed::<f32>(num_bins)?;
        let fft = FftEngine::new(config.fft_length, config.sample_rate as f32, Window::Hamming)?;

        let cepstrum = if config.cepstral_coefficients > 0 {
            Some(CepstrumComputer::new(
                config.fft_length,
                config.sample_rate,
                config.cepstral_coefficients,
            )?)
        } else {
            None
        };

        let fingerprint = if config.range_count() > 0 {
            Some(FingerprintGenerator::new(
                config.resolved_ranges()?,
                config.resolved_fuzz_factor(),
                bin_resolution,
            )?)
        } else {
            None
        };

        let pitch_estimator =
            PitchEstimator::new(config.sample_rate as f32, config.fft_length)?;

        tracing::debug!(
            fft_length = config.fft_length,
            sample_rate = config.sample_rate,
            num_bins,
            "analysis buffers allocated"
        );

        Ok(Self {
            config,
            bin_resolution,
            num_bins,
            signal,
            spectrum,
            features: FeatureVector::new(),
            fft,
            cepstrum,
            fingerprint,
            pitch_estimator,
        })
    }

    /// Apply a new configuration.
    ///
    /// Reallocates buffers and components only when the new configuration
    /// differs in transform length, sample rate, range count, or
    /// coefficient count; every other change is applied in place and
    /// preserves buffer identity. On allocation failure the engine keeps
    /// its previous configuration — it is never left partially rebuilt.
    pub fn apply_config(&mut self, config: EngineConfig) -> Result<(), EngineError> {
        if self.sizing_changed(&config) {
            tracing::debug!("configuration changes buffer sizing, rebuilding");
            *self = Self::new(config)?;
            return Ok(());
        }

        tracing::debug!("configuration applied in place");
        if let Some(generator) = self.fingerprint.as_mut() {
            // same range count, possibly different boundary values or fuzz
            let boundaries = config.resolved_ranges()?;
            generator.set_profile(&boundaries, config.resolved_fuzz_factor());
        }
        self.config = config;
        Ok(())
    }

    fn sizing_changed(&self, config: &EngineConfig) -> bool {
        config.fft_length != self.config.fft_length
            || config.sample_rate != self.config.sample_rate
            || config.range_count() != self.config.range_count()
            || config.cepstral_coefficients != self.config.cepstral_coefficients
    }

    /// The active configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Number of spectral bins, `fft_length/2`.
    pub fn num_bins(&self) -> usize {
        self.num_bins
    }

    /// Frequency resolution of one spectral bin, in Hz.
    pub fn bin_resolution(&self) -> f32 {
        self.bin_resolution
    }

    /// Center frequency of a spectral bin, in Hz.
    pub fn frequency(&self, bin: usize) -> f32 {
        bin as f32 * self.bin_resolution
    }

    /// Magnitude spectrum of the last transformed frame.
    pub fn magnitudes(&self) -> &[f32] {
        &self.spectrum
    }

    /// Feature vector of the last statistics call (plus the transform's
    /// peak estimate).
    pub fn features(&self) -> &FeatureVector {
        &self.features
    }

    /// Root-mean-square amplitude of a raw frame.
    ///
    /// Assumes DC bias has already been removed; no correction is applied
    /// here to keep the hot path cheap.
    pub fn rms<S: Sample>(&self, signal: &[S]) -> f32 {
        rms(signal)
    }

    /// Calibrated sound pressure level of a raw frame, in dB SPL.
    ///
    /// Returns `None` when the configured sensitivity is zero (the SPL
    /// feature is opted out). The caller must pre-remove DC bias; the
    /// value is meaningless otherwise.
    pub fn decibel_level<S: Sample>(&self, signal: &[S]) -> Option<f32> {
        if self.config.sensitivity == 0.0 {
            return None;
        }
        Some(decibel_spl(signal, self.config.sensitivity, self.config.gain))
    }

    /// Estimate the fundamental frequency of a raw frame, in Hz.
    ///
    /// The frame is converted into the internal working buffer; a frame
    /// shorter than the transform length is zero-padded.
    pub fn pitch<S: Sample>(&mut self, signal: &[S]) -> f32 {
        copy_frame(&mut self.signal, signal);
        self.pitch_estimator.process(&self.signal)
    }

    /// Window, transform, and magnitude-convert a raw frame.
    ///
    /// The transform engine's own dominant-peak estimate is captured into
    /// the feature vector. When `remove_dc` is set, the frame mean is
    /// removed before the transform and the DC magnitude bin is forced to
    /// zero afterwards — residual energy there would corrupt the
    /// downstream statistics.
    pub fn transform<S: Sample>(&mut self, signal: &[S], remove_dc: bool) {
        copy_frame(&mut self.signal, signal);

        self.fft.apply_window(&mut self.signal);
        if remove_dc {
            self.fft.remove_dc(&mut self.signal);
        }
        self.fft.magnitudes(&self.signal, &mut self.spectrum);

        let (peak_frequency, peak_magnitude) = self.fft.peak(&self.spectrum);
        self.features
            .set(SpectralFeature::PeakFrequency, peak_frequency);
        self.features
            .set(SpectralFeature::PeakMagnitude, peak_magnitude);

        if remove_dc {
            self.spectrum[0] = 0.0;
        }
    }

    /// Compute all ten spectral descriptors over a magnitude spectrum.
    ///
    /// Operates on `spectrum` when given, otherwise on the engine's own
    /// spectrum from the last [`FeatureEngine::transform`]. Bin 0 (DC) is
    /// always excluded. The whole vector is recomputed; the returned
    /// borrow is valid until the next mutating call.
    pub fn spectral_statistics(&mut self, spectrum: Option<&[f32]>) -> &FeatureVector {
        let bins = spectrum.unwrap_or(&self.spectrum);
        compute_statistics(
            &mut self.features,
            bins,
            self.bin_resolution,
            self.config.rolloff_percentile,
        );
        &self.features
    }

    /// Compute mel-frequency cepstral coefficients over a magnitude
    /// spectrum.
    ///
    /// Returns `None` when the configured coefficient count is zero. The
    /// returned slice is engine-owned and valid until the next call.
    pub fn cepstral_coefficients(&mut self, spectrum: Option<&[f32]>) -> Option<&[f32]> {
        let cepstrum = self.cepstrum.as_mut()?;
        let bins = spectrum.unwrap_or(&self.spectrum);
        Some(cepstrum.process(bins))
    }

    /// Compute the fingerprint signature of a magnitude spectrum.
    ///
    /// Returns `None` when no fingerprint ranges are configured. The
    /// returned slice is engine-owned and valid until the next call.
    pub fn fingerprint(&mut self, spectrum: Option<&[f32]>) -> Option<&[u16]> {
        let generator = self.fingerprint.as_mut()?;
        let bins = spectrum.unwrap_or(&self.spectrum);
        Some(generator.process(bins))
    }

    /// Hash a signature with fuzz-tolerant quantization.
    ///
    /// Hashes `signature` when given, otherwise the engine's own signature
    /// from the last [`FeatureEngine::fingerprint`] call. Returns `None`
    /// when no fingerprint ranges are configured.
    pub fn fingerprint_hash(&self, signature: Option<&[u16]>) -> Option<u32> {
        let generator = self.fingerprint.as_ref()?;
        let signature = signature.unwrap_or_else(|| generator.signature());
        Some(generator.hash(signature))
    }
}

/// Convert a raw frame into the engine's f32 working buffer, zero-padding
/// when the frame is shorter than the buffer.
fn copy_frame<S: Sample>(buffer: &mut [f32], signal: &[S]) {
    for (slot, sample) in buffer.iter_mut().zip(signal.iter()) {
        *slot = sample.to_f32();
    }
    if signal.len() < buffer.len() {
        buffer[signal.len()..].fill(0.0);
    }
}

/// Compute the ten spectral descriptors over bins 1..N-1 of a magnitude
/// spectrum, writing them into `features`.
///
/// Sums are divided by the full bin count N. For an all-zero spectrum the
/// defined fallbacks apply: average 0, centroid 0, flatness ~1, crest 1,
/// kurtosis -3, rolloff 0; spread and skewness propagate as NaN (there is
/// no spread about an undefined centroid).
fn compute_statistics(
    features: &mut FeatureVector,
    bins: &[f32],
    bin_resolution: f32,
    rolloff_percentile: f32,
) {
    let num_bins = bins.len();
    let n = num_bins as f32;

    let mut sum_amplitudes = 0.0f32;
    let mut sum_weighted = 0.0f32;
    let mut peak_frequency = 0.0f32;
    let mut peak_magnitude = 0.0f32;
    // flatness accumulates in the log domain so long spectra cannot
    // overflow the geometric-mean product
    let mut log_sum = 0.0f64;
    let mut flatness_sum = 0.0f64;
    let mut sum_squared = 0.0f32;
    let mut max_squared = 0.0f32;

    for (i, &mag) in bins.iter().enumerate().skip(1) {
        sum_amplitudes += mag;
        sum_weighted += mag * i as f32;

        let f = 1.0 + f64::from(mag);
        log_sum += f.ln();
        flatness_sum += f;

        let squared = mag * mag;
        sum_squared += squared;
        if squared > max_squared {
            max_squared = squared;
        }

        if mag > peak_magnitude {
            peak_magnitude = mag;
            peak_frequency = i as f32 * bin_resolution;
        }
    }

    let mean_magnitude = sum_amplitudes / n;
    let flatness_mean = flatness_sum / f64::from(n);
    let log_mean = log_sum / f64::from(n);
    let mean_squared = sum_squared / n;

    features.set(SpectralFeature::PeakFrequency, peak_frequency);
    features.set(SpectralFeature::PeakMagnitude, peak_magnitude);
    features.set(SpectralFeature::AverageMagnitude, mean_magnitude);

    // centroid in bin units drives the moment computations below; the
    // stored feature is in Hz
    let centroid = if sum_amplitudes > 0.0 {
        sum_weighted / sum_amplitudes
    } else {
        0.0
    };
    features.set(SpectralFeature::Centroid, centroid * bin_resolution);

    features.set(
        SpectralFeature::Flatness,
        if flatness_mean > 0.0 {
            (log_mean.exp() / flatness_mean) as f32
        } else {
            0.0
        },
    );
    features.set(
        SpectralFeature::Crest,
        if sum_squared > 0.0 {
            max_squared / mean_squared
        } else {
            1.0
        },
    );

    let mut spread_sum = 0.0f32;
    let mut skewness_sum = 0.0f32;
    let mut moment2 = 0.0f32;
    let mut moment4 = 0.0f32;
    let mut rolloff = 0.0f32;
    let mut rolloff_sum = 0.0f32;
    let rolloff_threshold = rolloff_percentile * sum_amplitudes;

    for (i, &mag) in bins.iter().enumerate().skip(1) {
        let deviation = i as f32 - centroid;
        spread_sum += deviation * deviation * mag;
        skewness_sum += deviation * deviation * deviation * mag;

        // the rolloff bin is the first whose predecessors' cumulative
        // magnitude already exceeds the threshold
        if rolloff == 0.0 {
            if rolloff_sum > rolloff_threshold {
                rolloff = i as f32 / n;
            } else {
                rolloff_sum += mag;
            }
        }

        let difference = mag - mean_magnitude;
        let squared_difference = difference * difference;
        moment2 += squared_difference;
        moment4 += squared_difference * squared_difference;
    }
    features.set(SpectralFeature::Rolloff, rolloff);

    let spread = (spread_sum / sum_amplitudes).sqrt();
    features.set(SpectralFeature::Spread, spread);
    features.set(
        SpectralFeature::Skewness,
        (skewness_sum / sum_amplitudes) / (spread * spread * spread),
    );

    let m2 = moment2 / n;
    let m4 = moment4 / n;
    features.set(
        SpectralFeature::Kurtosis,
        if m2 == 0.0 { -3.0 } else { m4 / (m2 * m2) - 3.0 },
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RangeProfile;
    use std::f32::consts::PI;

    fn test_config() -> EngineConfig {
        EngineConfig {
            sample_rate: 8192,
            fft_length: 512,
            ..EngineConfig::default()
        }
    }

    fn sine(freq: f32, sample_rate: f32, len: usize) -> Vec<f32> {
        (0..len)
            .map(|i| (2.0 * PI * freq * i as f32 / sample_rate).sin())
            .collect()
    }

    #[test]
    fn test_zero_spectrum_statistics() {
        let mut engine = FeatureEngine::new(test_config()).unwrap();
        let silence = vec![0.0f32; 256];
        let features = engine.spectral_statistics(Some(&silence));

        assert_eq!(features[SpectralFeature::AverageMagnitude], 0.0);
        assert_eq!(features[SpectralFeature::Crest], 1.0);
        assert_eq!(features[SpectralFeature::Kurtosis], -3.0);
        assert_eq!(features[SpectralFeature::Rolloff], 0.0);
        assert_eq!(features[SpectralFeature::Centroid], 0.0);
        assert_eq!(features[SpectralFeature::PeakMagnitude], 0.0);
    }

    #[test]
    fn test_rms_exactness() {
        let engine = FeatureEngine::new(test_config()).unwrap();
        assert_eq!(engine.rms(&vec![0.0f32; 512]), 0.0);
        assert!((engine.rms(&vec![2.5f32; 512]) - 2.5).abs() < 1e-6);
        assert!((engine.rms(&vec![-2.5f32; 512]) - 2.5).abs() < 1e-6);
    }

    #[test]
    fn test_transform_and_statistics_of_tone() {
        let mut engine = FeatureEngine::new(test_config()).unwrap();
        let freq = 1024.0; // bin 64 at 16 Hz resolution
        let signal = sine(freq, 8192.0, 512);

        engine.transform(&signal, true);
        let features = engine.spectral_statistics(None);

        let peak = features[SpectralFeature::PeakFrequency];
        assert!(
            (peak - freq).abs() < 32.0,
            "peak {} Hz should be near {} Hz",
            peak,
            freq
        );
        // a pure tone is far from a flat spectrum
        assert!(features[SpectralFeature::Flatness] < 0.8);
        assert!(features[SpectralFeature::Crest] > 10.0);
        // centroid sits at the tone
        let centroid = features[SpectralFeature::Centroid];
        assert!(
            (centroid - freq).abs() < 64.0,
            "centroid {} Hz should be near {} Hz",
            centroid,
            freq
        );
    }

    #[test]
    fn test_dc_bin_zeroed_after_transform() {
        let mut engine = FeatureEngine::new(test_config()).unwrap();
        // heavy DC offset
        let signal: Vec<f32> = sine(1024.0, 8192.0, 512).iter().map(|s| s + 10.0).collect();
        engine.transform(&signal, true);
        assert_eq!(engine.magnitudes()[0], 0.0);
    }

    #[test]
    fn test_statistics_exclude_dc() {
        let mut engine = FeatureEngine::new(test_config()).unwrap();
        let mut spectrum = vec![0.0f32; 256];
        spectrum[0] = 1000.0; // only DC energy
        let features = engine.spectral_statistics(Some(&spectrum));
        assert_eq!(features[SpectralFeature::AverageMagnitude], 0.0);
        assert_eq!(features[SpectralFeature::PeakMagnitude], 0.0);
    }

    #[test]
    fn test_decibel_level_disabled_by_zero_sensitivity() {
        let config = EngineConfig {
            sensitivity: 0.0,
            ..test_config()
        };
        let engine = FeatureEngine::new(config).unwrap();
        assert!(engine.decibel_level(&vec![1.0f32; 512]).is_none());
    }

    #[test]
    fn test_cepstral_disabled_by_zero_count() {
        let config = EngineConfig {
            cepstral_coefficients: 0,
            ..test_config()
        };
        let mut engine = FeatureEngine::new(config).unwrap();
        let spectrum = vec![1.0f32; 256];
        assert!(engine.cepstral_coefficients(Some(&spectrum)).is_none());
    }

    #[test]
    fn test_fingerprint_disabled_by_empty_ranges() {
        let config = EngineConfig {
            ranges: RangeProfile::Custom(Vec::new()),
            ..test_config()
        };
        let mut engine = FeatureEngine::new(config).unwrap();
        let spectrum = vec![1.0f32; 256];
        assert!(engine.fingerprint(Some(&spectrum)).is_none());
        assert!(engine.fingerprint_hash(None).is_none());
    }

    #[test]
    fn test_enabled_features_produce_output() {
        let mut engine = FeatureEngine::new(test_config()).unwrap();
        let signal = sine(1024.0, 8192.0, 512);
        engine.transform(&signal, true);

        assert_eq!(engine.cepstral_coefficients(None).unwrap().len(), 13);
        assert_eq!(engine.fingerprint(None).unwrap().len(), 6);
        assert!(engine.fingerprint_hash(None).is_some());
    }

    #[test]
    fn test_pitch_of_tone() {
        let mut engine = FeatureEngine::new(test_config()).unwrap();
        let freq = 128.0;
        let signal = sine(freq, 8192.0, 512);
        let pitch = engine.pitch(&signal);
        assert!(
            (pitch - freq).abs() < 2.0,
            "pitch {} Hz should be near {} Hz",
            pitch,
            freq
        );
    }

    #[test]
    fn test_integer_samples() {
        let mut engine = FeatureEngine::new(test_config()).unwrap();
        let signal: Vec<i16> = sine(1024.0, 8192.0, 512)
            .iter()
            .map(|s| (s * 1000.0) as i16)
            .collect();

        engine.transform(&signal, true);
        let features = engine.spectral_statistics(None);
        let peak = features[SpectralFeature::PeakFrequency];
        assert!(
            (peak - 1024.0).abs() < 32.0,
            "peak {} Hz should be near 1024 Hz",
            peak
        );
    }

    #[test]
    fn test_short_frame_zero_padded() {
        let mut engine = FeatureEngine::new(test_config()).unwrap();
        let signal = sine(1024.0, 8192.0, 200);
        engine.transform(&signal, true);
        assert!(engine.magnitudes().iter().all(|m| m.is_finite()));
    }

    #[test]
    fn test_caller_spectrum_overrides_internal() {
        let mut engine = FeatureEngine::new(test_config()).unwrap();
        engine.transform(&sine(1024.0, 8192.0, 512), true);

        let mut custom = vec![0.0f32; 256];
        custom[10] = 5.0;
        let features = engine.spectral_statistics(Some(&custom));
        assert!((features[SpectralFeature::PeakFrequency] - 160.0).abs() < 1e-3);
    }
}
