//! Engine configuration and error types.
//!
//! [`EngineConfig`] is a plain value: construct one, adjust fields, hand it
//! to [`crate::FeatureEngine`]. Applying a configuration is the only
//! fallible, allocating operation in the crate — every per-frame call
//! afterwards reuses the buffers it sized.

use std::collections::TryReserveError;

use thiserror::Error;

/// Default sampling frequency in Hz.
pub const DEFAULT_SAMPLE_RATE: u32 = 44100;

/// Default transform length in samples. The default fingerprint profile is
/// defined against this length and is rescaled for any other.
pub const DEFAULT_FFT_LENGTH: usize = 256;

/// Default microphone sensitivity: output in signal units at the 94 dB SPL
/// reference (datasheet value for a common electret capsule).
pub const DEFAULT_SENSITIVITY: f32 = 5.012;

/// Default calibrated amplifier gain in dB.
pub const DEFAULT_GAIN: f32 = 75.0;

/// Default spectral rolloff percentile.
pub const DEFAULT_ROLLOFF_PERCENTILE: f32 = 0.85;

/// Default fingerprint range boundaries, as bin indices for
/// [`DEFAULT_FFT_LENGTH`]. Each boundary closes a band: bins 1-4, 5-9,
/// 10-19, 20-39, 40-79, 80 and up.
pub const DEFAULT_RANGES: [usize; 6] = [5, 10, 20, 40, 80, 256];

/// Default fingerprint fuzz tolerance in Hz.
pub const DEFAULT_FUZZ_FACTOR: u16 = 32;

/// Default number of cepstral coefficients.
pub const DEFAULT_CEPSTRAL_COEFFICIENTS: usize = 13;

/// Errors produced when applying a configuration.
///
/// Only buffer allocation can fail; every steady-state per-frame operation
/// is infallible by design.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Failed to allocate analysis buffers for the requested configuration.
    #[error("failed to allocate analysis buffers: {0}")]
    Allocation(#[from] TryReserveError),
}

/// Fingerprint frequency-range profile.
///
/// The default profile is an explicit marker rather than a boundary list so
/// the engine knows it may rescale it to a non-default transform length.
/// Custom boundaries are always used verbatim — even if they happen to
/// equal the default profile numerically.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RangeProfile {
    /// [`DEFAULT_RANGES`], auto-rescaled when the transform length differs
    /// from [`DEFAULT_FFT_LENGTH`].
    Default,
    /// Caller-supplied ascending bin-index boundaries, used as-is.
    ///
    /// The last boundary should be at least the spectral bin count; bins
    /// beyond it fall into the last range rather than erroring.
    Custom(Vec<usize>),
}

impl RangeProfile {
    /// Number of ranges in the profile.
    pub fn len(&self) -> usize {
        match self {
            RangeProfile::Default => DEFAULT_RANGES.len(),
            RangeProfile::Custom(ranges) => ranges.len(),
        }
    }

    /// True when the profile defines no ranges, disabling fingerprinting.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Analysis engine configuration.
///
/// A value type: cheap to clone, compared field-wise, immutable once
/// applied. Feature opt-outs are encoded in the values themselves —
/// `sensitivity` 0.0 disables SPL, an empty range profile disables
/// fingerprinting, `cepstral_coefficients` 0 disables the cepstrum.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Sampling frequency in Hz.
    pub sample_rate: u32,
    /// Transform length in samples; must be a power of two.
    pub fft_length: usize,
    /// Microphone sensitivity at the 94 dB SPL reference; 0.0 disables
    /// decibel computation.
    pub sensitivity: f32,
    /// Calibrated amplifier gain in dB.
    pub gain: f32,
    /// Spectral rolloff percentile in [0, 1].
    pub rolloff_percentile: f32,
    /// Fingerprint frequency ranges.
    pub ranges: RangeProfile,
    /// Fingerprint fuzz tolerance in Hz.
    pub fuzz_factor: u16,
    /// Number of cepstral coefficients; 0 disables cepstral computation.
    pub cepstral_coefficients: usize,
}

impl Default for EngineConfig {
    /// A fresh, independent default configuration.
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            fft_length: DEFAULT_FFT_LENGTH,
            sensitivity: DEFAULT_SENSITIVITY,
            gain: DEFAULT_GAIN,
            rolloff_percentile: DEFAULT_ROLLOFF_PERCENTILE,
            ranges: RangeProfile::Default,
            fuzz_factor: DEFAULT_FUZZ_FACTOR,
            cepstral_coefficients: DEFAULT_CEPSTRAL_COEFFICIENTS,
        }
    }
}

impl EngineConfig {
    /// Number of configured fingerprint ranges.
    pub fn range_count(&self) -> usize {
        self.ranges.len()
    }

    /// Spectral bin count implied by the transform length.
    pub fn num_bins(&self) -> usize {
        self.fft_length / 2
    }

    /// Frequency resolution of one spectral bin, in Hz.
    pub fn bin_resolution(&self) -> f32 {
        self.sample_rate as f32 / self.fft_length as f32
    }

    /// Whether the default range profile must be rescaled for this
    /// transform length.
    fn rescales_default_profile(&self) -> bool {
        matches!(self.ranges, RangeProfile::Default) && self.fft_length != DEFAULT_FFT_LENGTH
    }

    /// The range boundaries this configuration resolves to.
    ///
    /// The default profile is defined for [`DEFAULT_FFT_LENGTH`]; when the
    /// configured length differs, every boundary is scaled proportionally
    /// so the profile keeps covering the same frequency bands. Custom
    /// boundaries pass through untouched.
    pub fn resolved_ranges(&self) -> Result<Vec<usize>, TryReserveError> {
        let source: &[usize] = match &self.ranges {
            RangeProfile::Default => &DEFAULT_RANGES,
            RangeProfile::Custom(ranges) => ranges,
        };

        let mut resolved = Vec::new();
        resolved.try_reserve_exact(source.len())?;

        if self.rescales_default_profile() {
            resolved.extend(
                source
                    .iter()
                    .map(|&bound| bound * self.fft_length / DEFAULT_FFT_LENGTH),
            );
        } else {
            resolved.extend_from_slice(source);
        }
        Ok(resolved)
    }

    /// The fuzz factor this configuration resolves to, rescaled together
    /// with the default range profile.
    pub fn resolved_fuzz_factor(&self) -> u16 {
        if self.rescales_default_profile() {
            (usize::from(self.fuzz_factor) * self.fft_length / DEFAULT_FFT_LENGTH) as u16
        } else {
            self.fuzz_factor
        }
    }
}
