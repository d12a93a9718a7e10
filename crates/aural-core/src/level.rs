//! Time-domain level measurement: RMS and calibrated decibel SPL.
//!
//! Both measures assume any DC bias has already been removed from the
//! signal. Bias correction is deliberately not performed here — these run
//! on the per-frame hot path and a biased frame produces a biased level,
//! which is the caller's contract to avoid.

use libm::sqrt;

use crate::math::linear_to_db;
use crate::sample::Sample;

/// The SPL calibration reference: 94 dB SPL corresponds to 1 Pa, the level
/// at which microphone sensitivity is specified.
pub const SPL_REFERENCE_DB: f32 = 94.0;

/// Compute the root-mean-square amplitude of a signal.
///
/// Accumulates in f64 so long integer-sample frames do not lose precision.
/// Returns 0.0 for an empty signal.
///
/// # Example
/// ```rust
/// use aural_core::rms;
///
/// let constant = [3.0f32; 64];
/// assert!((rms(&constant) - 3.0).abs() < 1e-6);
/// ```
pub fn rms<S: Sample>(signal: &[S]) -> f32 {
    if signal.is_empty() {
        return 0.0;
    }

    let sum_sq: f64 = signal
        .iter()
        .map(|&s| {
            let v = f64::from(s.to_f32());
            v * v
        })
        .sum();
    sqrt(sum_sq / signal.len() as f64) as f32
}

/// Compute the calibrated sound pressure level of a signal in dB SPL.
///
/// The signal's RMS voltage is referred to the microphone `sensitivity`
/// (its output at the 94 dB SPL reference), then corrected for the analog
/// chain's `gain` in dB:
///
/// ```text
/// SPL = 20·log10(rms / sensitivity) − gain + 94
/// ```
///
/// The caller must have removed DC bias from the signal; a biased frame
/// yields a meaningless level.
///
/// # Arguments
/// * `signal` - DC-free frame of raw samples
/// * `sensitivity` - microphone sensitivity at the 94 dB reference, in the
///   signal's amplitude units
/// * `gain` - calibrated amplifier gain in dB
pub fn decibel_spl<S: Sample>(signal: &[S], sensitivity: f32, gain: f32) -> f32 {
    let v_rms = rms(signal);
    linear_to_db(v_rms / sensitivity) - gain + SPL_REFERENCE_DB
}
