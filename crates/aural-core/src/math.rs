//! Scale conversions for audio analysis.
//!
//! Provides the dB/linear and mel/Hz conversions used across the analysis
//! pipeline. All functions are allocation-free and suitable for `no_std`.
//!
//! # Level Conversions
//!
//! - [`db_to_linear`] / [`linear_to_db`] - convert between dB and linear gain
//!
//! # Mel Scale
//!
//! - [`hz_to_mel`] / [`mel_to_hz`] - perceptual frequency scale used to space
//!   cepstral filters more densely at low frequencies

use libm::{expf, logf};

/// Convert decibels to linear gain.
///
/// # Arguments
/// * `db` - Value in decibels
///
/// # Returns
/// Linear gain value (e.g., 0 dB → 1.0, -6 dB → 0.5, +6 dB → 2.0)
///
/// # Example
/// ```rust
/// use aural_core::db_to_linear;
///
/// assert!((db_to_linear(0.0) - 1.0).abs() < 0.001);
/// assert!((db_to_linear(-6.02) - 0.5).abs() < 0.01);
/// ```
#[inline]
pub fn db_to_linear(db: f32) -> f32 {
    // 10^(dB/20) = e^(dB * ln(10)/20)
    const FACTOR: f32 = core::f32::consts::LN_10 / 20.0;
    expf(db * FACTOR)
}

/// Convert linear gain to decibels.
///
/// # Arguments
/// * `linear` - Linear gain value (must be > 0; values below 1e-10 clamp
///   to -200 dB rather than producing -inf)
///
/// # Returns
/// Value in decibels
///
/// # Example
/// ```rust
/// use aural_core::linear_to_db;
///
/// assert!((linear_to_db(1.0) - 0.0).abs() < 0.001);
/// assert!((linear_to_db(0.5) - (-6.02)).abs() < 0.01);
/// ```
#[inline]
pub fn linear_to_db(linear: f32) -> f32 {
    // 20 * log10(linear) = 20 * ln(linear) / ln(10)
    const FACTOR: f32 = 20.0 / core::f32::consts::LN_10;
    logf(linear.max(1e-10)) * FACTOR
}

/// Convert frequency in Hz to mels.
///
/// Uses the natural-log form `mel(f) = 1127 * ln(1 + f/700)`.
///
/// # Example
/// ```rust
/// use aural_core::hz_to_mel;
///
/// assert!(hz_to_mel(0.0).abs() < 1e-6);
/// // 1000 Hz is ~1000 mel by construction of the scale
/// assert!((hz_to_mel(1000.0) - 1000.0).abs() < 2.0);
/// ```
#[inline]
pub fn hz_to_mel(hz: f32) -> f32 {
    1127.0 * logf(1.0 + hz / 700.0)
}

/// Convert mels to frequency in Hz. Inverse of [`hz_to_mel`].
#[inline]
pub fn mel_to_hz(mel: f32) -> f32 {
    700.0 * (expf(mel / 1127.0) - 1.0)
}
