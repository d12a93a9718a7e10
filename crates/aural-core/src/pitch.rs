//! Time-domain pitch estimation via the YIN algorithm.
//!
//! Implements the cumulative-mean-normalized difference method of
//! de Cheveigné and Kawahara (2002): for each candidate lag the summed
//! squared sample differences are normalized by the running mean of the
//! raw differences, turning periodic signals into deep minima at the
//! period and its multiples.
//!
//! The estimator persists one scalar between frames — the previous period
//! estimate — and prefers a minimum near it over a fresh global search.
//! This trades an occasionally non-optimal lag for stable frame-to-frame
//! tracking of a sustained tone.

#[cfg(not(feature = "std"))]
use alloc::{collections::TryReserveError, vec::Vec};
#[cfg(feature = "std")]
use std::collections::TryReserveError;

use libm::{ceilf, roundf};

/// Lags below this floor are never scanned as fresh candidates; they
/// correspond to frequencies far above any voiced pitch.
const SCAN_FLOOR: usize = 30;

/// Absolute threshold on the normalized difference below which the first
/// local minimum is accepted.
const DIFFERENCE_THRESHOLD: f32 = 0.1;

/// YIN pitch estimator over fixed-size frames.
///
/// The difference buffer is sized to half the frame length at construction
/// and reused for every call; [`PitchEstimator::process`] performs no
/// allocation.
pub struct PitchEstimator {
    sample_rate: f32,
    frame_len: usize,
    /// Minimum period implied by the configured maximum frequency.
    min_period: usize,
    /// Previous period estimate, the continuity anchor. Starts at 1.0.
    prev_period_estimate: f32,
    /// Cumulative-mean-normalized difference function, frame_len/2 lags.
    delta: Vec<f32>,
}

impl PitchEstimator {
    /// Create an estimator for the given sample rate and frame length.
    ///
    /// The maximum detectable frequency defaults to 1500 Hz; see
    /// [`PitchEstimator::set_max_frequency`].
    pub fn new(sample_rate: f32, frame_len: usize) -> Result<Self, TryReserveError> {
        let half = frame_len / 2;
        let mut delta = Vec::new();
        delta.try_reserve_exact(half)?;
        delta.resize(half, 0.0);

        let mut estimator = Self {
            sample_rate,
            frame_len,
            min_period: 1,
            prev_period_estimate: 1.0,
            delta,
        };
        estimator.set_max_frequency(1500.0);
        Ok(estimator)
    }

    /// Set the maximum frequency the estimator will report.
    ///
    /// Values at or below 200 Hz are treated as a misconfiguration and
    /// replaced with 2000 Hz.
    pub fn set_max_frequency(&mut self, max_frequency: f32) {
        let max_frequency = if max_frequency <= 200.0 {
            2000.0
        } else {
            max_frequency
        };
        self.min_period = ceilf(self.sample_rate / max_frequency) as usize;
    }

    /// The maximum frequency the estimator will report, in Hz.
    pub fn max_frequency(&self) -> f32 {
        self.sample_rate / self.min_period as f32
    }

    /// Forget the previous period estimate, e.g. after a stream gap.
    pub fn reset(&mut self) {
        self.prev_period_estimate = 1.0;
    }

    /// Estimate the fundamental frequency of a frame, in Hz.
    ///
    /// `frame` must hold at least the frame length given at construction;
    /// only the first `frame_len` samples are examined.
    pub fn process(&mut self, frame: &[f32]) -> f32 {
        self.difference_function(frame);

        // prefer a minimum near the previous estimate for continuity
        let period = match self.continuity_search() {
            Some(p) => p,
            None => self.period_candidate(),
        };

        // refine by parabolic interpolation when the lag is interior
        let half = self.frame_len / 2;
        let refined = if period > 0 && period < half - 1 {
            parabolic_interpolation(
                period,
                self.delta[period - 1],
                self.delta[period],
                self.delta[period + 1],
            )
        } else {
            period as f32
        };

        self.prev_period_estimate = refined;
        self.sample_rate / refined
    }

    /// Steps 1-3 of the YIN algorithm: the cumulative-mean-normalized
    /// difference function over lags [0, frame_len/2).
    fn difference_function(&mut self, frame: &[f32]) {
        let half = self.frame_len / 2;
        let mut cumulative_sum = 0.0f32;

        for tau in 0..half {
            let mut sum = 0.0f32;
            for j in 0..half {
                let diff = frame[j] - frame[j + tau];
                sum += diff * diff;
            }

            // normalize by the running mean of the raw differences; skip
            // while the cumulative sum has no signal in it
            cumulative_sum += sum;
            self.delta[tau] = if cumulative_sum > 0.0 {
                sum * tau as f32 / cumulative_sum
            } else {
                sum
            };
        }

        // lag 0 is trivially a perfect match, never a candidate
        self.delta[0] = 1.0;
    }

    /// Look for a strict local minimum at, or one lag either side of, the
    /// previous period estimate.
    fn continuity_search(&self) -> Option<usize> {
        let half = self.frame_len / 2;
        let prev = roundf(self.prev_period_estimate) as i64;

        let mut found = None;
        for lag in (prev - 1)..=(prev + 1) {
            if lag > 0 && (lag as usize) < half - 1 {
                let lag = lag as usize;
                if self.delta[lag] < self.delta[lag - 1] && self.delta[lag] < self.delta[lag + 1] {
                    found = Some(lag);
                }
            }
        }
        found
    }

    /// Scan upward from the fixed floor for the first local minimum below
    /// the absolute threshold; fall back to the global minimum seen.
    fn period_candidate(&self) -> usize {
        let half = self.frame_len / 2;
        let mut min_value = f32::MAX;
        let mut min_lag = 0;

        for lag in SCAN_FLOOR..half.saturating_sub(1) {
            if self.delta[lag] < min_value {
                min_value = self.delta[lag];
                min_lag = lag;
            }

            if self.delta[lag] < DIFFERENCE_THRESHOLD
                && self.delta[lag] < self.delta[lag - 1]
                && self.delta[lag] < self.delta[lag + 1]
            {
                // minima are visited in order, so the first qualifying one
                // is the shortest period and wins
                return lag;
            }
        }

        min_lag
    }
}

/// Refine a period estimate from the difference values at its neighbors.
///
/// When all three values are equal the parabola is degenerate and the
/// unrefined period is returned.
fn parabolic_interpolation(period: usize, y1: f32, y2: f32, y3: f32) -> f32 {
    if y1 == y2 && y2 == y3 {
        period as f32
    } else {
        period as f32 + (y3 - y1) / (2.0 * (2.0 * y2 - y3 - y1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::f32::consts::PI;

    fn sine_frame(freq: f32, sample_rate: f32, len: usize) -> Vec<f32> {
        (0..len)
            .map(|i| libm::sinf(2.0 * PI * freq * i as f32 / sample_rate))
            .collect()
    }

    #[test]
    fn test_pure_tone_pitch() {
        let sample_rate = 8192.0;
        let freq = 128.0; // period 64 samples, well above the scan floor
        let frame = sine_frame(freq, sample_rate, 512);

        let mut estimator = PitchEstimator::new(sample_rate, 512).unwrap();
        let pitch = estimator.process(&frame);

        assert!(
            (pitch - freq).abs() < 2.0,
            "Estimated {} Hz, expected {} Hz",
            pitch,
            freq
        );
    }

    #[test]
    fn test_continuity_across_frames() {
        let sample_rate = 8192.0;
        let freq = 128.0;
        let frame = sine_frame(freq, sample_rate, 512);

        let mut estimator = PitchEstimator::new(sample_rate, 512).unwrap();
        let first = estimator.process(&frame);
        // second call lands on the continuity path seeded by the first
        let second = estimator.process(&frame);

        assert!((first - freq).abs() < 2.0, "first call: {} Hz", first);
        assert!((second - freq).abs() < 2.0, "second call: {} Hz", second);
        assert!(
            (first - second).abs() < 0.5,
            "continuity should keep estimates stable: {} vs {}",
            first,
            second
        );
    }

    #[test]
    fn test_silent_frame_is_finite() {
        let mut estimator = PitchEstimator::new(8192.0, 512).unwrap();
        let silence = [0.0f32; 512];
        let pitch = estimator.process(&silence);
        // no periodicity: the scan falls back to the global minimum at the
        // floor lag and the result stays finite
        assert!(pitch.is_finite());
        assert!(pitch > 0.0);
    }

    #[test]
    fn test_max_frequency_misconfiguration() {
        let mut estimator = PitchEstimator::new(44100.0, 512).unwrap();
        estimator.set_max_frequency(150.0);
        // <= 200 Hz is replaced with 2000 Hz
        assert!((estimator.max_frequency() - 2000.0).abs() < 100.0);
    }

    #[test]
    fn test_max_frequency_normal() {
        let mut estimator = PitchEstimator::new(44100.0, 512).unwrap();
        estimator.set_max_frequency(1000.0);
        // ceil rounding of the period makes the bound slightly conservative
        assert!(estimator.max_frequency() <= 1000.0);
        assert!(estimator.max_frequency() > 900.0);
    }

    #[test]
    fn test_reset_clears_anchor() {
        let sample_rate = 8192.0;
        let frame = sine_frame(128.0, sample_rate, 512);

        let mut estimator = PitchEstimator::new(sample_rate, 512).unwrap();
        estimator.process(&frame);
        estimator.reset();

        // after reset the next call takes the fresh-search path again
        let pitch = estimator.process(&frame);
        assert!((pitch - 128.0).abs() < 2.0, "got {} Hz", pitch);
    }

    #[test]
    fn test_interpolation_degenerate() {
        assert_eq!(parabolic_interpolation(42, 0.5, 0.5, 0.5), 42.0);
    }

    #[test]
    fn test_interpolation_refines_toward_smaller_neighbor() {
        // y3 < y1 pulls the refined period above the integer lag
        let refined = parabolic_interpolation(40, 0.5, 0.1, 0.3);
        assert!(refined > 39.0 && refined < 41.0);
        assert!(refined != 40.0);
    }
}
