//! Range-partitioned spectral fingerprinting.
//!
//! The magnitude spectrum is partitioned into configured frequency ranges;
//! each range contributes the frequency of its strongest bin (on a
//! log-compressed magnitude scale) to the signature. Ranges whose peak sits
//! below the cross-range average are zeroed out — a range dominated by
//! noise or silence carries no information worth matching on.
//!
//! The signature hash quantizes every value by the fuzz factor before
//! mixing, so two captures of the same signal whose peak frequencies
//! jitter by less than the tolerance hash identically.

use std::collections::TryReserveError;

use crate::try_zeroed;

/// Seed of the polynomial signature hash.
const HASH_SEED: u32 = 5381;

/// Produces per-range dominant-frequency signatures and their hashes.
///
/// The signature buffer is allocated at construction and reused;
/// [`FingerprintGenerator::process`] allocates nothing.
pub struct FingerprintGenerator {
    /// Ascending range boundaries, as bin indices. Never empty.
    boundaries: Vec<usize>,
    fuzz_factor: u16,
    bin_resolution: f32,
    /// Signature of the most recent frame, one entry per range.
    signature: Vec<u16>,
    /// Per-range peak log-magnitudes, scratch for the current frame.
    peak_logs: Vec<f32>,
}

impl FingerprintGenerator {
    /// Create a generator for the given resolved range boundaries.
    ///
    /// `boundaries` must be non-empty and ascending; the engine disables
    /// fingerprinting entirely rather than constructing an empty generator.
    pub fn new(
        boundaries: Vec<usize>,
        fuzz_factor: u16,
        bin_resolution: f32,
    ) -> Result<Self, TryReserveError> {
        debug_assert!(!boundaries.is_empty());
        let num_ranges = boundaries.len();
        Ok(Self {
            boundaries,
            fuzz_factor,
            bin_resolution,
            signature: try_zeroed(num_ranges)?,
            peak_logs: try_zeroed(num_ranges)?,
        })
    }

    /// Number of ranges in the signature.
    pub fn num_ranges(&self) -> usize {
        self.boundaries.len()
    }

    /// The resolved range boundaries.
    pub fn boundaries(&self) -> &[usize] {
        &self.boundaries
    }

    /// The fuzz tolerance applied by [`FingerprintGenerator::hash`].
    pub fn fuzz_factor(&self) -> u16 {
        self.fuzz_factor
    }

    /// The signature computed by the most recent
    /// [`FingerprintGenerator::process`] call.
    pub fn signature(&self) -> &[u16] {
        &self.signature
    }

    /// Replace boundaries and fuzz factor in place.
    ///
    /// The new boundary list must have the same length as the current one;
    /// a change in range count goes through engine reallocation instead.
    pub(crate) fn set_profile(&mut self, boundaries: &[usize], fuzz_factor: u16) {
        debug_assert_eq!(boundaries.len(), self.boundaries.len());
        self.boundaries.copy_from_slice(boundaries);
        self.fuzz_factor = fuzz_factor;
    }

    /// Compute the signature of a magnitude spectrum.
    ///
    /// Returns the engine-owned signature slice, valid until the next call.
    pub fn process(&mut self, magnitudes: &[f32]) -> &[u16] {
        self.signature.fill(0);
        self.peak_logs.fill(0.0);

        // keep, per range, the frequency of the strongest bin
        for (bin, &mag) in magnitudes.iter().enumerate().skip(1) {
            let range = self.range_index(bin);
            let log_mag = (mag.abs() + 1.0).ln();
            if log_mag > self.peak_logs[range] {
                self.peak_logs[range] = log_mag;
                self.signature[range] = (bin as f32 * self.bin_resolution) as u16;
            }
        }

        // suppress ranges whose peak falls below the cross-range average
        let average = self.peak_logs.iter().sum::<f32>() / self.peak_logs.len() as f32;
        for (frequency, &peak) in self.signature.iter_mut().zip(&self.peak_logs) {
            if peak < average {
                *frequency = 0;
            }
        }

        &self.signature
    }

    /// Hash a signature with fuzz-tolerant quantization.
    ///
    /// Polynomial accumulation seeded with 5381: the running hash is
    /// multiplied by 33 and XORed with each value quantized down to a
    /// multiple of the fuzz factor, folding from the last range to the
    /// first. A fuzz factor of 0 is treated as 1 (no quantization) so the
    /// hash stays total.
    pub fn hash(&self, signature: &[u16]) -> u32 {
        let fuzz = u32::from(self.fuzz_factor).max(1);
        signature.iter().rev().fold(HASH_SEED, |hash, &value| {
            let value = u32::from(value);
            hash.wrapping_mul(33) ^ (value - value % fuzz)
        })
    }

    /// Index of the range holding `bin`: the first boundary strictly above
    /// it. Bins beyond the last boundary fall into the last range, so an
    /// incomplete boundary list degrades instead of erroring.
    fn range_index(&self, bin: usize) -> usize {
        self.boundaries
            .iter()
            .position(|&bound| bound > bin)
            .unwrap_or(self.boundaries.len() - 1)
    }
}
