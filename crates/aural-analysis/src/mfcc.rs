//! Mel-frequency cepstral coefficients.
//!
//! A triangular mel-scale filter bank projects the magnitude spectrum into
//! perceptual bands; the log band energies pass through a type-II discrete
//! cosine transform to produce a compact timbral descriptor.
//!
//! The filter bank depends only on the transform length, sample rate, and
//! coefficient count, so it is computed once at construction. The engine's
//! reallocation rule guarantees a computer is rebuilt exactly when one of
//! those parameters changes.

use std::collections::TryReserveError;
use std::f32::consts::PI;

use aural_core::{hz_to_mel, mel_to_hz};

use crate::try_zeroed;

/// Computes mel-frequency cepstral coefficients from a magnitude spectrum.
///
/// All buffers, including the filter bank, are allocated at construction;
/// [`CepstrumComputer::process`] allocates nothing.
pub struct CepstrumComputer {
    num_coefficients: usize,
    num_bins: usize,
    /// Triangular filters, `num_coefficients` rows of `num_bins` weights.
    filter_bank: Vec<Vec<f32>>,
    /// Mel band energies for the current frame.
    mel_energies: Vec<f32>,
    /// Log band energies, input to the cosine transform.
    log_energies: Vec<f32>,
    /// The cepstral coefficients for the current frame.
    coefficients: Vec<f32>,
}

impl CepstrumComputer {
    /// Build a computer and its filter bank.
    ///
    /// # Arguments
    /// * `fft_length` - transform length; the magnitude spectrum covers
    ///   `fft_length/2` bins
    /// * `sample_rate` - sampling frequency in Hz
    /// * `num_coefficients` - number of cepstral coefficients to produce
    pub fn new(
        fft_length: usize,
        sample_rate: u32,
        num_coefficients: usize,
    ) -> Result<Self, TryReserveError> {
        let num_bins = fft_length / 2;

        let mut filter_bank = Vec::new();
        filter_bank.try_reserve_exact(num_coefficients)?;
        for _ in 0..num_coefficients {
            filter_bank.push(try_zeroed::<f32>(num_bins)?);
        }

        let mut computer = Self {
            num_coefficients,
            num_bins,
            filter_bank,
            mel_energies: try_zeroed(num_coefficients)?,
            log_energies: try_zeroed(num_coefficients)?,
            coefficients: try_zeroed(num_coefficients)?,
        };
        computer.build_filter_bank(sample_rate);
        Ok(computer)
    }

    /// Number of coefficients produced per frame.
    pub fn num_coefficients(&self) -> usize {
        self.num_coefficients
    }

    /// The coefficients computed by the most recent
    /// [`CepstrumComputer::process`] call.
    pub fn coefficients(&self) -> &[f32] {
        &self.coefficients
    }

    /// Compute the cepstral coefficients of a magnitude spectrum.
    ///
    /// Returns the engine-owned coefficient slice, valid until the next
    /// call.
    pub fn process(&mut self, magnitudes: &[f32]) -> &[f32] {
        // mel energies: filter-weighted sums of squared magnitudes
        for (energy, filter) in self.mel_energies.iter_mut().zip(&self.filter_bank) {
            let mut sum = 0.0f64;
            for (&weight, &mag) in filter.iter().zip(magnitudes.iter()) {
                sum += f64::from(mag * mag * weight);
            }
            *energy = sum as f32;
        }

        // log compression; epsilon keeps a silent band out of log(0)
        for (log_energy, &energy) in self.log_energies.iter_mut().zip(&self.mel_energies) {
            *log_energy = (energy + f32::MIN_POSITIVE).ln();
        }

        self.discrete_cosine_transform();
        &self.coefficients
    }

    /// Type-II DCT of the log energies, coefficient k scaled by 2.
    fn discrete_cosine_transform(&mut self) {
        let n = self.num_coefficients as f32;
        let pi_over_n = PI / n;

        for (k, coefficient) in self.coefficients.iter_mut().enumerate() {
            let mut sum = 0.0f32;
            for (j, &log_energy) in self.log_energies.iter().enumerate() {
                sum += log_energy * (pi_over_n * (j as f32 + 0.5) * k as f32).cos();
            }
            *coefficient = 2.0 * sum;
        }
    }

    /// Place `num_coefficients + 2` boundary points equally spaced on the
    /// mel scale between 0 Hz and Nyquist, convert them back to bin
    /// indices, and ramp each filter linearly up to its center boundary
    /// and back down to the next.
    fn build_filter_bank(&mut self, sample_rate: u32) {
        let nyquist = sample_rate as f32 / 2.0;
        let min_mel = hz_to_mel(0.0);
        let max_mel = hz_to_mel(nyquist);
        let num_edges = self.num_coefficients + 2;

        let edge_bin = |i: usize| -> usize {
            let mel = min_mel + (max_mel - min_mel) * i as f32 / (num_edges - 1) as f32;
            let hz = mel_to_hz(mel);
            (self.num_bins as f32 * hz / nyquist + 0.5) as usize
        };

        for (i, filter) in self.filter_bank.iter_mut().enumerate() {
            let left = edge_bin(i);
            let center = edge_bin(i + 1);
            let right = edge_bin(i + 2);

            // upward slope; a zero-width slope contributes nothing
            if center > left {
                let rise = (center - left) as f32;
                for k in left..center.min(self.num_bins) {
                    filter[k] = (k - left) as f32 / rise;
                }
            }

            // downward slope
            if right > center {
                let fall = (right - center) as f32;
                for k in center..right.min(self.num_bins) {
                    filter[k] = (right - k) as f32 / fall;
                }
            }
        }
    }
}
