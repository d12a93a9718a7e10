//! Aural Core - audio feature-extraction primitives
//!
//! This crate provides the foundational building blocks for per-frame audio
//! analysis on resource-constrained targets: raw-sample ingestion, level
//! measurement, window functions, scale conversions, and time-domain pitch
//! estimation. Everything here is designed for a fixed memory budget —
//! buffers are sized once and reused, and the per-frame paths never allocate.
//!
//! # Modules
//!
//! - [`sample`] - [`Sample`] trait abstracting the raw sample type delivered
//!   by the acquisition layer (integer ADC counts or floats)
//! - [`level`] - RMS and calibrated decibel-SPL measurement
//! - [`math`] - dB/linear and mel/Hz scale conversions
//! - [`window`] - window functions applied before a spectral transform
//! - [`pitch`] - [`PitchEstimator`], an autocorrelation-difference (YIN)
//!   pitch tracker with frame-to-frame continuity
//!
//! # no_std Support
//!
//! This crate is `no_std` compatible for embedded targets. Disable the
//! default `std` feature in your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! aural-core = { version = "0.1", default-features = false }
//! ```
//!
//! The pitch estimator owns one heap buffer and therefore requires `alloc`.
//!
//! # Design Principles
//!
//! - **Real-time safe**: no allocations in per-frame paths
//! - **No dependencies on std**: pure `no_std` with `libm` for math
//! - **Defined degeneracies**: division-by-zero hazards fall back to
//!   documented values instead of propagating faults

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod level;
pub mod math;
pub mod pitch;
pub mod sample;
pub mod window;

// Re-export main types at crate root
pub use level::{decibel_spl, rms};
pub use math::{db_to_linear, hz_to_mel, linear_to_db, mel_to_hz};
pub use pitch::PitchEstimator;
pub use sample::Sample;
pub use window::Window;
