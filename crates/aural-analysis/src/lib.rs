//! Aural Analysis - per-frame audio feature and fingerprint engine
//!
//! This crate turns a frame of sampled audio into compact descriptors:
//!
//! - [`engine`] - [`FeatureEngine`], the configuration-driven orchestrator
//!   and the only type a host application needs
//! - [`config`] - [`EngineConfig`] value type and the reallocation rules
//! - [`features`] - the ten-element spectral [`FeatureVector`]
//! - [`fft`] - the spectral transform engine over rustfft
//! - [`mfcc`] - [`CepstrumComputer`], mel-frequency cepstral coefficients
//! - [`fingerprint`] - [`FingerprintGenerator`], range-partitioned
//!   signatures with a fuzz-tolerant hash
//!
//! # Example Workflow
//!
//! ```rust
//! use aural_analysis::{EngineConfig, FeatureEngine, SpectralFeature};
//!
//! let mut engine = FeatureEngine::new(EngineConfig {
//!     sample_rate: 8192,
//!     fft_length: 512,
//!     ..EngineConfig::default()
//! })?;
//!
//! // per frame: transform, then read whichever descriptors you need
//! let frame = vec![0.0f32; 512];
//! engine.transform(&frame, true);
//! let features = engine.spectral_statistics(None);
//! let _centroid = features[SpectralFeature::Centroid];
//! # Ok::<(), aural_analysis::EngineError>(())
//! ```
//!
//! # Resource Model
//!
//! Every buffer is allocated when a configuration is applied and reused for
//! every subsequent frame; the per-frame path is allocation-free.
//! Reapplying a configuration reallocates only when transform length,
//! sample rate, range count, or coefficient count changed. Results are
//! borrows of engine-owned storage, valid until the next mutating call —
//! enforced by the borrow checker, not by caller discipline.

use std::collections::TryReserveError;

pub mod config;
pub mod engine;
pub mod features;
pub mod fft;
pub mod fingerprint;
pub mod mfcc;

// Re-export main types at crate root
pub use config::{EngineConfig, EngineError, RangeProfile};
pub use engine::FeatureEngine;
pub use features::{FeatureVector, SpectralFeature};
pub use fft::FftEngine;
pub use fingerprint::FingerprintGenerator;
pub use mfcc::CepstrumComputer;

// Re-export the core types that appear in this crate's public API
pub use aural_core::{Sample, Window};

/// Allocate a zeroed buffer, reporting failure instead of aborting.
pub(crate) fn try_zeroed<T: Copy + Default>(len: usize) -> Result<Vec<T>, TryReserveError> {
    let mut buffer = Vec::new();
    buffer.try_reserve_exact(len)?;
    buffer.resize(len, T::default());
    Ok(buffer)
}
