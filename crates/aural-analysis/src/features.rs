//! The spectral feature vector and its index enumeration.

use std::fmt;
use std::ops::Index;

/// The spectral descriptors computed per frame, in storage order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(usize)]
pub enum SpectralFeature {
    /// Frequency of the dominant spectral bin, in Hz.
    PeakFrequency,
    /// Magnitude of the dominant spectral bin.
    PeakMagnitude,
    /// Arithmetic mean magnitude across bins.
    AverageMagnitude,
    /// Magnitude-weighted standard deviation of bin index about the
    /// centroid, in bin units.
    Spread,
    /// Third standardized moment of bin index about the centroid.
    Skewness,
    /// Magnitude-weighted mean bin index, converted to Hz.
    Centroid,
    /// Geometric-to-arithmetic mean ratio of (1 + magnitude): near 1 for
    /// flat/noisy spectra, near 0 for tonal peaks.
    Flatness,
    /// Maximum squared magnitude over mean squared magnitude.
    Crest,
    /// Excess kurtosis of magnitude about its mean.
    Kurtosis,
    /// First bin fraction at which cumulative magnitude passes the
    /// configured percentile of total magnitude.
    Rolloff,
}

impl SpectralFeature {
    /// Number of features in the vector.
    pub const COUNT: usize = 10;

    /// All features in storage order.
    pub const ALL: [SpectralFeature; Self::COUNT] = [
        SpectralFeature::PeakFrequency,
        SpectralFeature::PeakMagnitude,
        SpectralFeature::AverageMagnitude,
        SpectralFeature::Spread,
        SpectralFeature::Skewness,
        SpectralFeature::Centroid,
        SpectralFeature::Flatness,
        SpectralFeature::Crest,
        SpectralFeature::Kurtosis,
        SpectralFeature::Rolloff,
    ];

    /// Stable display name, e.g. for labelled reports.
    pub fn name(self) -> &'static str {
        match self {
            SpectralFeature::PeakFrequency => "PeakFreq",
            SpectralFeature::PeakMagnitude => "PeakMag",
            SpectralFeature::AverageMagnitude => "AvgMag",
            SpectralFeature::Spread => "Spread",
            SpectralFeature::Skewness => "Skewness",
            SpectralFeature::Centroid => "Centroid",
            SpectralFeature::Flatness => "Flatness",
            SpectralFeature::Crest => "Crest",
            SpectralFeature::Kurtosis => "Kurtosis",
            SpectralFeature::Rolloff => "Rolloff",
        }
    }
}

impl fmt::Display for SpectralFeature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Fixed-size vector of the per-frame spectral descriptors.
///
/// Recomputed in full on every statistics call; there is no partial
/// update. Index it with a [`SpectralFeature`]:
///
/// ```rust
/// use aural_analysis::{FeatureVector, SpectralFeature};
///
/// let features = FeatureVector::new();
/// assert_eq!(features[SpectralFeature::Crest], 0.0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct FeatureVector([f32; SpectralFeature::COUNT]);

impl FeatureVector {
    /// A zeroed feature vector.
    pub fn new() -> Self {
        Self([0.0; SpectralFeature::COUNT])
    }

    /// The raw values in storage order.
    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    /// Iterate features with their values, in storage order.
    pub fn iter(&self) -> impl Iterator<Item = (SpectralFeature, f32)> + '_ {
        SpectralFeature::ALL.iter().map(move |&f| (f, self[f]))
    }

    pub(crate) fn set(&mut self, feature: SpectralFeature, value: f32) {
        self.0[feature as usize] = value;
    }
}

impl Index<SpectralFeature> for FeatureVector {
    type Output = f32;

    fn index(&self, feature: SpectralFeature) -> &f32 {
        &self.0[feature as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enumeration_order_matches_storage() {
        for (i, feature) in SpectralFeature::ALL.iter().enumerate() {
            assert_eq!(*feature as usize, i);
        }
    }

    #[test]
    fn names_are_unique() {
        for a in SpectralFeature::ALL {
            for b in SpectralFeature::ALL {
                if a != b {
                    assert_ne!(a.name(), b.name());
                }
            }
        }
    }

    #[test]
    fn set_and_index_round_trip() {
        let mut features = FeatureVector::new();
        features.set(SpectralFeature::Centroid, 1234.5);
        assert_eq!(features[SpectralFeature::Centroid], 1234.5);
        assert_eq!(features.as_slice()[SpectralFeature::Centroid as usize], 1234.5);
    }

    #[test]
    fn iter_yields_all_features() {
        let features = FeatureVector::new();
        assert_eq!(features.iter().count(), SpectralFeature::COUNT);
    }
}
