//! Raw sample type abstraction.
//!
//! The acquisition layer delivers frames in whatever format the ADC or codec
//! produces — signed integer counts or floats. The analysis code works in
//! `f32` throughout, so conversion happens exactly once, at the boundary
//! where a frame enters the engine.

/// A raw audio sample as delivered by the acquisition layer.
///
/// Implementations convert to `f32` by value, without rescaling: an i16
/// sample of 1000 becomes 1000.0, not 1000/32768. Level measurements are
/// therefore in the same units the acquisition layer calibrated against
/// (e.g. a microphone sensitivity expressed in ADC counts).
pub trait Sample: Copy {
    /// Convert the raw sample to `f32`.
    fn to_f32(self) -> f32;
}

impl Sample for f32 {
    #[inline]
    fn to_f32(self) -> f32 {
        self
    }
}

impl Sample for i16 {
    #[inline]
    fn to_f32(self) -> f32 {
        f32::from(self)
    }
}

impl Sample for i32 {
    #[inline]
    fn to_f32(self) -> f32 {
        self as f32
    }
}
