//! Window functions applied to a frame before a spectral transform.
//!
//! Windowing reduces spectral leakage by tapering the frame edges. The
//! analysis engine applies a Hamming window by default; Hann and
//! rectangular variants are provided for callers that drive the transform
//! directly.

use core::f32::consts::PI;

use libm::cosf;

/// Window function types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Window {
    /// Rectangular (no windowing)
    Rectangular,
    /// Hann window (raised cosine)
    Hann,
    /// Hamming window
    Hamming,
}

impl Window {
    /// Apply the window to a buffer in place.
    pub fn apply(&self, buffer: &mut [f32]) {
        let n = buffer.len();
        match self {
            Window::Rectangular => {}
            Window::Hann => {
                for (i, sample) in buffer.iter_mut().enumerate() {
                    let w = 0.5 * (1.0 - cosf(2.0 * PI * i as f32 / n as f32));
                    *sample *= w;
                }
            }
            Window::Hamming => {
                for (i, sample) in buffer.iter_mut().enumerate() {
                    let w = 0.54 - 0.46 * cosf(2.0 * PI * i as f32 / n as f32);
                    *sample *= w;
                }
            }
        }
    }
}
