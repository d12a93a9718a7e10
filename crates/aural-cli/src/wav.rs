//! WAV file reading.

use std::path::Path;

use anyhow::Context;
use hound::{SampleFormat, WavReader};

/// A decoded, mono audio file.
pub struct WavAudio {
    /// Samples normalized to [-1, 1], mixed down to mono.
    pub samples: Vec<f32>,
    /// Sample rate in Hz.
    pub sample_rate: u32,
}

/// Read a WAV file and return mono f32 samples.
///
/// Multi-channel files are mixed down by averaging channels; integer
/// formats are normalized by their full-scale value.
pub fn read_wav<P: AsRef<Path>>(path: P) -> anyhow::Result<WavAudio> {
    let path = path.as_ref();
    let reader =
        WavReader::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let spec = reader.spec();
    let channels = spec.channels as usize;

    let samples: Vec<f32> = match spec.sample_format {
        SampleFormat::Float => reader
            .into_samples::<f32>()
            .collect::<Result<Vec<_>, _>>()?,
        SampleFormat::Int => {
            let max_val = (1i32 << (spec.bits_per_sample - 1)) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f32 / max_val))
                .collect::<Result<Vec<_>, _>>()?
        }
    };

    // Mix down to mono if multi-channel
    let samples = if channels > 1 {
        samples
            .chunks(channels)
            .map(|chunk| chunk.iter().sum::<f32>() / channels as f32)
            .collect()
    } else {
        samples
    };

    Ok(WavAudio {
        samples,
        sample_rate: spec.sample_rate,
    })
}
