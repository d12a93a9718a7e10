//! Per-frame feature extraction command.

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;

use aural_analysis::{EngineConfig, FeatureEngine, SpectralFeature};
use aural_core::linear_to_db;

use crate::wav::read_wav;

#[derive(Args)]
pub struct AnalyzeArgs {
    /// Input WAV file
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Transform length per frame (power of two)
    #[arg(long, default_value = "512")]
    fft_length: usize,

    /// Number of cepstral coefficients (0 disables the cepstrum)
    #[arg(long, default_value = "13")]
    cepstral: usize,

    /// Spectral rolloff percentile
    #[arg(long, default_value = "0.85")]
    rolloff: f32,

    /// Microphone sensitivity for SPL calibration (0 disables SPL)
    #[arg(long, default_value = "0")]
    sensitivity: f32,

    /// Calibrated amplifier gain in dB for SPL
    #[arg(long, default_value = "0")]
    gain: f32,

    /// Analyze at most this many frames (0 = all)
    #[arg(long, default_value = "8")]
    frames: usize,

    /// Include a pitch estimate per frame
    #[arg(long)]
    pitch: bool,

    /// Emit JSON instead of a table
    #[arg(long)]
    json: bool,
}

pub fn run(args: AnalyzeArgs) -> anyhow::Result<()> {
    let audio = read_wav(&args.input)?;
    anyhow::ensure!(
        args.fft_length.is_power_of_two(),
        "transform length {} is not a power of two",
        args.fft_length
    );

    tracing::info!(
        samples = audio.samples.len(),
        sample_rate = audio.sample_rate,
        "loaded input"
    );

    let mut engine = FeatureEngine::new(EngineConfig {
        sample_rate: audio.sample_rate,
        fft_length: args.fft_length,
        sensitivity: args.sensitivity,
        gain: args.gain,
        rolloff_percentile: args.rolloff,
        cepstral_coefficients: args.cepstral,
        ..EngineConfig::default()
    })
    .context("failed to configure the analysis engine")?;

    let frames = audio.samples.chunks_exact(args.fft_length);
    let frame_limit = if args.frames == 0 {
        usize::MAX
    } else {
        args.frames
    };

    let mut reports = Vec::new();
    for (index, frame) in frames.enumerate().take(frame_limit) {
        engine.transform(frame, true);
        let rms = engine.rms(frame);
        let features = engine.spectral_statistics(None);

        let mut report = serde_json::json!({
            "frame": index,
            "rms": rms,
        });
        for (feature, value) in features.iter() {
            report[feature.name()] = serde_json::json!(value);
        }
        if let Some(spl) = engine.decibel_level(frame) {
            report["SplDb"] = serde_json::json!(spl);
        }
        if args.pitch {
            report["PitchHz"] = serde_json::json!(engine.pitch(frame));
        }
        if let Some(coefficients) = engine.cepstral_coefficients(None) {
            report["Mfcc"] = serde_json::json!(coefficients);
        }
        reports.push(report);
    }

    anyhow::ensure!(
        !reports.is_empty(),
        "input is shorter than one {}-sample frame",
        args.fft_length
    );

    if args.json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
        return Ok(());
    }

    println!(
        "{} frames of {} samples at {} Hz ({:.1} Hz/bin)",
        reports.len(),
        args.fft_length,
        audio.sample_rate,
        engine.bin_resolution()
    );
    println!();
    println!(
        "  {:>5}  {:>9}  {:>9}  {:>8}  {:>9}  {:>8}  {:>8}",
        "frame", "peak(Hz)", "peak(dB)", "rms", "centroid", "flatness", "rolloff"
    );
    for report in &reports {
        println!(
            "  {:>5}  {:>9.1}  {:>9.1}  {:>8.4}  {:>9.1}  {:>8.3}  {:>8.3}",
            report["frame"],
            report[SpectralFeature::PeakFrequency.name()]
                .as_f64()
                .unwrap_or(0.0),
            linear_to_db(
                report[SpectralFeature::PeakMagnitude.name()]
                    .as_f64()
                    .unwrap_or(0.0) as f32
            ),
            report["rms"].as_f64().unwrap_or(0.0),
            report[SpectralFeature::Centroid.name()]
                .as_f64()
                .unwrap_or(0.0),
            report[SpectralFeature::Flatness.name()]
                .as_f64()
                .unwrap_or(0.0),
            report[SpectralFeature::Rolloff.name()]
                .as_f64()
                .unwrap_or(0.0),
        );
    }

    if args.pitch {
        println!();
        println!("  {:>5}  {:>9}", "frame", "pitch(Hz)");
        for report in &reports {
            println!(
                "  {:>5}  {:>9.1}",
                report["frame"],
                report["PitchHz"].as_f64().unwrap_or(0.0)
            );
        }
    }

    Ok(())
}
