//! Frame-by-frame fingerprinting command.

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;

use aural_analysis::{EngineConfig, FeatureEngine};

use crate::wav::read_wav;

#[derive(Args)]
pub struct FingerprintArgs {
    /// Input WAV file
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Transform length per frame (power of two)
    #[arg(long, default_value = "512")]
    fft_length: usize,

    /// Fingerprint at most this many frames (0 = all)
    #[arg(long, default_value = "0")]
    frames: usize,

    /// Emit JSON instead of a table
    #[arg(long)]
    json: bool,
}

pub fn run(args: FingerprintArgs) -> anyhow::Result<()> {
    let audio = read_wav(&args.input)?;
    anyhow::ensure!(
        args.fft_length.is_power_of_two(),
        "transform length {} is not a power of two",
        args.fft_length
    );

    let config = EngineConfig {
        sample_rate: audio.sample_rate,
        fft_length: args.fft_length,
        // SPL and the cepstrum are irrelevant to fingerprinting
        sensitivity: 0.0,
        cepstral_coefficients: 0,
        ..EngineConfig::default()
    };
    let boundaries = config.resolved_ranges()?;
    let fuzz_factor = config.resolved_fuzz_factor();
    let mut engine =
        FeatureEngine::new(config).context("failed to configure the analysis engine")?;

    let frame_limit = if args.frames == 0 {
        usize::MAX
    } else {
        args.frames
    };

    let mut rows = Vec::new();
    for (index, frame) in audio
        .samples
        .chunks_exact(args.fft_length)
        .enumerate()
        .take(frame_limit)
    {
        engine.transform(frame, true);
        let signature = engine
            .fingerprint(None)
            .context("fingerprinting is disabled")?
            .to_vec();
        let hash = engine
            .fingerprint_hash(None)
            .context("fingerprinting is disabled")?;
        rows.push((index, signature, hash));
    }

    anyhow::ensure!(
        !rows.is_empty(),
        "input is shorter than one {}-sample frame",
        args.fft_length
    );

    if args.json {
        let report = serde_json::json!({
            "sample_rate": audio.sample_rate,
            "fft_length": args.fft_length,
            "range_boundaries": boundaries,
            "fuzz_factor": fuzz_factor,
            "frames": rows
                .iter()
                .map(|(index, signature, hash)| {
                    serde_json::json!({
                        "frame": index,
                        "signature": signature,
                        "hash": hash,
                    })
                })
                .collect::<Vec<_>>(),
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!(
        "{} frames, ranges at bins {:?}, fuzz {} Hz",
        rows.len(),
        boundaries,
        fuzz_factor
    );
    println!();
    println!("  {:>5}  {:>30}  {:>10}", "frame", "signature (Hz)", "hash");
    for (index, signature, hash) in &rows {
        let rendered = signature
            .iter()
            .map(|f| f.to_string())
            .collect::<Vec<_>>()
            .join(" ");
        println!("  {:>5}  {:>30}  {:>#10x}", index, rendered, hash);
    }

    Ok(())
}
