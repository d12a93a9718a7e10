//! Criterion benchmarks for the per-frame analysis path
//!
//! Run with: cargo bench -p aural-analysis

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use aural_analysis::{EngineConfig, FeatureEngine};
use std::f32::consts::PI;

const SAMPLE_RATE: u32 = 8192;

/// Generate a test signal with a few harmonics
fn generate_frame(size: usize) -> Vec<f32> {
    (0..size)
        .map(|i| {
            let t = i as f32 / SAMPLE_RATE as f32;
            let f1 = (2.0 * PI * 256.0 * t).sin();
            let f2 = 0.5 * (2.0 * PI * 512.0 * t).sin();
            let f3 = 0.25 * (2.0 * PI * 1024.0 * t).sin();
            (f1 + f2 + f3) * 0.5
        })
        .collect()
}

fn engine_for(fft_length: usize) -> FeatureEngine {
    FeatureEngine::new(EngineConfig {
        sample_rate: SAMPLE_RATE,
        fft_length,
        ..EngineConfig::default()
    })
    .expect("engine allocation")
}

fn bench_transform(c: &mut Criterion) {
    let mut group = c.benchmark_group("transform");

    for size in [256, 512, 1024, 2048] {
        let mut engine = engine_for(size);
        let frame = generate_frame(size);

        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| {
                engine.transform(black_box(&frame), true);
            });
        });
    }

    group.finish();
}

fn bench_spectral_statistics(c: &mut Criterion) {
    let mut engine = engine_for(512);
    let frame = generate_frame(512);
    engine.transform(&frame, true);

    c.bench_function("spectral_statistics_512", |b| {
        b.iter(|| {
            black_box(engine.spectral_statistics(None));
        });
    });
}

fn bench_cepstral_coefficients(c: &mut Criterion) {
    let mut engine = engine_for(512);
    let frame = generate_frame(512);
    engine.transform(&frame, true);

    c.bench_function("cepstral_coefficients_512", |b| {
        b.iter(|| {
            black_box(engine.cepstral_coefficients(None));
        });
    });
}

fn bench_fingerprint(c: &mut Criterion) {
    let mut engine = engine_for(512);
    let frame = generate_frame(512);
    engine.transform(&frame, true);

    c.bench_function("fingerprint_512", |b| {
        b.iter(|| {
            black_box(engine.fingerprint(None));
            black_box(engine.fingerprint_hash(None));
        });
    });
}

fn bench_pitch(c: &mut Criterion) {
    let mut engine = engine_for(512);
    let frame = generate_frame(512);

    c.bench_function("pitch_512", |b| {
        b.iter(|| {
            black_box(engine.pitch(black_box(&frame)));
        });
    });
}

fn bench_full_frame(c: &mut Criterion) {
    let mut engine = engine_for(512);
    let frame = generate_frame(512);

    c.bench_function("full_frame_512", |b| {
        b.iter(|| {
            engine.transform(black_box(&frame), true);
            black_box(engine.spectral_statistics(None));
            black_box(engine.cepstral_coefficients(None));
            black_box(engine.fingerprint(None));
            black_box(engine.fingerprint_hash(None));
        });
    });
}

criterion_group!(
    benches,
    bench_transform,
    bench_spectral_statistics,
    bench_cepstral_coefficients,
    bench_fingerprint,
    bench_pitch,
    bench_full_frame
);
criterion_main!(benches);
