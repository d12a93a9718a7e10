//! Aural CLI - per-frame audio feature extraction from WAV files.

mod commands;
mod wav;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "aural")]
#[command(author, version, about = "Audio feature and fingerprint extraction", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract per-frame spectral features from an audio file
    Analyze(commands::analyze::AnalyzeArgs),

    /// Fingerprint an audio file frame by frame
    Fingerprint(commands::fingerprint::FingerprintArgs),
}

fn main() -> anyhow::Result<()> {
    use tracing_subscriber::EnvFilter;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze(args) => commands::analyze::run(args),
        Commands::Fingerprint(args) => commands::fingerprint::run(args),
    }
}
