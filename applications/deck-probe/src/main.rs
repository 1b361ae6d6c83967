/// Deck Probe - FLAC stream inspector
use clap::{Parser, Subcommand};
use deck_probe::{config::ProbeConfig, probe};
use serde::Serialize;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "deck-probe")]
#[command(about = "Inspect and test-decode FLAC files", long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true, env = "DECK_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the track record read from the file header
    Info {
        /// FLAC file to inspect
        path: PathBuf,
    },
    /// Decode the whole file and report what was read
    Decode {
        /// FLAC file to decode
        path: PathBuf,
        /// Samples per read (overrides the configuration)
        #[arg(long)]
        chunk: Option<usize>,
        /// Logical sample to seek to before decoding
        #[arg(long)]
        seek: Option<u64>,
    },
}

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "deck_audio=info,deck_probe=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = ProbeConfig::load(cli.config.as_deref())?;
    tracing::debug!("Configuration: {:?}", config);

    match cli.command {
        Commands::Info { path } => {
            let info = probe::describe(&path, config.decoder)?;
            print_json(&info, config.output.pretty)?;
        }
        Commands::Decode { path, chunk, seek } => {
            let chunk_size = chunk.unwrap_or(config.output.chunk_size);
            let summary = probe::decode(&path, config.decoder, chunk_size, seek)?;
            print_json(&summary, config.output.pretty)?;
            if !summary.clean {
                anyhow::bail!("{} did not decode cleanly", path.display());
            }
        }
    }

    Ok(())
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> anyhow::Result<()> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{json}");
    Ok(())
}
