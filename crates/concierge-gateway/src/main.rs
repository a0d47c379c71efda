//! Concierge — retrieval-augmented question-answering service

use clap::{Parser, Subcommand};
use concierge_core::{BindMode, Config};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(
    name = "concierge",
    about = "Concierge — retrieval-augmented QA service"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP service
    Serve {
        #[arg(short, long)]
        port: Option<u16>,
        #[arg(short, long)]
        bind: Option<String>,
        #[arg(long)]
        system_prompt: Option<String>,
    },
    /// Embed documents from a JSON file and upsert them into the vector store
    Ingest {
        /// JSON file containing an array of {"text": "..."} objects
        #[arg(short, long)]
        file: PathBuf,
        /// Target table (default: VECTOR_TABLE)
        #[arg(short, long)]
        table: Option<String>,
    },
    /// Show version
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "concierge=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Serve {
            port,
            bind,
            system_prompt,
        }) => {
            let mut config = Config::from_env();
            if let Some(port) = port {
                config.port = port;
            }
            if let Some(bind) = bind {
                config.bind = match bind.as_str() {
                    "loopback" | "localhost" | "127.0.0.1" => BindMode::Loopback,
                    _ => BindMode::Lan,
                };
            }
            if system_prompt.is_some() {
                config.system_prompt = system_prompt;
            }
            concierge_gateway::start_server(config).await?;
        }

        Some(Commands::Ingest { file, table }) => {
            let config = Config::from_env();
            let stored = concierge_gateway::ingest::run_ingest(&config, &file, table).await?;
            println!("stored {} documents", stored);
        }

        Some(Commands::Version) => {
            println!("concierge v{}", env!("CARGO_PKG_VERSION"));
        }

        // No subcommand = serve with environment defaults
        None => {
            concierge_gateway::start_server(Config::from_env()).await?;
        }
    }

    Ok(())
}
