//! Mostrador CLI — the main entry point.
//!
//! Commands:
//! - `chat`     — Interactive chat or single-message mode
//! - `relay`    — Start the Google Calendar OAuth relay
//! - `calendar` — Query busy intervals through a running relay
//! - `enhance`  — Rewrite a knowledge-base block through the model
//! - `config`   — Inspect the persisted configuration

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "mostrador",
    about = "Mostrador — asistente de atención a clientes impulsado por Gemini",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Chat with the assistant
    Chat {
        /// Send a single message instead of entering interactive mode
        #[arg(short, long)]
        message: Option<String>,

        /// Gemini API key
        #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
        api_key: Option<String>,
    },

    /// Start the Google Calendar OAuth relay
    Relay {
        /// Override the port
        #[arg(short, long)]
        port: Option<u16>,

        /// Google OAuth client ID
        #[arg(long, env = "GOOGLE_CLIENT_ID")]
        client_id: Option<String>,

        /// Google OAuth client secret
        #[arg(long, env = "GOOGLE_CLIENT_SECRET", hide_env_values = true)]
        client_secret: Option<String>,

        /// OAuth redirect URI registered with Google
        #[arg(long, env = "GOOGLE_REDIRECT_URI")]
        redirect_uri: Option<String>,
    },

    /// Query busy intervals through a running relay
    Calendar {
        /// Window start, ISO-8601 (e.g. 2024-08-10T00:00:00Z)
        start: String,

        /// Window end, ISO-8601
        end: String,

        /// Base URL of the relay
        #[arg(long, env = "MOSTRADOR_RELAY_URL")]
        relay_url: Option<String>,
    },

    /// Rewrite a knowledge-base block read from stdin
    Enhance {
        /// The section the text belongs to, e.g. "Información de la Empresa"
        label: String,

        /// Gemini API key
        #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
        api_key: Option<String>,
    },

    /// Inspect the persisted configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration as TOML
    Show,

    /// Print the config file path
    Path,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env("MOSTRADOR_LOG")
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    match cli.command {
        Commands::Chat { message, api_key } => commands::chat::run(message, api_key).await?,
        Commands::Relay {
            port,
            client_id,
            client_secret,
            redirect_uri,
        } => commands::relay::run(port, client_id, client_secret, redirect_uri).await?,
        Commands::Calendar {
            start,
            end,
            relay_url,
        } => commands::calendar::run(start, end, relay_url).await?,
        Commands::Enhance { label, api_key } => {
            commands::enhance::run(label, api_key).await?
        }
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::config_cmd::show().await?,
            ConfigAction::Path => commands::config_cmd::path().await?,
        },
    }

    Ok(())
}
