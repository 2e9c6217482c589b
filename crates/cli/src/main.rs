mod auth_commands;

use std::path::PathBuf;

use {
    clap::{Parser, Subcommand},
    tracing::info,
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

#[derive(Parser)]
#[command(name = "steward", about = "Steward, credential gateway for Aplos and Virtuous")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file (toml, yaml or json). Defaults to ./steward.toml or
    /// ~/.config/steward/steward.toml when present.
    #[arg(long, global = true, env = "STEWARD_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP gateway.
    Gateway {
        #[arg(long, default_value = "127.0.0.1")]
        bind: String,
        #[arg(long, default_value_t = 5000)]
        port: u16,
    },
    /// Run a single provider token exchange.
    Auth {
        #[command(subcommand)]
        action: auth_commands::AuthAction,
    },
    /// Authenticate with Aplos and print the first account.
    Accounts,
    /// Validate configuration and list enabled providers.
    Check,
}

fn init_telemetry(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    if cli.json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_target(true).with_thread_ids(false))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_ansi(true),
            )
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_telemetry(&cli);

    info!(version = env!("CARGO_PKG_VERSION"), "steward starting");

    // Configuration errors are fatal here, before any provider is contacted.
    let config = steward_config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Gateway { bind, port } => {
            steward_gateway::start_gateway(&bind, port, &config).await
        },
        Commands::Auth { action } => auth_commands::handle_auth(action, &config).await,
        Commands::Accounts => auth_commands::accounts(&config).await,
        Commands::Check => auth_commands::check(&config),
    }
}
