mod api;
mod history_cmd;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use kokoro_channels::{LineClient, LineConfig};
use kokoro_config::{load_and_prepare, redacted_snapshot, validate, KokoroConfig};
use kokoro_memory::{ConversationStore, JsonFileStore};
use kokoro_planner::{GeminiProvider, GenerationSettings, ResponseGenerator};
use kokoro_routing::{MessageRouter, ParticipantKeys};
use kokoro_understanding::{AzureSentimentProvider, SentimentClassifier};

use api::AppState;

#[derive(Parser)]
#[command(name = "kokoro")]
#[command(about = "kokoro: LINE chat relay with Gemini replies and sentiment tagging")]
#[command(version)]
struct Cli {
    /// Path to config.yaml
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the webhook server
    Serve {
        /// Port to bind the HTTP server to
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Show or clear the conversation log of a running server
    History {
        /// Port the server listens on
        #[arg(short, long)]
        port: Option<u16>,
        /// Delete all history instead of showing it
        #[arg(long)]
        clear: bool,
    },
    /// Print the effective (redacted) config and validation report
    CheckConfig,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = kokoro_config::config_file_path(cli.config.as_deref());
    let config = load_and_prepare(&config_path).await?;

    kokoro_logging::init_logger(
        config.log_level(),
        config.logging.dir.as_deref().map(Path::new),
    );

    match cli.command {
        Commands::Serve { port } => {
            let mut config = config;
            if port.is_some() {
                config.server.port = port;
            }
            run_server(config).await?;
        }
        Commands::History { port, clear } => {
            let port = port
                .or(config.server.port)
                .unwrap_or(kokoro_config::defaults::DEFAULT_PORT);
            history_cmd::run(port, clear).await?;
        }
        Commands::CheckConfig => {
            println!("# {}", config_path.display());
            println!("{}", serde_json::to_string_pretty(&redacted_snapshot(&config))?);
            let report = validate(&config);
            for warning in &report.warnings {
                println!("warning: {warning}");
            }
            for err in &report.errors {
                println!("error: {err}");
            }
            if !report.is_valid() {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}

/// Build the message router from config, wiring in whichever backends have
/// credentials.
fn build_router(config: &KokoroConfig, store: Arc<dyn ConversationStore>) -> (MessageRouter, String) {
    let timeout = config.timeout();

    let generator = match config.gemini.api_key.as_deref() {
        Some(key) if !key.is_empty() => {
            let mut settings = GenerationSettings::default();
            if let Some(model) = &config.gemini.model {
                settings = settings.with_model(model.clone());
            }
            info!(model = %settings.model, "Registered Gemini provider");
            ResponseGenerator::new(Arc::new(GeminiProvider::new(key, timeout)), settings)
        }
        _ => ResponseGenerator::unconfigured(),
    };

    let classifier = match (
        config.azure_language.endpoint.as_deref(),
        config.azure_language.api_key.as_deref(),
    ) {
        (Some(endpoint), Some(key)) if !endpoint.is_empty() && !key.is_empty() => {
            info!(endpoint = %endpoint, "Registered Azure Language sentiment provider");
            SentimentClassifier::new(Arc::new(AzureSentimentProvider::new(endpoint, key, timeout)))
        }
        _ => SentimentClassifier::unconfigured(),
    };

    let line = LineConfig {
        channel_secret: config.line.channel_secret.clone().unwrap_or_default(),
        channel_access_token: config.line.channel_access_token.clone().unwrap_or_default(),
    };
    let channel_secret = line.channel_secret.clone();
    let sender = Arc::new(LineClient::new(line, timeout));

    let mut keys = ParticipantKeys::default();
    if let Some(user) = &config.history.user_key {
        keys.user = user.clone();
    }
    if let Some(bot) = &config.history.bot_key {
        keys.bot = bot.clone();
    }

    let router = MessageRouter::new(generator, classifier, store, sender).with_keys(keys);
    (router, channel_secret)
}

async fn run_server(config: KokoroConfig) -> Result<()> {
    let report = validate(&config);
    for warning in &report.warnings {
        warn!(path = %warning.path, message = %warning.message, "Config warning");
    }
    if !report.is_valid() {
        for err in &report.errors {
            error!(path = %err.path, message = %err.message, "Config error");
            eprintln!("{}", err.message);
        }
        std::process::exit(1);
    }

    info!(config = %redacted_snapshot(&config), "Starting kokoro");

    let store: Arc<dyn ConversationStore> = Arc::new(JsonFileStore::new(config.history_path()));
    let (router, channel_secret) = build_router(&config, store.clone());

    let app_state = Arc::new(AppState {
        router,
        store,
        channel_secret,
    });
    let app = api::build_router(app_state).layer(TraceLayer::new_for_http());

    let addr = config.bind_address();
    let listener = TcpListener::bind(&addr).await?;
    info!(addr = %addr, history = %config.history_path(), "HTTP API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
    }
}
