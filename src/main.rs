//! PaperSprint chat service - main entry point

use clap::{Parser, Subcommand};
use papersprint_chat::config::ChatConfig;
use papersprint_chat::gateway::LlmAgent;
use papersprint_chat::intent::IntentRouter;
use papersprint_chat::llm::{LlmProvider, OpenAiConfig, OpenAiProvider};
use papersprint_chat::observability::logging::{parse_include_spans, LogFormat};
use papersprint_chat::observability::{init_default_logging, init_logging};
use papersprint_chat::{ChatDispatcher, ChatServer};
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tracing::{error, info, warn, Level};

/// Hybrid rule/LLM chat service for PaperSprint
#[derive(Parser)]
#[command(name = "papersprint-chat")]
#[command(about = "Hybrid rule/LLM chat service for the PaperSprint storefront")]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, value_name = "FILE", env = "PAPERSPRINT_CHAT_CONFIG")]
    config: Option<PathBuf>,

    /// Verbose logging (-v debug, -vv trace); overrides LOG_LEVEL
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP chat server
    Serve,
    /// Validate configuration
    Config {
        /// Show the effective configuration
        #[arg(long)]
        show: bool,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    match cli.verbose {
        0 => init_default_logging(),
        1 => init_logging_from_env(Level::DEBUG),
        _ => init_logging_from_env(Level::TRACE),
    }

    info!("Starting papersprint-chat v{}", env!("CARGO_PKG_VERSION"));

    let config = match load_configuration(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            process::exit(1);
        }
    };

    let result = match cli.command {
        Commands::Serve => run_server(config).await,
        Commands::Config { show } => handle_config_command(&config, show),
    };

    if let Err(e) = result {
        error!("Command failed: {}", e);
        process::exit(1);
    }
}

fn init_logging_from_env(level: Level) {
    let format = LogFormat::parse(&std::env::var("LOG_FORMAT").unwrap_or_default());
    let include_spans = parse_include_spans(&std::env::var("LOG_SPANS").unwrap_or_default());
    init_logging(level, format, include_spans);
}

fn load_configuration(
    config_path: &Option<PathBuf>,
) -> Result<ChatConfig, Box<dyn std::error::Error>> {
    if let Some(path) = config_path {
        info!("Loading configuration from: {}", path.display());
        return Ok(ChatConfig::load_from_file(path)?);
    }

    for path_str in ["chat.toml", "config/chat.toml"] {
        let path = PathBuf::from(path_str);
        if path.exists() {
            info!("Loading configuration from: {}", path.display());
            return Ok(ChatConfig::load_from_file(&path)?);
        }
    }

    Err("No configuration file found. Provide one with -c/--config or create chat.toml".into())
}

/// Provider factory for creating LLM providers from configuration
struct LlmProviderFactory;

impl LlmProviderFactory {
    fn create_provider(
        config: &ChatConfig,
    ) -> Result<Arc<dyn LlmProvider>, Box<dyn std::error::Error>> {
        let api_key = config.get_llm_api_key()?;

        let mut provider_config = match config.llm.provider.as_str() {
            "groq" => OpenAiConfig::groq(api_key),
            "openai" => OpenAiConfig::openai(api_key),
            provider => return Err(format!("Unsupported LLM provider: {provider}").into()),
        };
        if let Some(base_url) = &config.llm.base_url {
            provider_config.base_url = base_url.trim_end_matches('/').to_string();
        }
        if let Some(timeout) = config.agent_timeout() {
            // Leave the dispatcher's limit in charge of the whole call
            provider_config.timeout = timeout + Duration::from_secs(1);
        }

        Ok(Arc::new(OpenAiProvider::new(provider_config)?))
    }
}

/// Bootstrap: wire router, agent and dispatcher from configuration
fn build_dispatcher(config: &ChatConfig) -> Result<ChatDispatcher, Box<dyn std::error::Error>> {
    let provider = LlmProviderFactory::create_provider(config)?;
    let agent = LlmAgent::new(provider, config.llm.model.clone())
        .with_system_prompt(config.llm.system_prompt.clone())
        .with_temperature(config.llm.temperature)
        .with_max_tokens(config.llm.max_tokens);

    let router = IntentRouter::standard(config.site.base_url.clone());

    Ok(ChatDispatcher::new(Arc::new(router), Arc::new(agent))
        .with_agent_timeout(config.agent_timeout()))
}

async fn run_server(config: ChatConfig) -> Result<(), Box<dyn std::error::Error>> {
    let dispatcher = build_dispatcher(&config)?;
    info!(
        provider = %config.llm.provider,
        model = %config.llm.model,
        base_url = %config.site.base_url,
        "Chat dispatcher ready"
    );

    let addr = config.bind_address()?;
    let server = ChatServer::new(
        dispatcher,
        config.site.welcome_message.clone(),
        config.server.clone(),
    );

    server.serve(addr, shutdown_signal()).await?;

    info!("Application shutdown complete");
    Ok(())
}

fn handle_config_command(config: &ChatConfig, show: bool) -> Result<(), Box<dyn std::error::Error>> {
    if show {
        println!("Current configuration:");
        println!("{}", toml::to_string_pretty(config)?);
    }

    if config.get_llm_api_key().is_err() {
        warn!(
            "Environment variable {} is not set; `serve` will fail",
            config.llm.api_key_env
        );
    }

    info!("Configuration validation complete");
    Ok(())
}

/// Resolves on SIGINT or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for SIGINT: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received SIGINT, shutting down gracefully..."),
        _ = terminate => info!("Received SIGTERM, shutting down gracefully..."),
    }
}
