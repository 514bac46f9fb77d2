mod cli;
mod command;
mod render;
mod repl;

use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use nanochat_config::schema::{self, HostConfig, NanochatConfig};
use nanochat_core::{ChatError, ChatOrchestrator, ChatSettings, ChunkMode, SimulatedHost};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

fn chunk_mode(mode: schema::ChunkMode) -> ChunkMode {
    match mode {
        schema::ChunkMode::Cumulative => ChunkMode::Cumulative,
        schema::ChunkMode::Delta => ChunkMode::Delta,
    }
}

fn build_host(host: &HostConfig, mode: ChunkMode) -> SimulatedHost {
    if !host.available {
        return SimulatedHost::unavailable();
    }
    SimulatedHost::new(host.default_temperature, host.default_top_k)
        .with_max_tokens(host.max_tokens)
        .with_chunk_delay(Duration::from_millis(host.chunk_delay_ms))
        .with_chunk_mode(mode)
}

fn load_config(path: Option<&Path>) -> nanochat_common::Result<NanochatConfig> {
    let config = match path {
        Some(path) => nanochat_config::load_config_from(path)?,
        None => nanochat_config::load_config()?,
    };
    Ok(config)
}

fn chat_settings(config: &NanochatConfig) -> ChatSettings {
    ChatSettings {
        welcome_message: config.chat.welcome_message.clone(),
        cleared_message: config.chat.cleared_message.clone(),
        chunk_mode: chunk_mode(config.chat.chunk_mode),
        notice_capacity: config.chat.notice_capacity as usize,
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = cli::parse();

    // Load config before logging so its level can apply.
    let loaded = load_config(args.config.as_deref());

    let fallback = loaded
        .as_ref()
        .map(|c| c.logging.level.as_directive())
        .unwrap_or("info");
    let log_directive = args.log_level.as_deref().unwrap_or(fallback);
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(
                log_directive
                    .parse()
                    .unwrap_or_else(|_| LevelFilter::INFO.into()),
            ),
        )
        .init();

    tracing::info!("nanochat v{} starting...", env!("CARGO_PKG_VERSION"));

    let config = loaded.unwrap_or_else(|e| {
        tracing::warn!("Config load failed, using defaults: {e}");
        NanochatConfig::default()
    });

    let settings = chat_settings(&config);
    let host = Arc::new(build_host(&config.host, settings.chunk_mode));
    let mut chat = ChatOrchestrator::new(host, settings);

    if let Err(e) = chat.start().await {
        if e == ChatError::Unsupported {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
        tracing::warn!("chat started without a session: {e}");
    }

    if let Err(e) = repl::run(&mut chat, &config.sampling).await {
        tracing::error!("front end error: {e}");
        return ExitCode::FAILURE;
    }
    tracing::info!("Shutdown complete");
    ExitCode::SUCCESS
}
