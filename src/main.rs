mod catalog;
mod chat;
mod config;
mod error;
mod gemini;
mod imaging;
mod logger;
mod models;
mod plant_id;
mod prompt;
mod rate_limit;
mod router;
mod upload;

use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;

use chat::ChatService;
use config::AppConfig;
use gemini::GeminiClient;
use logger::LogSettings;
use plant_id::PlantIdClient;
use router::{run_router, RouterState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  dotenv::dotenv().ok();
  let _log_guard = logger::init(&LogSettings::from_env())?;

  let config = AppConfig::from_env().context("invalid configuration")?;

  let state = RouterState {
    started_at: Instant::now(),
    chat: ChatService::new(Arc::new(GeminiClient::new(&config.gemini))),
    plant_id: Arc::new(PlantIdClient::new(&config.plant_id)),
    image_limits: config.image.clone(),
    max_tokens: config.gemini.max_tokens,
    max_file_size: config.max_file_size,
    chat_rate_limit: config.chat_rate_limit,
  };

  let addr = format!("{}:{}", config.host, config.port);
  let listener = tokio::net::TcpListener::bind(&addr)
    .await
    .with_context(|| format!("failed to bind {addr}"))?;
  tracing::info!(
    "Arco gateway listening on {} (model: {})",
    listener.local_addr()?,
    config.gemini.model
  );

  run_router(listener, state).await
}
