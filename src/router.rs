use std::net::SocketAddr;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Instant;

use axum::extract::multipart::MultipartRejection;
use axum::extract::rejection::JsonRejection;
use axum::extract::{DefaultBodyLimit, Multipart, Query, State};
use axum::routing::{get, post};
use axum::{middleware, Json, Router};
use serde::Deserialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::catalog::{self, DEFAULT_LANGUAGE};
use crate::chat::ChatService;
use crate::error::{ClassifiedError, ErrorKind};
use crate::imaging::{self, ImageLimits};
use crate::models::{
  ApiResponse, ChatMetadata, ChatOptions, ChatRequest, ChatResponse, DiagnosisMetadata,
  DiagnosisResponse, LanguageInfo, StartersResponse,
};
use crate::plant_id::PlantIdentifier;
use crate::rate_limit::{self, ChatRateLimit};
use crate::upload::read_diagnosis_form;

const MAX_MESSAGE_CHARS: usize = 2000;
const MAX_CONTEXT_MESSAGES: usize = 10;
const CHAT_TEMPERATURE: f32 = 0.7;

pub struct RouterState {
  pub started_at: Instant,
  pub chat: ChatService,
  pub plant_id: Arc<dyn PlantIdentifier>,
  pub image_limits: ImageLimits,
  pub max_tokens: u32,
  pub max_file_size: usize,
  pub chat_rate_limit: NonZeroU32,
}

type ApiResult<T> = Result<Json<ApiResponse<T>>, ClassifiedError>;

pub fn build_router(state: RouterState) -> Router {
  // Multipart framing overhead on top of the file itself.
  let body_limit = state.max_file_size + 1024 * 1024;
  let chat_limit = Arc::new(ChatRateLimit::per_minute(state.chat_rate_limit));

  Router::new()
    .route("/health", get(health))
    .route(
      "/api/assistant/chat",
      post(chat).layer(middleware::from_fn_with_state(chat_limit, rate_limit::limit_chat)),
    )
    .route("/api/assistant/starters", get(starters))
    .route("/api/assistant/languages", get(languages))
    .route(
      "/api/diagnosis",
      post(diagnose).layer(DefaultBodyLimit::max(body_limit)),
    )
    .route("/api/diagnosis/modifiers", get(modifiers))
    .fallback(not_found)
    .layer(TraceLayer::new_for_http())
    .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any))
    .with_state(Arc::new(state))
}

pub async fn run_router(listener: tokio::net::TcpListener, state: RouterState) -> anyhow::Result<()> {
  let app = build_router(state);
  axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
    .with_graceful_shutdown(shutdown_signal())
    .await?;
  Ok(())
}

async fn shutdown_signal() {
  if let Err(err) = tokio::signal::ctrl_c().await {
    tracing::error!("failed to listen for shutdown signal: {err}");
    std::future::pending::<()>().await;
  }
  tracing::info!("shutting down");
}

async fn health(State(state): State<Arc<RouterState>>) -> Json<serde_json::Value> {
  let uptime = state.started_at.elapsed().as_millis();
  Json(serde_json::json!({
    "status": "ok",
    "version": env!("CARGO_PKG_VERSION"),
    "uptime_ms": uptime
  }))
}

async fn not_found() -> ClassifiedError {
  ClassifiedError::not_found("Route not found")
}

fn validate_chat(req: &ChatRequest) -> Result<String, ClassifiedError> {
  if req.message.trim().is_empty() {
    return Err(ClassifiedError::validation("Message is required"));
  }
  if req.message.chars().count() > MAX_MESSAGE_CHARS {
    return Err(ClassifiedError::validation(
      "Message must be between 1 and 2000 characters",
    ));
  }
  if req.context.len() > MAX_CONTEXT_MESSAGES {
    return Err(ClassifiedError::validation(
      "Context cannot contain more than 10 messages",
    ));
  }

  let language = req.language.as_deref().unwrap_or(DEFAULT_LANGUAGE);
  if !catalog::is_supported_language(language) {
    return Err(ClassifiedError::validation("Unsupported language"));
  }
  Ok(language.to_string())
}

async fn chat(
  State(state): State<Arc<RouterState>>,
  payload: Result<Json<ChatRequest>, JsonRejection>,
) -> ApiResult<ChatResponse> {
  let Json(req) = payload.map_err(|rejection| ClassifiedError::validation(rejection.body_text()))?;
  let language = validate_chat(&req)?;
  tracing::info!("Processing chat request. Language: {language}");

  let options = ChatOptions {
    language,
    context: req.context,
    temperature: CHAT_TEMPERATURE,
    max_tokens: state.max_tokens,
  };
  let result = state.chat.respond(&req.message, &options).await?;

  let suggestions = if result.suggestions.is_empty() {
    None
  } else {
    Some(result.suggestions)
  };
  tracing::info!("Chat response generated successfully");

  Ok(Json(ApiResponse::ok(ChatResponse {
    message: result.text,
    metadata: ChatMetadata {
      timestamp: chrono::Utc::now().to_rfc3339(),
      language: options.language,
      tokens_used: result.tokens_used,
    },
    suggestions,
  })))
}

#[derive(Deserialize)]
struct StartersQuery {
  language: Option<String>,
}

async fn starters(Query(query): Query<StartersQuery>) -> Json<ApiResponse<StartersResponse>> {
  let language = query.language.unwrap_or_else(|| DEFAULT_LANGUAGE.to_string());
  let starters = catalog::conversation_starters(&language);
  Json(ApiResponse::ok(StartersResponse { language, starters }))
}

async fn languages() -> Json<ApiResponse<Vec<LanguageInfo>>> {
  Json(ApiResponse::ok(catalog::supported_languages()))
}

async fn diagnose(
  State(state): State<Arc<RouterState>>,
  multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<DiagnosisResponse> {
  let multipart = multipart.map_err(|rejection| ClassifiedError::validation(rejection.body_text()))?;
  let upload = read_diagnosis_form(multipart, state.max_file_size).await?;
  tracing::info!(
    "Processing plant diagnosis request for file: {}",
    upload.file_name
  );

  let raw = upload.image;
  let limits = state.image_limits.clone();
  let image = tokio::task::spawn_blocking(move || imaging::normalize(&raw, &limits))
    .await
    .map_err(|err| {
      ClassifiedError::new(ErrorKind::ImageProcessing, 500, "Failed to process image")
        .with_detail(err.to_string())
    })??;
  tracing::debug!(
    "Normalized upload to {}x{} at quality {} ({} bytes)",
    image.width,
    image.height,
    image.quality,
    image.bytes.len()
  );

  let options = upload.options;
  let diagnosis = state.plant_id.identify(&image, &options).await?;
  tracing::info!(
    "Plant diagnosis completed successfully. Is plant: {}",
    diagnosis.is_plant
  );

  let disease_suggestions = diagnosis
    .health_assessment
    .as_ref()
    .map(|h| h.diseases.clone())
    .unwrap_or_default();

  Ok(Json(ApiResponse::ok(DiagnosisResponse {
    is_plant: diagnosis.is_plant,
    is_plant_probability: diagnosis.is_plant_probability,
    suggestions: diagnosis.suggestions,
    health_assessment: diagnosis.health_assessment,
    disease_suggestions,
    metadata: DiagnosisMetadata {
      date: chrono::Utc::now().to_rfc3339(),
      version: diagnosis.version,
      custom_id: diagnosis.custom_id,
      location: options.location(),
    },
  })))
}

async fn modifiers(State(state): State<Arc<RouterState>>) -> ApiResult<serde_json::Value> {
  let modifiers = state.plant_id.modifiers().await?;
  Ok(Json(ApiResponse::ok(modifiers)))
}
