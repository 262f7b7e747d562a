use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

const API_KEY_SIGNALS: &[&str] = &["api key", "api_key"];
const QUOTA_SIGNALS: &[&str] = &["quota", "resource has been exhausted"];
const SAFETY_SIGNALS: &[&str] = &["safety"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
  ImageProcessing,
  Validation,
  NotFound,
  Auth,
  RateLimit,
  BadRequest,
  ContentBlocked,
  GatewayTimeout,
  Upstream,
  UpstreamContract,
  Generation,
  Internal,
}

/// Uniform failure surfaced by the gateway. `message` is safe to show to callers,
/// `detail` is for operators only and never leaves the process.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{message}")]
pub struct ClassifiedError {
  pub kind: ErrorKind,
  pub status: u16,
  pub message: String,
  pub detail: Option<String>,
}

impl ClassifiedError {
  pub fn new(kind: ErrorKind, status: u16, message: impl Into<String>) -> Self {
    Self {
      kind,
      status,
      message: message.into(),
      detail: None,
    }
  }

  pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
    self.detail = Some(detail.into());
    self
  }

  pub fn image_processing(detail: impl Into<String>) -> Self {
    Self::new(ErrorKind::ImageProcessing, 400, "Failed to process image").with_detail(detail)
  }

  pub fn validation(message: impl Into<String>) -> Self {
    Self::new(ErrorKind::Validation, 400, message)
  }

  pub fn not_found(message: impl Into<String>) -> Self {
    Self::new(ErrorKind::NotFound, 404, message)
  }

  pub fn upstream_contract(vendor: &str, detail: impl Into<String>) -> Self {
    Self::new(
      ErrorKind::UpstreamContract,
      500,
      format!("Invalid response from {vendor} API"),
    )
    .with_detail(detail)
  }

  pub fn generation(message: impl Into<String>) -> Self {
    Self::new(ErrorKind::Generation, 500, message)
  }

  pub fn internal(message: impl Into<String>) -> Self {
    Self::new(ErrorKind::Internal, 500, message)
  }
}

/// Raw failure signal from a vendor call, before classification.
#[derive(Debug, Clone)]
pub struct VendorFailure {
  pub vendor: &'static str,
  pub status: Option<u16>,
  pub message: String,
  pub timed_out: bool,
}

impl VendorFailure {
  pub fn http(vendor: &'static str, status: u16, message: impl Into<String>) -> Self {
    Self {
      vendor,
      status: Some(status),
      message: message.into(),
      timed_out: false,
    }
  }

  pub fn message(vendor: &'static str, message: impl Into<String>) -> Self {
    Self {
      vendor,
      status: None,
      message: message.into(),
      timed_out: false,
    }
  }

  /// Transport-level failure from reqwest; carries a status only for `error_for_status` errors.
  pub fn transport(vendor: &'static str, err: &reqwest::Error) -> Self {
    Self {
      vendor,
      status: err.status().map(|s| s.as_u16()),
      message: err.to_string(),
      timed_out: err.is_timeout() || err.is_connect(),
    }
  }
}

impl std::fmt::Display for VendorFailure {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self.status {
      Some(status) => write!(f, "{} error ({}): {}", self.vendor, status, self.message),
      None => write!(f, "{} error: {}", self.vendor, self.message),
    }
  }
}

/// Maps a vendor failure into the gateway taxonomy. Rules are checked in order and
/// the first match wins; `fallback` is the caller-facing message for the catch-all.
pub fn classify(failure: &VendorFailure, fallback: &str) -> ClassifiedError {
  let vendor = failure.vendor;
  if let Some(status) = failure.status {
    return match status {
      401 => ClassifiedError::new(ErrorKind::Auth, 401, format!("Invalid {vendor} API key")),
      429 => ClassifiedError::new(
        ErrorKind::RateLimit,
        429,
        format!("{vendor} API rate limit exceeded"),
      ),
      400 => ClassifiedError::new(
        ErrorKind::BadRequest,
        400,
        format!("Invalid request: {}", failure.message),
      ),
      other => ClassifiedError::new(ErrorKind::Upstream, other, failure.message.clone()),
    }
    .with_detail(failure.to_string());
  }

  if failure.timed_out {
    return ClassifiedError::new(
      ErrorKind::GatewayTimeout,
      504,
      format!("{vendor} API request timeout"),
    )
    .with_detail(failure.to_string());
  }

  let lowered = failure.message.to_lowercase();
  let matches = |signals: &[&str]| signals.iter().any(|s| lowered.contains(s));

  let classified = if matches(API_KEY_SIGNALS) {
    ClassifiedError::new(ErrorKind::Auth, 401, format!("Invalid {vendor} API key"))
  } else if matches(QUOTA_SIGNALS) {
    ClassifiedError::new(ErrorKind::RateLimit, 429, "API quota exceeded")
  } else if matches(SAFETY_SIGNALS) {
    ClassifiedError::new(
      ErrorKind::ContentBlocked,
      400,
      "Content was blocked for safety reasons",
    )
  } else {
    ClassifiedError::internal(fallback)
  };
  classified.with_detail(failure.to_string())
}

impl IntoResponse for ClassifiedError {
  fn into_response(self) -> Response {
    let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let detail = self.detail.as_deref().unwrap_or("-");
    if status.is_server_error() {
      tracing::error!(kind = ?self.kind, status = self.status, detail, "{}", self.message);
    } else {
      tracing::warn!(kind = ?self.kind, status = self.status, detail, "{}", self.message);
    }

    let body = Json(serde_json::json!({ "success": false, "error": self.message }));
    (status, body).into_response()
  }
}
