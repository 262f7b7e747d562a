use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde::Serialize;

use crate::config::GeminiConfig;
use crate::error::VendorFailure;

pub const VENDOR: &str = "Gemini";

#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
  pub temperature: f32,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub top_p: Option<f32>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub top_k: Option<u32>,
  pub max_output_tokens: u32,
}

/// Text generation seam. Returns the raw generated text, which may be empty.
#[async_trait]
pub trait LanguageModel: Send + Sync {
  async fn generate(&self, prompt: &str, config: &GenerationConfig) -> Result<String, VendorFailure>;
}

#[derive(Serialize)]
struct Part<'a> {
  text: &'a str,
}

#[derive(Serialize)]
struct Content<'a> {
  role: &'static str,
  parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
  contents: Vec<Content<'a>>,
  generation_config: &'a GenerationConfig,
}

pub struct GeminiClient {
  client: reqwest::Client,
  api_key: String,
  model: String,
  base_url: String,
  timeout: Duration,
}

impl GeminiClient {
  pub fn new(config: &GeminiConfig) -> Self {
    Self {
      client: reqwest::Client::new(),
      api_key: config.api_key.clone(),
      model: config.model.clone(),
      base_url: config.base_url.trim_end_matches('/').to_string(),
      timeout: config.timeout,
    }
  }

  fn endpoint(&self) -> String {
    format!("{}/models/{}:generateContent", self.base_url, self.model)
  }
}

#[async_trait]
impl LanguageModel for GeminiClient {
  async fn generate(&self, prompt: &str, config: &GenerationConfig) -> Result<String, VendorFailure> {
    let mut headers = HeaderMap::new();
    headers.insert(
      "x-goog-api-key",
      HeaderValue::from_str(&self.api_key)
        .map_err(|_| VendorFailure::message(VENDOR, "API key contains invalid characters"))?,
    );
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

    let payload = GenerateContentRequest {
      contents: vec![Content {
        role: "user",
        parts: vec![Part { text: prompt }],
      }],
      generation_config: config,
    };

    let resp = self
      .client
      .post(self.endpoint())
      .headers(headers)
      .timeout(self.timeout)
      .json(&payload)
      .send()
      .await
      .map_err(|err| VendorFailure::transport(VENDOR, &err))?;

    if !resp.status().is_success() {
      let status = resp.status();
      let text = resp.text().await.unwrap_or_default();
      let message = vendor_error_message(&text).unwrap_or_else(|| status.to_string());
      // Reported without the status attached, like the vendor SDK does, so the
      // message rules of the classifier decide.
      return Err(VendorFailure::message(
        VENDOR,
        format!("[{}] {}", status.as_u16(), message),
      ));
    }

    let body = resp
      .json::<serde_json::Value>()
      .await
      .map_err(|err| VendorFailure::transport(VENDOR, &err))?;
    extract_text(&body)
  }
}

fn vendor_error_message(body: &str) -> Option<String> {
  let value: serde_json::Value = serde_json::from_str(body).ok()?;
  value["error"]["message"].as_str().map(|s| s.to_string())
}

/// Concatenates the text parts of the first candidate. Blocked prompts and
/// candidates stopped by the safety filter are failures.
pub fn extract_text(body: &serde_json::Value) -> Result<String, VendorFailure> {
  if let Some(reason) = body["promptFeedback"]["blockReason"].as_str() {
    return Err(VendorFailure::message(
      VENDOR,
      format!("Text not available. Prompt was blocked due to {reason}"),
    ));
  }

  let candidate = &body["candidates"][0];
  if candidate["finishReason"].as_str() == Some("SAFETY") {
    return Err(VendorFailure::message(
      VENDOR,
      "Text not available. Response was blocked due to SAFETY",
    ));
  }

  let text = candidate["content"]["parts"]
    .as_array()
    .map(|parts| {
      parts
        .iter()
        .filter_map(|part| part["text"].as_str())
        .collect::<String>()
    })
    .unwrap_or_default();
  Ok(text)
}
