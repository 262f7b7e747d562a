use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde::{Deserialize, Serialize};

use crate::config::PlantIdConfig;
use crate::error::{classify, ClassifiedError, VendorFailure};
use crate::imaging::NormalizedImage;
use crate::models::{
  DiagnosisOptions, DiagnosisResult, DiseaseDetails, DiseaseSuggestion, HealthAssessment,
  PlantDetails, PlantSuggestion, SimilarImage, VendorId,
};

pub const VENDOR: &str = "Plant.id";
pub const MAX_PLANT_SUGGESTIONS: usize = 5;
pub const MAX_DISEASES: usize = 3;

/// Plant identification seam used by the diagnosis route.
#[async_trait]
pub trait PlantIdentifier: Send + Sync {
  async fn identify(
    &self,
    image: &NormalizedImage,
    options: &DiagnosisOptions,
  ) -> Result<DiagnosisResult, ClassifiedError>;

  /// Vendor-defined list of request modifiers, passed through untouched.
  async fn modifiers(&self) -> Result<serde_json::Value, ClassifiedError>;
}

#[derive(Serialize, Debug)]
pub struct IdentificationRequest {
  pub images: Vec<String>,
  pub plant_details: Vec<String>,
  pub plant_language: String,
  pub similar_images: bool,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub latitude: Option<f64>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub longitude: Option<f64>,
  pub health: &'static str,
}

pub fn build_request(image: &NormalizedImage, options: &DiagnosisOptions) -> IdentificationRequest {
  let encoded = base64::engine::general_purpose::STANDARD.encode(&image.bytes);
  let location = options.location();
  IdentificationRequest {
    images: vec![format!("data:{};base64,{}", image.mime(), encoded)],
    plant_details: options.plant_details.clone(),
    plant_language: options.plant_language.clone(),
    similar_images: options.similar_images,
    latitude: location.map(|l| l.latitude),
    longitude: location.map(|l| l.longitude),
    health: "all",
  }
}

// Vendor payload, decoded leniently: optional keys and nulls become None.

#[derive(Deserialize, Debug)]
struct VendorEnvelope {
  result: Option<VendorResult>,
}

#[derive(Deserialize, Debug)]
struct VendorBinary {
  binary: bool,
  probability: f64,
}

#[derive(Deserialize, Debug)]
struct VendorResult {
  is_plant: VendorBinary,
  classification: Option<VendorClassification>,
  health_assessment: Option<VendorHealth>,
  custom_id: Option<VendorId>,
}

#[derive(Deserialize, Debug)]
struct VendorClassification {
  suggestions: Option<Vec<VendorSuggestion>>,
  version: Option<String>,
}

#[derive(Deserialize, Debug)]
struct VendorValue {
  value: Option<String>,
}

#[derive(Deserialize, Debug)]
struct VendorPlantDetails {
  scientific_name: Option<String>,
  common_names: Option<Vec<String>>,
  url: Option<String>,
  description: Option<VendorValue>,
  synonyms: Option<Vec<String>>,
  image: Option<VendorValue>,
}

#[derive(Deserialize, Debug)]
struct VendorSimilarImage {
  id: Option<VendorId>,
  url: Option<String>,
  similarity: Option<f64>,
}

#[derive(Deserialize, Debug)]
struct VendorSuggestion {
  id: Option<VendorId>,
  name: Option<String>,
  details: Option<VendorPlantDetails>,
  probability: Option<f64>,
  confirmed: Option<bool>,
  similar_images: Option<Vec<VendorSimilarImage>>,
}

#[derive(Deserialize, Debug)]
struct VendorHealth {
  is_healthy: VendorBinary,
  diseases: Option<Vec<VendorDisease>>,
}

#[derive(Deserialize, Debug)]
struct VendorDiseaseDetails {
  description: Option<serde_json::Value>,
  treatment: Option<serde_json::Value>,
  cause: Option<serde_json::Value>,
  url: Option<String>,
}

#[derive(Deserialize, Debug)]
struct VendorDisease {
  id: Option<VendorId>,
  name: Option<String>,
  probability: Option<f64>,
  disease_details: Option<VendorDiseaseDetails>,
  similar_images: Option<Vec<VendorSimilarImage>>,
}

fn similar_images(images: Option<Vec<VendorSimilarImage>>) -> Vec<SimilarImage> {
  images
    .unwrap_or_default()
    .into_iter()
    .map(|img| SimilarImage {
      id: img.id,
      url: img.url,
      similarity: img.similarity,
    })
    .collect()
}

fn plant_suggestion(suggestion: VendorSuggestion) -> PlantSuggestion {
  let details = suggestion.details;
  let plant_details = match details {
    Some(d) => PlantDetails {
      scientific_name: d.scientific_name.or_else(|| suggestion.name.clone()),
      common_names: d.common_names.unwrap_or_default(),
      url: d.url,
      description: d.description.and_then(|v| v.value),
      synonyms: d.synonyms.unwrap_or_default(),
      image: d.image.and_then(|v| v.value),
    },
    None => PlantDetails {
      scientific_name: suggestion.name.clone(),
      common_names: Vec::new(),
      url: None,
      description: None,
      synonyms: Vec::new(),
      image: None,
    },
  };

  PlantSuggestion {
    id: suggestion.id,
    plant_name: suggestion.name,
    plant_details,
    probability: suggestion.probability.unwrap_or(0.0),
    confirmed: suggestion.confirmed.unwrap_or(false),
    similar_images: similar_images(suggestion.similar_images),
  }
}

fn disease_suggestion(disease: VendorDisease) -> DiseaseSuggestion {
  let details = disease.disease_details;
  DiseaseSuggestion {
    id: disease.id,
    name: disease.name,
    probability: disease.probability.unwrap_or(0.0),
    disease_details: match details {
      Some(d) => DiseaseDetails {
        description: d.description,
        treatment: d.treatment,
        cause: d.cause,
        url: d.url,
      },
      None => DiseaseDetails {
        description: None,
        treatment: None,
        cause: None,
        url: None,
      },
    },
    similar_images: similar_images(disease.similar_images),
  }
}

/// Validates and reshapes a successful identification body into the stable
/// diagnosis shape, applying the suggestion and disease caps.
pub fn normalize_response(body: serde_json::Value) -> Result<DiagnosisResult, ClassifiedError> {
  let envelope: VendorEnvelope = serde_json::from_value(body)
    .map_err(|err| ClassifiedError::upstream_contract(VENDOR, err.to_string()))?;
  let result = envelope
    .result
    .ok_or_else(|| ClassifiedError::upstream_contract(VENDOR, "response has no result"))?;

  let (suggestions, version) = match result.classification {
    Some(c) => (c.suggestions.unwrap_or_default(), c.version),
    None => (Vec::new(), None),
  };

  let health_assessment = result.health_assessment.map(|health| HealthAssessment {
    is_healthy: health.is_healthy.binary,
    is_healthy_probability: health.is_healthy.probability,
    diseases: health
      .diseases
      .unwrap_or_default()
      .into_iter()
      .take(MAX_DISEASES)
      .map(disease_suggestion)
      .collect(),
  });

  Ok(DiagnosisResult {
    is_plant: result.is_plant.binary,
    is_plant_probability: result.is_plant.probability,
    suggestions: suggestions
      .into_iter()
      .take(MAX_PLANT_SUGGESTIONS)
      .map(plant_suggestion)
      .collect(),
    health_assessment,
    version,
    custom_id: result.custom_id,
  })
}

pub struct PlantIdClient {
  client: reqwest::Client,
  api_key: String,
  api_url: String,
  modifiers_url: String,
  timeout: Duration,
  modifiers_timeout: Duration,
}

impl PlantIdClient {
  pub fn new(config: &PlantIdConfig) -> Self {
    Self {
      client: reqwest::Client::new(),
      api_key: config.api_key.clone(),
      api_url: config.api_url.clone(),
      modifiers_url: config.modifiers_url(),
      timeout: config.timeout,
      modifiers_timeout: config.modifiers_timeout,
    }
  }

  fn headers(&self) -> Result<HeaderMap, ClassifiedError> {
    let mut headers = HeaderMap::new();
    headers.insert(
      "api-key",
      HeaderValue::from_str(&self.api_key)
        .map_err(|err| ClassifiedError::internal("Invalid Plant.id API key").with_detail(err.to_string()))?,
    );
    Ok(headers)
  }

  async fn send(&self, request: reqwest::RequestBuilder) -> Result<serde_json::Value, ClassifiedError> {
    let fallback = format!("{VENDOR} request failed");
    let resp = request
      .send()
      .await
      .map_err(|err| classify(&VendorFailure::transport(VENDOR, &err), &fallback))?;

    if !resp.status().is_success() {
      let status = resp.status().as_u16();
      let text = resp.text().await.unwrap_or_default();
      let message = serde_json::from_str::<serde_json::Value>(&text)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(|s| s.to_string()))
        .unwrap_or_else(|| "Plant.id API error".to_string());
      return Err(classify(&VendorFailure::http(VENDOR, status, message), &fallback));
    }

    // The request timeout also covers the body, so a stalled read is a transport failure.
    let bytes = resp
      .bytes()
      .await
      .map_err(|err| classify(&VendorFailure::transport(VENDOR, &err), &fallback))?;
    serde_json::from_slice(&bytes)
      .map_err(|err| ClassifiedError::upstream_contract(VENDOR, err.to_string()))
  }
}

#[async_trait]
impl PlantIdentifier for PlantIdClient {
  async fn identify(
    &self,
    image: &NormalizedImage,
    options: &DiagnosisOptions,
  ) -> Result<DiagnosisResult, ClassifiedError> {
    let payload = build_request(image, options);
    let mut headers = self.headers()?;
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

    let request = self
      .client
      .post(&self.api_url)
      .headers(headers)
      .timeout(self.timeout)
      .json(&payload);
    let body = self.send(request).await?;
    normalize_response(body)
  }

  async fn modifiers(&self) -> Result<serde_json::Value, ClassifiedError> {
    let request = self
      .client
      .get(&self.modifiers_url)
      .headers(self.headers()?)
      .timeout(self.modifiers_timeout);
    self.send(request).await
  }
}

#[cfg(test)]
mod tests {
  use std::sync::{Arc, Mutex};

  use axum::extract::State;
  use axum::http::{HeaderMap as AxumHeaders, StatusCode};
  use axum::routing::{get, post};
  use axum::{Json, Router};

  use super::*;
  use crate::error::ErrorKind;

  fn image() -> NormalizedImage {
    NormalizedImage {
      bytes: vec![0xFF, 0xD8, 0xFF, 0xD9],
      width: 1,
      height: 1,
      quality: 85,
    }
  }

  fn suggestion(i: usize) -> serde_json::Value {
    serde_json::json!({
      "id": format!("s{i}"),
      "name": format!("Plantus {i}"),
      "probability": 0.9 - i as f64 * 0.1,
      "details": { "common_names": [format!("plant {i}")] }
    })
  }

  fn full_payload() -> serde_json::Value {
    serde_json::json!({
      "result": {
        "is_plant": { "binary": true, "probability": 0.98 },
        "custom_id": 42,
        "classification": {
          "version": "3.1.0",
          "suggestions": [{
            "id": "abc",
            "name": "Solanum lycopersicum",
            "probability": 0.91,
            "confirmed": true,
            "details": {
              "scientific_name": "Solanum lycopersicum L.",
              "common_names": ["tomato", "love apple"],
              "url": "https://en.wikipedia.org/wiki/Tomato",
              "description": { "value": "An edible berry." },
              "synonyms": ["Lycopersicon esculentum"],
              "image": { "value": "https://example.org/tomato.jpg" }
            },
            "similar_images": [
              { "id": "img1", "url": "https://example.org/1.jpg", "similarity": 0.8 },
              { "id": "img2", "url": "https://example.org/2.jpg", "similarity": 0.7 }
            ]
          }]
        },
        "health_assessment": {
          "is_healthy": { "binary": false, "probability": 0.12 },
          "diseases": [{
            "id": 7,
            "name": "early blight",
            "probability": 0.66,
            "disease_details": {
              "description": "Fungal leaf spots.",
              "treatment": { "biological": ["remove leaves"], "chemical": ["copper"] },
              "cause": "Alternaria solani",
              "url": "https://example.org/blight"
            },
            "similar_images": [{ "id": "d1", "url": "https://example.org/d1.jpg", "similarity": 0.5 }]
          }]
        }
      }
    })
  }

  #[test]
  fn request_includes_location_only_when_both_coordinates_present() {
    let mut options = DiagnosisOptions {
      latitude: Some(48.85),
      ..DiagnosisOptions::default()
    };
    let value = serde_json::to_value(build_request(&image(), &options)).unwrap();
    assert!(value.get("latitude").is_none());
    assert!(value.get("longitude").is_none());

    options.longitude = Some(2.35);
    let value = serde_json::to_value(build_request(&image(), &options)).unwrap();
    assert_eq!(value["latitude"], 48.85);
    assert_eq!(value["longitude"], 2.35);
  }

  #[test]
  fn request_embeds_image_and_asks_for_full_health() {
    let options = DiagnosisOptions {
      similar_images: true,
      plant_language: "fr".to_string(),
      ..DiagnosisOptions::default()
    };
    let value = serde_json::to_value(build_request(&image(), &options)).unwrap();
    assert_eq!(value["images"][0], "data:image/jpeg;base64,/9j/2Q==");
    assert_eq!(value["health"], "all");
    assert_eq!(value["similar_images"], true);
    assert_eq!(value["plant_language"], "fr");
    assert_eq!(value["plant_details"], serde_json::json!(["common_names", "url"]));
  }

  #[test]
  fn suggestions_are_capped_at_five_in_vendor_order() {
    let suggestions: Vec<_> = (0..8).map(suggestion).collect();
    let body = serde_json::json!({
      "result": {
        "is_plant": { "binary": true, "probability": 0.9 },
        "classification": { "suggestions": suggestions }
      }
    });

    let result = normalize_response(body).unwrap();
    let ids: Vec<_> = result.suggestions.iter().map(|s| s.id.clone()).collect();
    let expected: Vec<_> = (0..5).map(|i| Some(VendorId::Text(format!("s{i}")))).collect();
    assert_eq!(ids, expected);
  }

  #[test]
  fn missing_health_assessment_is_none() {
    let body = serde_json::json!({
      "result": { "is_plant": { "binary": false, "probability": 0.2 } }
    });
    let result = normalize_response(body).unwrap();
    assert!(result.health_assessment.is_none());
    assert!(result.suggestions.is_empty());
    assert_eq!(result.version, None);

    let value = serde_json::to_value(&result).unwrap();
    assert!(value.get("health_assessment").unwrap().is_null());
    assert!(value.get("custom_id").unwrap().is_null());
  }

  #[test]
  fn diseases_are_capped_at_three() {
    let diseases: Vec<_> = (0..6)
      .map(|i| serde_json::json!({ "id": i, "name": format!("d{i}"), "probability": 0.1 }))
      .collect();
    let body = serde_json::json!({
      "result": {
        "is_plant": { "binary": true, "probability": 0.9 },
        "health_assessment": { "is_healthy": { "binary": false, "probability": 0.3 }, "diseases": diseases }
      }
    });
    let health = normalize_response(body).unwrap().health_assessment.unwrap();
    assert_eq!(health.diseases.len(), 3);
    assert_eq!(health.diseases[2].name.as_deref(), Some("d2"));
    assert_eq!(health.diseases[0].disease_details.url, None);
  }

  #[test]
  fn full_payload_keeps_every_field() {
    let result = normalize_response(full_payload()).unwrap();
    assert!(result.is_plant);
    assert_eq!(result.is_plant_probability, 0.98);
    assert_eq!(result.version.as_deref(), Some("3.1.0"));
    assert_eq!(result.custom_id, Some(VendorId::Number(42)));

    let s = &result.suggestions[0];
    assert_eq!(s.id, Some(VendorId::Text("abc".to_string())));
    assert_eq!(s.plant_name.as_deref(), Some("Solanum lycopersicum"));
    assert_eq!(s.probability, 0.91);
    assert!(s.confirmed);
    assert_eq!(s.plant_details.scientific_name.as_deref(), Some("Solanum lycopersicum L."));
    assert_eq!(s.plant_details.common_names, vec!["tomato", "love apple"]);
    assert_eq!(s.plant_details.url.as_deref(), Some("https://en.wikipedia.org/wiki/Tomato"));
    assert_eq!(s.plant_details.description.as_deref(), Some("An edible berry."));
    assert_eq!(s.plant_details.synonyms, vec!["Lycopersicon esculentum"]);
    assert_eq!(s.plant_details.image.as_deref(), Some("https://example.org/tomato.jpg"));
    assert_eq!(s.similar_images.len(), 2);
    assert_eq!(s.similar_images[1].similarity, Some(0.7));

    let health = result.health_assessment.unwrap();
    assert!(!health.is_healthy);
    assert_eq!(health.is_healthy_probability, 0.12);
    let d = &health.diseases[0];
    assert_eq!(d.id, Some(VendorId::Number(7)));
    assert_eq!(d.probability, 0.66);
    assert_eq!(d.disease_details.cause, Some(serde_json::json!("Alternaria solani")));
    assert_eq!(d.disease_details.treatment.as_ref().unwrap()["chemical"][0], "copper");
    assert_eq!(d.similar_images[0].url.as_deref(), Some("https://example.org/d1.jpg"));
  }

  #[test]
  fn scientific_name_falls_back_to_name() {
    let body = serde_json::json!({
      "result": {
        "is_plant": { "binary": true, "probability": 0.9 },
        "classification": { "suggestions": [{ "id": "x", "name": "Mentha", "probability": 0.5, "details": null }] }
      }
    });
    let result = normalize_response(body).unwrap();
    let details = &result.suggestions[0].plant_details;
    assert_eq!(details.scientific_name.as_deref(), Some("Mentha"));
    assert!(details.common_names.is_empty());
    assert!(!result.suggestions[0].confirmed);
  }

  #[test]
  fn missing_result_is_a_contract_error() {
    let err = normalize_response(serde_json::json!({ "status": "COMPLETED" })).unwrap_err();
    assert_eq!(err.kind, ErrorKind::UpstreamContract);
    assert_eq!(err.status, 500);

    let err = normalize_response(serde_json::json!({ "result": {} })).unwrap_err();
    assert_eq!(err.kind, ErrorKind::UpstreamContract);
  }

  type Seen = Arc<Mutex<Vec<(Option<String>, serde_json::Value)>>>;

  async fn spawn_vendor(status: StatusCode, reply: serde_json::Value, delay: Duration) -> (String, Seen) {
    let seen: Seen = Arc::new(Mutex::new(Vec::new()));
    let identify = {
      let reply = reply.clone();
      move |State(seen): State<Seen>, headers: AxumHeaders, Json(body): Json<serde_json::Value>| {
        let reply = reply.clone();
        async move {
          let key = headers
            .get("api-key")
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());
          seen.lock().unwrap().push((key, body));
          tokio::time::sleep(delay).await;
          (status, Json(reply))
        }
      }
    };
    let modifiers = move || {
      let reply = reply.clone();
      async move { (status, Json(reply)) }
    };

    let app = Router::new()
      .route("/v3/identification", post(identify))
      .route("/v3/identification/modifiers", get(modifiers))
      .with_state(seen.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
      axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}/v3/identification"), seen)
  }

  fn client(api_url: String, timeout: Duration) -> PlantIdClient {
    PlantIdClient::new(&PlantIdConfig {
      api_key: "plant-key".to_string(),
      api_url,
      timeout,
      modifiers_timeout: timeout,
    })
  }

  #[tokio::test]
  async fn identify_round_trips_through_vendor() {
    let (url, seen) = spawn_vendor(StatusCode::CREATED, full_payload(), Duration::ZERO).await;
    let options = DiagnosisOptions {
      latitude: Some(10.0),
      longitude: Some(20.0),
      ..DiagnosisOptions::default()
    };

    let result = client(url, Duration::from_secs(5))
      .identify(&image(), &options)
      .await
      .unwrap();
    assert_eq!(result.suggestions.len(), 1);

    let seen = seen.lock().unwrap();
    let (key, body) = &seen[0];
    assert_eq!(key.as_deref(), Some("plant-key"));
    assert_eq!(body["latitude"], 10.0);
    assert_eq!(body["health"], "all");
  }

  #[tokio::test]
  async fn vendor_rate_limit_is_classified() {
    let reply = serde_json::json!({ "error": { "message": "slow down" } });
    let (url, _) = spawn_vendor(StatusCode::TOO_MANY_REQUESTS, reply, Duration::ZERO).await;

    let err = client(url, Duration::from_secs(5))
      .identify(&image(), &DiagnosisOptions::default())
      .await
      .unwrap_err();
    assert_eq!(err.kind, ErrorKind::RateLimit);
    assert_eq!(err.status, 429);
  }

  #[tokio::test]
  async fn vendor_bad_request_carries_vendor_message() {
    let reply = serde_json::json!({ "error": { "message": "image is too small" } });
    let (url, _) = spawn_vendor(StatusCode::BAD_REQUEST, reply, Duration::ZERO).await;

    let err = client(url, Duration::from_secs(5))
      .identify(&image(), &DiagnosisOptions::default())
      .await
      .unwrap_err();
    assert_eq!(err.kind, ErrorKind::BadRequest);
    assert_eq!(err.message, "Invalid request: image is too small");
  }

  #[tokio::test]
  async fn slow_vendor_times_out() {
    let (url, _) = spawn_vendor(StatusCode::OK, full_payload(), Duration::from_secs(2)).await;

    let err = client(url, Duration::from_millis(100))
      .identify(&image(), &DiagnosisOptions::default())
      .await
      .unwrap_err();
    assert_eq!(err.kind, ErrorKind::GatewayTimeout);
    assert_eq!(err.status, 504);
  }

  /// Sends headers and the start of a body, then goes quiet.
  async fn spawn_stalling_vendor() -> String {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
      loop {
        let Ok((mut socket, _)) = listener.accept().await else {
          return;
        };
        tokio::spawn(async move {
          let mut buf = vec![0u8; 64 * 1024];
          let _ = socket.read(&mut buf).await;
          let head = "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: 200\r\n\r\n{\"result\":";
          let _ = socket.write_all(head.as_bytes()).await;
          let _ = socket.flush().await;
          tokio::time::sleep(Duration::from_secs(5)).await;
        });
      }
    });
    format!("http://{addr}/v3/identification")
  }

  #[tokio::test]
  async fn stalled_body_times_out() {
    let url = spawn_stalling_vendor().await;
    let plant_id = client(url, Duration::from_millis(300));

    let err = plant_id
      .identify(&image(), &DiagnosisOptions::default())
      .await
      .unwrap_err();
    assert_eq!(err.kind, ErrorKind::GatewayTimeout);
    assert_eq!(err.status, 504);

    let err = plant_id.modifiers().await.unwrap_err();
    assert_eq!(err.status, 504);
  }

  #[tokio::test]
  async fn malformed_success_body_is_contract_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = Router::new().route(
      "/v3/identification/modifiers",
      get(|| async { (StatusCode::OK, "not json") }),
    );
    tokio::spawn(async move {
      axum::serve(listener, app).await.unwrap();
    });

    let err = client(format!("http://{addr}/v3/identification"), Duration::from_secs(5))
      .modifiers()
      .await
      .unwrap_err();
    assert_eq!(err.kind, ErrorKind::UpstreamContract);
    assert_eq!(err.status, 500);
  }

  #[tokio::test]
  async fn success_without_result_is_contract_error() {
    let (url, _) = spawn_vendor(StatusCode::OK, serde_json::json!({ "ok": true }), Duration::ZERO).await;

    let err = client(url, Duration::from_secs(5))
      .identify(&image(), &DiagnosisOptions::default())
      .await
      .unwrap_err();
    assert_eq!(err.kind, ErrorKind::UpstreamContract);
  }

  #[tokio::test]
  async fn modifiers_pass_through_unmodified() {
    let payload = serde_json::json!({ "modifiers": ["crops_fast", "similar_images"], "extra": { "n": 1 } });
    let (url, _) = spawn_vendor(StatusCode::OK, payload.clone(), Duration::ZERO).await;

    let value = client(url, Duration::from_secs(5)).modifiers().await.unwrap();
    assert_eq!(value, payload);
  }

  #[tokio::test]
  async fn modifiers_failure_is_classified() {
    let (url, _) = spawn_vendor(StatusCode::UNAUTHORIZED, serde_json::json!({}), Duration::ZERO).await;

    let err = client(url, Duration::from_secs(5)).modifiers().await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Auth);
    assert_eq!(err.status, 401);
  }
}
