use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
  User,
  Assistant,
}

impl Role {
  pub fn label(self) -> &'static str {
    match self {
      Role::User => "User",
      Role::Assistant => "Assistant",
    }
  }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Message {
  pub role: Role,
  pub content: String,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ChatRequest {
  pub message: String,
  #[serde(default)]
  pub context: Vec<Message>,
  pub language: Option<String>,
}

#[derive(Clone, Debug)]
pub struct ChatOptions {
  pub language: String,
  pub context: Vec<Message>,
  pub temperature: f32,
  pub max_tokens: u32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ChatResult {
  pub text: String,
  pub tokens_used: u64,
  pub suggestions: Vec<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ChatMetadata {
  pub timestamp: String,
  pub language: String,
  pub tokens_used: u64,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ChatResponse {
  pub message: String,
  pub metadata: ChatMetadata,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub suggestions: Option<Vec<String>>,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct Location {
  pub latitude: f64,
  pub longitude: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct DiagnosisOptions {
  pub latitude: Option<f64>,
  pub longitude: Option<f64>,
  pub similar_images: bool,
  pub plant_details: Vec<String>,
  pub plant_language: String,
}

impl DiagnosisOptions {
  /// Location is only attached when both coordinates are known.
  pub fn location(&self) -> Option<Location> {
    match (self.latitude, self.longitude) {
      (Some(latitude), Some(longitude)) => Some(Location { latitude, longitude }),
      _ => None,
    }
  }
}

impl Default for DiagnosisOptions {
  fn default() -> Self {
    Self {
      latitude: None,
      longitude: None,
      similar_images: false,
      plant_details: vec!["common_names".to_string(), "url".to_string()],
      plant_language: "en".to_string(),
    }
  }
}

/// Vendor identifiers arrive as strings or integers depending on API version.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(untagged)]
pub enum VendorId {
  Text(String),
  Number(i64),
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct SimilarImage {
  pub id: Option<VendorId>,
  pub url: Option<String>,
  pub similarity: Option<f64>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct PlantDetails {
  pub scientific_name: Option<String>,
  pub common_names: Vec<String>,
  pub url: Option<String>,
  pub description: Option<String>,
  pub synonyms: Vec<String>,
  pub image: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct PlantSuggestion {
  pub id: Option<VendorId>,
  pub plant_name: Option<String>,
  pub plant_details: PlantDetails,
  pub probability: f64,
  pub confirmed: bool,
  pub similar_images: Vec<SimilarImage>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct DiseaseDetails {
  pub description: Option<serde_json::Value>,
  pub treatment: Option<serde_json::Value>,
  pub cause: Option<serde_json::Value>,
  pub url: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct DiseaseSuggestion {
  pub id: Option<VendorId>,
  pub name: Option<String>,
  pub probability: f64,
  pub disease_details: DiseaseDetails,
  pub similar_images: Vec<SimilarImage>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct HealthAssessment {
  pub is_healthy: bool,
  pub is_healthy_probability: f64,
  pub diseases: Vec<DiseaseSuggestion>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct DiagnosisResult {
  pub is_plant: bool,
  pub is_plant_probability: f64,
  pub suggestions: Vec<PlantSuggestion>,
  pub health_assessment: Option<HealthAssessment>,
  pub version: Option<String>,
  pub custom_id: Option<VendorId>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct DiagnosisMetadata {
  pub date: String,
  pub version: Option<String>,
  pub custom_id: Option<VendorId>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub location: Option<Location>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct DiagnosisResponse {
  pub is_plant: bool,
  pub is_plant_probability: f64,
  pub suggestions: Vec<PlantSuggestion>,
  pub health_assessment: Option<HealthAssessment>,
  pub disease_suggestions: Vec<DiseaseSuggestion>,
  pub metadata: DiagnosisMetadata,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct LanguageInfo {
  pub code: String,
  pub name: String,
  pub native: String,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct StartersResponse {
  pub language: String,
  pub starters: Vec<String>,
}

/// Success envelope. Failures are rendered by `ClassifiedError`.
#[derive(Serialize, Deserialize, Debug)]
pub struct ApiResponse<T> {
  pub success: bool,
  pub data: T,
}

impl<T> ApiResponse<T> {
  pub fn ok(data: T) -> Self {
    Self { success: true, data }
  }
}
