use axum::extract::multipart::{Multipart, MultipartError};

use crate::error::{ClassifiedError, ErrorKind};
use crate::models::DiagnosisOptions;

const ALLOWED_MIMES: &[&str] = &["image/jpeg", "image/jpg", "image/png", "image/webp"];

pub struct DiagnosisUpload {
  pub file_name: String,
  pub image: Vec<u8>,
  pub options: DiagnosisOptions,
}

#[derive(Default)]
struct RawFields {
  latitude: Option<String>,
  longitude: Option<String>,
  similar_images: Option<String>,
  plant_details: Vec<String>,
  plant_language: Option<String>,
}

fn multipart_error(err: MultipartError) -> ClassifiedError {
  ClassifiedError::new(ErrorKind::Validation, err.status().as_u16(), err.body_text())
}

/// Reads the diagnosis form: one `image` file plus optional text fields.
pub async fn read_diagnosis_form(
  mut multipart: Multipart,
  max_file_size: usize,
) -> Result<DiagnosisUpload, ClassifiedError> {
  let mut image: Option<(String, Vec<u8>)> = None;
  let mut raw = RawFields::default();

  while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
    let name = field.name().unwrap_or_default().to_string();
    if name == "image" {
      if image.is_some() {
        return Err(ClassifiedError::validation("Only one image file is allowed"));
      }
      let mime = field.content_type().unwrap_or_default().to_lowercase();
      if !ALLOWED_MIMES.contains(&mime.as_str()) {
        return Err(ClassifiedError::validation(
          "Invalid file type. Only JPEG, PNG, and WebP images are allowed.",
        ));
      }
      let file_name = field.file_name().unwrap_or("upload").to_string();
      let bytes = field.bytes().await.map_err(multipart_error)?;
      if bytes.len() > max_file_size {
        return Err(ClassifiedError::new(ErrorKind::Validation, 413, "File too large"));
      }
      image = Some((file_name, bytes.to_vec()));
      continue;
    }

    let value = field.text().await.map_err(multipart_error)?;
    match name.as_str() {
      "latitude" => raw.latitude = Some(value),
      "longitude" => raw.longitude = Some(value),
      "similar_images" => raw.similar_images = Some(value),
      "plant_details" | "plant_details[]" => raw.plant_details.push(value),
      "plant_language" => raw.plant_language = Some(value),
      _ => {}
    }
  }

  let (file_name, image) = image.ok_or_else(|| ClassifiedError::validation("No image file provided"))?;
  Ok(DiagnosisUpload {
    file_name,
    image,
    options: parse_options(raw)?,
  })
}

fn parse_coordinate(value: Option<String>, min: f64, max: f64, message: &str) -> Result<Option<f64>, ClassifiedError> {
  let Some(value) = value.filter(|v| !v.trim().is_empty()) else {
    return Ok(None);
  };
  match value.trim().parse::<f64>() {
    Ok(n) if n.is_finite() && (min..=max).contains(&n) => Ok(Some(n)),
    _ => Err(ClassifiedError::validation(message)),
  }
}

fn parse_bool(value: &str) -> Option<bool> {
  match value.trim().to_lowercase().as_str() {
    "true" | "1" => Some(true),
    "false" | "0" | "" => Some(false),
    _ => None,
  }
}

// Accepts repeated fields, a JSON array, or a comma separated list.
fn parse_plant_details(values: Vec<String>) -> Result<Vec<String>, ClassifiedError> {
  let mut details = Vec::new();
  for value in values {
    let trimmed = value.trim();
    if trimmed.starts_with('[') {
      let list: Vec<String> = serde_json::from_str(trimmed)
        .map_err(|_| ClassifiedError::validation("plant_details must be an array"))?;
      details.extend(list);
    } else {
      details.extend(trimmed.split(',').map(|s| s.trim().to_string()));
    }
  }
  details.retain(|d| !d.is_empty());
  Ok(details)
}

fn parse_options(raw: RawFields) -> Result<DiagnosisOptions, ClassifiedError> {
  let defaults = DiagnosisOptions::default();

  let similar_images = match raw.similar_images {
    Some(value) => parse_bool(&value)
      .ok_or_else(|| ClassifiedError::validation("similar_images must be boolean"))?,
    None => defaults.similar_images,
  };

  let plant_details = parse_plant_details(raw.plant_details)?;
  let plant_language = match raw.plant_language.map(|l| l.trim().to_string()) {
    Some(lang) if !lang.is_empty() => {
      if !(2..=5).contains(&lang.chars().count()) {
        return Err(ClassifiedError::validation("Invalid language code"));
      }
      lang
    }
    _ => defaults.plant_language.clone(),
  };

  Ok(DiagnosisOptions {
    latitude: parse_coordinate(raw.latitude, -90.0, 90.0, "Invalid latitude")?,
    longitude: parse_coordinate(raw.longitude, -180.0, 180.0, "Invalid longitude")?,
    similar_images,
    plant_details: if plant_details.is_empty() {
      defaults.plant_details
    } else {
      plant_details
    },
    plant_language,
  })
}
