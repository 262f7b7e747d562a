use std::num::NonZeroU32;
use std::time::Duration;

use crate::imaging::ImageLimits;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
  #[error("{0} is not configured")]
  Missing(&'static str),
  #[error("{name} has an invalid value: {value:?}")]
  Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct GeminiConfig {
  pub api_key: String,
  pub model: String,
  pub base_url: String,
  pub max_tokens: u32,
  pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct PlantIdConfig {
  pub api_key: String,
  pub api_url: String,
  pub timeout: Duration,
  pub modifiers_timeout: Duration,
}

impl PlantIdConfig {
  pub fn modifiers_url(&self) -> String {
    format!("{}/modifiers", self.api_url.trim_end_matches('/'))
  }
}

const DEFAULT_CHAT_RATE_LIMIT: NonZeroU32 = match NonZeroU32::new(20) {
  Some(limit) => limit,
  None => unreachable!(),
};

/// Process-wide settings, read once at startup and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct AppConfig {
  pub host: String,
  pub port: u16,
  pub gemini: GeminiConfig,
  pub plant_id: PlantIdConfig,
  pub max_file_size: usize,
  pub image: ImageLimits,
  /// Chat requests allowed per client per minute.
  pub chat_rate_limit: NonZeroU32,
}

impl AppConfig {
  pub fn from_env() -> Result<Self, ConfigError> {
    Self::from_lookup(|name| std::env::var(name).ok())
  }

  pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
  where
    F: Fn(&str) -> Option<String>,
  {
    let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
    let required = |name: &'static str| get(name).ok_or(ConfigError::Missing(name));

    let image_defaults = ImageLimits::default();
    let image = ImageLimits {
      max_width: parse_or(&get, "IMAGE_MAX_WIDTH", image_defaults.max_width)?,
      max_height: parse_or(&get, "IMAGE_MAX_HEIGHT", image_defaults.max_height)?,
      quality: parse_or(&get, "IMAGE_QUALITY", image_defaults.quality)?,
      min_quality: parse_or(&get, "IMAGE_MIN_QUALITY", image_defaults.min_quality)?,
      quality_step: image_defaults.quality_step,
      max_bytes: parse_or(&get, "IMAGE_MAX_BYTES", image_defaults.max_bytes)?,
    };
    if image.max_width == 0 || image.max_height == 0 || image.min_quality == 0 || image.quality > 100 {
      return Err(ConfigError::Invalid {
        name: "IMAGE_*",
        value: format!("{image:?}"),
      });
    }

    Ok(Self {
      host: get("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
      port: parse_or(&get, "PORT", 3000)?,
      gemini: GeminiConfig {
        api_key: required("GEMINI_API_KEY")?,
        model: get("GEMINI_MODEL").unwrap_or_else(|| "gemini-pro".to_string()),
        base_url: get("GEMINI_API_URL")
          .unwrap_or_else(|| "https://generativelanguage.googleapis.com/v1beta".to_string()),
        max_tokens: parse_or(&get, "GEMINI_MAX_TOKENS", 2048)?,
        timeout: Duration::from_millis(parse_or(&get, "GEMINI_TIMEOUT", 30_000)?),
      },
      plant_id: PlantIdConfig {
        api_key: required("PLANT_ID_API_KEY")?,
        api_url: get("PLANT_ID_API_URL")
          .unwrap_or_else(|| "https://api.plant.id/v3/identification".to_string()),
        timeout: Duration::from_millis(parse_or(&get, "PLANT_ID_TIMEOUT", 30_000)?),
        modifiers_timeout: Duration::from_secs(10),
      },
      max_file_size: parse_or(&get, "MAX_FILE_SIZE", 10 * 1024 * 1024)?,
      image,
      chat_rate_limit: parse_or(&get, "CHAT_RATE_LIMIT", DEFAULT_CHAT_RATE_LIMIT)?,
    })
  }
}

fn parse_or<T, G>(get: &G, name: &'static str, default: T) -> Result<T, ConfigError>
where
  T: std::str::FromStr,
  G: Fn(&str) -> Option<String>,
{
  match get(name) {
    Some(raw) => raw
      .trim()
      .parse()
      .map_err(|_| ConfigError::Invalid { name, value: raw }),
    None => Ok(default),
  }
}
