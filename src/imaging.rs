use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, RgbImage};

use crate::error::ClassifiedError;

pub const JPEG_MIME: &str = "image/jpeg";

/// Bounds applied to every image before it is sent to a vendor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageLimits {
  pub max_width: u32,
  pub max_height: u32,
  pub quality: u8,
  pub min_quality: u8,
  pub quality_step: u8,
  pub max_bytes: usize,
}

impl Default for ImageLimits {
  fn default() -> Self {
    Self {
      max_width: 1024,
      max_height: 1024,
      quality: 85,
      min_quality: 50,
      quality_step: 10,
      max_bytes: 1024 * 1024,
    }
  }
}

#[derive(Debug, Clone)]
pub struct NormalizedImage {
  pub bytes: Vec<u8>,
  pub width: u32,
  pub height: u32,
  pub quality: u8,
}

impl NormalizedImage {
  pub fn mime(&self) -> &'static str {
    JPEG_MIME
  }
}

/// Scales `(width, height)` down to fit inside the limits, keeping the aspect ratio.
/// Never enlarges.
pub fn target_dimensions(width: u32, height: u32, limits: &ImageLimits) -> (u32, u32) {
  if width <= limits.max_width && height <= limits.max_height {
    return (width, height);
  }

  let scale = f64::min(
    limits.max_width as f64 / width as f64,
    limits.max_height as f64 / height as f64,
  );
  let scaled = |side: u32, max: u32| ((side as f64 * scale).round() as u32).clamp(1, max);
  (
    scaled(width, limits.max_width),
    scaled(height, limits.max_height),
  )
}

/// Decodes, bounds and re-encodes an uploaded image as JPEG. The size ceiling is
/// best effort: quality drops by `quality_step` until the output fits or the floor
/// is reached. CPU heavy, call it from a blocking task.
pub fn normalize(raw: &[u8], limits: &ImageLimits) -> Result<NormalizedImage, ClassifiedError> {
  if raw.is_empty() {
    return Err(ClassifiedError::image_processing("empty image payload"));
  }

  let format = image::guess_format(raw)
    .map(|f| format!("{f:?}"))
    .unwrap_or_else(|_| "unknown".to_string());
  let decoded = image::load_from_memory(raw)
    .map_err(|err| ClassifiedError::image_processing(format!("decode failed: {err}")))?;
  tracing::info!(
    "Processing image: {}x{}, format: {}",
    decoded.width(),
    decoded.height(),
    format
  );

  let (width, height) = target_dimensions(decoded.width(), decoded.height(), limits);
  let flat = flatten_alpha(&decoded);
  let source = if (width, height) == flat.dimensions() {
    flat
  } else {
    image::imageops::resize(&flat, width, height, FilterType::Lanczos3)
  };

  let mut quality = limits.quality.clamp(1, 100);
  let floor = limits.min_quality.clamp(1, quality);
  let mut bytes = encode_jpeg(&source, quality)?;
  while bytes.len() > limits.max_bytes && quality > floor {
    quality = quality.saturating_sub(limits.quality_step.max(1)).max(floor);
    // always from the resized source, never from the previous lossy output
    bytes = encode_jpeg(&source, quality)?;
  }

  tracing::info!(
    "Image processed: {}x{}, size: {:.2}KB, quality: {}",
    width,
    height,
    bytes.len() as f64 / 1024.0,
    quality
  );

  Ok(NormalizedImage {
    bytes,
    width,
    height,
    quality,
  })
}

fn encode_jpeg(source: &RgbImage, quality: u8) -> Result<Vec<u8>, ClassifiedError> {
  let mut bytes = Vec::new();
  JpegEncoder::new_with_quality(&mut bytes, quality)
    .encode_image(source)
    .map_err(|err| ClassifiedError::image_processing(format!("jpeg encode failed: {err}")))?;
  Ok(bytes)
}

// JPEG has no alpha channel; composite transparent pixels over white.
fn flatten_alpha(image: &DynamicImage) -> RgbImage {
  if !image.color().has_alpha() {
    return image.to_rgb8();
  }

  let rgba = image.to_rgba8();
  RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
    let pixel = rgba.get_pixel(x, y);
    let alpha = u16::from(pixel[3]);
    let blend =
      |channel: u8| -> u8 { (((u16::from(channel) * alpha) + (255 * (255 - alpha))) / 255) as u8 };
    image::Rgb([blend(pixel[0]), blend(pixel[1]), blend(pixel[2])])
  })
}
