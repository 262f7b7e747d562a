use std::sync::Arc;

use crate::catalog::language_name;
use crate::error::{classify, ClassifiedError};
use crate::gemini::{GenerationConfig, LanguageModel};
use crate::models::{ChatOptions, ChatResult};
use crate::prompt::compose;

const MAX_SUGGESTIONS: usize = 3;
const SUGGESTION_EXCERPT_CHARS: usize = 200;

/// Drives the gardening conversation: one generation call for the answer and a
/// second, best-effort call for follow-up questions.
pub struct ChatService {
  model: Arc<dyn LanguageModel>,
}

impl ChatService {
  pub fn new(model: Arc<dyn LanguageModel>) -> Self {
    Self { model }
  }

  pub async fn respond(&self, user_message: &str, options: &ChatOptions) -> Result<ChatResult, ClassifiedError> {
    let prompt = compose(user_message, &options.context, &options.language);
    let config = GenerationConfig {
      temperature: options.temperature,
      top_p: Some(0.9),
      top_k: Some(40),
      max_output_tokens: options.max_tokens,
    };

    let text = self
      .model
      .generate(&prompt, &config)
      .await
      .map_err(|failure| classify(&failure, "Failed to generate response"))?;

    if text.trim().is_empty() {
      return Err(ClassifiedError::generation("No response generated from Gemini"));
    }

    let tokens_used = estimate_tokens(&format!("{prompt}{text}"));
    let suggestions = self.suggestions(&text, &options.language).await;

    Ok(ChatResult {
      text: text.trim().to_string(),
      tokens_used,
      suggestions,
    })
  }

  async fn suggestions(&self, answer: &str, language: &str) -> Vec<String> {
    let prompt = suggestion_prompt(answer, language);
    let config = GenerationConfig {
      temperature: 0.8,
      top_p: None,
      top_k: None,
      max_output_tokens: 150,
    };

    match self.model.generate(&prompt, &config).await {
      Ok(text) => parse_suggestions(&text),
      Err(failure) => {
        tracing::warn!("Error generating suggestions: {failure}");
        Vec::new()
      }
    }
  }
}

/// Roughly four characters per token.
pub fn estimate_tokens(text: &str) -> u64 {
  (text.chars().count() as u64).div_ceil(4)
}

pub fn suggestion_prompt(answer: &str, language: &str) -> String {
  let excerpt: String = answer.chars().take(SUGGESTION_EXCERPT_CHARS).collect();
  let language = language_name(language).unwrap_or("English");
  format!(
    "Based on this gardening advice: \"{excerpt}...\"\n\n\
     Generate 3 short follow-up questions a user might ask (in {language}).\n\
     Format: Return only the questions, one per line, no numbering or bullets."
  )
}

pub fn parse_suggestions(text: &str) -> Vec<String> {
  text
    .lines()
    .map(str::trim)
    .filter(|line| !line.is_empty())
    .take(MAX_SUGGESTIONS)
    .map(str::to_string)
    .collect()
}
