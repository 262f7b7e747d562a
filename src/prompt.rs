use crate::catalog::{language_name, DEFAULT_LANGUAGE};
use crate::models::Message;

/// Number of most recent context messages that reach the model.
pub const CONTEXT_WINDOW: usize = 5;

pub const PERSONA: &str = "You are Arco, a knowledgeable and friendly virtual cultivation assistant.
Your role is to help users with gardening, plant care, and cultivation questions.

Key guidelines:
- Provide accurate, practical advice based on best gardening practices
- Consider the user's climate, season, and location when relevant
- Suggest organic and sustainable methods when possible
- Be encouraging and supportive, especially for beginners
- Keep responses concise but informative (2-3 paragraphs max)
- If you're unsure about something, acknowledge it and suggest consulting local experts
- Focus on plant health, growth optimization, and problem-solving
- Include specific actionable steps when giving advice";

/// Renders the last `CONTEXT_WINDOW` messages as `Role: content` lines, oldest first.
pub fn render_history(context: &[Message]) -> String {
  let start = context.len().saturating_sub(CONTEXT_WINDOW);
  context[start..]
    .iter()
    .map(|msg| format!("{}: {}", msg.role.label(), msg.content))
    .collect::<Vec<_>>()
    .join("\n")
}

pub fn compose(user_message: &str, context: &[Message], language: &str) -> String {
  let mut prompt = format!("{PERSONA}\n\n");

  if language != DEFAULT_LANGUAGE {
    let name = language_name(language).unwrap_or("English");
    prompt.push_str(&format!("Please respond in {name}.\n\n"));
  }

  if !context.is_empty() {
    prompt.push_str("Previous conversation:\n");
    prompt.push_str(&render_history(context));
    prompt.push_str("\n\n");
  }

  prompt.push_str(&format!("User: {user_message}\nAssistant:"));
  prompt
}
