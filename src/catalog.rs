use crate::models::LanguageInfo;

pub const DEFAULT_LANGUAGE: &str = "en";

const LANGUAGES: &[(&str, &str, &str)] = &[
  ("en", "English", "English"),
  ("es", "Spanish", "Español"),
  ("fr", "French", "Français"),
  ("de", "German", "Deutsch"),
  ("it", "Italian", "Italiano"),
  ("pt", "Portuguese", "Português"),
  ("zh", "Chinese", "中文"),
  ("ja", "Japanese", "日本語"),
  ("ko", "Korean", "한국어"),
];

const STARTERS_EN: &[&str] = &[
  "What vegetables grow well in shade?",
  "How do I know when to water my plants?",
  "What are the best plants for beginners?",
  "How can I improve my soil quality?",
  "What plants attract beneficial insects?",
];

const STARTERS_ES: &[&str] = &[
  "¿Qué vegetales crecen bien en la sombra?",
  "¿Cómo sé cuándo regar mis plantas?",
  "¿Cuáles son las mejores plantas para principiantes?",
  "¿Cómo puedo mejorar la calidad de mi suelo?",
  "¿Qué plantas atraen insectos beneficiosos?",
];

const STARTERS_FR: &[&str] = &[
  "Quels légumes poussent bien à l'ombre?",
  "Comment savoir quand arroser mes plantes?",
  "Quelles sont les meilleures plantes pour les débutants?",
  "Comment puis-je améliorer la qualité de mon sol?",
  "Quelles plantes attirent les insectes bénéfiques?",
];

pub fn is_supported_language(code: &str) -> bool {
  LANGUAGES.iter().any(|(c, _, _)| *c == code)
}

/// English name of a supported language code.
pub fn language_name(code: &str) -> Option<&'static str> {
  LANGUAGES
    .iter()
    .find(|(c, _, _)| *c == code)
    .map(|(_, name, _)| *name)
}

pub fn supported_languages() -> Vec<LanguageInfo> {
  LANGUAGES
    .iter()
    .map(|(code, name, native)| LanguageInfo {
      code: code.to_string(),
      name: name.to_string(),
      native: native.to_string(),
    })
    .collect()
}

/// Conversation starters; languages without a curated list get the English one.
pub fn conversation_starters(code: &str) -> Vec<String> {
  let starters = match code {
    "es" => STARTERS_ES,
    "fr" => STARTERS_FR,
    _ => STARTERS_EN,
  };
  starters.iter().map(|s| s.to_string()).collect()
}
