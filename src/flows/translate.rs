//! Translation flow — renders text into a regional target language.

use std::sync::Arc;

use serde::Deserialize;
use tracing::debug;

use crate::error::GenerationError;
use crate::flows::extract_json_object;
use crate::llm::{ChatMessage, CompletionRequest, LlmProvider};

const TRANSLATE_MAX_TOKENS: u64 = 2048;

/// Temperature for translation (faithful, not creative).
const TRANSLATE_TEMPERATURE: f64 = 0.1;

/// A translated piece of text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Translation {
    pub translated_text: String,
}

/// Translates text via the generation collaborator.
pub struct Translator {
    llm: Arc<dyn LlmProvider>,
}

impl Translator {
    pub fn new(llm: Arc<dyn LlmProvider>) -> Self {
        Self { llm }
    }

    /// Translate `text` into `target_language`. One attempt; failure propagates.
    pub async fn translate(
        &self,
        text: &str,
        target_language: &str,
    ) -> Result<Translation, GenerationError> {
        let request = CompletionRequest::new(vec![
            ChatMessage::system(build_translate_system_prompt()),
            ChatMessage::user(format!(
                "Target language: {target_language}\n\nText:\n{text}"
            )),
        ])
        .with_temperature(TRANSLATE_TEMPERATURE)
        .with_max_tokens(TRANSLATE_MAX_TOKENS);

        let response = self.llm.complete(request).await?;

        let translation = parse_translate_response(&response.content)?;
        debug!(
            target_language,
            translated_len = translation.translated_text.len(),
            "Translation complete"
        );
        Ok(translation)
    }
}

fn build_translate_system_prompt() -> String {
    "You are a professional translator. Translate the user's text into the \
     requested target language. Preserve meaning, tone, and any legal \
     terminology precisely. Do not add commentary.\n\n\
     Respond with ONLY a JSON object:\n\
     {\"translatedText\": \"the translated text\"}"
        .to_string()
}

#[derive(Debug, Deserialize)]
struct TranslateResponse {
    #[serde(rename = "translatedText")]
    translated_text: String,
}

fn parse_translate_response(raw: &str) -> Result<Translation, GenerationError> {
    let json_str = extract_json_object(raw);
    let response: TranslateResponse =
        serde_json::from_str(&json_str).map_err(|e| GenerationError::InvalidResponse {
            reason: format!("translation reply did not match schema: {e}"),
        })?;

    if response.translated_text.trim().is_empty() {
        return Err(GenerationError::InvalidResponse {
            reason: "translation reply had an empty translatedText".to_string(),
        });
    }

    Ok(Translation {
        translated_text: response.translated_text,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_valid_response() {
        let raw = r#"{"translatedText": "नमस्ते"}"#;
        let translation = parse_translate_response(raw).unwrap();
        assert_eq!(translation.translated_text, "नमस्ते");
    }

    #[test]
    fn parse_rejects_empty_translation() {
        let raw = r#"{"translatedText": ""}"#;
        let err = parse_translate_response(raw).unwrap_err();
        assert!(matches!(err, GenerationError::InvalidResponse { .. }));
    }

    #[test]
    fn parse_rejects_wrong_shape() {
        let raw = r#"{"text": "missing the right key"}"#;
        let err = parse_translate_response(raw).unwrap_err();
        assert!(matches!(err, GenerationError::InvalidResponse { .. }));
    }
}
