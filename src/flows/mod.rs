//! Generation flows.
//!
//! Each flow sends a fixed instruction template to the generation
//! collaborator and parses a structured JSON object out of the reply.
//! Malformed or schema-violating model output is a `GenerationError` —
//! flows never silently degrade.

pub mod analysis;
pub mod enhance;
pub mod speech;
pub mod translate;

pub use analysis::{LegalAnalysis, LegalAnalyzer};
pub use enhance::{ComplaintEnhancer, EnhancedComplaint};
pub use speech::{SpeechAudio, SpeechSynthesizer};
pub use translate::{Translation, Translator};

use std::future::Future;
use std::time::Duration;

use crate::error::GenerationError;

/// Run a generation call with an explicit deadline.
///
/// A slow collaborator must not stall the user-visible response without
/// bound; timeouts surface as a distinct error kind from outright failure.
pub async fn with_deadline<T, F>(timeout: Duration, fut: F) -> Result<T, GenerationError>
where
    F: Future<Output = Result<T, GenerationError>>,
{
    match tokio::time::timeout(timeout, fut).await {
        Ok(result) => result,
        Err(_) => Err(GenerationError::Timeout { timeout }),
    }
}

/// Extract a JSON object from LLM output (handles markdown wrapping).
pub(crate) fn extract_json_object(text: &str) -> String {
    let trimmed = text.trim();

    // Already a JSON object
    if trimmed.starts_with('{') {
        return trimmed.to_string();
    }

    // Wrapped in markdown code block
    if let Some(start) = trimmed.find("```json") {
        let after = &trimmed[start + 7..];
        if let Some(end) = after.find("```") {
            return after[..end].trim().to_string();
        }
    }

    if let Some(start) = trimmed.find("```") {
        let after = &trimmed[start + 3..];
        if let Some(end) = after.find("```") {
            let inner = after[..end].trim();
            if inner.starts_with('{') {
                return inner.to_string();
            }
        }
    }

    // Try to find object bounds
    if let (Some(start), Some(end)) = (trimmed.find('{'), trimmed.rfind('}'))
        && end > start
    {
        return trimmed[start..=end].to_string();
    }

    trimmed.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_bare_object() {
        let raw = r#"{"enhancedProblem": "ok"}"#;
        assert_eq!(extract_json_object(raw), raw);
    }

    #[test]
    fn extract_from_json_code_block() {
        let raw = "```json\n{\"a\": 1}\n```";
        assert_eq!(extract_json_object(raw), r#"{"a": 1}"#);
    }

    #[test]
    fn extract_from_plain_code_block() {
        let raw = "```\n{\"a\": 1}\n```";
        assert_eq!(extract_json_object(raw), r#"{"a": 1}"#);
    }

    #[test]
    fn extract_from_surrounding_prose() {
        let raw = "Here is the result: {\"a\": 1} — let me know.";
        assert_eq!(extract_json_object(raw), r#"{"a": 1}"#);
    }

    #[test]
    fn extract_passthrough_when_no_object() {
        assert_eq!(extract_json_object("no json here"), "no json here");
    }

    #[tokio::test]
    async fn with_deadline_times_out() {
        let result: Result<(), _> = with_deadline(Duration::from_millis(10), async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(())
        })
        .await;
        assert!(matches!(result, Err(GenerationError::Timeout { .. })));
    }

    #[tokio::test]
    async fn with_deadline_passes_through_result() {
        let result = with_deadline(Duration::from_secs(1), async { Ok(42) }).await;
        assert_eq!(result.unwrap(), 42);
    }
}
