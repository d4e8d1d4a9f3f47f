//! Complaint enhancement flow — rephrases a raw complaint for clarity.

use std::sync::Arc;

use serde::Deserialize;
use tracing::debug;

use crate::error::GenerationError;
use crate::flows::extract_json_object;
use crate::llm::{ChatMessage, CompletionRequest, LlmProvider};

/// Max tokens for the enhancement call.
const ENHANCE_MAX_TOKENS: u64 = 1024;

/// Temperature for enhancement (faithful rewording, not creativity).
const ENHANCE_TEMPERATURE: f64 = 0.2;

/// A cleaned, structured rephrasing of a complaint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnhancedComplaint {
    pub enhanced_problem: String,
}

/// Rephrases a user's complaint via the generation collaborator.
pub struct ComplaintEnhancer {
    llm: Arc<dyn LlmProvider>,
}

impl ComplaintEnhancer {
    pub fn new(llm: Arc<dyn LlmProvider>) -> Self {
        Self { llm }
    }

    /// Enhance a validated complaint. One attempt; failure propagates.
    pub async fn enhance(&self, problem: &str) -> Result<EnhancedComplaint, GenerationError> {
        let request = CompletionRequest::new(vec![
            ChatMessage::system(build_enhance_system_prompt()),
            ChatMessage::user(format!("Original Complaint: {problem}")),
        ])
        .with_temperature(ENHANCE_TEMPERATURE)
        .with_max_tokens(ENHANCE_MAX_TOKENS);

        let response = self.llm.complete(request).await?;

        let enhanced = parse_enhance_response(&response.content)?;
        debug!(
            original_len = problem.len(),
            enhanced_len = enhanced.enhanced_problem.len(),
            "Complaint enhanced"
        );
        Ok(enhanced)
    }
}

/// Build the enhancement system prompt.
fn build_enhance_system_prompt() -> String {
    "You are an expert at summarizing and structuring information. A user has \
     submitted a complaint. Your task is to rephrase it to be as clear and \
     concise as possible for the person who will handle it.\n\n\
     Focus on:\n\
     - Identifying the key issue.\n\
     - Structuring the information logically.\n\
     - Removing any emotional or extraneous language, while preserving the core facts.\n\
     - Formatting the output for readability.\n\n\
     Respond with ONLY a JSON object:\n\
     {\"enhancedProblem\": \"the enhanced, clear version of the complaint\"}"
        .to_string()
}

/// LLM enhancement response structure.
#[derive(Debug, Deserialize)]
struct EnhanceResponse {
    #[serde(rename = "enhancedProblem")]
    enhanced_problem: String,
}

/// Parse the LLM reply into an `EnhancedComplaint`.
fn parse_enhance_response(raw: &str) -> Result<EnhancedComplaint, GenerationError> {
    let json_str = extract_json_object(raw);
    let response: EnhanceResponse =
        serde_json::from_str(&json_str).map_err(|e| GenerationError::InvalidResponse {
            reason: format!("enhancement reply did not match schema: {e}"),
        })?;

    if response.enhanced_problem.trim().is_empty() {
        return Err(GenerationError::InvalidResponse {
            reason: "enhancement reply had an empty enhancedProblem".to_string(),
        });
    }

    Ok(EnhancedComplaint {
        enhanced_problem: response.enhanced_problem,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_prompt_demands_json_schema() {
        let prompt = build_enhance_system_prompt();
        assert!(prompt.contains("enhancedProblem"));
        assert!(prompt.contains("ONLY a JSON object"));
    }

    #[test]
    fn parse_valid_response() {
        let raw = r#"{"enhancedProblem": "Water supply was shut off for two weeks without notice."}"#;
        let enhanced = parse_enhance_response(raw).unwrap();
        assert!(enhanced.enhanced_problem.contains("two weeks"));
    }

    #[test]
    fn parse_markdown_wrapped_response() {
        let raw = "```json\n{\"enhancedProblem\": \"Clear version.\"}\n```";
        let enhanced = parse_enhance_response(raw).unwrap();
        assert_eq!(enhanced.enhanced_problem, "Clear version.");
    }

    #[test]
    fn parse_rejects_missing_field() {
        let raw = r#"{"summary": "wrong shape"}"#;
        let err = parse_enhance_response(raw).unwrap_err();
        assert!(matches!(err, GenerationError::InvalidResponse { .. }));
    }

    #[test]
    fn parse_rejects_empty_enhancement() {
        let raw = r#"{"enhancedProblem": "   "}"#;
        let err = parse_enhance_response(raw).unwrap_err();
        assert!(matches!(err, GenerationError::InvalidResponse { .. }));
    }

    #[test]
    fn parse_rejects_prose_without_json() {
        let err = parse_enhance_response("I cannot help with that.").unwrap_err();
        assert!(matches!(err, GenerationError::InvalidResponse { .. }));
    }
}
