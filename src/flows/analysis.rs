//! Legal analysis flow — identifies the statute sections relevant to an issue.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::GenerationError;
use crate::flows::extract_json_object;
use crate::llm::{ChatMessage, CompletionRequest, LlmProvider};

/// Max tokens for the analysis call (next steps + escalation lists).
const ANALYSIS_MAX_TOKENS: u64 = 1536;

/// Temperature for analysis (factual, statute-bound).
const ANALYSIS_TEMPERATURE: f64 = 0.1;

/// Structured guidance for a described legal issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegalAnalysis {
    /// The potential case type (civil/criminal).
    pub case_type: String,
    /// The relevant section number.
    pub section_number: String,
    /// A concise explanation of the section.
    pub explanation: String,
    /// Markdown list of immediate next steps.
    pub next_steps: String,
    /// Markdown list of how to escalate if initial steps fail.
    pub escalation_path: String,
}

/// Identifies relevant legal sections via the generation collaborator.
pub struct LegalAnalyzer {
    llm: Arc<dyn LlmProvider>,
}

impl LegalAnalyzer {
    pub fn new(llm: Arc<dyn LlmProvider>) -> Self {
        Self { llm }
    }

    /// Analyze a user-described issue. One attempt; failure propagates.
    pub async fn analyze(&self, issue: &str) -> Result<LegalAnalysis, GenerationError> {
        let request = CompletionRequest::new(vec![
            ChatMessage::system(build_analysis_system_prompt()),
            ChatMessage::user(format!("User issue: {issue}")),
        ])
        .with_temperature(ANALYSIS_TEMPERATURE)
        .with_max_tokens(ANALYSIS_MAX_TOKENS);

        let response = self.llm.complete(request).await?;

        let analysis = parse_analysis_response(&response.content)?;
        debug!(
            case_type = %analysis.case_type,
            section = %analysis.section_number,
            "Legal analysis complete"
        );
        Ok(analysis)
    }
}

/// Build the analysis system prompt.
fn build_analysis_system_prompt() -> String {
    "You are a legal expert. A user will describe their issue. You must provide the \
     most relevant:\n\n\
     - case type (civil/criminal)\n\
     - section number\n\
     - A small explanation of that section\n\
     - A markdown list of next steps the user should take.\n\
     - A markdown list of how the user can escalate the issue.\n\n\
     Make sure you only provide real articles or parts thereof.\n\n\
     Respond with ONLY a JSON object:\n\
     {\"caseType\": \"...\", \"sectionNumber\": \"...\", \"explanation\": \"...\", \
     \"nextSteps\": \"...\", \"escalationPath\": \"...\"}"
        .to_string()
}

/// Parse the LLM reply into a `LegalAnalysis`.
fn parse_analysis_response(raw: &str) -> Result<LegalAnalysis, GenerationError> {
    let json_str = extract_json_object(raw);
    let analysis: LegalAnalysis =
        serde_json::from_str(&json_str).map_err(|e| GenerationError::InvalidResponse {
            reason: format!("analysis reply did not match schema: {e}"),
        })?;

    if analysis.case_type.trim().is_empty() || analysis.section_number.trim().is_empty() {
        return Err(GenerationError::InvalidResponse {
            reason: "analysis reply had empty caseType or sectionNumber".to_string(),
        });
    }

    Ok(analysis)
}
