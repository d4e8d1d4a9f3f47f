//! HTTP API — the form submission, analysis, translation, and speech
//! surfaces, served by axum with permissive CORS for the browser frontend.
//!
//! Handlers never leak collaborator detail: generation failures map to the
//! fixed retry-later wording and the cause is logged server-side.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tracing::error;

use crate::flows::{self, LegalAnalysis, LegalAnalyzer, SpeechSynthesizer, Translator};
use crate::intake::{IntakeOrchestrator, IntakeResult, RawComplaint};
use crate::session::Session;

const ANALYZE_UNAVAILABLE: &str =
    "Sorry, we couldn't analyze your issue at this time. Please try again later.";
const TRANSLATE_UNAVAILABLE: &str =
    "Sorry, we couldn't translate your text at this time. Please try again later.";
const SPEECH_UNAVAILABLE: &str =
    "Sorry, we couldn't generate audio at this time. Please try again later.";

/// Shared state for API routes.
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<IntakeOrchestrator>,
    pub analyzer: Arc<LegalAnalyzer>,
    pub translator: Arc<Translator>,
    /// Absent when no TTS credential is configured.
    pub speech: Option<Arc<SpeechSynthesizer>>,
    pub generation_timeout: Duration,
}

/// `{ data }` on success, `{ error }` otherwise — the shape the frontend's
/// form actions already consume.
#[derive(Debug, Serialize)]
#[serde(untagged)]
enum ActionResponse<T: Serialize> {
    Data { data: T },
    Error { error: String },
}

impl<T: Serialize> ActionResponse<T> {
    fn error(message: impl Into<String>) -> Self {
        Self::Error {
            error: message.into(),
        }
    }
}

// ── Complaints ──────────────────────────────────────────────────────

/// GET /api/complaints
///
/// The initial form state, before any submission.
async fn complaint_form_state() -> Json<IntakeResult> {
    Json(IntakeResult::idle())
}

/// POST /api/complaints
///
/// Runs the intake pipeline for one submission.
async fn submit_complaint(
    State(state): State<AppState>,
    session: Session,
    Json(raw): Json<RawComplaint>,
) -> Json<IntakeResult> {
    Json(state.orchestrator.submit(&session, raw).await)
}

// ── Analysis ────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct AnalyzeRequest {
    #[serde(default)]
    issue: String,
}

/// Wire shape of an analysis result (`sectionNumber` is exposed as `section`).
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AnalysisData {
    case_type: String,
    section: String,
    explanation: String,
    next_steps: String,
    escalation_path: String,
}

impl From<LegalAnalysis> for AnalysisData {
    fn from(analysis: LegalAnalysis) -> Self {
        Self {
            case_type: analysis.case_type,
            section: analysis.section_number,
            explanation: analysis.explanation,
            next_steps: analysis.next_steps,
            escalation_path: analysis.escalation_path,
        }
    }
}

/// POST /api/analyze
async fn analyze_issue(
    State(state): State<AppState>,
    _session: Session,
    Json(request): Json<AnalyzeRequest>,
) -> Json<ActionResponse<AnalysisData>> {
    if request.issue.is_empty() {
        return Json(ActionResponse::error("Issue description cannot be empty."));
    }

    let result = flows::with_deadline(
        state.generation_timeout,
        state.analyzer.analyze(&request.issue),
    )
    .await;

    match result {
        Ok(analysis) => Json(ActionResponse::Data {
            data: analysis.into(),
        }),
        Err(e) => {
            error!(error = %e, "Legal analysis failed");
            Json(ActionResponse::error(ANALYZE_UNAVAILABLE))
        }
    }
}

// ── Translation ─────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct TranslateRequest {
    #[serde(default)]
    text: String,
    #[serde(default, rename = "targetLanguage")]
    target_language: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TranslationData {
    translated_text: String,
}

/// POST /api/translate
async fn translate_text(
    State(state): State<AppState>,
    _session: Session,
    Json(request): Json<TranslateRequest>,
) -> Json<ActionResponse<TranslationData>> {
    if request.text.is_empty() || request.target_language.is_empty() {
        return Json(ActionResponse::error(
            "Text and target language are required.",
        ));
    }

    let result = flows::with_deadline(
        state.generation_timeout,
        state
            .translator
            .translate(&request.text, &request.target_language),
    )
    .await;

    match result {
        Ok(translation) => Json(ActionResponse::Data {
            data: TranslationData {
                translated_text: translation.translated_text,
            },
        }),
        Err(e) => {
            error!(error = %e, "Translation failed");
            Json(ActionResponse::error(TRANSLATE_UNAVAILABLE))
        }
    }
}

// ── Speech ──────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct SpeechRequest {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Serialize)]
struct SpeechData {
    media: String,
}

/// POST /api/speech
async fn synthesize_speech(
    State(state): State<AppState>,
    _session: Session,
    Json(request): Json<SpeechRequest>,
) -> Json<ActionResponse<SpeechData>> {
    if request.text.is_empty() {
        return Json(ActionResponse::error("Text cannot be empty."));
    }

    let Some(ref speech) = state.speech else {
        return Json(ActionResponse::error(SPEECH_UNAVAILABLE));
    };

    let result =
        flows::with_deadline(state.generation_timeout, speech.synthesize(&request.text)).await;

    match result {
        Ok(audio) => Json(ActionResponse::Data {
            data: SpeechData { media: audio.media },
        }),
        Err(e) => {
            error!(error = %e, "Speech synthesis failed");
            Json(ActionResponse::error(SPEECH_UNAVAILABLE))
        }
    }
}

// ── Router ──────────────────────────────────────────────────────────

/// GET /health
async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Build the API router.
pub fn api_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route(
            "/api/complaints",
            get(complaint_form_state).post(submit_complaint),
        )
        .route("/api/analyze", post(analyze_issue))
        .route("/api/translate", post(translate_text))
        .route("/api/speech", post(synthesize_speech))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_response_data_shape() {
        let response = ActionResponse::Data {
            data: SpeechData {
                media: "data:audio/mp3;base64,AAAA".to_string(),
            },
        };
        let value = serde_json::to_value(&response).unwrap();
        assert!(value["data"]["media"].as_str().unwrap().starts_with("data:"));
        assert!(value.get("error").is_none());
    }

    #[test]
    fn action_response_error_shape() {
        let response: ActionResponse<SpeechData> = ActionResponse::error("nope");
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["error"], "nope");
        assert!(value.get("data").is_none());
    }

    #[test]
    fn analysis_data_renames_section_number() {
        let data: AnalysisData = LegalAnalysis {
            case_type: "Criminal".into(),
            section_number: "Section 378 IPC".into(),
            explanation: "e".into(),
            next_steps: "n".into(),
            escalation_path: "p".into(),
        }
        .into();
        let value = serde_json::to_value(&data).unwrap();
        assert_eq!(value["section"], "Section 378 IPC");
        assert_eq!(value["caseType"], "Criminal");
        assert!(value.get("sectionNumber").is_none());
    }
}
