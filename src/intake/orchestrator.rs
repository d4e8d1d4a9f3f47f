//! Intake orchestrator — sequences validate → enhance → notify.
//!
//! The pipeline is linear with exactly two failure exits:
//! 1. Validation failure → `error` with the field message, verbatim.
//! 2. Enhancement failure → `error` with a generic retry-later message
//!    (cause logged, never exposed).
//!
//! A submission that passes enhancement is accepted; the notification
//! side-channel can never downgrade it.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::{Instrument, error, info, info_span, warn};
use uuid::Uuid;

use crate::flows::{self, ComplaintEnhancer};
use crate::intake::notify::{ComplaintNotifier, NotificationOutcome};
use crate::intake::validate::{self, RawComplaint};
use crate::session::Session;

/// Confirmation shown to the user after a successful intake.
const CONFIRMATION_MESSAGE: &str =
    "Your complaint has been submitted successfully. We will review it shortly.";

/// Generic message for enhancement failures. The cause is logged only.
const RETRY_LATER_MESSAGE: &str = "An unexpected error occurred. Please try again later.";

/// Terminal state of one orchestration run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IntakeStatus {
    /// Initial form state, before any submission.
    Idle,
    Success,
    Error,
}

/// The terminal output of one orchestration run.
#[derive(Debug, Clone, Serialize)]
pub struct IntakeResult {
    pub status: IntakeStatus,
    pub message: String,
    /// Present on success: what happened to the notification side-channel.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notification: Option<NotificationOutcome>,
}

impl IntakeResult {
    pub fn idle() -> Self {
        Self {
            status: IntakeStatus::Idle,
            message: String::new(),
            notification: None,
        }
    }

    fn success(notification: NotificationOutcome) -> Self {
        Self {
            status: IntakeStatus::Success,
            message: CONFIRMATION_MESSAGE.to_string(),
            notification: Some(notification),
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self {
            status: IntakeStatus::Error,
            message: message.into(),
            notification: None,
        }
    }
}

/// Sequences the intake pipeline for one submission at a time.
///
/// Runs share no mutable state; any number may execute concurrently.
pub struct IntakeOrchestrator {
    enhancer: ComplaintEnhancer,
    notifier: Arc<dyn ComplaintNotifier>,
    generation_timeout: Duration,
}

impl IntakeOrchestrator {
    pub fn new(
        enhancer: ComplaintEnhancer,
        notifier: Arc<dyn ComplaintNotifier>,
        generation_timeout: Duration,
    ) -> Self {
        Self {
            enhancer,
            notifier,
            generation_timeout,
        }
    }

    /// Run one submission through the pipeline.
    pub async fn submit(&self, session: &Session, raw: RawComplaint) -> IntakeResult {
        let run_id = Uuid::new_v4();
        let span = info_span!(
            "intake",
            %run_id,
            authenticated = session.is_authenticated()
        );
        self.run(raw).instrument(span).await
    }

    async fn run(&self, raw: RawComplaint) -> IntakeResult {
        // Step 1: validate (fail fast, no side effects)
        let submission = match validate::validate(raw) {
            Ok(submission) => submission,
            Err(e) => {
                warn!(field = e.field, "Submission failed validation");
                return IntakeResult::error(e.message);
            }
        };

        // Step 2: enhance (single attempt, bounded)
        let enhanced = match flows::with_deadline(
            self.generation_timeout,
            self.enhancer.enhance(&submission.problem),
        )
        .await
        {
            Ok(enhanced) => enhanced,
            Err(e) => {
                error!(error = %e, "Complaint enhancement failed");
                return IntakeResult::error(RETRY_LATER_MESSAGE);
            }
        };

        info!(
            received_at = %submission.received_at,
            has_email = submission.email.is_some(),
            "Complaint accepted"
        );

        // Step 3: notify (best-effort; outcome is recorded, never fatal)
        let notification = self
            .notifier
            .notify(&enhanced, submission.email.as_deref())
            .await;

        IntakeResult::success(notification)
    }
}
