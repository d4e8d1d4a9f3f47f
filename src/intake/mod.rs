//! Complaint intake pipeline.
//!
//! One submission flows through:
//! 1. `validate` — schema checks, fail fast, no side effects
//! 2. `ComplaintEnhancer` — external generation call (fatal on failure)
//! 3. `ComplaintNotifier` — best-effort email (never fatal)
//!
//! **Core invariant: a submission reaches the notifier only after it passed
//! validation and enhancement succeeded, and delivery failure never
//! invalidates an accepted submission.**

pub mod notify;
pub mod orchestrator;
pub mod validate;

pub use notify::{ComplaintNotifier, NotificationOutcome, SmtpNotifier};
pub use orchestrator::{IntakeOrchestrator, IntakeResult, IntakeStatus};
pub use validate::{ComplaintSubmission, RawComplaint};
