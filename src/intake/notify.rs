//! Complaint notifier — emails the enhanced complaint to the intake inbox.
//!
//! Best-effort by contract: the pipeline's user-facing outcome never depends
//! on delivery. Every failure path collapses into a typed
//! `NotificationOutcome` and a log line.

use std::time::Duration;

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use serde::Serialize;
use tracing::{error, info, warn};

use crate::config::SmtpConfig;
use crate::error::DeliveryError;
use crate::flows::EnhancedComplaint;

/// Fixed recipient for all complaint notifications.
const COMPLAINT_RECIPIENT: &str = "intake@lawhelp.example.org";

const COMPLAINT_SUBJECT: &str = "New Enhanced Complaint Filed - LawHelp AI";

/// What happened to the notification side-channel for one intake run.
///
/// `Simulated` and `Failed` are still successful intakes — the submission
/// was accepted once enhancement succeeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationOutcome {
    /// One delivery attempt succeeded.
    Delivered,
    /// No delivery credential configured; payload was logged instead.
    Simulated,
    /// Delivery was attempted and failed. Cause is logged, never surfaced.
    Failed,
}

/// Sends the enhanced complaint to the fixed intake recipient.
#[async_trait]
pub trait ComplaintNotifier: Send + Sync {
    /// Never returns an error: delivery failures map to `Failed`.
    async fn notify(
        &self,
        enhanced: &EnhancedComplaint,
        reply_to: Option<&str>,
    ) -> NotificationOutcome;
}

/// SMTP notifier backed by lettre, with a simulated no-op mode when no
/// delivery credential is configured.
pub struct SmtpNotifier {
    config: Option<SmtpConfig>,
    timeout: Duration,
}

impl SmtpNotifier {
    pub fn new(config: Option<SmtpConfig>, timeout: Duration) -> Self {
        Self { config, timeout }
    }

    /// One delivery attempt over SMTP. Blocking transport, run off the
    /// async runtime with a deadline.
    async fn deliver(
        &self,
        config: &SmtpConfig,
        html: String,
        reply_to: Option<&str>,
    ) -> Result<(), DeliveryError> {
        let config = config.clone();
        let reply_to = reply_to.map(str::to_string);

        let send = tokio::task::spawn_blocking(move || send_email(&config, &html, reply_to));

        match tokio::time::timeout(self.timeout, send).await {
            Ok(Ok(result)) => result,
            Ok(Err(join_err)) => Err(DeliveryError::SendFailed(format!(
                "delivery task panicked: {join_err}"
            ))),
            Err(_) => Err(DeliveryError::Timeout {
                timeout: self.timeout,
            }),
        }
    }
}

#[async_trait]
impl ComplaintNotifier for SmtpNotifier {
    async fn notify(
        &self,
        enhanced: &EnhancedComplaint,
        reply_to: Option<&str>,
    ) -> NotificationOutcome {
        let html = build_email_html(enhanced, reply_to);

        let Some(ref config) = self.config else {
            info!(
                recipient = COMPLAINT_RECIPIENT,
                reply_to = reply_to.unwrap_or("(none)"),
                "No delivery credential configured — simulating complaint email"
            );
            info!(payload = %enhanced.enhanced_problem, "Simulated complaint email body");
            return NotificationOutcome::Simulated;
        };

        match self.deliver(config, html, reply_to).await {
            Ok(()) => {
                info!(recipient = COMPLAINT_RECIPIENT, "Complaint email sent");
                NotificationOutcome::Delivered
            }
            Err(e) => {
                // Swallowed by contract: the submission is already accepted.
                error!(error = %e, "Complaint email delivery failed");
                NotificationOutcome::Failed
            }
        }
    }
}

/// Send the complaint email via SMTP.
fn send_email(
    config: &SmtpConfig,
    html: &str,
    reply_to: Option<String>,
) -> Result<(), DeliveryError> {
    let creds = Credentials::new(config.username.clone(), config.password.clone());

    let transport = SmtpTransport::relay(&config.host)
        .map_err(|e| DeliveryError::SendFailed(format!("SMTP relay error: {e}")))?
        .port(config.port)
        .credentials(creds)
        .build();

    let mut builder = Message::builder()
        .from(
            config
                .from_address
                .parse()
                .map_err(|e| DeliveryError::InvalidAddress {
                    address: config.from_address.clone(),
                    reason: format!("{e}"),
                })?,
        )
        .to(COMPLAINT_RECIPIENT
            .parse()
            .map_err(|e| DeliveryError::InvalidAddress {
                address: COMPLAINT_RECIPIENT.to_string(),
                reason: format!("{e}"),
            })?)
        .subject(COMPLAINT_SUBJECT)
        .header(ContentType::TEXT_HTML);

    if let Some(ref addr) = reply_to {
        match addr.parse() {
            Ok(mailbox) => builder = builder.reply_to(mailbox),
            // Sender contact is advisory; it already appears in the body.
            Err(e) => warn!(address = %addr, error = %e, "Skipping unparseable reply-to"),
        }
    }

    let email = builder
        .body(html.to_string())
        .map_err(|e| DeliveryError::BuildFailed(e.to_string()))?;

    transport
        .send(&email)
        .map_err(|e| DeliveryError::SendFailed(e.to_string()))?;

    Ok(())
}

/// Build the HTML payload embedding the enhanced text and reply contact.
fn build_email_html(enhanced: &EnhancedComplaint, reply_to: Option<&str>) -> String {
    let body = escape_html(&enhanced.enhanced_problem).replace('\n', "<br>");

    let mut html = format!(
        "<p>A new complaint has been filed and enhanced by AI for clarity:</p>\
         <div style=\"border: 1px solid #eee; padding: 16px; border-radius: 8px; \
         background-color: #f9f9f9;\"><p>{body}</p></div>"
    );

    match reply_to {
        Some(addr) => {
            let addr = escape_html(addr);
            html.push_str(&format!(
                "<p>The sender provided their email for follow-up: \
                 <a href=\"mailto:{addr}\">{addr}</a></p>"
            ));
        }
        None => html.push_str("<p>The sender did not provide an email address.</p>"),
    }

    html
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enhanced(text: &str) -> EnhancedComplaint {
        EnhancedComplaint {
            enhanced_problem: text.to_string(),
        }
    }

    #[test]
    fn html_embeds_enhanced_text() {
        let html = build_email_html(&enhanced("Water was shut off."), None);
        assert!(html.contains("Water was shut off."));
        assert!(html.contains("did not provide an email address"));
    }

    #[test]
    fn html_includes_reply_contact_when_present() {
        let html = build_email_html(&enhanced("Issue."), Some("a@b.com"));
        assert!(html.contains("mailto:a@b.com"));
        assert!(!html.contains("did not provide"));
    }

    #[test]
    fn html_converts_newlines_to_breaks() {
        let html = build_email_html(&enhanced("line one\nline two"), None);
        assert!(html.contains("line one<br>line two"));
    }

    #[test]
    fn html_escapes_markup_in_complaint() {
        let html = build_email_html(&enhanced("<script>alert(1)</script>"), None);
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[tokio::test]
    async fn missing_credential_simulates_without_error() {
        let notifier = SmtpNotifier::new(None, Duration::from_secs(5));
        let outcome = notifier.notify(&enhanced("Some issue."), Some("a@b.com")).await;
        assert_eq!(outcome, NotificationOutcome::Simulated);
    }

    #[tokio::test]
    async fn unreachable_relay_maps_to_failed_outcome() {
        // Port 1 refuses the connection, so the single delivery attempt
        // fails; the notifier must swallow that into `Failed`, not an error.
        let config = SmtpConfig {
            host: "127.0.0.1".to_string(),
            port: 1,
            username: "user".to_string(),
            password: "secret".to_string(),
            from_address: "noreply@lawhelp.example.org".to_string(),
        };
        let notifier = SmtpNotifier::new(Some(config), Duration::from_millis(500));
        let outcome = notifier.notify(&enhanced("Some issue."), Some("a@b.com")).await;
        assert_eq!(outcome, NotificationOutcome::Failed);
    }

    #[test]
    fn outcome_serializes_lowercase() {
        assert_eq!(
            serde_json::to_value(NotificationOutcome::Simulated).unwrap(),
            serde_json::json!("simulated")
        );
        assert_eq!(
            serde_json::to_value(NotificationOutcome::Delivered).unwrap(),
            serde_json::json!("delivered")
        );
    }
}
