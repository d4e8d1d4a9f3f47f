use std::sync::Arc;

use lawhelp::config::{self, AppConfig, SmtpConfig, SpeechConfig};
use lawhelp::flows::{ComplaintEnhancer, LegalAnalyzer, SpeechSynthesizer, Translator};
use lawhelp::http::{AppState, api_routes};
use lawhelp::intake::{IntakeOrchestrator, SmtpNotifier};
use lawhelp::llm::create_provider;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Install rustls crypto provider before any TLS usage
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let app_config = AppConfig::from_env();
    let llm_config = config::llm_config_from_env()?;

    eprintln!("⚖️  LawHelp v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Model: {}", llm_config.model);
    eprintln!("   API: http://0.0.0.0:{}/api", app_config.port);

    let llm = create_provider(&llm_config)?;

    // ── Intake pipeline ─────────────────────────────────────────────
    let smtp_config = SmtpConfig::from_env();
    match smtp_config {
        Some(ref smtp) => eprintln!("   Email: enabled (SMTP: {})", smtp.host),
        None => eprintln!("   Email: disabled (no credential — delivery simulated)"),
    }
    let notifier = Arc::new(SmtpNotifier::new(smtp_config, app_config.delivery_timeout));
    let orchestrator = Arc::new(IntakeOrchestrator::new(
        ComplaintEnhancer::new(Arc::clone(&llm)),
        notifier,
        app_config.generation_timeout,
    ));

    // ── Generation flows ────────────────────────────────────────────
    let analyzer = Arc::new(LegalAnalyzer::new(Arc::clone(&llm)));
    let translator = Arc::new(Translator::new(Arc::clone(&llm)));

    let speech = match SpeechConfig::from_env() {
        Some(speech_config) => {
            eprintln!("   Speech: enabled (model: {})", speech_config.model);
            Some(Arc::new(SpeechSynthesizer::new(
                speech_config,
                app_config.generation_timeout,
            )?))
        }
        None => {
            eprintln!("   Speech: disabled (no OPENAI_API_KEY)");
            None
        }
    };

    // ── HTTP server ─────────────────────────────────────────────────
    let state = AppState {
        orchestrator,
        analyzer,
        translator,
        speech,
        generation_timeout: app_config.generation_timeout,
    };
    let app = api_routes(state);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", app_config.port)).await?;
    tracing::info!(port = app_config.port, "LawHelp API server started");
    axum::serve(listener, app).await?;

    Ok(())
}
