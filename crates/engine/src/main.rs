use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vitalis_engine::providers::{NullCacheStats, NullDependencyStats};
use vitalis_engine::{EngineConfig, ObservabilityEngine};
use vitalis_notify::{EmailChannel, EmailConfig, LogChannel, NotificationDispatcher, WebhookChannel};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vitalis_engine=debug,vitalis_notify=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = EngineConfig::from_env();

    let mut dispatcher = NotificationDispatcher::new();
    dispatcher.register(Arc::new(LogChannel));

    if let Ok(url) = std::env::var("ALERT_WEBHOOK_URL") {
        match WebhookChannel::new(url) {
            Ok(channel) => dispatcher.register(Arc::new(channel)),
            Err(e) => tracing::warn!(error = %e, "Webhook channel unavailable"),
        }
    }

    if let Some(email_config) = EmailConfig::from_env() {
        dispatcher.register(Arc::new(EmailChannel::new(email_config)));
    } else {
        tracing::info!("SMTP not configured, email alerts disabled");
    }

    // Standalone mode runs without a database or cache behind it; wire real
    // providers in when embedding the engine in the API service.
    let engine = Arc::new(ObservabilityEngine::new(
        config,
        Arc::new(NullDependencyStats),
        Arc::new(NullCacheStats),
        dispatcher,
    ));

    engine.start_default();

    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Shutdown signal received"),
        Err(e) => tracing::error!(error = %e, "Failed to listen for shutdown signal"),
    }

    engine.stop();
}
