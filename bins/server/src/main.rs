//! Cognitax API Server
//!
//! Main entry point for the Cognitax backend service.

use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cognitax_api::{AppState, Ingestion, create_router};
use cognitax_core::chat::ChatService;
use cognitax_core::extraction::{GeminiClient, GeminiConfig};
use cognitax_core::ingestion::{IngestionOptions, IngestionService};
use cognitax_core::staging::{DocumentStaging, StagingBackend};
use cognitax_db::{ChatTurnRepository, UploadRepository, connect_with};
use cognitax_shared::config::IngestionSettings;
use cognitax_shared::{AppConfig, JwtConfig, JwtService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cognitax=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load()?;

    let db = connect_with(&config.database).await?;
    info!("Connected to database");

    let jwt_service = JwtService::new(JwtConfig::from(&config.jwt));

    let gemini_config = GeminiConfig::from(&config.gemini);
    info!(model = %gemini_config.model, "Gemini client configured");
    let extractor = Arc::new(GeminiClient::new(gemini_config)?);

    let staging = DocumentStaging::new(&StagingBackend::local_fs(&config.staging.root))?;
    info!(root = %config.staging.root, backend = staging.backend(), "Document staging ready");

    let ingestion = Arc::new(IngestionService::new(
        Arc::new(UploadRepository::new(db.clone())),
        Arc::clone(&extractor),
        Arc::new(staging),
        IngestionOptions::from(&config.ingestion),
    ));
    let chat = ChatService::new(Arc::new(ChatTurnRepository::new(db.clone())), extractor);

    spawn_reconciler(Arc::clone(&ingestion), &config.ingestion);

    let state = AppState {
        db: Arc::new(db),
        jwt_service: Arc::new(jwt_service),
        ingestion,
        chat: Arc::new(chat),
    };

    let app = create_router(state, &config.server.cors_origins);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Periodically fails uploads left in `processing` by a crash or restart.
fn spawn_reconciler(ingestion: Arc<Ingestion>, settings: &IngestionSettings) {
    let stale_after = Duration::from_secs(settings.stale_after_secs);
    let every = Duration::from_secs(settings.sweep_interval_secs.max(1));

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            match ingestion.fail_stale_uploads(stale_after).await {
                Ok(0) => {}
                Ok(count) => warn!(count, "Failed stale uploads"),
                Err(e) => error!(error = %e, "Stale upload sweep failed"),
            }
        }
    });
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}
