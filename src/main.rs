//! WhatsApp menu bot
//!
//! Webhook service that walks each sender through a fixed menu dialogue,
//! replies through the WhatsApp Cloud API and records every interaction.

mod api;
mod config;
mod db;
mod dialogue;
mod runtime;
mod sheets;
mod transport;

use api::{create_router, AppState};
use config::Config;
use db::Database;
use dialogue::DialogueContext;
use runtime::{
    DatabaseRecorder, DialogueEngine, FanoutRecorder, InMemoryStateStore, InteractionRecorder,
    ReplySender,
};
use sheets::SheetsRecorder;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use transport::{LogOnlySender, WhatsAppSender};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "whatsapp_menu_bot=info,tower_http=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    let config = Config::from_env()?;

    if config.verify_token.is_none() {
        tracing::warn!("VERIFY_TOKEN not set; webhook verification will always fail");
    }
    if config.api_key.is_none() {
        tracing::warn!("API_KEY not set; admin routes will reject every request");
    }

    // Ensure database directory exists
    if let Some(parent) = config.db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    tracing::info!(path = %config.db_path.display(), "Opening database");
    let db = Database::open(&config.db_path)?;

    // Reply channel
    let reply_sender: Arc<dyn ReplySender> = match &config.whatsapp {
        Some(whatsapp) => {
            tracing::info!(phone_id = %whatsapp.phone_id, "WhatsApp replies enabled");
            Arc::new(WhatsAppSender::new(
                &whatsapp.api_base,
                &whatsapp.phone_id,
                whatsapp.access_token.clone(),
                config.outbound_timeout,
            )?)
        }
        None => {
            tracing::warn!("WhatsApp credentials not set; replies will only be logged");
            Arc::new(LogOnlySender)
        }
    };

    // Interaction recorders
    let mut recorders: Vec<Arc<dyn InteractionRecorder>> =
        vec![Arc::new(DatabaseRecorder::new(db.clone()))];
    match &config.sheets {
        Some(spreadsheet) => {
            tracing::info!(range = %spreadsheet.range, "Google Sheets recording enabled");
            let tokens = sheets::auth::provider_for(&spreadsheet.auth, config.outbound_timeout)?;
            recorders.push(Arc::new(SheetsRecorder::new(
                &spreadsheet.spreadsheet_id,
                &spreadsheet.range,
                tokens,
                spreadsheet.utc_offset,
                config.outbound_timeout,
            )?));
        }
        None => tracing::info!("Google Sheets not configured; recording to database only"),
    }
    let recorder: Arc<dyn InteractionRecorder> = Arc::new(FanoutRecorder::new(recorders));

    let engine = DialogueEngine::new(
        InMemoryStateStore::new(),
        reply_sender,
        recorder,
        DialogueContext {
            record_faq: config.record_faq,
        },
        config.outbound_timeout,
    );

    let state = AppState {
        engine: Arc::new(engine),
        db,
        verify_token: config.verify_token.clone(),
        api_key: config.api_key.clone(),
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = create_router(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("WhatsApp menu bot listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
