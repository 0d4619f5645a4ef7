mod analytics;
mod domain;
mod services;
mod state;
mod store;
mod web;

use crate::domain::sync::SyncEngine;
use crate::domain::wizard::{Wizard, WizardTimers};
use crate::services::directory::SimulatedDirectory;
use crate::services::insight::OpenAiInsight;
use crate::state::SharedState;
use crate::store::{AdminStore, BrandingStore, ConfigStore, FeedbackStore, Keyspace};
use axum::{routing::get_service, Router};
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::cors::CorsLayer;
use tower_http::{services::ServeDir, services::ServeFile, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let data_dir =
        std::env::var("GUESTPULSE_DATA_DIR").unwrap_or_else(|_| "data".to_string());
    tracing::info!("Opening local key space at {data_dir}");
    let keyspace = Keyspace::open(&data_dir)?;

    let feedback = Arc::new(FeedbackStore::open(keyspace.clone())?);
    let admins = AdminStore::open(keyspace.clone())?;
    let config = ConfigStore::new(keyspace.clone());
    let branding = BrandingStore::open(keyspace)?;
    tracing::info!("{} feedback records loaded", feedback.count().await);

    let directory = Arc::new(SimulatedDirectory::new());
    let sync = SyncEngine::new(directory, Arc::clone(&feedback));
    let wizard = Wizard::new(Arc::clone(&feedback), WizardTimers::default());

    let api_key = std::env::var("OPENAI_API_KEY").unwrap_or_default();
    if api_key.is_empty() {
        tracing::warn!("OPENAI_API_KEY missing; insight requests will use the fallback text");
    }
    let insight = Arc::new(OpenAiInsight::new(api_key));

    let shared: SharedState = Arc::new(state::AppState {
        feedback,
        admins,
        config,
        branding,
        wizard,
        sync,
        insight,
        filter: Mutex::new(Default::default()),
    });

    let static_handler = ServeDir::new("static").not_found_service(ServeFile::new("static/index.html"));

    let app = Router::new()
        .merge(web::routes(shared))
        .fallback_service(get_service(static_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| {
        let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
        format!("0.0.0.0:{}", port)
    });
    tracing::info!("Listening on {addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
