use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;

use campus_api::{AppState, AppStateInner, collaborators, converse, messages, pages, profile, projects};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "campus=debug,tower_http=debug".into()),
        )
        .init();

    // Config — key, secret, store path and port are required, no defaults.
    let api_key = require_env("GEMINI_API_KEY");
    let session_secret = require_env("CAMPUS_SESSION_SECRET");
    let db_path = require_env("CAMPUS_DB_PATH");
    let port: u16 = require_env("CAMPUS_PORT").parse()?;
    let model = std::env::var("CAMPUS_AI_MODEL").unwrap_or_else(|_| campus_ai::DEFAULT_MODEL.into());
    let host = std::env::var("CAMPUS_HOST").unwrap_or_else(|_| "0.0.0.0".into());
    let uploads_dir: PathBuf = std::env::var("CAMPUS_UPLOADS_DIR")
        .unwrap_or_else(|_| "uploads".into())
        .into();
    let static_dir = std::env::var("CAMPUS_STATIC_DIR").unwrap_or_else(|_| "static".into());

    // Init database
    let db = campus_db::Database::open(&PathBuf::from(&db_path))?;

    // Shared state
    let ai = campus_ai::GeminiClient::new(api_key, model);
    let state = AppState(Arc::new(AppStateInner::new(db, ai, &session_secret, uploads_dir)?));

    // Routes
    let app = Router::new()
        .route("/", get(pages::homepage))
        .route("/profile", post(profile::create_profile))
        .route("/collaborators/{interest}", get(collaborators::find_collaborators))
        .route("/project", post(projects::create_project))
        .route("/project/{id}", get(pages::project_page))
        .route("/project/{id}/message", post(messages::post_message))
        .route("/converse", post(converse::converse))
        .nest_service("/static", ServeDir::new(static_dir))
        .layer(DefaultBodyLimit::max(50 * 1024 * 1024)) // assistant uploads
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Campus server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

fn require_env(name: &str) -> String {
    match required(name, std::env::var(name).ok()) {
        Ok(value) => value,
        Err(e) => {
            eprintln!("FATAL: {}.", e);
            eprintln!("       Set it in your .env file and restart.");
            std::process::exit(1);
        }
    }
}

/// Required settings have no defaults; an empty value counts as unset.
fn required(name: &str, value: Option<String>) -> anyhow::Result<String> {
    match value {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(anyhow::anyhow!("{} is not set", name)),
    }
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    {
        let mut sigterm =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
                .expect("failed to install SIGTERM handler");
        tokio::select! {
            _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
            _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
        }
    }
    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
        info!("Received Ctrl+C, shutting down...");
    }
}
