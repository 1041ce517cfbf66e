use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use traitor_quiz::{catalog::Catalog, config::ServerConfig, router, state::AppState};

#[tokio::main]
async fn main() {
    // Load .env file if present (before any env var reads)
    if let Err(e) = dotenvy::dotenv() {
        // Not an error if .env doesn't exist, only log if it's a different issue
        if !matches!(e, dotenvy::Error::Io(_)) {
            eprintln!("Warning: Failed to load .env file: {}", e);
        }
    }

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "traitor_quiz=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting traitor quiz...");

    let config = ServerConfig::from_env();

    let catalog = match &config.catalog_path {
        Some(path) => match Catalog::from_json_file(path) {
            Ok(catalog) => {
                tracing::info!("Loaded {} questions from {}", catalog.len(), path.display());
                catalog
            }
            Err(e) => {
                tracing::error!("Failed to load question catalog {}: {}", path.display(), e);
                return;
            }
        },
        None => Catalog::builtin(),
    };

    let state = Arc::new(AppState::from_config(&config, catalog));
    let app = router::build_router(state, &config.static_dir);

    let listener = match tokio::net::TcpListener::bind(config.bind_addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("Failed to bind {}: {}", config.bind_addr, e);
            return;
        }
    };
    tracing::info!("Listening on http://{}", config.bind_addr);

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!("Server error: {}", e);
    }
}
