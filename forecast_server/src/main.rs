//! # forecast_server
//!
//! REST API server for the stock prediction pipeline: clients upload
//! historical OHLCV CSV data and receive historical model predictions
//! plus a one-step-ahead forecast.

use axum::{
    routing::{get, post},
    Json, Router,
};
use forecast_core::ArtifactStore;
use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod routes;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Artifacts load lazily on first use; a failed load is retried on
    /// the next request instead of poisoning the process.
    artifacts: Arc<OnceCell<ArtifactStore>>,
    models_dir: PathBuf,
    uploads_dir: PathBuf,
}

impl AppState {
    /// Get the loaded artifact store, loading it on first use.
    pub async fn artifacts(&self) -> forecast_core::Result<&ArtifactStore> {
        let models_dir = self.models_dir.clone();
        self.artifacts
            .get_or_try_init(|| async move {
                tokio::task::spawn_blocking(move || ArtifactStore::load(&models_dir))
                    .await
                    .map_err(|e| {
                        forecast_core::ForecastError::ArtifactLoad(format!(
                            "artifact load task failed: {}",
                            e
                        ))
                    })?
            })
            .await
    }
}

/// Root endpoint - service banner
async fn root() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "message": "Stock Price Prediction API",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running"
    }))
}

/// Health check endpoint - liveness only, never touches artifacts
async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "healthy" }))
}

#[tokio::main]
async fn main() {
    // Load .env file (optional - won't fail if missing)
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "forecast_server=info,forecast_core=info,tower_http=info".into()),
        )
        .init();

    let models_dir =
        PathBuf::from(env::var("MODELS_DIR").unwrap_or_else(|_| "saved_models".to_string()));
    let uploads_dir =
        PathBuf::from(env::var("UPLOADS_DIR").unwrap_or_else(|_| "uploads".to_string()));

    if let Err(e) = std::fs::create_dir_all(&uploads_dir) {
        tracing::warn!("cannot create uploads directory: {}", e);
    }

    let state = AppState {
        artifacts: Arc::new(OnceCell::new()),
        models_dir,
        uploads_dir,
    };

    // CORS configuration for the browser frontend
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/api/upload", post(routes::upload))
        .route("/api/predict", post(routes::predict))
        .route("/api/model-info", get(routes::model_info))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state);

    // Server configuration from environment
    let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = env::var("PORT")
        .unwrap_or_else(|_| "8000".to_string())
        .parse()
        .expect("PORT must be a valid number");
    let addr: SocketAddr = format!("{}:{}", host, port)
        .parse()
        .expect("Invalid HOST:PORT configuration");

    tracing::info!(
        "forecast_server v{} listening on {}",
        env!("CARGO_PKG_VERSION"),
        addr
    );

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
