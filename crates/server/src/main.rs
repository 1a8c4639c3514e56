use std::sync::Arc;

use axum::{
    routing::{get, post},
    Extension, Router,
};
use tower_http::cors::{Any, CorsLayer};
use tracing_subscriber::EnvFilter;

use server::clients::responder::HttpResponder;
use server::config;
use server::routes;
use server::routes::{SharedRandom, SharedResponder};
use server::session::protocol::ThreadRngSource;
use server::session::SessionStore;

const SWEEP_INTERVAL_SECS: u64 = 5 * 60;

#[tokio::main]
async fn main() {
    // Load .env if present
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = config::Config::from_env();

    let store = Arc::new(SessionStore::new());
    let responder: SharedResponder = Arc::new(HttpResponder::new(&config));
    let random: SharedRandom = Arc::new(ThreadRngSource);

    // Periodic eviction of ended and idle sessions
    tokio::spawn({
        let store = store.clone();
        async move {
            let mut interval =
                tokio::time::interval(std::time::Duration::from_secs(SWEEP_INTERVAL_SECS));
            loop {
                interval.tick().await;
                let evicted = store.sweep_expired().await;
                if evicted > 0 {
                    tracing::info!("Evicted {} expired sessions", evicted);
                }
            }
        }
    });

    // CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/", get(routes::health::hello))
        .route("/stats", get(routes::health::stats))
        .route("/session/create", post(routes::sessions::create_session))
        .route("/session/{id}/move", post(routes::sessions::make_move))
        .route(
            "/session/{id}/latestMove",
            post(routes::sessions::latest_move),
        )
        .layer(Extension(store))
        .layer(Extension(responder))
        .layer(Extension(random))
        .layer(cors);

    let addr = format!("{}:{}", config.host, config.port);
    tracing::info!("Starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind");

    axum::serve(listener, app).await.expect("Server error");
}
