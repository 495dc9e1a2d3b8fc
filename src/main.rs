use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use leaderboard_backend::{api, build_state, config::Config, metrics};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("Invalid configuration: {e}");
            std::process::exit(2);
        }
    };

    if config.admin_password.is_none() {
        tracing::warn!("ADMIN_PASSWORD is not set; admin login will always be rejected");
    }

    metrics::register_metrics();

    let state = match build_state(&config).await {
        Ok(s) => s,
        Err(e) => {
            tracing::error!("Failed to initialize persistence: {e}");
            std::process::exit(1);
        }
    };
    tracing::info!("Persisting contestants to {}", state.store.backend());

    let app = api::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port))
        .await
        .expect("Failed to bind listener");

    tracing::info!("Leaderboard backend listening on port {}", config.port);
    axum::serve(listener, app)
        .await
        .expect("Failed to start server");
}
