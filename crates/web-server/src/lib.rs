use axum::{routing::get, Router};
use configuration::Settings;
use dataset::MarketData;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    cors::{AllowHeaders, AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

pub mod error;
pub mod handlers;
pub mod pages;

/// The shared application state that all handlers can access: the
/// read-only market context loaded at startup plus the settings that
/// bound the user-facing controls.
#[derive(Clone)]
pub struct AppState {
    pub ctx: Arc<MarketData>,
    pub settings: Settings,
}

/// Builds the dashboard API router over a loaded context.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::any())
        .allow_methods(Any)
        .allow_headers(AllowHeaders::any());

    Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .route("/api/meta", get(handlers::get_meta))
        .route("/api/kpis", get(handlers::get_kpis))
        .route("/api/fx", get(handlers::get_fx))
        .route("/api/fx/correlation", get(handlers::get_fx_correlation))
        .route("/api/supply", get(handlers::get_supply))
        .route("/api/demand", get(handlers::get_demand))
        .route("/api/balance", get(handlers::get_balance))
        .route("/api/forecast", get(handlers::get_forecast))
        .with_state(state)
        .layer(cors)
        // This middleware logs information about every incoming request.
        .layer(TraceLayer::new_for_http())
}

/// The main function to configure and run the web server.
///
/// The context is loaded by the caller and handed over explicitly; the
/// server itself performs no I/O besides answering requests.
pub async fn run_server(
    addr: SocketAddr,
    ctx: MarketData,
    settings: Settings,
) -> anyhow::Result<()> {
    let state = Arc::new(AppState {
        ctx: Arc::new(ctx),
        settings,
    });
    let app = router(state);

    tracing::info!("Dashboard API listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
