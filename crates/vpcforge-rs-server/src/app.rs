//! Router assembly and the listener loop.

use axum::Router;
use axum::http::{HeaderName, Method, header};
use axum::routing::{get, post};
use log::{info, warn};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use vpcforge_rs_config::VpcForgeConfig;
use vpcforge_rs_core::Orchestrator;

use crate::error::ServerError;
use crate::middleware;
use crate::routes;
use crate::state::AppState;

/// Build the router. Layers, outermost first: cors, trace, request id, key check.
pub fn router(state: AppState) -> Router {
    let cors = state.cors.then(|| cors_layer(state.api_key_header.clone()));
    let app = Router::new()
        .route(
            "/vpc",
            post(routes::create_network).get(routes::list_networks),
        )
        .route(
            "/vpc/{vpc_id}",
            get(routes::get_network).delete(routes::delete_network),
        )
        .fallback(routes::fallback)
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::require_api_key,
        ))
        .layer(axum::middleware::from_fn(middleware::request_id))
        .layer(TraceLayer::new_for_http())
        .with_state(state);
    match cors {
        Some(cors) => app.layer(cors),
        None => app,
    }
}

fn cors_layer(api_key_header: HeaderName) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, api_key_header])
}

/// Build the orchestrator from `config` and serve until ctrl-c.
pub async fn serve(config: &VpcForgeConfig) -> Result<(), ServerError> {
    let orchestrator = Orchestrator::from_config(config)?;
    let state = AppState::new(orchestrator, &config.server)?;
    if !state.requires_api_key() {
        warn!("no api key configured; requests are not authenticated");
    }
    let listener = TcpListener::bind(&config.server.bind).await?;
    info!(
        "vpcforge server listening (addr={}, cors={})",
        listener.local_addr()?,
        state.cors
    );
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("vpcforge server stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("shutdown requested"),
        Err(err) => {
            warn!("failed to listen for ctrl-c (err={err})");
            std::future::pending::<()>().await;
        }
    }
}
