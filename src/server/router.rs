use crate::core::verifier::Verifier;
use crate::domain::ports::{LedgerSource, OcrEngine};
use crate::server::handler;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Build the axum router with the health and verification endpoints.
pub fn build_router<O, L>(verifier: Arc<Verifier<O, L>>, max_upload_bytes: usize) -> Router
where
    O: OcrEngine + 'static,
    L: LedgerSource + 'static,
{
    Router::new()
        .route("/", get(handler::health_handler))
        .route("/verify", post(handler::verify_handler::<O, L>))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(verifier)
}
