//! API routes

use axum::{
    routing::{get, patch, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::extractors::AppState;
use crate::handlers::teaching_contracts;

/// Routes of the contract engine, still waiting for their state
pub fn router() -> Router<AppState> {
    Router::new().nest("/teaching-contracts", teaching_contracts_router())
}

/// Stateful router with request tracing
pub fn app(state: AppState) -> Router {
    router()
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn teaching_contracts_router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(teaching_contracts::list_contracts).post(teaching_contracts::create_contract),
        )
        .route(
            "/:id",
            get(teaching_contracts::get_contract).delete(teaching_contracts::delete_contract),
        )
        .route("/:id/pdf", get(teaching_contracts::contract_pdf))
        .route("/:id/signature", post(teaching_contracts::submit_signature))
        .route("/:id/status", patch(teaching_contracts::override_status))
}
