//! HTTP surface for the Spy Cat Agency backend.
//!
//! # Responsibility
//! - Route REST requests to `spycat_core` services.
//! - Resolve the breed catalog before entering core.
//!
//! # Invariants
//! - Handlers hold the connection lock only for synchronous core work.
//! - Every error response uses the `ApiError` envelope.

pub mod breeds;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod state;

pub use breeds::{BreedClient, BreedSource, DEFAULT_BREED_API_URL, DEFAULT_BREED_TIMEOUT};
pub use error::ApiError;
pub use state::AppState;

use axum::routing::{get, patch};
use axum::{Json, Router};
use handlers::{cats, missions, targets};
use serde_json::{json, Value};

/// Builds the full application router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/cats", get(cats::list_cats).post(cats::create_cat))
        .route(
            "/cats/:id",
            get(cats::get_cat)
                .put(cats::replace_cat)
                .patch(cats::patch_cat)
                .delete(cats::delete_cat),
        )
        .route(
            "/missions",
            get(missions::list_missions).post(missions::create_mission),
        )
        .route(
            "/missions/:id",
            get(missions::get_mission)
                .put(missions::replace_mission)
                .patch(missions::patch_mission)
                .delete(missions::delete_mission),
        )
        .route("/missions/:id/assign_cat", patch(missions::assign_cat))
        .route(
            "/targets/:id",
            get(targets::get_target)
                .put(targets::replace_target)
                .patch(targets::patch_target),
        )
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({
        "ok": true,
        "ping": spycat_core::ping(),
        "version": spycat_core::core_version(),
    }))
}
