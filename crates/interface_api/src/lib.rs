//! HTTP API Layer
//!
//! REST surface for the policy and claims registries using Axum.
//!
//! # Architecture
//!
//! - **Handlers**: Request handlers for each resource
//! - **Middleware**: JWT authentication and audit logging
//! - **DTOs**: Request/Response data transfer objects
//! - **Error Handling**: Domain error kinds mapped onto status codes
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_api::{create_router, AppState};
//!
//! let state = AppState::in_memory(config, owner).await?;
//! axum::serve(listener, create_router(state)).await?;
//! ```

pub mod config;
pub mod error;
pub mod middleware;
pub mod handlers;
pub mod dto;
pub mod auth;
pub mod state;

use axum::{
    Router,
    routing::{get, post},
    middleware as axum_middleware,
};
use tower_http::trace::TraceLayer;
use tower_http::cors::{CorsLayer, Any};

use crate::middleware::{auth_middleware, audit_middleware};
use crate::handlers::{claims, health, insurers, policy};

pub use crate::state::AppState;

/// Creates the main API router
///
/// # Arguments
///
/// * `state` - Wired registries and configuration
///
/// # Returns
///
/// Configured Axum router with all routes and middleware
pub fn create_router(state: AppState) -> Router {
    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check));

    let insurer_routes = Router::new()
        .route("/", post(insurers::add_insurer).get(insurers::list_insurers));

    let policy_routes = Router::new()
        .route("/", post(policy::issue_policy).get(policy::list_policies))
        .route("/:id", get(policy::get_policy))
        .route("/:id/status", get(policy::get_policy_status))
        .route("/:id/premiums", post(policy::pay_premium))
        .route("/:id/claims", get(policy::list_policy_claims));

    let claims_routes = Router::new()
        .route("/", post(claims::submit_claim))
        .route("/:id", get(claims::get_claim))
        .route("/:id/approve", post(claims::approve_claim))
        .route("/:id/reject", post(claims::reject_claim))
        .route("/:id/pay", post(claims::pay_claim));

    // Protected API routes
    let api_routes = Router::new()
        .nest("/insurers", insurer_routes)
        .nest("/policies", policy_routes)
        .nest("/claims", claims_routes)
        .layer(axum_middleware::from_fn(audit_middleware))
        .layer(axum_middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .merge(public_routes)
        .nest("/api/v1", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
