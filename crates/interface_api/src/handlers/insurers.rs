//! Insurer handlers

use axum::{extract::State, Extension, Json};

use core_kernel::Principal;

use crate::auth::Caller;
use crate::dto::insurers::*;
use crate::{error::ApiError, AppState};

/// Authorizes a new insurer (owner only)
pub async fn add_insurer(
    State(state): State<AppState>,
    Extension(Caller(caller)): Extension<Caller>,
    Json(request): Json<AddInsurerRequest>,
) -> Result<Json<InsurersResponse>, ApiError> {
    state
        .guard
        .add_insurer(caller, Principal::from_uuid(request.insurer))
        .await?;
    list_insurers(State(state)).await
}

/// Lists authorized insurers
pub async fn list_insurers(
    State(state): State<AppState>,
) -> Result<Json<InsurersResponse>, ApiError> {
    Ok(Json(InsurersResponse {
        owner: state.guard.owner(),
        insurers: state.guard.insurers().await?,
    }))
}
