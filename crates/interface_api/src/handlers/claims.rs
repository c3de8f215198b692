//! Claims handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use validator::Validate;

use crate::auth::Caller;
use crate::dto::claims::*;
use crate::dto::parse_claim_id;
use crate::{error::ApiError, AppState};

/// Files a claim against one of the caller's policies
pub async fn submit_claim(
    State(state): State<AppState>,
    Extension(Caller(caller)): Extension<Caller>,
    Json(request): Json<SubmitClaimRequest>,
) -> Result<(StatusCode, Json<ClaimResponse>), ApiError> {
    request.validate()?;
    let claim_id = state
        .claims
        .submit_claim(
            request.policy_id,
            caller,
            request.amount.to_money()?,
            request.reason,
        )
        .await?;
    let claim = state.claims.get_claim_details(claim_id).await?;
    Ok((StatusCode::CREATED, Json(claim.into())))
}

/// Gets a claim by ID
pub async fn get_claim(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ClaimResponse>, ApiError> {
    let claim = state.claims.get_claim_details(parse_claim_id(&id)?).await?;
    Ok(Json(claim.into()))
}

/// Approves a submitted claim (insurer only)
pub async fn approve_claim(
    State(state): State<AppState>,
    Extension(Caller(caller)): Extension<Caller>,
    Path(id): Path<String>,
) -> Result<Json<ClaimResponse>, ApiError> {
    let claim_id = parse_claim_id(&id)?;
    state.claims.approve_claim(claim_id, caller).await?;
    let claim = state.claims.get_claim_details(claim_id).await?;
    Ok(Json(claim.into()))
}

/// Rejects a submitted claim (insurer only)
pub async fn reject_claim(
    State(state): State<AppState>,
    Extension(Caller(caller)): Extension<Caller>,
    Path(id): Path<String>,
) -> Result<Json<ClaimResponse>, ApiError> {
    let claim_id = parse_claim_id(&id)?;
    state.claims.reject_claim(claim_id, caller).await?;
    let claim = state.claims.get_claim_details(claim_id).await?;
    Ok(Json(claim.into()))
}

/// Pays out an approved claim (insurer only)
pub async fn pay_claim(
    State(state): State<AppState>,
    Extension(Caller(caller)): Extension<Caller>,
    Path(id): Path<String>,
) -> Result<Json<PaymentResponse>, ApiError> {
    let claim_id = parse_claim_id(&id)?;
    let receipt = state.claims.pay_claim(claim_id, caller).await?;
    let claim = state.claims.get_claim_details(claim_id).await?;
    Ok(Json(PaymentResponse::new(claim, receipt)))
}
