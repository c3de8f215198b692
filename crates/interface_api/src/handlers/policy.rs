//! Policy handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use validator::Validate;

use domain_policy::Policy;

use crate::auth::Caller;
use crate::dto::claims::ClaimResponse;
use crate::dto::parse_policy_id;
use crate::dto::policy::*;
use crate::{error::ApiError, AppState};

fn respond(state: &AppState, policy: &Policy) -> PolicyResponse {
    PolicyResponse::from_policy(
        policy,
        state.policies.clock().now(),
        state.policies.grace_period(),
    )
}

/// Issues a policy (insurer only)
pub async fn issue_policy(
    State(state): State<AppState>,
    Extension(Caller(caller)): Extension<Caller>,
    Json(request): Json<IssuePolicyRequest>,
) -> Result<(StatusCode, Json<PolicyResponse>), ApiError> {
    request.validate()?;
    let policy_id = state
        .policies
        .issue_policy(caller, request.into_terms()?)
        .await?;
    let policy = state.policies.get_policy_details(policy_id).await?;
    Ok((StatusCode::CREATED, Json(respond(&state, &policy))))
}

/// Lists the caller's policies
pub async fn list_policies(
    State(state): State<AppState>,
    Extension(Caller(caller)): Extension<Caller>,
) -> Result<Json<Vec<PolicyResponse>>, ApiError> {
    let policies = state.policies.policies_held_by(caller).await?;
    Ok(Json(policies.iter().map(|p| respond(&state, p)).collect()))
}

/// Gets a policy by ID
pub async fn get_policy(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PolicyResponse>, ApiError> {
    let policy = state
        .policies
        .get_policy_details(parse_policy_id(&id)?)
        .await?;
    Ok(Json(respond(&state, &policy)))
}

/// Gets the current status of a policy
pub async fn get_policy_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PolicyStatusResponse>, ApiError> {
    let policy_id = parse_policy_id(&id)?;
    let status = state.policies.check_policy_status(policy_id).await?;
    Ok(Json(PolicyStatusResponse { policy_id, status }))
}

/// Records a premium payment from the caller
pub async fn pay_premium(
    State(state): State<AppState>,
    Extension(Caller(caller)): Extension<Caller>,
    Path(id): Path<String>,
    Json(request): Json<PayPremiumRequest>,
) -> Result<Json<PolicyResponse>, ApiError> {
    request.validate()?;
    let policy_id = parse_policy_id(&id)?;
    state
        .policies
        .pay_premium(policy_id, caller, request.amount.to_money()?)
        .await?;
    let policy = state.policies.get_policy_details(policy_id).await?;
    Ok(Json(respond(&state, &policy)))
}

/// Lists the claims filed against a policy
pub async fn list_policy_claims(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<ClaimResponse>>, ApiError> {
    let claims = state
        .claims
        .claims_for_policy(parse_policy_id(&id)?)
        .await?;
    Ok(Json(claims.into_iter().map(ClaimResponse::from).collect()))
}
