//! Insurer DTOs

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use core_kernel::Principal;

#[derive(Debug, Deserialize)]
pub struct AddInsurerRequest {
    pub insurer: Uuid,
}

#[derive(Debug, Serialize)]
pub struct InsurersResponse {
    pub owner: Principal,
    pub insurers: Vec<Principal>,
}
