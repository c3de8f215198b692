//! Request handlers, one module per resource

pub mod claims;
pub mod health;
pub mod insurers;
pub mod policy;
