//! Claim Registry Domain
//!
//! Accepts claims against active policies, records insurer decisions, and
//! releases funds through the [`FundTransferPort`].
//!
//! # Claim Lifecycle
//!
//! ```text
//! Submitted -> Approved -> Paid
//!     |
//!     +------> Rejected
//! ```
//!
//! Rejected and Paid are terminal. See [`PayoutOrdering`] for what a failed
//! transfer does to a claim that was already marked Paid.

pub mod claim;
pub mod events;
pub mod error;
pub mod ports;
pub mod registry;

pub use claim::{Claim, ClaimStatus};
pub use events::ClaimEvent;
pub use error::ClaimError;
pub use ports::{
    ClaimStore, FundTransferPort, TransferError, TransferReceipt,
    memory::{InMemoryClaimStore, InMemoryFundLedger},
};
pub use registry::{ClaimRegistry, ClaimRegistryConfig, PayoutOrdering};
