//! Access Domain
//!
//! Answers the two questions every mutating operation asks before it runs:
//! "may this principal act as an insurer?" and "is this principal the holder
//! of that policy?".
//!
//! The principal that initializes the system becomes its owner. The owner is
//! always an authorized insurer and is the only principal that can authorize
//! further insurers. There is no removal operation.
//!
//! ```rust,ignore
//! let guard = AuthorizationGuard::initialize(store, owner).await?;
//! guard.add_insurer(owner, insurer).await?;
//! guard.ensure_insurer(insurer, "issue_policy").await?;
//! ```

pub mod guard;
pub mod ports;
pub mod error;

pub use guard::AuthorizationGuard;
pub use ports::{InsurerStore, memory::InMemoryInsurerStore};
pub use error::AccessError;
