//! Validated state machines for both order lifecycles.
//!
//! Every status change, including the generic status patch, goes through
//! one of these machines, which
//! check the transition against a closed table before persisting. A
//! transition to the current status is legal and idempotent, so re-applying
//! the same patch twice converges instead of erroring.

pub mod service;
pub mod supply;

pub use service::{ServiceOrderStateMachine, ServiceStateError};
pub use supply::{SupplyOrderStateMachine, SupplyStateError};
