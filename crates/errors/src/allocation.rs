//! Allocation protocol error types
//!
//! These are caller bugs, not denials. A request that is merely refused is
//! reported through `RequestOutcome::Denied` instead.

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AllocationError {
    #[error("unknown consumer {consumer} (ledger has {consumers} consumers)")]
    UnknownConsumer { consumer: usize, consumers: usize },

    #[error("vector has {actual} resource types, ledger has {expected}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error(
        "consumer {consumer} released {released} units of resource {resource} \
         but holds {held}"
    )]
    ExceedsAllocation {
        consumer: usize,
        resource: usize,
        released: u32,
        held: u32,
    },

    #[error("ledger lock poisoned")]
    LockPoisoned,
}

impl UserFacingError for AllocationError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::ExceedsAllocation { .. } => {
                Some("Release exactly the vector that was granted.")
            }
            Self::LockPoisoned => Some("A previous operation panicked; restart the allocator."),
            _ => None,
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::UnknownConsumer { .. } => "allocation.unknown_consumer",
            Self::DimensionMismatch { .. } => "allocation.dimension_mismatch",
            Self::ExceedsAllocation { .. } => "allocation.exceeds_allocation",
            Self::LockPoisoned => "allocation.lock_poisoned",
        };
        Some(code)
    }
}
