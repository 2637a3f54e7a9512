use banker_types::{ConsumerId, RequestOutcome, ResourceVector};
use serde::{Deserialize, Serialize};

use super::FailureContext;

/// Call-site reports of request and release operations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AllocationEvent {
    /// A request completed with the given outcome
    Requested {
        consumer: ConsumerId,
        request: ResourceVector,
        outcome: RequestOutcome,
    },

    /// A release was committed
    Released {
        consumer: ConsumerId,
        released: ResourceVector,
    },

    /// A release was rejected without mutating the ledger
    ReleaseFailed {
        consumer: ConsumerId,
        released: ResourceVector,
        failure: FailureContext,
    },

    /// Everything a consumer held was returned to the pool
    Reclaimed {
        consumer: ConsumerId,
        reclaimed: ResourceVector,
    },
}

impl AllocationEvent {
    /// Consumer this event concerns
    #[must_use]
    pub fn consumer(&self) -> ConsumerId {
        match self {
            Self::Requested { consumer, .. }
            | Self::Released { consumer, .. }
            | Self::ReleaseFailed { consumer, .. }
            | Self::Reclaimed { consumer, .. } => *consumer,
        }
    }
}
