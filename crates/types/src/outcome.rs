//! Outcomes of allocation requests

use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a request was refused
///
/// These are expected, recoverable outcomes. A denied request never
/// changes the ledger; the consumer decides whether to retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DenialReason {
    /// The request exceeds the consumer's remaining need
    ExceedsMaxDemand,
    /// Not enough units are currently available
    InsufficientResources,
    /// Granting would leave the system in an unsafe state
    WouldBeUnsafe,
}

impl DenialReason {
    /// Stable identifier for reports and structured logs
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Self::ExceedsMaxDemand => "exceeds_max_demand",
            Self::InsufficientResources => "insufficient_resources",
            Self::WouldBeUnsafe => "would_be_unsafe",
        }
    }
}

impl fmt::Display for DenialReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ExceedsMaxDemand => write!(f, "exceeds maximum demand"),
            Self::InsufficientResources => write!(f, "insufficient resources"),
            Self::WouldBeUnsafe => write!(f, "would lead to an unsafe state"),
        }
    }
}

/// Terminal outcome of a single request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "reason", rename_all = "snake_case")]
pub enum RequestOutcome {
    Granted,
    Denied(DenialReason),
}

impl RequestOutcome {
    #[must_use]
    pub fn is_granted(self) -> bool {
        matches!(self, Self::Granted)
    }

    #[must_use]
    pub fn denial_reason(self) -> Option<DenialReason> {
        match self {
            Self::Granted => None,
            Self::Denied(reason) => Some(reason),
        }
    }
}

impl fmt::Display for RequestOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Granted => write!(f, "granted"),
            Self::Denied(reason) => write!(f, "denied ({reason})"),
        }
    }
}
