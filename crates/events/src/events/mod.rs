use serde::{Deserialize, Serialize};

use crate::EventSource;
use banker_errors::UserFacingError;

/// Structured failure information shared across domains.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureContext {
    /// Stable error code, when the error provides one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Short user-facing message.
    pub message: String,
    /// Optional remediation hint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    /// Whether retrying the operation might succeed.
    pub retryable: bool,
}

impl FailureContext {
    /// Construct a new failure context.
    #[must_use]
    pub fn new(
        code: Option<impl Into<String>>,
        message: impl Into<String>,
        hint: Option<impl Into<String>>,
        retryable: bool,
    ) -> Self {
        Self {
            code: code.map(Into::into),
            message: message.into(),
            hint: hint.map(Into::into),
            retryable,
        }
    }

    /// Build failure context from a `UserFacingError` implementation.
    #[must_use]
    pub fn from_error<E: UserFacingError + ?Sized>(error: &E) -> Self {
        Self::new(
            error.user_code(),
            error.user_message().into_owned(),
            error.user_hint(),
            error.is_retryable(),
        )
    }
}

pub mod allocation;
pub mod general;
pub mod ledger;
pub mod lifecycle;

pub use allocation::*;
pub use general::*;
pub use ledger::*;
pub use lifecycle::*;

/// Top-level application event enum that aggregates all domain-specific events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "domain", content = "event", rename_all = "snake_case")]
pub enum AppEvent {
    /// General utility events (warnings, errors, debug output)
    General(GeneralEvent),

    /// Request/release outcomes reported by consumers
    Allocation(AllocationEvent),

    /// State-change notifications published by the allocator
    Ledger(LedgerEvent),

    /// Consumer start/stop and shutdown
    Lifecycle(LifecycleEvent),
}

impl AppEvent {
    /// Identify the source domain for this event (used for metadata/logging).
    #[must_use]
    pub fn event_source(&self) -> EventSource {
        match self {
            Self::General(_) => EventSource::GENERAL,
            Self::Allocation(_) => EventSource::ALLOCATOR,
            Self::Ledger(_) => EventSource::LEDGER,
            Self::Lifecycle(_) => EventSource::LIFECYCLE,
        }
    }

    /// Determine the appropriate tracing log level for this event
    #[must_use]
    pub fn log_level(&self) -> tracing::Level {
        use tracing::Level;

        match self {
            Self::General(GeneralEvent::Error { .. }) => Level::ERROR,

            Self::General(GeneralEvent::Warning { .. })
            | Self::Allocation(AllocationEvent::ReleaseFailed { .. }) => Level::WARN,

            // Denials are expected outcomes, not anomalies
            Self::Allocation(AllocationEvent::Requested { .. })
            | Self::Ledger(LedgerEvent::StateChanged { .. }) => Level::DEBUG,

            _ => Level::INFO,
        }
    }

    /// Get the log target for this event (for structured logging)
    #[must_use]
    pub fn log_target(&self) -> &'static str {
        match self {
            Self::General(_) => "banker::events::general",
            Self::Allocation(_) => "banker::events::allocation",
            Self::Ledger(_) => "banker::events::ledger",
            Self::Lifecycle(_) => "banker::events::lifecycle",
        }
    }
}
