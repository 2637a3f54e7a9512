use banker_types::ConsumerId;
use serde::{Deserialize, Serialize};

/// Consumer lifecycle and shutdown events
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LifecycleEvent {
    /// A consumer actor began its loop
    ConsumerStarted { consumer: ConsumerId },

    /// A consumer actor left its loop
    ConsumerStopped {
        consumer: ConsumerId,
        attempts: u64,
        grants: u64,
    },

    /// Shutdown was signalled to all consumers
    ShutdownRequested { reason: String },
}
