use banker_types::{LedgerSnapshot, ResourceVector};
use serde::{Deserialize, Serialize};

/// Notifications describing the shared ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LedgerEvent {
    /// The ledger was constructed
    Initialized {
        capacity: ResourceVector,
        maxima: Vec<ResourceVector>,
        snapshot: LedgerSnapshot,
    },

    /// A request or release was committed
    StateChanged { snapshot: LedgerSnapshot },
}

impl LedgerEvent {
    #[must_use]
    pub fn snapshot(&self) -> &LedgerSnapshot {
        match self {
            Self::Initialized { snapshot, .. } | Self::StateChanged { snapshot } => snapshot,
        }
    }
}
