//! Point-in-time copies of the ledger carried by notifications

use crate::{ConsumerId, ResourceVector};
use serde::{Deserialize, Serialize};

/// A consumer currently holding a non-zero allocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsumerAllocation {
    pub consumer: ConsumerId,
    pub allocation: ResourceVector,
}

/// State captured right after a committed mutation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    /// Sequence number of the commit that produced this snapshot
    pub version: u64,
    /// Units not allocated to any consumer
    pub available: ResourceVector,
    /// Consumers with a non-zero allocation, in index order
    pub holders: Vec<ConsumerAllocation>,
}

impl LedgerSnapshot {
    /// Whether two snapshots describe the same allocation state
    ///
    /// The version is ignored.
    #[must_use]
    pub fn same_state(&self, other: &Self) -> bool {
        self.available == other.available && self.holders == other.holders
    }

    /// Allocation held by `consumer` in this snapshot (zero when absent)
    #[must_use]
    pub fn allocation_of(&self, consumer: ConsumerId) -> ResourceVector {
        self.holders
            .iter()
            .find(|holder| holder.consumer == consumer)
            .map_or_else(
                || ResourceVector::zeros(self.available.len()),
                |holder| holder.allocation.clone(),
            )
    }
}
