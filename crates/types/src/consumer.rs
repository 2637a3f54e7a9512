//! Consumer identifiers

use serde::{Deserialize, Serialize};
use std::fmt;

/// Index of a consumer in `0..C`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConsumerId(usize);

impl ConsumerId {
    #[must_use]
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    /// Row index into the ledger tables
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }

    /// Iterate over the first `count` consumer ids
    pub fn all(count: usize) -> impl Iterator<Item = Self> {
        (0..count).map(Self)
    }
}

impl From<usize> for ConsumerId {
    fn from(index: usize) -> Self {
        Self(index)
    }
}

impl fmt::Display for ConsumerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "consumer {}", self.0)
    }
}
