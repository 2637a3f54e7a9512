//! The shared resource-accounting state
//!
//! A [`Ledger`] records how many units of each resource type exist, how
//! many are free, and for every consumer its declared maximum, current
//! allocation and remaining need. Only the [`Allocator`](crate::Allocator)
//! mutates it; everyone else gets read access.

use banker_errors::{AllocationError, ConfigError};
use banker_types::{ConsumerAllocation, ConsumerId, LedgerSnapshot, ResourceVector};
use thiserror::Error;

use crate::safety;

/// A broken ledger invariant, as reported by [`Ledger::check_invariants`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    #[error(
        "resource {resource}: available {available} plus allocated {allocated} \
         differs from capacity {capacity}"
    )]
    Conservation {
        resource: usize,
        available: u64,
        allocated: u64,
        capacity: u32,
    },

    #[error("consumer {consumer}, resource {resource}: allocation plus need differs from maximum")]
    NeedMismatch { consumer: usize, resource: usize },

    #[error("consumer {consumer}, resource {resource}: allocation exceeds maximum")]
    AllocationExceedsMaximum { consumer: usize, resource: usize },

    #[error("ledger is not in a safe state")]
    Unsafe,
}

/// Available units, per-consumer maxima, allocations and needs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ledger {
    capacity: ResourceVector,
    available: ResourceVector,
    maximum: Vec<ResourceVector>,
    allocation: Vec<ResourceVector>,
    need: Vec<ResourceVector>,
    version: u64,
}

impl Ledger {
    /// Create a ledger with nothing allocated
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if there are no resource types or consumers,
    /// if a maximum row has the wrong number of resource types, or if any
    /// maximum exceeds the capacity of its resource type.
    pub fn new(
        capacity: ResourceVector,
        maximum: Vec<ResourceVector>,
    ) -> Result<Self, ConfigError> {
        validate_shape(&capacity, &maximum)?;

        let need = maximum.clone();
        let allocation = vec![ResourceVector::zeros(capacity.len()); maximum.len()];
        Ok(Self {
            available: capacity.clone(),
            capacity,
            maximum,
            allocation,
            need,
            version: 0,
        })
    }

    /// Create a ledger with an explicit starting allocation
    ///
    /// The resulting state must satisfy every ledger invariant, safety
    /// included.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` for any shape or bound violation, if the
    /// allocations add up to more than the capacity, or with
    /// `UnsafeInitialState` if the resulting state is unsafe.
    pub fn with_allocation(
        capacity: ResourceVector,
        maximum: Vec<ResourceVector>,
        allocation: Vec<ResourceVector>,
    ) -> Result<Self, ConfigError> {
        validate_shape(&capacity, &maximum)?;
        if allocation.len() != maximum.len() {
            return Err(ConfigError::Invalid {
                message: format!(
                    "{} allocation rows for {} consumers",
                    allocation.len(),
                    maximum.len()
                ),
            });
        }

        let mut need = Vec::with_capacity(maximum.len());
        for (consumer, (max, held)) in maximum.iter().zip(&allocation).enumerate() {
            if held.len() != capacity.len() {
                return Err(ConfigError::DimensionMismatch {
                    what: format!("allocation row {consumer}"),
                    expected: capacity.len(),
                    actual: held.len(),
                });
            }
            let remaining = max.checked_sub(held).ok_or_else(|| ConfigError::Invalid {
                message: format!("allocation of consumer {consumer} exceeds its maximum"),
            })?;
            need.push(remaining);
        }

        let available = ResourceVector::sum(capacity.len(), &allocation)
            .and_then(|allocated| capacity.checked_sub(&allocated))
            .ok_or_else(|| ConfigError::Invalid {
                message: "allocations exceed capacity".to_string(),
            })?;

        let ledger = Self {
            capacity,
            available,
            maximum,
            allocation,
            need,
            version: 0,
        };
        if !safety::is_safe(&ledger) {
            return Err(ConfigError::UnsafeInitialState);
        }
        Ok(ledger)
    }

    /// Total units per resource type
    #[must_use]
    pub fn capacity(&self) -> &ResourceVector {
        &self.capacity
    }

    /// Units not allocated to any consumer
    #[must_use]
    pub fn available(&self) -> &ResourceVector {
        &self.available
    }

    #[must_use]
    pub fn maximum(&self, consumer: ConsumerId) -> Option<&ResourceVector> {
        self.maximum.get(consumer.index())
    }

    #[must_use]
    pub fn allocation(&self, consumer: ConsumerId) -> Option<&ResourceVector> {
        self.allocation.get(consumer.index())
    }

    #[must_use]
    pub fn need(&self, consumer: ConsumerId) -> Option<&ResourceVector> {
        self.need.get(consumer.index())
    }

    /// Every consumer's maximum, in index order
    #[must_use]
    pub fn maxima(&self) -> &[ResourceVector] {
        &self.maximum
    }

    /// Every consumer's allocation, in index order
    #[must_use]
    pub fn allocations(&self) -> &[ResourceVector] {
        &self.allocation
    }

    /// Every consumer's need, in index order
    #[must_use]
    pub fn needs(&self) -> &[ResourceVector] {
        &self.need
    }

    /// Number of consumers (C)
    #[must_use]
    pub fn consumers(&self) -> usize {
        self.maximum.len()
    }

    /// Number of resource types (R)
    #[must_use]
    pub fn resource_types(&self) -> usize {
        self.capacity.len()
    }

    /// Number of committed mutations so far
    #[must_use]
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Copy of the current state for notifications
    #[must_use]
    pub fn snapshot(&self) -> LedgerSnapshot {
        let holders = self
            .allocation
            .iter()
            .enumerate()
            .filter(|(_, held)| !held.is_zero())
            .map(|(index, held)| ConsumerAllocation {
                consumer: ConsumerId::new(index),
                allocation: held.clone(),
            })
            .collect();

        LedgerSnapshot {
            version: self.version,
            available: self.available.clone(),
            holders,
        }
    }

    /// Verify all four ledger invariants
    ///
    /// # Errors
    ///
    /// Returns the first violated invariant.
    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        for resource in 0..self.resource_types() {
            let allocated: u64 = self
                .allocation
                .iter()
                .map(|held| u64::from(held[resource]))
                .sum();
            let available = u64::from(self.available[resource]);
            if available + allocated != u64::from(self.capacity[resource]) {
                return Err(InvariantViolation::Conservation {
                    resource,
                    available,
                    allocated,
                    capacity: self.capacity[resource],
                });
            }
        }

        for consumer in 0..self.consumers() {
            for resource in 0..self.resource_types() {
                let held = self.allocation[consumer][resource];
                let max = self.maximum[consumer][resource];
                if held > max {
                    return Err(InvariantViolation::AllocationExceedsMaximum { consumer, resource });
                }
                if u64::from(held) + u64::from(self.need[consumer][resource]) != u64::from(max) {
                    return Err(InvariantViolation::NeedMismatch { consumer, resource });
                }
            }
        }

        if !safety::is_safe(self) {
            return Err(InvariantViolation::Unsafe);
        }
        Ok(())
    }

    /// Reject operands that do not address this ledger
    pub(crate) fn check_operands(
        &self,
        consumer: ConsumerId,
        vector: &ResourceVector,
    ) -> Result<(), AllocationError> {
        if consumer.index() >= self.consumers() {
            return Err(AllocationError::UnknownConsumer {
                consumer: consumer.index(),
                consumers: self.consumers(),
            });
        }
        if vector.len() != self.resource_types() {
            return Err(AllocationError::DimensionMismatch {
                expected: self.resource_types(),
                actual: vector.len(),
            });
        }
        Ok(())
    }

    /// Move `amount` from the pool to `consumer`
    ///
    /// Either all three rows change or none do. Returns `false` when the
    /// transfer would underflow `available` or `need`.
    pub(crate) fn transfer_to(&mut self, consumer: usize, amount: &ResourceVector) -> bool {
        let (Some(held), Some(need)) = (self.allocation.get(consumer), self.need.get(consumer))
        else {
            return false;
        };
        let (Some(available), Some(held), Some(need)) = (
            self.available.checked_sub(amount),
            held.checked_add(amount),
            need.checked_sub(amount),
        ) else {
            return false;
        };

        self.available = available;
        self.allocation[consumer] = held;
        self.need[consumer] = need;
        true
    }

    /// Move `amount` from `consumer` back to the pool
    ///
    /// Exact inverse of [`Ledger::transfer_to`].
    pub(crate) fn transfer_from(&mut self, consumer: usize, amount: &ResourceVector) -> bool {
        let (Some(held), Some(need)) = (self.allocation.get(consumer), self.need.get(consumer))
        else {
            return false;
        };
        let (Some(available), Some(held), Some(need)) = (
            self.available.checked_add(amount),
            held.checked_sub(amount),
            need.checked_add(amount),
        ) else {
            return false;
        };

        self.available = available;
        self.allocation[consumer] = held;
        self.need[consumer] = need;
        true
    }

    /// Mark the current tentative state as committed
    pub(crate) fn commit(&mut self) -> u64 {
        self.version += 1;
        self.version
    }
}

fn validate_shape(
    capacity: &ResourceVector,
    maximum: &[ResourceVector],
) -> Result<(), ConfigError> {
    if capacity.is_empty() {
        return Err(ConfigError::Invalid {
            message: "at least one resource type is required".to_string(),
        });
    }
    if maximum.is_empty() {
        return Err(ConfigError::Invalid {
            message: "at least one consumer is required".to_string(),
        });
    }

    for (consumer, row) in maximum.iter().enumerate() {
        if row.len() != capacity.len() {
            return Err(ConfigError::DimensionMismatch {
                what: format!("maximum row {consumer}"),
                expected: capacity.len(),
                actual: row.len(),
            });
        }
        if let Some(resource) = row.first_exceeding(capacity) {
            return Err(ConfigError::MaximumExceedsCapacity {
                consumer,
                resource,
                maximum: row[resource],
                capacity: capacity[resource],
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(values: &[[u32; 3]]) -> Vec<ResourceVector> {
        values.iter().map(|row| ResourceVector::from(*row)).collect()
    }

    fn classic() -> Ledger {
        Ledger::with_allocation(
            ResourceVector::from([10, 5, 7]),
            rows(&[[7, 5, 3], [3, 2, 2], [9, 0, 2], [2, 2, 2], [4, 3, 3]]),
            rows(&[[0, 1, 0], [2, 0, 0], [3, 0, 2], [2, 1, 1], [0, 0, 2]]),
        )
        .unwrap()
    }

    #[test]
    fn test_new_ledger_starts_unallocated() {
        let ledger = Ledger::new(
            ResourceVector::from([10, 5, 7]),
            rows(&[[7, 5, 3], [3, 2, 2]]),
        )
        .unwrap();

        assert_eq!(ledger.available(), &ResourceVector::from([10, 5, 7]));
        assert!(ledger.allocations().iter().all(ResourceVector::is_zero));
        assert_eq!(ledger.needs(), ledger.maxima());
        assert_eq!(ledger.version(), 0);
        ledger.check_invariants().unwrap();
    }

    #[test]
    fn test_classic_derived_rows() {
        let ledger = classic();
        assert_eq!(ledger.available(), &ResourceVector::from([3, 3, 2]));
        assert_eq!(
            ledger.needs(),
            rows(&[[7, 4, 3], [1, 2, 2], [6, 0, 0], [0, 1, 1], [4, 3, 1]]).as_slice()
        );
        ledger.check_invariants().unwrap();
    }

    #[test]
    fn test_maximum_above_capacity_rejected() {
        let err = Ledger::new(ResourceVector::from([3, 3]), rows2(&[[1, 1], [0, 4]])).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::MaximumExceedsCapacity {
                consumer: 1,
                resource: 1,
                maximum: 4,
                capacity: 3
            }
        ));
    }

    #[test]
    fn test_dimension_mismatch_rejected() {
        let err = Ledger::new(
            ResourceVector::from([3, 3, 3]),
            vec![ResourceVector::from([1, 1])],
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::DimensionMismatch {
                expected: 3,
                actual: 2,
                ..
            }
        ));
    }

    #[test]
    fn test_empty_shapes_rejected() {
        assert!(Ledger::new(ResourceVector::zeros(0), Vec::new()).is_err());
        assert!(Ledger::new(ResourceVector::from([1]), Vec::new()).is_err());
    }

    #[test]
    fn test_all_zero_maximum_is_legal() {
        let ledger = Ledger::new(
            ResourceVector::from([4, 4]),
            vec![ResourceVector::zeros(2), ResourceVector::from([4, 4])],
        )
        .unwrap();
        assert!(ledger.need(ConsumerId::new(0)).unwrap().is_zero());
        ledger.check_invariants().unwrap();
    }

    #[test]
    fn test_unsafe_initial_allocation_rejected() {
        // Both consumers hold one unit and each still needs two more
        let err = Ledger::with_allocation(
            ResourceVector::from([2]),
            vec![ResourceVector::from([2]), ResourceVector::from([2])],
            vec![ResourceVector::from([1]), ResourceVector::from([1])],
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::UnsafeInitialState));
    }

    #[test]
    fn test_over_allocation_rejected() {
        let err = Ledger::with_allocation(
            ResourceVector::from([2]),
            vec![ResourceVector::from([2]), ResourceVector::from([2])],
            vec![ResourceVector::from([2]), ResourceVector::from([1])],
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }

    #[test]
    fn test_transfer_round_trip_is_exact() {
        let mut ledger = classic();
        let before = ledger.clone();
        let amount = ResourceVector::from([1, 0, 2]);

        assert!(ledger.transfer_to(1, &amount));
        assert_eq!(ledger.available(), &ResourceVector::from([2, 3, 0]));
        assert!(ledger.transfer_from(1, &amount));
        assert_eq!(ledger, before);
    }

    #[test]
    fn test_transfer_refuses_underflow_without_mutation() {
        let mut ledger = classic();
        let before = ledger.clone();

        assert!(!ledger.transfer_to(1, &ResourceVector::from([4, 0, 0])));
        assert!(!ledger.transfer_from(0, &ResourceVector::from([0, 2, 0])));
        assert!(!ledger.transfer_to(9, &ResourceVector::from([0, 0, 0])));
        assert_eq!(ledger, before);
    }

    #[test]
    fn test_snapshot_lists_only_holders() {
        let ledger = classic();
        let snapshot = ledger.snapshot();
        assert_eq!(snapshot.available, ResourceVector::from([3, 3, 2]));
        let holders: Vec<_> = snapshot
            .holders
            .iter()
            .map(|holder| holder.consumer.index())
            .collect();
        assert_eq!(holders, vec![0, 1, 2, 3, 4]);

        let fresh = Ledger::new(ResourceVector::from([1]), vec![ResourceVector::from([1])])
            .unwrap()
            .snapshot();
        assert!(fresh.holders.is_empty());
    }

    #[test]
    fn test_check_operands() {
        let ledger = classic();
        assert_eq!(
            ledger.check_operands(ConsumerId::new(5), &ResourceVector::zeros(3)),
            Err(AllocationError::UnknownConsumer {
                consumer: 5,
                consumers: 5
            })
        );
        assert_eq!(
            ledger.check_operands(ConsumerId::new(0), &ResourceVector::zeros(2)),
            Err(AllocationError::DimensionMismatch {
                expected: 3,
                actual: 2
            })
        );
    }

    fn rows2(values: &[[u32; 2]]) -> Vec<ResourceVector> {
        values.iter().map(|row| ResourceVector::from(*row)).collect()
    }
}
