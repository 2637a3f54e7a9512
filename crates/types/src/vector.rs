//! Per-resource-type count vectors

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Index;

/// An ordered sequence of unit counts, one per resource type.
///
/// Used for capacity, available units, and each consumer's maximum,
/// allocation and need. All component-wise comparisons treat vectors of
/// different lengths as incomparable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceVector(Vec<u32>);

impl ResourceVector {
    /// Create a vector from explicit counts
    #[must_use]
    pub fn new(counts: Vec<u32>) -> Self {
        Self(counts)
    }

    /// Create an all-zero vector with `len` resource types
    #[must_use]
    pub fn zeros(len: usize) -> Self {
        Self(vec![0; len])
    }

    /// Number of resource types
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Count for resource type `index`, if present
    #[must_use]
    pub fn get(&self, index: usize) -> Option<u32> {
        self.0.get(index).copied()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[u32] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.0.iter().copied()
    }

    /// True when every component is zero
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|&count| count == 0)
    }

    /// Component-wise `self <= other`
    #[must_use]
    pub fn fits_within(&self, other: &Self) -> bool {
        self.len() == other.len() && self.first_exceeding(other).is_none()
    }

    /// Index of the first resource type where `self` exceeds `other`
    ///
    /// Only the common prefix is compared; callers check arity separately.
    #[must_use]
    pub fn first_exceeding(&self, other: &Self) -> Option<usize> {
        self.0
            .iter()
            .zip(other.0.iter())
            .position(|(lhs, rhs)| lhs > rhs)
    }

    /// Component-wise sum, `None` on arity mismatch or overflow
    #[must_use]
    pub fn checked_add(&self, other: &Self) -> Option<Self> {
        if self.len() != other.len() {
            return None;
        }
        self.0
            .iter()
            .zip(other.0.iter())
            .map(|(lhs, rhs)| lhs.checked_add(*rhs))
            .collect::<Option<Vec<_>>>()
            .map(Self)
    }

    /// Component-wise difference, `None` on arity mismatch or underflow
    #[must_use]
    pub fn checked_sub(&self, other: &Self) -> Option<Self> {
        if self.len() != other.len() {
            return None;
        }
        self.0
            .iter()
            .zip(other.0.iter())
            .map(|(lhs, rhs)| lhs.checked_sub(*rhs))
            .collect::<Option<Vec<_>>>()
            .map(Self)
    }

    /// Sum a set of vectors of the given arity, `None` on mismatch or overflow
    pub fn sum<'a>(len: usize, vectors: impl IntoIterator<Item = &'a Self>) -> Option<Self> {
        vectors
            .into_iter()
            .try_fold(Self::zeros(len), |acc, vector| acc.checked_add(vector))
    }
}

impl From<Vec<u32>> for ResourceVector {
    fn from(counts: Vec<u32>) -> Self {
        Self(counts)
    }
}

impl<const N: usize> From<[u32; N]> for ResourceVector {
    fn from(counts: [u32; N]) -> Self {
        Self(counts.to_vec())
    }
}

impl FromIterator<u32> for ResourceVector {
    fn from_iter<I: IntoIterator<Item = u32>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Index<usize> for ResourceVector {
    type Output = u32;

    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

impl fmt::Display for ResourceVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, count) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{count}")?;
        }
        write!(f, "]")
    }
}
