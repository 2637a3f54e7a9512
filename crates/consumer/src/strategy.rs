//! Policies for generating candidate requests
//!
//! A strategy only proposes vectors; the allocator decides. Every proposal
//! is bounded component-wise by the need it was given.

use banker_types::ResourceVector;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Source of candidate requests for one consumer
pub trait RequestStrategy: Send {
    /// Propose a request no larger than `need` in any component
    fn next_request(&mut self, need: &ResourceVector) -> ResourceVector;
}

/// Draw each component uniformly from `[0, need[j]]`
#[derive(Debug)]
pub struct UniformStrategy {
    rng: StdRng,
}

impl UniformStrategy {
    /// Seed from the operating system
    #[must_use]
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    /// Reproducible draws
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl RequestStrategy for UniformStrategy {
    fn next_request(&mut self, need: &ResourceVector) -> ResourceVector {
        need.iter()
            .map(|remaining| {
                if remaining == 0 {
                    0
                } else {
                    self.rng.random_range(0..=remaining)
                }
            })
            .collect()
    }
}

/// Replay a fixed list of requests in a cycle, clamped to the current need
#[derive(Debug, Clone)]
pub struct ScriptedStrategy {
    script: Vec<ResourceVector>,
    cursor: usize,
}

impl ScriptedStrategy {
    #[must_use]
    pub fn new(script: Vec<ResourceVector>) -> Self {
        Self { script, cursor: 0 }
    }
}

impl RequestStrategy for ScriptedStrategy {
    fn next_request(&mut self, need: &ResourceVector) -> ResourceVector {
        let Some(next) = self.script.get(self.cursor) else {
            return ResourceVector::zeros(need.len());
        };
        self.cursor = (self.cursor + 1) % self.script.len();

        need.iter()
            .enumerate()
            .map(|(resource, remaining)| next.get(resource).unwrap_or(0).min(remaining))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_stays_within_need() {
        let mut strategy = UniformStrategy::seeded(7);
        let need = ResourceVector::from([7, 0, 3]);
        for _ in 0..500 {
            let request = strategy.next_request(&need);
            assert!(request.fits_within(&need), "{request} exceeds {need}");
            assert_eq!(request[1], 0);
        }
    }

    #[test]
    fn test_uniform_is_reproducible() {
        let need = ResourceVector::from([9, 9, 9]);
        let mut a = UniformStrategy::seeded(42);
        let mut b = UniformStrategy::seeded(42);
        for _ in 0..20 {
            assert_eq!(a.next_request(&need), b.next_request(&need));
        }
    }

    #[test]
    fn test_scripted_cycles_and_clamps() {
        let mut strategy = ScriptedStrategy::new(vec![
            ResourceVector::from([5, 1]),
            ResourceVector::from([0, 2]),
        ]);
        let need = ResourceVector::from([3, 3]);
        assert_eq!(strategy.next_request(&need), ResourceVector::from([3, 1]));
        assert_eq!(strategy.next_request(&need), ResourceVector::from([0, 2]));
        assert_eq!(strategy.next_request(&need), ResourceVector::from([3, 1]));
    }

    #[test]
    fn test_empty_script_requests_nothing() {
        let mut strategy = ScriptedStrategy::new(Vec::new());
        assert!(strategy.next_request(&ResourceVector::from([2])).is_zero());
    }
}
