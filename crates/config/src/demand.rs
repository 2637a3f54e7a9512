//! Assigning each consumer's maximum demand at startup

use banker_errors::ConfigError;
use banker_types::ResourceVector;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::settings::{DemandConfig, MaximumPolicy};

/// Produce one maximum row per consumer according to `demand`
///
/// Random rows are drawn uniformly in `[0, capacity[j]]`, so an all-zero
/// row is possible and legal. Table rows must match the consumer count
/// and the number of resource types and stay within capacity.
///
/// # Errors
///
/// Returns a `ConfigError` if a table does not fit `capacity` and
/// `consumers`.
pub fn assign_maxima(
    capacity: &ResourceVector,
    consumers: usize,
    demand: &DemandConfig,
    seed: Option<u64>,
) -> Result<Vec<ResourceVector>, ConfigError> {
    match demand.policy {
        MaximumPolicy::Random => {
            let mut rng = seed.map_or_else(StdRng::from_os_rng, StdRng::seed_from_u64);
            Ok((0..consumers)
                .map(|_| {
                    capacity
                        .iter()
                        .map(|cap| rng.random_range(0..=cap))
                        .collect()
                })
                .collect())
        }
        MaximumPolicy::Table => {
            if demand.maxima.len() != consumers {
                return Err(ConfigError::InvalidValue {
                    field: "demand.maxima".to_string(),
                    value: format!("{} rows for {consumers} consumers", demand.maxima.len()),
                });
            }
            demand
                .maxima
                .iter()
                .enumerate()
                .map(|(consumer, row)| {
                    let row = ResourceVector::new(row.clone());
                    if row.len() != capacity.len() {
                        return Err(ConfigError::DimensionMismatch {
                            what: format!("demand.maxima row {consumer}"),
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
                    Ok(row)
                })
                .collect()
        }
    }
}
