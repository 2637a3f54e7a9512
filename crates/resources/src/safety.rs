//! Banker's safety check
//!
//! A ledger is safe when some order exists in which every consumer can
//! obtain its full remaining need from the free pool, finish, and hand back
//! everything it holds. The check works on a scratch copy of the free pool
//! and never touches the ledger itself.

use banker_types::ConsumerId;

use crate::Ledger;

/// Whether every consumer can eventually finish
#[must_use]
pub fn is_safe(ledger: &Ledger) -> bool {
    safe_sequence(ledger).is_some()
}

/// A completion order proving the ledger safe, scanning consumers by index
#[must_use]
pub fn safe_sequence(ledger: &Ledger) -> Option<Vec<ConsumerId>> {
    let order: Vec<ConsumerId> = ConsumerId::all(ledger.consumers()).collect();
    safe_sequence_in_order(ledger, &order)
}

/// A completion order found by scanning consumers in `order`
///
/// Each pass walks `order` once and finishes every consumer whose need fits
/// in the accumulated pool; passes repeat until one makes no progress.
/// Since the pool only grows, the set of consumers that end up finished
/// does not depend on `order`, only the returned sequence does. Consumers
/// missing from `order` are never finished, so the result is `None` unless
/// `order` covers all of them.
#[must_use]
pub fn safe_sequence_in_order(ledger: &Ledger, order: &[ConsumerId]) -> Option<Vec<ConsumerId>> {
    let needs = ledger.needs();
    let allocations = ledger.allocations();

    let mut work = ledger.available().clone();
    let mut finished = vec![false; ledger.consumers()];
    let mut sequence = Vec::with_capacity(ledger.consumers());

    loop {
        let mut progressed = false;
        for &consumer in order {
            let index = consumer.index();
            if finished.get(index).copied().unwrap_or(true) {
                continue;
            }
            if !needs[index].fits_within(&work) {
                continue;
            }
            // The pool never exceeds capacity, so this cannot overflow
            work = work.checked_add(&allocations[index])?;
            finished[index] = true;
            sequence.push(consumer);
            progressed = true;
        }
        if !progressed {
            break;
        }
    }

    (sequence.len() == ledger.consumers()).then_some(sequence)
}

#[cfg(test)]
mod tests {
    use super::*;
    use banker_types::ResourceVector;

    fn rows(values: &[[u32; 3]]) -> Vec<ResourceVector> {
        values.iter().map(|row| ResourceVector::from(*row)).collect()
    }

    fn classic_maxima() -> Vec<ResourceVector> {
        rows(&[[7, 5, 3], [3, 2, 2], [9, 0, 2], [2, 2, 2], [4, 3, 3]])
    }

    fn classic() -> Ledger {
        Ledger::with_allocation(
            ResourceVector::from([10, 5, 7]),
            classic_maxima(),
            rows(&[[0, 1, 0], [2, 0, 0], [3, 0, 2], [2, 1, 1], [0, 0, 2]]),
        )
        .unwrap()
    }

    fn ids(indices: &[usize]) -> Vec<ConsumerId> {
        indices.iter().copied().map(ConsumerId::new).collect()
    }

    fn permutations(items: &[usize]) -> Vec<Vec<usize>> {
        if items.len() <= 1 {
            return vec![items.to_vec()];
        }
        let mut out = Vec::new();
        for (i, &head) in items.iter().enumerate() {
            let mut rest = items.to_vec();
            rest.remove(i);
            for mut tail in permutations(&rest) {
                tail.insert(0, head);
                out.push(tail);
            }
        }
        out
    }

    /// Replay a sequence and confirm each step is actually finishable
    fn assert_valid_sequence(ledger: &Ledger, sequence: &[ConsumerId]) {
        let mut work = ledger.available().clone();
        for consumer in sequence {
            let need = ledger.need(*consumer).unwrap();
            assert!(need.fits_within(&work), "{consumer} cannot finish");
            work = work
                .checked_add(ledger.allocation(*consumer).unwrap())
                .unwrap();
        }
        assert_eq!(&work, ledger.capacity());
    }

    #[test]
    fn test_classic_state_is_safe() {
        let ledger = classic();
        let sequence = safe_sequence(&ledger).unwrap();
        assert_eq!(sequence, ids(&[1, 3, 4, 0, 2]));
        assert_valid_sequence(&ledger, &sequence);
        assert!(is_safe(&ledger));
    }

    #[test]
    fn test_unsafe_state_detected() {
        // Classic state after granting consumer 1 [1,0,2] and consumer 0 [0,2,0]
        let mut tentative = classic();
        assert!(tentative.transfer_to(1, &ResourceVector::from([1, 0, 2])));
        assert!(is_safe(&tentative));
        assert!(tentative.transfer_to(0, &ResourceVector::from([0, 2, 0])));

        assert!(!is_safe(&tentative));
        assert_eq!(safe_sequence(&tentative), None);
    }

    #[test]
    fn test_verdict_is_independent_of_scan_order() {
        let safe = classic();
        let mut unsafe_state = classic();
        assert!(unsafe_state.transfer_to(1, &ResourceVector::from([1, 0, 2])));
        assert!(unsafe_state.transfer_to(0, &ResourceVector::from([0, 2, 0])));

        for order in permutations(&[0, 1, 2, 3, 4]) {
            let order = ids(&order);
            let sequence = safe_sequence_in_order(&safe, &order)
                .unwrap_or_else(|| panic!("order {order:?} reported unsafe"));
            assert_valid_sequence(&safe, &sequence);
            assert_eq!(safe_sequence_in_order(&unsafe_state, &order), None);
        }
    }

    #[test]
    fn test_partial_order_never_finishes_everyone() {
        let ledger = classic();
        assert_eq!(safe_sequence_in_order(&ledger, &ids(&[0, 1, 2, 3])), None);
    }

    #[test]
    fn test_oracle_does_not_mutate() {
        let ledger = classic();
        let before = ledger.clone();
        let _ = safe_sequence(&ledger);
        assert_eq!(ledger, before);
    }

    #[test]
    fn test_zero_maximum_consumer_finishes_immediately() {
        let ledger = Ledger::new(
            ResourceVector::from([0, 0, 0]),
            vec![ResourceVector::zeros(3)],
        )
        .unwrap();
        assert_eq!(safe_sequence(&ledger), Some(ids(&[0])));
    }
}
