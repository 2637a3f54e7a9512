//! Request/release protocol around the shared ledger
//!
//! Every operation takes the ledger lock for its whole body and never
//! blocks or performs I/O while holding it. State-change notifications are
//! built under the lock and sent after it is released.

use std::sync::{Mutex, MutexGuard};

use banker_errors::{AllocationError, Error};
use banker_events::{AllocationEvent, AppEvent, EventEmitter, EventSender, LedgerEvent};
use banker_types::{ConsumerId, DenialReason, LedgerSnapshot, RequestOutcome, ResourceVector};
use tracing::{debug, trace, warn};

use crate::{safety, Ledger};

/// Grants and releases resources while keeping the ledger safe
#[derive(Debug)]
pub struct Allocator {
    ledger: Mutex<Ledger>,
    event_sender: Option<EventSender>,
}

impl Allocator {
    /// Take ownership of a ledger
    #[must_use]
    pub fn new(ledger: Ledger) -> Self {
        Self {
            ledger: Mutex::new(ledger),
            event_sender: None,
        }
    }

    /// Publish state-change notifications on `sender`
    #[must_use]
    pub fn with_event_sender(mut self, sender: EventSender) -> Self {
        self.event_sender = Some(sender);
        self
    }

    /// Emit the initial ledger state
    ///
    /// # Errors
    ///
    /// Returns an error if the ledger lock is poisoned.
    pub fn announce(&self) -> Result<(), Error> {
        let event = {
            let ledger = self.lock()?;
            LedgerEvent::Initialized {
                capacity: ledger.capacity().clone(),
                maxima: ledger.maxima().to_vec(),
                snapshot: ledger.snapshot(),
            }
        };
        self.emit(AppEvent::Ledger(event));
        Ok(())
    }

    /// Ask for `request` on behalf of `consumer`
    ///
    /// The request is granted only if it fits the consumer's remaining need,
    /// fits the free pool, and leaves the ledger safe. A denied request
    /// leaves the ledger exactly as it was.
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown consumer, a vector of the wrong
    /// arity, or a poisoned lock. Denials are not errors.
    pub fn request(
        &self,
        consumer: ConsumerId,
        request: &ResourceVector,
    ) -> Result<RequestOutcome, Error> {
        let (outcome, snapshot) = {
            let mut ledger = self.lock()?;
            ledger.check_operands(consumer, request).inspect_err(|err| {
                warn!(consumer = consumer.index(), error = %err, "rejected request");
            })?;
            Self::decide(&mut ledger, consumer, request)?
        };

        match outcome {
            RequestOutcome::Granted => debug!(
                consumer = consumer.index(),
                request = %request,
                "request granted"
            ),
            RequestOutcome::Denied(reason) => debug!(
                consumer = consumer.index(),
                request = %request,
                reason = reason.code(),
                "request denied"
            ),
        }

        if let Some(snapshot) = snapshot {
            self.emit_state_changed(snapshot);
        }
        Ok(outcome)
    }

    /// Return `release` from `consumer` to the pool
    ///
    /// A release can only enlarge the free pool, so it never makes the
    /// ledger unsafe and is always committed when valid.
    ///
    /// # Errors
    ///
    /// Returns `ExceedsAllocation` (with no mutation) if the consumer holds
    /// less than it is releasing, and the same operand errors as
    /// [`Allocator::request`].
    pub fn release(&self, consumer: ConsumerId, release: &ResourceVector) -> Result<(), Error> {
        let snapshot = {
            let mut ledger = self.lock()?;
            ledger.check_operands(consumer, release)?;
            Self::give_back(&mut ledger, consumer, release).inspect_err(|err| {
                warn!(consumer = consumer.index(), error = %err, "rejected release");
            })?
        };

        debug!(consumer = consumer.index(), release = %release, "released");
        if let Some(snapshot) = snapshot {
            self.emit_state_changed(snapshot);
        }
        Ok(())
    }

    /// Release everything `consumer` currently holds
    ///
    /// Used to clean up after a consumer that was torn down while holding
    /// a grant. Returns what was reclaimed.
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown consumer or a poisoned lock.
    pub fn reclaim(&self, consumer: ConsumerId) -> Result<ResourceVector, Error> {
        let (held, snapshot) = {
            let mut ledger = self.lock()?;
            let held = ledger
                .allocation(consumer)
                .cloned()
                .ok_or(AllocationError::UnknownConsumer {
                    consumer: consumer.index(),
                    consumers: ledger.consumers(),
                })?;
            let snapshot = Self::give_back(&mut ledger, consumer, &held)?;
            (held, snapshot)
        };

        if let Some(snapshot) = snapshot {
            debug!(consumer = consumer.index(), reclaimed = %held, "reclaimed allocation");
            self.emit(AppEvent::Allocation(AllocationEvent::Reclaimed {
                consumer,
                reclaimed: held.clone(),
            }));
            self.emit_state_changed(snapshot);
        }
        Ok(held)
    }

    /// Remaining need of `consumer`
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown consumer or a poisoned lock.
    pub fn need(&self, consumer: ConsumerId) -> Result<ResourceVector, Error> {
        self.inspect(|ledger| ledger.need(consumer).cloned())?
            .ok_or_else(|| self.unknown(consumer))
    }

    /// Current allocation of `consumer`
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown consumer or a poisoned lock.
    pub fn allocation(&self, consumer: ConsumerId) -> Result<ResourceVector, Error> {
        self.inspect(|ledger| ledger.allocation(consumer).cloned())?
            .ok_or_else(|| self.unknown(consumer))
    }

    /// Copy of the current state
    ///
    /// # Errors
    ///
    /// Returns an error if the ledger lock is poisoned.
    pub fn snapshot(&self) -> Result<LedgerSnapshot, Error> {
        self.inspect(Ledger::snapshot)
    }

    /// Run `f` against a consistent view of the ledger
    ///
    /// `f` runs under the ledger lock and must not block.
    ///
    /// # Errors
    ///
    /// Returns an error if the ledger lock is poisoned.
    pub fn inspect<R>(&self, f: impl FnOnce(&Ledger) -> R) -> Result<R, Error> {
        let ledger = self.lock()?;
        Ok(f(&ledger))
    }

    /// Number of consumers the ledger was built for
    ///
    /// # Errors
    ///
    /// Returns an error if the ledger lock is poisoned.
    pub fn consumers(&self) -> Result<usize, Error> {
        self.inspect(Ledger::consumers)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Ledger>, Error> {
        self.ledger
            .lock()
            .map_err(|_| AllocationError::LockPoisoned.into())
    }

    fn unknown(&self, consumer: ConsumerId) -> Error {
        let consumers = self.consumers().unwrap_or_default();
        AllocationError::UnknownConsumer {
            consumer: consumer.index(),
            consumers,
        }
        .into()
    }

    /// Bound check, availability check, tentative apply, safety check
    fn decide(
        ledger: &mut Ledger,
        consumer: ConsumerId,
        request: &ResourceVector,
    ) -> Result<(RequestOutcome, Option<LedgerSnapshot>), Error> {
        let index = consumer.index();
        let need = &ledger.needs()[index];
        if request.first_exceeding(need).is_some() {
            return Ok((RequestOutcome::Denied(DenialReason::ExceedsMaxDemand), None));
        }
        if request.first_exceeding(ledger.available()).is_some() {
            return Ok((
                RequestOutcome::Denied(DenialReason::InsufficientResources),
                None,
            ));
        }
        if request.is_zero() {
            return Ok((RequestOutcome::Granted, None));
        }

        if !ledger.transfer_to(index, request) {
            return Err(Error::internal(format!(
                "tentative grant of {request} to {consumer} failed after checks passed"
            )));
        }

        if let Some(sequence) = safety::safe_sequence(ledger) {
            ledger.commit();
            trace!(consumer = index, ?sequence, "safe completion order");
            return Ok((RequestOutcome::Granted, Some(ledger.snapshot())));
        }

        if !ledger.transfer_from(index, request) {
            return Err(Error::internal(format!(
                "rollback of {request} from {consumer} failed"
            )));
        }
        Ok((RequestOutcome::Denied(DenialReason::WouldBeUnsafe), None))
    }

    fn give_back(
        ledger: &mut Ledger,
        consumer: ConsumerId,
        release: &ResourceVector,
    ) -> Result<Option<LedgerSnapshot>, Error> {
        let index = consumer.index();
        let held = &ledger.allocations()[index];
        if let Some(resource) = release.first_exceeding(held) {
            return Err(AllocationError::ExceedsAllocation {
                consumer: index,
                resource,
                released: release[resource],
                held: held[resource],
            }
            .into());
        }
        if release.is_zero() {
            return Ok(None);
        }

        if !ledger.transfer_from(index, release) {
            return Err(Error::internal(format!(
                "release of {release} from {consumer} failed after checks passed"
            )));
        }
        ledger.commit();
        Ok(Some(ledger.snapshot()))
    }
}

impl EventEmitter for Allocator {
    fn event_sender(&self) -> Option<&EventSender> {
        self.event_sender.as_ref()
    }
}
