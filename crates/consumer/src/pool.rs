//! Spawning, stopping and reaping a set of consumer actors

use std::sync::Arc;

use banker_errors::Error;
use banker_events::{AppEvent, EventEmitter, EventSender, LifecycleEvent};
use banker_resources::Allocator;
use banker_types::ConsumerId;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::{ActorTiming, ConsumerActor, ConsumerReport, RequestStrategy};

/// One running actor per consumer in the ledger
pub struct ConsumerPool {
    allocator: Arc<Allocator>,
    shutdown: watch::Sender<bool>,
    handles: Vec<(ConsumerId, JoinHandle<ConsumerReport>)>,
    event_sender: Option<EventSender>,
}

impl ConsumerPool {
    /// Spawn an actor for every consumer, asking `strategy_for` for each one's policy
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns an error if the allocator's ledger lock is poisoned.
    pub fn spawn<F>(
        allocator: Arc<Allocator>,
        timing: ActorTiming,
        event_sender: Option<EventSender>,
        mut strategy_for: F,
    ) -> Result<Self, Error>
    where
        F: FnMut(ConsumerId) -> Box<dyn RequestStrategy>,
    {
        let (shutdown, receiver) = watch::channel(false);
        let consumers = allocator.consumers()?;

        let handles = ConsumerId::all(consumers)
            .map(|id| {
                let mut actor =
                    ConsumerActor::new(id, Arc::clone(&allocator), strategy_for(id), timing);
                if let Some(sender) = &event_sender {
                    actor = actor.with_event_sender(sender.clone());
                }
                let receiver = receiver.clone();
                (id, tokio::spawn(actor.run(receiver)))
            })
            .collect();

        info!(consumers, "spawned consumer actors");
        Ok(Self {
            allocator,
            shutdown,
            handles,
            event_sender,
        })
    }

    /// Number of actors spawned
    #[must_use]
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Signal shutdown, wait for every actor, and reclaim anything left held
    ///
    /// Actors that panicked are reported with a failure and whatever they
    /// held is returned to the pool.
    ///
    /// # Errors
    ///
    /// Returns an error if reclaiming a consumer's allocation fails.
    pub async fn shutdown(self, reason: impl Into<String>) -> Result<Vec<ConsumerReport>, Error> {
        let reason = reason.into();
        self.emit(AppEvent::Lifecycle(LifecycleEvent::ShutdownRequested {
            reason: reason.clone(),
        }));
        // Receivers may all be gone already; that is fine.
        let _ = self.shutdown.send(true);

        let mut reports = Vec::with_capacity(self.handles.len());
        for (id, handle) in self.handles {
            let report = match handle.await {
                Ok(report) => report,
                Err(err) => {
                    warn!(consumer = id.index(), error = %err, "consumer task failed");
                    ConsumerReport {
                        consumer: id,
                        attempts: 0,
                        grants: 0,
                        denials: crate::DenialCounts::default(),
                        releases: 0,
                        failure: Some(err.to_string()),
                    }
                }
            };

            let reclaimed = self.allocator.reclaim(id)?;
            if !reclaimed.is_zero() {
                warn!(consumer = id.index(), %reclaimed, "reclaimed allocation left by stopped consumer");
            }
            reports.push(report);
        }

        info!(%reason, "all consumers stopped");
        Ok(reports)
    }
}

impl EventEmitter for ConsumerPool {
    fn event_sender(&self) -> Option<&EventSender> {
        self.event_sender.as_ref()
    }
}
