//! A single consumer's request/hold/release loop

use std::sync::Arc;
use std::time::Duration;

use banker_errors::Error;
use banker_events::{AppEvent, EventEmitter, EventSender, FailureContext, LifecycleEvent};
use banker_resources::Allocator;
use banker_types::{ConsumerId, DenialReason, RequestOutcome, ResourceVector};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{debug, error};

use crate::RequestStrategy;

/// How long a consumer holds a grant and how long it pauses between attempts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActorTiming {
    pub hold: Duration,
    pub pause: Duration,
}

impl Default for ActorTiming {
    fn default() -> Self {
        Self {
            hold: Duration::from_millis(500),
            pause: Duration::from_millis(300),
        }
    }
}

/// Denied attempts broken down by reason
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DenialCounts {
    pub exceeds_max_demand: u64,
    pub insufficient_resources: u64,
    pub would_be_unsafe: u64,
}

impl DenialCounts {
    fn record(&mut self, reason: DenialReason) {
        match reason {
            DenialReason::ExceedsMaxDemand => self.exceeds_max_demand += 1,
            DenialReason::InsufficientResources => self.insufficient_resources += 1,
            DenialReason::WouldBeUnsafe => self.would_be_unsafe += 1,
        }
    }

    #[must_use]
    pub fn total(&self) -> u64 {
        self.exceeds_max_demand + self.insufficient_resources + self.would_be_unsafe
    }
}

/// What a consumer did before it stopped
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsumerReport {
    pub consumer: ConsumerId,
    pub attempts: u64,
    pub grants: u64,
    pub denials: DenialCounts,
    pub releases: u64,
    /// Set when the loop ended because of an allocator error
    pub failure: Option<String>,
}

impl ConsumerReport {
    fn new(consumer: ConsumerId) -> Self {
        Self {
            consumer,
            attempts: 0,
            grants: 0,
            denials: DenialCounts::default(),
            releases: 0,
            failure: None,
        }
    }

    fn record(&mut self, outcome: RequestOutcome) {
        self.attempts += 1;
        match outcome {
            RequestOutcome::Granted => self.grants += 1,
            RequestOutcome::Denied(reason) => self.denials.record(reason),
        }
    }
}

enum Flow {
    Continue,
    Stop,
}

/// One consumer bound to a shared allocator
pub struct ConsumerActor {
    id: ConsumerId,
    allocator: Arc<Allocator>,
    strategy: Box<dyn RequestStrategy>,
    timing: ActorTiming,
    event_sender: Option<EventSender>,
    report: ConsumerReport,
}

impl ConsumerActor {
    #[must_use]
    pub fn new(
        id: ConsumerId,
        allocator: Arc<Allocator>,
        strategy: Box<dyn RequestStrategy>,
        timing: ActorTiming,
    ) -> Self {
        Self {
            id,
            allocator,
            strategy,
            timing,
            event_sender: None,
            report: ConsumerReport::new(id),
        }
    }

    /// Report outcomes on `sender`
    #[must_use]
    pub fn with_event_sender(mut self, sender: EventSender) -> Self {
        self.event_sender = Some(sender);
        self
    }

    #[must_use]
    pub fn id(&self) -> ConsumerId {
        self.id
    }

    /// Loop until `shutdown` turns true or its sender goes away
    ///
    /// Shutdown is only observed between transactions. A consumer holding
    /// a grant when shutdown arrives releases it before returning.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) -> ConsumerReport {
        self.emit(AppEvent::Lifecycle(LifecycleEvent::ConsumerStarted {
            consumer: self.id,
        }));

        while !*shutdown.borrow() {
            match self.step(&mut shutdown).await {
                Ok(Flow::Continue) => {}
                Ok(Flow::Stop) => break,
                Err(err) => {
                    error!(consumer = self.id.index(), error = %err, "consumer stopped");
                    self.emit_error(format!("{} stopped: {err}", self.id));
                    self.report.failure = Some(err.to_string());
                    break;
                }
            }
        }

        self.emit(AppEvent::Lifecycle(LifecycleEvent::ConsumerStopped {
            consumer: self.id,
            attempts: self.report.attempts,
            grants: self.report.grants,
        }));
        self.report
    }

    /// One request, an optional hold and release, then a pause
    async fn step(&mut self, shutdown: &mut watch::Receiver<bool>) -> Result<Flow, Error> {
        let need = self.allocator.need(self.id)?;
        let request = self.strategy.next_request(&need);
        let outcome = self.allocator.request(self.id, &request)?;
        self.report.record(outcome);
        self.emit_request_outcome(self.id, request.clone(), outcome);

        if outcome.is_granted() && !request.is_zero() {
            let interrupted = sleep_unless_shutdown(self.timing.hold, shutdown).await;
            self.give_back(request)?;
            if interrupted {
                return Ok(Flow::Stop);
            }
        }

        if sleep_unless_shutdown(self.timing.pause, shutdown).await {
            return Ok(Flow::Stop);
        }
        Ok(Flow::Continue)
    }

    fn give_back(&mut self, granted: ResourceVector) -> Result<(), Error> {
        match self.allocator.release(self.id, &granted) {
            Ok(()) => {
                self.report.releases += 1;
                self.emit_released(self.id, granted);
                Ok(())
            }
            Err(err) => {
                self.emit_release_failed(self.id, granted, FailureContext::from_error(&err));
                Err(err)
            }
        }
    }
}

impl EventEmitter for ConsumerActor {
    fn event_sender(&self) -> Option<&EventSender> {
        self.event_sender.as_ref()
    }
}

/// Sleep for `duration`; true if shutdown was signalled first
async fn sleep_unless_shutdown(duration: Duration, shutdown: &mut watch::Receiver<bool>) -> bool {
    tokio::select! {
        () = tokio::time::sleep(duration) => false,
        changed = shutdown.changed() => {
            let stop = changed.is_err() || *shutdown.borrow();
            if stop {
                debug!("shutdown observed while sleeping");
            }
            stop
        }
    }
}
