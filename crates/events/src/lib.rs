#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Event system for async communication in banker
//!
//! All observable output of the allocator and its consumers goes through
//! events: request outcomes, releases, and state-change notifications.
//! Emission never blocks; the observer drains the channel at its own pace.
//!
//! ## Architecture
//!
//! - **Domain-driven events**: Events grouped by functional domain (Allocation, Ledger, ...)
//! - **Unified `EventEmitter` trait**: Single, consistent API for all event emissions
//! - **Metadata envelope**: Every event travels with an [`EventMeta`] for logging and ordering

pub mod meta;
pub use meta::{EventLevel, EventMeta, EventSource};

pub mod events;
pub use events::{
    AllocationEvent, AppEvent, FailureContext, GeneralEvent, LedgerEvent, LifecycleEvent,
};

use banker_types::{ConsumerId, LedgerSnapshot, RequestOutcome, ResourceVector};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::UnboundedSender;

/// An event together with its metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventMessage {
    pub meta: EventMeta,
    pub event: AppEvent,
}

impl EventMessage {
    #[must_use]
    pub fn new(meta: EventMeta, event: AppEvent) -> Self {
        Self { meta, event }
    }

    /// Wrap an event with metadata derived from its domain and level
    #[must_use]
    pub fn from_event(event: AppEvent) -> Self {
        let meta = EventMeta::new(event.log_level(), event.event_source());
        Self::new(meta, event)
    }
}

/// Type alias for event sender
pub type EventSender = UnboundedSender<EventMessage>;

/// Type alias for event receiver
pub type EventReceiver = tokio::sync::mpsc::UnboundedReceiver<EventMessage>;

/// Create a new event channel
#[must_use]
pub fn channel() -> (EventSender, EventReceiver) {
    tokio::sync::mpsc::unbounded_channel()
}

/// The unified trait for emitting events throughout the banker system
///
/// This trait provides a single, consistent API for emitting events regardless of
/// whether you have a raw `EventSender` or a struct that contains one.
pub trait EventEmitter {
    /// Get the event sender for this emitter
    fn event_sender(&self) -> Option<&EventSender>;

    /// Emit an event with explicit metadata
    fn emit_with_meta(&self, meta: EventMeta, event: AppEvent) {
        if let Some(sender) = self.event_sender() {
            // Ignore send errors - if receiver is dropped, we just continue
            let _ = sender.send(EventMessage::new(meta, event));
        }
    }

    /// Emit an event through this emitter
    fn emit(&self, event: AppEvent) {
        let meta = EventMeta::new(event.log_level(), event.event_source());
        self.emit_with_meta(meta, event);
    }

    /// Emit a warning event
    fn emit_warning(&self, message: impl Into<String>) {
        self.emit(AppEvent::General(GeneralEvent::warning(message)));
    }

    /// Emit an error event
    fn emit_error(&self, message: impl Into<String>) {
        self.emit(AppEvent::General(GeneralEvent::error(message)));
    }

    /// Report the outcome of a request at its call site
    fn emit_request_outcome(
        &self,
        consumer: ConsumerId,
        request: ResourceVector,
        outcome: RequestOutcome,
    ) {
        self.emit(AppEvent::Allocation(AllocationEvent::Requested {
            consumer,
            request,
            outcome,
        }));
    }

    /// Report a successful release
    fn emit_released(&self, consumer: ConsumerId, released: ResourceVector) {
        self.emit(AppEvent::Allocation(AllocationEvent::Released {
            consumer,
            released,
        }));
    }

    /// Report a rejected release
    fn emit_release_failed(
        &self,
        consumer: ConsumerId,
        released: ResourceVector,
        failure: FailureContext,
    ) {
        self.emit(AppEvent::Allocation(AllocationEvent::ReleaseFailed {
            consumer,
            released,
            failure,
        }));
    }

    /// Publish the ledger state after a committed mutation
    fn emit_state_changed(&self, snapshot: LedgerSnapshot) {
        self.emit(AppEvent::Ledger(LedgerEvent::StateChanged { snapshot }));
    }
}

/// Implementation of `EventEmitter` for the raw `EventSender`
/// This allows `EventSender` to be used directly where `EventEmitter` is expected
impl EventEmitter for EventSender {
    fn event_sender(&self) -> Option<&EventSender> {
        Some(self)
    }
}

/// Emitter that discards every event
///
/// Useful for tests and embedding the allocator without an observer.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullEmitter;

impl EventEmitter for NullEmitter {
    fn event_sender(&self) -> Option<&EventSender> {
        None
    }
}

impl<T: EventEmitter> EventEmitter for std::sync::Arc<T> {
    fn event_sender(&self) -> Option<&EventSender> {
        (**self).event_sender()
    }

    fn emit_with_meta(&self, meta: EventMeta, event: AppEvent) {
        (**self).emit_with_meta(meta, event);
    }
}
