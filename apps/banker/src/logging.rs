//! Structured logging integration for events
//!
//! Domain events are turned into `tracing` records with structured fields,
//! at the level each event reports through `AppEvent::log_level`.

use banker_events::{
    AllocationEvent, AppEvent, EventMessage, GeneralEvent, LedgerEvent, LifecycleEvent,
};
use tracing::{debug, error, info, trace, warn, Level};

/// Emit a record at a level chosen at runtime
macro_rules! log_at {
    ($level:expr, $($arg:tt)+) => {
        match $level {
            Level::ERROR => error!($($arg)+),
            Level::WARN => warn!($($arg)+),
            Level::INFO => info!($($arg)+),
            Level::DEBUG => debug!($($arg)+),
            Level::TRACE => trace!($($arg)+),
        }
    };
}

/// Log an `AppEvent` using the tracing infrastructure with structured fields
pub fn log_event_with_tracing(message: &EventMessage) {
    let meta = &message.meta;
    let level = message.event.log_level();
    let source = meta.source.as_str();

    match &message.event {
        AppEvent::General(event) => match event {
            GeneralEvent::Warning { message } | GeneralEvent::Error { message } => {
                log_at!(level, source, event_id = %meta.event_id, "{message}");
            }
        },

        AppEvent::Allocation(event) => match event {
            AllocationEvent::Requested {
                consumer,
                request,
                outcome,
            } => {
                log_at!(
                    level,
                    source,
                    event_id = %meta.event_id,
                    consumer = consumer.index(),
                    request = %request,
                    granted = outcome.is_granted(),
                    reason = outcome.denial_reason().map(|reason| reason.code()),
                    "Request completed"
                );
            }
            AllocationEvent::Released { consumer, released } => {
                log_at!(
                    level,
                    source,
                    event_id = %meta.event_id,
                    consumer = consumer.index(),
                    released = %released,
                    "Release committed"
                );
            }
            AllocationEvent::ReleaseFailed {
                consumer,
                released,
                failure,
            } => {
                log_at!(
                    level,
                    source,
                    event_id = %meta.event_id,
                    consumer = consumer.index(),
                    released = %released,
                    code = ?failure.code,
                    hint = ?failure.hint,
                    "Release rejected: {}",
                    failure.message
                );
            }
            AllocationEvent::Reclaimed {
                consumer,
                reclaimed,
            } => {
                log_at!(
                    level,
                    source,
                    event_id = %meta.event_id,
                    consumer = consumer.index(),
                    reclaimed = %reclaimed,
                    "Allocation reclaimed"
                );
            }
        },

        AppEvent::Ledger(event) => match event {
            LedgerEvent::Initialized {
                capacity, maxima, ..
            } => {
                log_at!(
                    level,
                    source,
                    event_id = %meta.event_id,
                    capacity = %capacity,
                    consumers = maxima.len(),
                    "Ledger initialized"
                );
            }
            LedgerEvent::StateChanged { snapshot } => {
                log_at!(
                    level,
                    source,
                    event_id = %meta.event_id,
                    version = snapshot.version,
                    available = %snapshot.available,
                    holders = snapshot.holders.len(),
                    "Ledger state changed"
                );
            }
        },

        AppEvent::Lifecycle(event) => match event {
            LifecycleEvent::ConsumerStarted { consumer } => {
                log_at!(level, source, consumer = consumer.index(), "Consumer started");
            }
            LifecycleEvent::ConsumerStopped {
                consumer,
                attempts,
                grants,
            } => {
                log_at!(
                    level,
                    source,
                    consumer = consumer.index(),
                    attempts,
                    grants,
                    "Consumer stopped"
                );
            }
            LifecycleEvent::ShutdownRequested { reason } => {
                log_at!(level, source, reason = %reason, "Shutdown requested");
            }
        },
    }
}
