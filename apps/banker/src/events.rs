//! Event handling: structured logs plus console rendering

use banker_events::{AllocationEvent, AppEvent, EventMessage, GeneralEvent, LedgerEvent};
use banker_types::LedgerSnapshot;
use std::io;

use crate::display::OutputRenderer;
use crate::logging::log_event_with_tracing;

/// Routes every event to the tracing layer and the console renderer
pub struct EventHandler {
    renderer: OutputRenderer,
    /// Accepted state waiting for the allocation line that produced it
    pending_state: Option<LedgerSnapshot>,
}

impl EventHandler {
    pub fn new(renderer: OutputRenderer) -> Self {
        Self {
            renderer,
            pending_state: None,
        }
    }

    pub fn renderer(&self) -> &OutputRenderer {
        &self.renderer
    }

    /// Handle incoming event
    pub fn handle_event(&mut self, message: &EventMessage) -> io::Result<()> {
        log_event_with_tracing(message);

        if self.renderer.json_output() {
            let show = match &message.event {
                AppEvent::Ledger(LedgerEvent::StateChanged { snapshot }) => {
                    self.renderer.accept(snapshot)
                }
                AppEvent::Ledger(LedgerEvent::Initialized { snapshot, .. }) => {
                    self.renderer.accept(snapshot);
                    true
                }
                _ => true,
            };
            return if show {
                self.renderer.render_json(message)
            } else {
                Ok(())
            };
        }

        for line in self.human_lines(&message.event) {
            self.renderer.write_line(&line)?;
        }
        Ok(())
    }

    /// Print a state still waiting for its allocation line
    pub fn finish(&mut self) -> io::Result<()> {
        match self.pending_state.take() {
            Some(snapshot) => self.renderer.write_line(&self.renderer.format_state(&snapshot)),
            None => Ok(()),
        }
    }

    /// Lines to print for one event, in order
    ///
    /// The allocator announces a state change as soon as it commits, while
    /// the request or release line comes from the consumer afterwards. An
    /// accepted state is held back until the next committing allocation
    /// event so the line reads before the table it caused.
    fn human_lines(&mut self, event: &AppEvent) -> Vec<String> {
        let mut lines = Vec::new();
        let commits = match event {
            AppEvent::Ledger(LedgerEvent::Initialized {
                capacity,
                maxima,
                snapshot,
            }) => {
                lines.push(self.renderer.format_initial(capacity, maxima, snapshot));
                false
            }
            AppEvent::Ledger(LedgerEvent::StateChanged { snapshot }) => {
                if self.renderer.accept(snapshot) {
                    if let Some(previous) = self.pending_state.replace(snapshot.clone()) {
                        lines.push(self.renderer.format_state(&previous));
                    }
                }
                false
            }
            AppEvent::Allocation(AllocationEvent::Requested {
                consumer,
                request,
                outcome,
            }) => {
                lines.push(self.renderer.format_request(*consumer, request, *outcome));
                outcome.is_granted()
            }
            AppEvent::Allocation(AllocationEvent::Released { consumer, released }) => {
                lines.push(self.renderer.format_release(*consumer, released));
                true
            }
            AppEvent::Allocation(AllocationEvent::Reclaimed {
                consumer,
                reclaimed,
            }) => {
                lines.push(self.renderer.format_reclaim(*consumer, reclaimed));
                true
            }
            AppEvent::Allocation(AllocationEvent::ReleaseFailed { failure, .. }) => {
                self.renderer.render_problem(&failure.message);
                false
            }
            AppEvent::General(GeneralEvent::Error { message, .. }) => {
                self.renderer.render_problem(message);
                false
            }
            _ => false,
        };

        if commits {
            if let Some(snapshot) = self.pending_state.take() {
                lines.push(self.renderer.format_state(&snapshot));
            }
        }
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use banker_types::{
        ColorChoice, ConsumerAllocation, ConsumerId, DenialReason, RequestOutcome, ResourceVector,
    };

    fn handler() -> EventHandler {
        EventHandler::new(OutputRenderer::new(false, ColorChoice::Never))
    }

    fn state(version: u64, available: [u32; 2], holder: Option<[u32; 2]>) -> AppEvent {
        AppEvent::Ledger(LedgerEvent::StateChanged {
            snapshot: LedgerSnapshot {
                version,
                available: ResourceVector::from(available),
                holders: holder
                    .map(|allocation| ConsumerAllocation {
                        consumer: ConsumerId::new(0),
                        allocation: ResourceVector::from(allocation),
                    })
                    .into_iter()
                    .collect(),
            },
        })
    }

    fn requested(outcome: RequestOutcome) -> AppEvent {
        AppEvent::Allocation(AllocationEvent::Requested {
            consumer: ConsumerId::new(0),
            request: ResourceVector::from([1, 1]),
            outcome,
        })
    }

    #[test]
    fn test_request_line_precedes_its_state() {
        let mut handler = handler();

        // The allocator's notification arrives before the consumer's report
        assert!(handler.human_lines(&state(1, [2, 2], Some([1, 1]))).is_empty());
        let lines = handler.human_lines(&requested(RequestOutcome::Granted));

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "Consumer 0 requested [1 1] -> GRANTED");
        assert!(lines[1].contains("State #1"));
    }

    #[test]
    fn test_release_line_precedes_its_state() {
        let mut handler = handler();
        assert!(handler.human_lines(&state(2, [3, 3], None)).is_empty());

        let lines = handler.human_lines(&AppEvent::Allocation(AllocationEvent::Released {
            consumer: ConsumerId::new(0),
            released: ResourceVector::from([1, 1]),
        }));

        assert_eq!(lines[0], "Consumer 0 released [1 1]");
        assert!(lines[1].contains("State #2"));
        assert!(lines[1].contains("No allocations."));
    }

    #[test]
    fn test_denial_keeps_state_pending() {
        let mut handler = handler();
        assert!(handler.human_lines(&state(1, [2, 2], Some([1, 1]))).is_empty());

        let lines = handler.human_lines(&requested(RequestOutcome::Denied(
            DenialReason::InsufficientResources,
        )));
        assert_eq!(lines.len(), 1);
        assert!(handler.pending_state.is_some());

        let lines = handler.human_lines(&requested(RequestOutcome::Granted));
        assert!(lines[1].contains("State #1"));
        assert!(handler.pending_state.is_none());
    }

    #[test]
    fn test_newer_state_flushes_older_one() {
        let mut handler = handler();
        assert!(handler.human_lines(&state(1, [2, 2], Some([1, 1]))).is_empty());

        let lines = handler.human_lines(&state(2, [1, 1], Some([2, 2])));
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("State #1"));
        assert_eq!(
            handler.pending_state.as_ref().map(|snapshot| snapshot.version),
            Some(2)
        );
    }

    #[test]
    fn test_stale_state_never_pending() {
        let mut handler = handler();
        assert!(handler.human_lines(&state(3, [2, 2], Some([1, 1]))).is_empty());
        let _ = handler.human_lines(&requested(RequestOutcome::Granted));

        assert!(handler.human_lines(&state(2, [0, 0], Some([3, 3]))).is_empty());
        assert!(handler.pending_state.is_none());
    }
}
