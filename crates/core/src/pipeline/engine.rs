use thiserror::Error;
use tracing::debug;

use crate::audit::{AuditCategory, AuditContext, AuditEvent, AuditOutcome, AuditSink};
use crate::pipeline::states::{QueryEvent, QueryState, TransitionOutcome};

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("invalid transition from {state:?} using event {event:?}")]
    InvalidTransition { state: QueryState, event: QueryEvent },
}

/// Tracks one query through `Received -> Classified -> Dispatched -> Evaluated -> Assembled`.
///
/// A `Failed` event from any non-terminal state jumps straight to `Assembled`.
#[derive(Clone, Debug)]
pub struct QueryLifecycle {
    state: QueryState,
    history: Vec<TransitionOutcome>,
}

impl Default for QueryLifecycle {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryLifecycle {
    pub fn new() -> Self {
        Self { state: QueryState::Received, history: Vec::new() }
    }

    pub fn state(&self) -> QueryState {
        self.state
    }

    pub fn history(&self) -> &[TransitionOutcome] {
        &self.history
    }

    pub fn transition(
        current: QueryState,
        event: QueryEvent,
    ) -> Result<TransitionOutcome, TransitionError> {
        use QueryEvent as E;
        use QueryState::{Assembled, Classified, Dispatched, Evaluated, Received};

        let to = match (current, event) {
            (Received, E::Classified) => Classified,
            (Classified, E::Dispatched) => Dispatched,
            (Dispatched, E::Evaluated) => Evaluated,
            (Evaluated, E::Assembled) => Assembled,
            (Received | Classified | Dispatched | Evaluated, E::Failed) => Assembled,
            _ => return Err(TransitionError::InvalidTransition { state: current, event }),
        };

        Ok(TransitionOutcome { from: current, to, event })
    }

    pub fn advance(&mut self, event: QueryEvent) -> Result<TransitionOutcome, TransitionError> {
        let outcome = Self::transition(self.state, event)?;
        self.state = outcome.to;
        self.history.push(outcome);
        Ok(outcome)
    }

    pub fn advance_with_audit<S>(
        &mut self,
        event: QueryEvent,
        sink: &S,
        audit: &AuditContext,
    ) -> Result<TransitionOutcome, TransitionError>
    where
        S: AuditSink + ?Sized,
    {
        let result = self.advance(event);
        match &result {
            Ok(outcome) => {
                debug!(
                    event_name = "pipeline.transition_applied",
                    correlation_id = %audit.correlation_id,
                    from = outcome.from.as_str(),
                    to = outcome.to.as_str(),
                    "query state advanced"
                );
                sink.emit(
                    AuditEvent::new(
                        audit.correlation_id.clone(),
                        "pipeline.transition_applied",
                        AuditCategory::Pipeline,
                        audit.actor.clone(),
                        if event == QueryEvent::Failed {
                            AuditOutcome::Failed
                        } else {
                            AuditOutcome::Success
                        },
                    )
                    .with_metadata("from", outcome.from.as_str())
                    .with_metadata("to", outcome.to.as_str())
                    .with_metadata("event", outcome.event.as_str()),
                );
            }
            Err(error) => {
                sink.emit(
                    AuditEvent::new(
                        audit.correlation_id.clone(),
                        "pipeline.transition_rejected",
                        AuditCategory::Pipeline,
                        audit.actor.clone(),
                        AuditOutcome::Rejected,
                    )
                    .with_metadata("error", error.to_string()),
                );
            }
        }
        result
    }
}
