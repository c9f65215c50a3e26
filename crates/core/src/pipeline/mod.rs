pub mod engine;
pub mod states;

pub use engine::{QueryLifecycle, TransitionError};
pub use states::{QueryEvent, QueryState, TransitionOutcome};
