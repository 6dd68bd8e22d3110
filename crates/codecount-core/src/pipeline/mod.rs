//! Resolution pipeline: state machine plus the task that drives it.

pub mod resolver;
pub mod state;

pub use resolver::{Resolution, ResolutionOutcome, Resolver};
pub use state::{transition, InvalidTransition, ResolutionEvent, ResolutionState, Snapshot};
