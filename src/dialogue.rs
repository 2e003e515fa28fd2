//! Menu-driven dialogue state machine
//!
//! Pure transitions: given a sender's stored state and one normalised input,
//! produce the state update and the effects (reply, record) to execute.
//! Nothing in here performs I/O.

mod effect;
pub mod event;
pub mod replies;
pub mod state;
mod transition;

#[cfg(test)]
mod proptests;

pub use effect::Effect;
pub use event::{InboundMessage, UserInput};
pub use state::{DialogueState, StoredState, TerminalOutcome};
pub use transition::{transition, DialogueContext, RecordFaq, StateUpdate, TransitionResult};
