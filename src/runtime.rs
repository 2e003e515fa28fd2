//! Runtime for processing inbound messages
//!
//! Wires the pure dialogue transition to the outside world: state store,
//! reply channel and interaction recorders.

mod engine;
mod locks;
pub mod traits;

#[cfg(test)]
pub mod testing;

pub use engine::{DialogueEngine, EngineError, HandleOutcome};
pub use traits::*;

use std::sync::Arc;

/// Type alias for the engine with production adapters
pub type ProductionEngine =
    DialogueEngine<InMemoryStateStore, Arc<dyn ReplySender>, Arc<dyn InteractionRecorder>>;
