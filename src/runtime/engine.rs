//! Dialogue engine
//!
//! Runs one inbound message through the pure transition function and then
//! performs its effects: reply, record, state update, in that order.

use super::locks::SenderLocks;
use super::traits::{DeliveryError, InteractionRecorder, ReplySender, StateStore, StateStoreError};
use crate::db::InteractionRecord;
use crate::dialogue::{
    transition, DialogueContext, Effect, InboundMessage, StateUpdate, StoredState, UserInput,
};
use std::future::Future;
use std::time::Duration;
use thiserror::Error;

/// Failures that abort processing of a message
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("state store error: {0}")]
    State(#[from] StateStoreError),
}

/// What the engine did with an inbound message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleOutcome {
    /// Nothing to process (no text)
    Ignored,
    Processed { update: StateUpdate },
}

/// Generic engine that can work with any state store, sender and recorder
pub struct DialogueEngine<S, R, I>
where
    S: StateStore,
    R: ReplySender,
    I: InteractionRecorder,
{
    store: S,
    reply_sender: R,
    recorder: I,
    context: DialogueContext,
    /// Bound on each outbound call so a stuck upstream can't hold a sender's lock
    outbound_timeout: Duration,
    locks: SenderLocks,
}

impl<S, R, I> DialogueEngine<S, R, I>
where
    S: StateStore,
    R: ReplySender,
    I: InteractionRecorder,
{
    pub fn new(
        store: S,
        reply_sender: R,
        recorder: I,
        context: DialogueContext,
        outbound_timeout: Duration,
    ) -> Self {
        Self {
            store,
            reply_sender,
            recorder,
            context,
            outbound_timeout,
            locks: SenderLocks::new(),
        }
    }

    /// Process one inbound message.
    ///
    /// Reply and record failures are logged and do not fail the call. A state
    /// store failure does; the sender's previous state then stays in place.
    pub async fn handle(&self, message: InboundMessage) -> Result<HandleOutcome, EngineError> {
        let Some(input) = message.input() else {
            tracing::debug!(sender = %message.sender, "Ignoring inbound event without text");
            return Ok(HandleOutcome::Ignored);
        };

        let _guard = self.locks.acquire(&message.sender).await;

        let stored = self.store.get(&message.sender).await?;
        let state = StoredState::from_label(stored.as_deref());

        tracing::info!(
            sender = %message.sender,
            name = %message.display_name(),
            state = %state.label(),
            text = %input.as_str(),
            "Inbound message"
        );

        let result = transition(&state, &self.context, &input);

        for effect in &result.effects {
            self.execute_effect(&message, &input, effect).await;
        }

        self.apply_update(&message.sender, result.update).await?;

        tracing::debug!(
            sender = %message.sender,
            from = %state.label(),
            update = ?result.update,
            "Transition applied"
        );

        Ok(HandleOutcome::Processed {
            update: result.update,
        })
    }

    /// Drop a sender's conversation without replying
    pub async fn reset(&self, sender: &str) -> Result<(), EngineError> {
        let _guard = self.locks.acquire(sender).await;
        self.store.delete(sender).await?;
        tracing::info!(sender = %sender, "Conversation reset");
        Ok(())
    }

    /// Live conversations as `(sender, state label)`
    pub async fn active_conversations(&self) -> Result<Vec<(String, String)>, EngineError> {
        Ok(self.store.entries().await?)
    }

    async fn execute_effect(&self, message: &InboundMessage, input: &UserInput, effect: &Effect) {
        match effect {
            Effect::SendReply { text } => {
                match self
                    .bounded(self.reply_sender.send(&message.sender, text))
                    .await
                {
                    Ok(()) => tracing::debug!(sender = %message.sender, "Reply sent"),
                    Err(e) => tracing::error!(
                        sender = %message.sender,
                        error = %e,
                        "Failed to send reply"
                    ),
                }
            }

            Effect::Record {
                context,
                state_label,
            } => {
                let record = InteractionRecord::new(
                    &message.sender,
                    message.display_name(),
                    input.as_str(),
                    context,
                    state_label,
                );
                match self.bounded(self.recorder.record(&record)).await {
                    Ok(()) => tracing::debug!(
                        sender = %message.sender,
                        context = %context,
                        state = %state_label,
                        "Interaction recorded"
                    ),
                    Err(e) => tracing::error!(
                        sender = %message.sender,
                        recorder = self.recorder.name(),
                        error = %e,
                        "Failed to record interaction"
                    ),
                }
            }
        }
    }

    async fn apply_update(&self, sender: &str, update: StateUpdate) -> Result<(), StateStoreError> {
        match update {
            StateUpdate::Keep => Ok(()),
            StateUpdate::Enter(next) => self.store.set(sender, next.label()).await,
            StateUpdate::End => self.store.delete(sender).await,
        }
    }

    async fn bounded<F>(&self, call: F) -> Result<(), DeliveryError>
    where
        F: Future<Output = Result<(), DeliveryError>>,
    {
        tokio::time::timeout(self.outbound_timeout, call)
            .await
            .unwrap_or(Err(DeliveryError::Timeout(self.outbound_timeout)))
    }
}
