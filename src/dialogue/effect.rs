//! Effects produced by dialogue transitions

/// Effects to be executed after a transition, in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Send a text reply to the sender
    SendReply { text: String },

    /// Persist an interaction record for the processed message
    Record { context: String, state_label: String },
}

impl Effect {
    pub fn reply(text: impl Into<String>) -> Self {
        Effect::SendReply { text: text.into() }
    }

    pub fn record(context: impl Into<String>, state_label: impl Into<String>) -> Self {
        Effect::Record {
            context: context.into(),
            state_label: state_label.into(),
        }
    }
}
