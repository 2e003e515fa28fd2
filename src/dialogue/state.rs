//! Conversation state labels

use std::fmt;

/// Label recorded for senders with no stored entry
pub const FRESH_LABEL: &str = "inicio";

/// Live dialogue states. Only these are ever written to the state store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DialogueState {
    MainMenu,
    AwaitingArea,
    AwaitingAreaOther,
    AwaitingAutomationType,
    AwaitingTypeOther,
    AwaitingContact,
    AwaitingEmail,
    /// No transition enters this state; kept so stored entries still resolve.
    AwaitingBudget,
    /// No transition enters this state; kept so stored entries still resolve.
    AwaitingFollowUp,
    ServicesInfo,
}

impl DialogueState {
    pub const ALL: [DialogueState; 10] = [
        DialogueState::MainMenu,
        DialogueState::AwaitingArea,
        DialogueState::AwaitingAreaOther,
        DialogueState::AwaitingAutomationType,
        DialogueState::AwaitingTypeOther,
        DialogueState::AwaitingContact,
        DialogueState::AwaitingEmail,
        DialogueState::AwaitingBudget,
        DialogueState::AwaitingFollowUp,
        DialogueState::ServicesInfo,
    ];

    /// Label used in the state store and in interaction records
    pub fn label(self) -> &'static str {
        match self {
            DialogueState::MainMenu => "menu_principal",
            DialogueState::AwaitingArea => "esperando_area",
            DialogueState::AwaitingAreaOther => "esperando_area_otro",
            DialogueState::AwaitingAutomationType => "esperando_tipo_automatizacion",
            DialogueState::AwaitingTypeOther => "esperando_tipo_otro",
            DialogueState::AwaitingContact => "esperando_contacto",
            DialogueState::AwaitingEmail => "esperando_email",
            DialogueState::AwaitingBudget => "esperando_presupuesto",
            DialogueState::AwaitingFollowUp => "esperando_seguimiento",
            DialogueState::ServicesInfo => "info_servicios",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|state| state.label() == label)
    }
}

impl fmt::Display for DialogueState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Outcomes that close a conversation. They are recorded as state labels
/// but never stored: the sender's entry is deleted instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminalOutcome {
    VideoCallConfirmed,
    AwaitingAdvisor,
    AutomationConfirmed,
    EmailConfirmed,
    BudgetSent,
    FollowUpInProgress,
}

impl TerminalOutcome {
    pub const ALL: [TerminalOutcome; 6] = [
        TerminalOutcome::VideoCallConfirmed,
        TerminalOutcome::AwaitingAdvisor,
        TerminalOutcome::AutomationConfirmed,
        TerminalOutcome::EmailConfirmed,
        TerminalOutcome::BudgetSent,
        TerminalOutcome::FollowUpInProgress,
    ];

    pub fn label(self) -> &'static str {
        match self {
            TerminalOutcome::VideoCallConfirmed => "Videollamada Confirmada",
            TerminalOutcome::AwaitingAdvisor => "Esperando Respuesta del Asesor",
            TerminalOutcome::AutomationConfirmed => "Automatización Confirmada",
            TerminalOutcome::EmailConfirmed => "Email Confirmado",
            TerminalOutcome::BudgetSent => "Presupuesto Enviado",
            TerminalOutcome::FollowUpInProgress => "Seguimiento en Proceso",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|outcome| outcome.label() == label)
    }
}

/// A sender's state as read back from the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoredState {
    /// No entry: the next message starts a conversation
    Fresh,
    Active(DialogueState),
    /// A label outside the known set, e.g. left behind by an older deployment
    Unknown(String),
}

impl StoredState {
    /// Resolve a raw store value. Blank labels count as no entry.
    pub fn from_label(label: Option<&str>) -> Self {
        match label {
            None => StoredState::Fresh,
            Some(label) if label.trim().is_empty() => StoredState::Fresh,
            Some(label) => DialogueState::from_label(label)
                .map_or_else(|| StoredState::Unknown(label.to_string()), StoredState::Active),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            StoredState::Fresh => FRESH_LABEL,
            StoredState::Active(state) => state.label(),
            StoredState::Unknown(label) => label,
        }
    }
}
