//! Pure state transition function
//!
//! Global short-circuits run first (exit keyword, then FAQ keys), then the
//! table for the sender's stored state. Every branch yields exactly one reply
//! and, unless it is an unrecorded FAQ answer, exactly one record.

use super::replies;
use super::{DialogueState, Effect, StoredState, TerminalOutcome, UserInput};

/// What happens to the sender's state entry once effects have run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateUpdate {
    /// Leave the entry as it is (including absent)
    Keep,
    /// Overwrite the entry with a live state
    Enter(DialogueState),
    /// Delete the entry; the next message starts fresh
    End,
}

/// Result of a state transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionResult {
    pub update: StateUpdate,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(update: StateUpdate) -> Self {
        Self {
            update,
            effects: vec![],
        }
    }

    #[must_use]
    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }
}

/// Whether answers to FAQ keys produce an interaction record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecordFaq {
    #[default]
    Skip,
    Record,
}

/// Static settings the transition function consults
#[derive(Debug, Clone, Default)]
pub struct DialogueContext {
    pub record_faq: RecordFaq,
}

/// Compute the next state and effects for one input.
///
/// Pure: the same state, context and input always give the same result.
pub fn transition(
    state: &StoredState,
    context: &DialogueContext,
    input: &UserInput,
) -> TransitionResult {
    if input.is_exit() {
        return TransitionResult::new(StateUpdate::End)
            .with_effect(Effect::reply(replies::restart()))
            .with_effect(Effect::record(
                "Conversación reiniciada",
                DialogueState::MainMenu.label(),
            ));
    }

    if let Some(answer) = replies::faq_answer(input.as_str()) {
        let result = TransitionResult::new(StateUpdate::Keep).with_effect(Effect::reply(answer));
        return match context.record_faq {
            RecordFaq::Skip => result,
            RecordFaq::Record => result.with_effect(Effect::record(
                format!("Pregunta frecuente: {}", input.as_str()),
                state.label(),
            )),
        };
    }

    match state {
        StoredState::Fresh => enter(
            DialogueState::MainMenu,
            replies::welcome(),
            "Inicio de Conversación",
        ),
        StoredState::Active(active) => active_transition(*active, input),
        StoredState::Unknown(label) => fallback(label, input),
    }
}

fn active_transition(state: DialogueState, input: &UserInput) -> TransitionResult {
    let text = input.as_str();
    let current = state.label();

    match state {
        DialogueState::MainMenu => match text {
            "1" => enter(
                DialogueState::AwaitingArea,
                replies::AREA_MENU,
                "Selección de Automatización",
            ),
            // Stays live so follow-up questions don't restart the conversation
            "2" => enter(
                DialogueState::ServicesInfo,
                replies::SERVICES_INFO,
                "Información de servicios",
            ),
            "3" => enter(
                DialogueState::AwaitingContact,
                replies::CONTACT_MENU,
                "Elección de Contacto",
            ),
            _ if input.is_affirmation() => stay(current, replies::MENU_ACK, "Agradecimiento"),
            _ => stay(current, replies::MENU_INVALID, "Opción inválida"),
        },

        DialogueState::AwaitingContact => match text {
            "1" => finish(
                TerminalOutcome::VideoCallConfirmed,
                replies::VIDEO_CALL,
                "Videollamada Programada",
            ),
            "2" => finish(
                TerminalOutcome::AwaitingAdvisor,
                replies::WHATSAPP_ADVISOR,
                "Contacto por WhatsApp",
            ),
            "3" => enter(
                DialogueState::AwaitingEmail,
                replies::ASK_EMAIL,
                "Solicitud de contacto por email",
            ),
            _ => stay(current, replies::CONTACT_INVALID, "Opción inválida"),
        },

        DialogueState::AwaitingArea => {
            if let Some(area) = replies::area_label(text) {
                enter(
                    DialogueState::AwaitingAutomationType,
                    replies::AUTOMATION_TYPE_MENU,
                    area,
                )
            } else if text == "6" {
                enter(
                    DialogueState::AwaitingAreaOther,
                    replies::ASK_AREA_DESCRIPTION,
                    "Área de Automatización Personalizada",
                )
            } else {
                stay(current, replies::AREA_INVALID, "Opción inválida")
            }
        }

        DialogueState::AwaitingAreaOther => enter(
            DialogueState::AwaitingAutomationType,
            replies::AUTOMATION_TYPE_MENU_AFTER_AREA,
            format!("Área de automatización personalizada: {text}"),
        ),

        DialogueState::AwaitingAutomationType => {
            if let Some(kind) = replies::automation_type_label(text) {
                finish(
                    TerminalOutcome::AutomationConfirmed,
                    replies::ADVISOR_WILL_CONTACT,
                    format!("Automatización seleccionada: {kind}"),
                )
            } else if text == "4" {
                enter(
                    DialogueState::AwaitingTypeOther,
                    replies::ASK_TYPE_DESCRIPTION,
                    "Tipo de Automatización Personalizada",
                )
            } else {
                stay(current, replies::AUTOMATION_TYPE_INVALID, "Opción inválida")
            }
        }

        DialogueState::AwaitingTypeOther => finish(
            TerminalOutcome::AutomationConfirmed,
            replies::ADVISOR_WILL_CONTACT,
            format!("Automatización personalizada: {text}"),
        ),

        DialogueState::AwaitingEmail => {
            if text.contains('@') {
                finish(
                    TerminalOutcome::EmailConfirmed,
                    replies::EMAIL_RECEIVED,
                    "Email Recibido",
                )
            } else {
                stay(current, replies::EMAIL_INVALID, "Email inválido")
            }
        }

        DialogueState::AwaitingBudget => finish(
            TerminalOutcome::BudgetSent,
            replies::BUDGET_RECEIVED,
            "Solicitud de Presupuesto",
        ),

        DialogueState::AwaitingFollowUp => finish(
            TerminalOutcome::FollowUpInProgress,
            replies::FOLLOW_UP_RECEIVED,
            "Solicitud de Seguimiento",
        ),

        DialogueState::ServicesInfo => {
            if input.is_affirmation() {
                stay(current, replies::SERVICES_ACK, "Agradecimiento")
            } else {
                enter(
                    DialogueState::MainMenu,
                    replies::SERVICES_NOT_UNDERSTOOD,
                    "Regreso al menú principal",
                )
            }
        }
    }
}

/// Branch for labels outside the known set. The sender always has a live
/// (if unrecognised) entry here; fresh senders never reach it.
fn fallback(label: &str, input: &UserInput) -> TransitionResult {
    match input.as_str() {
        "hola" => enter(
            DialogueState::MainMenu,
            replies::welcome_back(),
            "Inicio de Conversación",
        ),
        _ if input.is_affirmation() => stay(label, replies::FALLBACK_ACK, "Agradecimiento"),
        _ => stay(
            label,
            replies::FALLBACK_NOT_UNDERSTOOD,
            "Mensaje no reconocido",
        ),
    }
}

fn enter(
    next: DialogueState,
    reply: impl Into<String>,
    context: impl Into<String>,
) -> TransitionResult {
    TransitionResult::new(StateUpdate::Enter(next))
        .with_effect(Effect::reply(reply))
        .with_effect(Effect::record(context, next.label()))
}

fn finish(
    outcome: TerminalOutcome,
    reply: impl Into<String>,
    context: impl Into<String>,
) -> TransitionResult {
    TransitionResult::new(StateUpdate::End)
        .with_effect(Effect::reply(reply))
        .with_effect(Effect::record(context, outcome.label()))
}

fn stay(current: &str, reply: impl Into<String>, context: impl Into<String>) -> TransitionResult {
    TransitionResult::new(StateUpdate::Keep)
        .with_effect(Effect::reply(reply))
        .with_effect(Effect::record(context, current))
}

#[cfg(test)]
impl TransitionResult {
    pub fn reply_text(&self) -> Option<&str> {
        self.effects.iter().find_map(|effect| match effect {
            Effect::SendReply { text } => Some(text.as_str()),
            Effect::Record { .. } => None,
        })
    }

    pub fn recorded(&self) -> Option<(&str, &str)> {
        self.effects.iter().find_map(|effect| match effect {
            Effect::Record {
                context,
                state_label,
            } => Some((context.as_str(), state_label.as_str())),
            Effect::SendReply { .. } => None,
        })
    }
}
