//! Inbound messages and normalised user input

/// Keyword that resets the conversation from any state
pub const EXIT_KEYWORD: &str = "salir";

/// Short acknowledgements that never advance the dialogue
pub const AFFIRMATIONS: [&str; 5] = ["ok", "okay", "gracias", "bien", "entendido"];

/// Name recorded when the transport carries no profile name
pub const UNKNOWN_DISPLAY_NAME: &str = "Desconocido";

/// One inbound chat message, extracted from the transport payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub sender: String,
    /// Absent for deliveries without text (media, reactions, ...)
    pub text: Option<String>,
    pub display_name: Option<String>,
}

impl InboundMessage {
    #[allow(dead_code)] // Used in tests
    pub fn text(sender: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            sender: sender.into(),
            text: Some(text.into()),
            display_name: None,
        }
    }

    #[must_use]
    #[allow(dead_code)] // Used in tests
    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    /// Normalised input, or `None` when there is nothing to process
    pub fn input(&self) -> Option<UserInput> {
        self.text.as_deref().map(UserInput::new)
    }

    pub fn display_name(&self) -> &str {
        self.display_name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(UNKNOWN_DISPLAY_NAME)
    }
}

/// Message text trimmed and lowercased
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserInput(String);

impl UserInput {
    pub fn new(raw: &str) -> Self {
        Self(raw.trim().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_exit(&self) -> bool {
        self.0 == EXIT_KEYWORD
    }

    pub fn is_affirmation(&self) -> bool {
        AFFIRMATIONS.contains(&self.0.as_str())
    }
}
