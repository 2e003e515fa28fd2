//! Database schema and types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// SQL schema for initialization
pub const SCHEMA: &str = r"
CREATE TABLE IF NOT EXISTS consultas (
    id TEXT PRIMARY KEY,
    usuario TEXT NOT NULL,
    nombre TEXT NOT NULL,
    mensaje TEXT NOT NULL,
    contexto TEXT NOT NULL,
    estado TEXT NOT NULL,
    fecha TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_consultas_fecha ON consultas(fecha DESC);
CREATE INDEX IF NOT EXISTS idx_consultas_usuario ON consultas(usuario, fecha DESC);
";

/// One processed message, as persisted. Never updated after insertion.
///
/// Serialized field names follow the records already consumed by reporting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractionRecord {
    pub id: String,
    #[serde(rename = "usuario")]
    pub sender: String,
    #[serde(rename = "nombre")]
    pub display_name: String,
    #[serde(rename = "mensaje")]
    pub message: String,
    #[serde(rename = "contexto")]
    pub context: String,
    #[serde(rename = "estado")]
    pub state_label: String,
    #[serde(rename = "fecha")]
    pub recorded_at: DateTime<Utc>,
}

impl InteractionRecord {
    pub fn new(
        sender: impl Into<String>,
        display_name: impl Into<String>,
        message: impl Into<String>,
        context: impl Into<String>,
        state_label: impl Into<String>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            sender: sender.into(),
            display_name: display_name.into(),
            message: message.into(),
            context: context.into(),
            state_label: state_label.into(),
            recorded_at: Utc::now(),
        }
    }

    #[must_use]
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = context.into();
        self
    }
}
