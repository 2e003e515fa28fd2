//! WhatsApp Cloud API transport
//!
//! Inbound webhook payload parsing and the outbound reply channel.

mod payload;
mod whatsapp;

pub use payload::WebhookPayload;
pub use whatsapp::{LogOnlySender, WhatsAppSender};
