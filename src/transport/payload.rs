//! Webhook delivery payload
//!
//! Only the fields the bot reads are modelled; everything else is ignored.
//! Shape: `entry[].changes[].value.{contacts, messages, statuses}`.
//!
//! Lists are read item by item: an entry, change, contact or message of the
//! wrong shape is skipped without discarding its siblings.

use crate::dialogue::InboundMessage;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

#[derive(Debug, Default, Deserialize)]
pub struct WebhookPayload {
    #[serde(default, deserialize_with = "lenient_list")]
    pub entry: Vec<Entry>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Entry {
    #[serde(default, deserialize_with = "lenient_list")]
    pub changes: Vec<Change>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Change {
    #[serde(default, deserialize_with = "lenient")]
    pub value: ChangeValue,
}

#[derive(Debug, Default, Deserialize)]
pub struct ChangeValue {
    #[serde(default, deserialize_with = "lenient_list")]
    pub contacts: Vec<Contact>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub messages: Vec<Message>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Contact {
    #[serde(default)]
    pub wa_id: Option<String>,
    #[serde(default)]
    pub profile: Option<Profile>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Message {
    /// Numeric ids are accepted and kept as their decimal text
    #[serde(default, deserialize_with = "sender_id")]
    pub from: String,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub text: Option<TextBody>,
    #[serde(default)]
    pub interactive: Option<Interactive>,
    #[serde(default)]
    pub button: Option<Button>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TextBody {
    #[serde(default)]
    pub body: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct Interactive {
    #[serde(default)]
    pub button_reply: Option<InteractiveReply>,
    #[serde(default)]
    pub list_reply: Option<InteractiveReply>,
}

#[derive(Debug, Default, Deserialize)]
pub struct InteractiveReply {
    #[serde(default)]
    pub id: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct Button {
    #[serde(default)]
    pub text: Option<String>,
}

/// Well-formed items of a list; anything that is not a list reads as empty
fn lenient_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let Value::Array(items) = Value::deserialize(deserializer)? else {
        return Ok(Vec::new());
    };
    Ok(items
        .into_iter()
        .filter_map(|item| match serde_json::from_value(item) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                tracing::warn!(error = %e, "Skipping malformed webhook item");
                None
            }
        })
        .collect())
}

fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

fn sender_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(id) => id,
        Value::Number(id) => id.to_string(),
        _ => String::new(),
    })
}

impl Message {
    /// Text the dialogue should see, if this message type carries any
    fn text(&self) -> Option<String> {
        if let Some(text) = &self.text {
            return Some(text.body.clone());
        }
        if let Some(interactive) = &self.interactive {
            let reply = interactive
                .button_reply
                .as_ref()
                .or(interactive.list_reply.as_ref());
            if let Some(reply) = reply {
                return Some(reply.id.clone());
            }
        }
        self.button.as_ref().and_then(|button| button.text.clone())
    }
}

impl ChangeValue {
    fn display_name_for(&self, sender: &str) -> Option<String> {
        let profile_name =
            |contact: &Contact| contact.profile.as_ref().and_then(|p| p.name.clone());

        self.contacts
            .iter()
            .find(|c| c.wa_id.as_deref() == Some(sender))
            .and_then(profile_name)
            .or_else(|| self.contacts.first().and_then(profile_name))
    }
}

impl WebhookPayload {
    /// Flatten every message in the delivery, in order.
    ///
    /// Status-only deliveries yield nothing. Messages without a sender are
    /// dropped; messages without text are kept with `text: None`.
    pub fn into_messages(self) -> Vec<InboundMessage> {
        let mut messages = Vec::new();
        for change in self.entry.into_iter().flat_map(|entry| entry.changes) {
            let value = change.value;
            for message in &value.messages {
                if message.from.is_empty() {
                    tracing::debug!(kind = ?message.kind, "Skipping message without sender");
                    continue;
                }
                messages.push(InboundMessage {
                    sender: message.from.clone(),
                    text: message.text(),
                    display_name: value.display_name_for(&message.from),
                });
            }
        }
        messages
    }
}
