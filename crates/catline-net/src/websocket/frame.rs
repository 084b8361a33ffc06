//! Chat frames exchanged over the socket.
//!
//! Outbound frames are JSON objects `{text, user_id, ...extra}`. Inbound text
//! frames are classified into chat messages and server-reported errors.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{NetworkError, Result};

/// Keys the caller may not supply through extra send data.
pub const RESERVED_KEYS: [&str; 2] = ["text", "user_id"];

/// A frame to send to the server.
#[derive(Clone, Debug, PartialEq)]
pub struct OutboundFrame {
    text: String,
    user_id: String,
    extra: Map<String, Value>,
}

impl OutboundFrame {
    /// Build a frame, rejecting extra data that would override a reserved key.
    pub fn new(
        text: impl Into<String>,
        user_id: impl Into<String>,
        extra: Option<Map<String, Value>>,
    ) -> Result<Self> {
        let extra = extra.unwrap_or_default();
        if let Some(key) = RESERVED_KEYS.iter().find(|key| extra.contains_key(**key)) {
            return Err(NetworkError::ReservedKey((*key).to_string()));
        }
        Ok(Self {
            text: text.into(),
            user_id: user_id.into(),
            extra,
        })
    }

    /// The message text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The user the message is sent as.
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// The frame as a JSON object.
    pub fn to_value(&self) -> Value {
        let mut object = Map::with_capacity(self.extra.len() + 2);
        object.insert("text".to_string(), Value::String(self.text.clone()));
        object.insert("user_id".to_string(), Value::String(self.user_id.clone()));
        object.extend(self.extra.clone());
        Value::Object(object)
    }

    /// Serialize for the wire.
    pub fn to_wire(&self) -> String {
        self.to_value().to_string()
    }
}

/// Kind of a chat message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    /// A complete chat reply.
    #[default]
    Chat,
    /// One streamed token of a reply being generated.
    ChatToken,
    /// A server notification.
    Notification,
    /// Any other message type.
    #[serde(other)]
    Other,
}

/// A chat message pushed by the server.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SocketMessage {
    /// Message type.
    #[serde(rename = "type", default)]
    pub kind: MessageKind,
    /// Message body.
    pub content: String,
    /// Recipient user, when the server includes it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    /// Explanation of how the reply was produced.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub why: Option<Value>,
    /// Remaining fields, untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// An error frame reported by the server.
#[derive(Clone, Debug, PartialEq)]
pub struct ServerError {
    /// Error name (`"Error"` when the server sent none).
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// The frame exactly as received.
    pub raw: Value,
}

impl ServerError {
    /// Build from any JSON payload, reading `name` and `description` when present.
    pub fn from_value(raw: Value) -> Self {
        let field = |key: &str| raw.get(key).and_then(Value::as_str).map(str::to_string);
        let name = field("name").unwrap_or_else(|| "Error".to_string());
        let description = field("description").unwrap_or_else(|| match &raw {
            Value::Object(_) => String::new(),
            other => other.to_string(),
        });
        Self {
            name,
            description,
            raw,
        }
    }
}

/// A classified inbound text frame.
#[derive(Clone, Debug, PartialEq)]
pub enum InboundFrame {
    /// A chat message.
    Message(SocketMessage),
    /// A server-reported error.
    Error(ServerError),
}

impl InboundFrame {
    /// Parse and classify a text frame.
    ///
    /// Fails only when the text is not JSON.
    pub fn parse(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)?;
        Ok(Self::classify(value))
    }

    /// Classify an already-parsed payload.
    pub fn classify(value: Value) -> Self {
        if !is_message_shaped(&value) {
            return Self::Error(ServerError::from_value(value));
        }
        match serde_json::from_value::<SocketMessage>(value.clone()) {
            Ok(message) => Self::Message(message),
            Err(_) => Self::Error(ServerError::from_value(value)),
        }
    }
}

/// Message frames carry `content`, no `error` field, and a type other than `"error"`.
fn is_message_shaped(value: &Value) -> bool {
    let Some(object) = value.as_object() else {
        return false;
    };
    object.contains_key("content")
        && !object.contains_key("error")
        && object.get("type").and_then(Value::as_str) != Some("error")
}
