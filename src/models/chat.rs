use chrono::{ Local, Utc };
use serde::{ Deserialize, Serialize };
use std::fmt;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    #[default]
    Text,
    Audio,
    Image,
    Document,
    Video,
}

impl MessageType {
    /// Lenient conversion used for webhook replies: case-insensitive, and
    /// anything unrecognised is shown as text.
    pub fn from_type_message(raw: Option<&str>) -> Self {
        raw.and_then(|s| s.parse().ok()).unwrap_or_default()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MessageType::Text => "text",
            MessageType::Audio => "audio",
            MessageType::Image => "image",
            MessageType::Document => "document",
            MessageType::Video => "video",
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct ParseMessageTypeError {
    message: String,
}

impl fmt::Display for ParseMessageTypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ParseMessageTypeError {}

impl FromStr for MessageType {
    type Err = ParseMessageTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "text" => Ok(MessageType::Text),
            "audio" => Ok(MessageType::Audio),
            "image" => Ok(MessageType::Image),
            "document" => Ok(MessageType::Document),
            "video" => Ok(MessageType::Video),
            _ =>
                Err(ParseMessageTypeError {
                    message: format!("Invalid message type: '{}'", s),
                }),
        }
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One bubble in the transcript.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: u64,
    /// For audio messages: `<data URI>|duration:<mm:ss>`.
    pub text: String,
    pub is_user: bool,
    pub time: String,
    pub created_at: i64,
    #[serde(rename = "type")]
    pub message_type: MessageType,
}

impl ChatMessage {
    pub fn new(id: u64, text: impl Into<String>, is_user: bool, message_type: MessageType) -> Self {
        Self {
            id,
            text: text.into(),
            is_user,
            time: Local::now().format("%H:%M").to_string(),
            created_at: Utc::now().timestamp_millis(),
            message_type,
        }
    }

    /// Stable identity for rendering; ids alone repeat across reopened sessions.
    pub fn render_key(&self) -> String {
        format!("{}-{}", self.id, self.created_at)
    }
}
