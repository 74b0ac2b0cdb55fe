use log::debug;
use serde_json::Value as JsonValue;
use std::fmt;
use std::str::FromStr;
use crate::models::chat::MessageType;
use crate::models::webhook::ReplyMessage;

/// Acknowledgement the workflow engine sends before a real answer exists.
pub const WORKFLOW_STARTED: &str = "Workflow was started";
pub const NO_ITEM_FOUND: &str = "No item to return got found";

/// How many of the messages in one reply reach the transcript.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ReplyPolicy {
    #[default]
    All,
    First,
}

#[derive(Debug, PartialEq, Eq)]
pub struct ParseReplyPolicyError {
    message: String,
}

impl fmt::Display for ParseReplyPolicyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ParseReplyPolicyError {}

impl FromStr for ReplyPolicy {
    type Err = ParseReplyPolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "all" => Ok(ReplyPolicy::All),
            "first" => Ok(ReplyPolicy::First),
            _ =>
                Err(ParseReplyPolicyError {
                    message: format!("Invalid reply policy: '{}' (expected all or first)", s),
                }),
        }
    }
}

/// One candidate message inside a reply, before filtering.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReplyItem {
    pub message: Option<String>,
    pub type_message: Option<String>,
}

impl ReplyItem {
    fn from_value(value: &JsonValue) -> Self {
        Self {
            message: value.get("message").and_then(JsonValue::as_str).map(str::to_string),
            type_message: value.get("typeMessage").and_then(JsonValue::as_str).map(str::to_string),
        }
    }

    fn into_reply_message(self) -> Option<ReplyMessage> {
        let text = self.message?;
        if text.is_empty() || text == WORKFLOW_STARTED {
            return None;
        }
        Some(ReplyMessage {
            text,
            message_type: MessageType::from_type_message(self.type_message.as_deref()),
        })
    }
}

/// The reply shapes the webhook has been seen to produce, tried in this order:
/// no-op markers, `{output: [...]}`, a bare array (items may themselves wrap
/// an `output` array), then a flat `{message|messages}` object.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WebhookReply {
    Empty,
    Output(Vec<ReplyItem>),
    Batch(Vec<ReplyItem>),
    Flat(ReplyItem),
    Unrecognized,
}

fn is_zero_code(obj: &serde_json::Map<String, JsonValue>) -> bool {
    obj.get("code").and_then(JsonValue::as_f64) == Some(0.0)
}

fn output_items(value: &JsonValue) -> Option<Vec<ReplyItem>> {
    value.get("output").and_then(JsonValue::as_array).map(|items| items.iter().map(ReplyItem::from_value).collect())
}

impl WebhookReply {
    pub fn from_value(value: &JsonValue) -> Self {
        match value {
            JsonValue::Null => WebhookReply::Empty,
            JsonValue::Object(obj) => {
                if obj.is_empty() || is_zero_code(obj) {
                    return WebhookReply::Empty;
                }
                if obj.get("message").and_then(JsonValue::as_str) == Some(NO_ITEM_FOUND) {
                    return WebhookReply::Empty;
                }
                if let Some(items) = output_items(value) {
                    return WebhookReply::Output(items);
                }
                let text = [obj.get("messages"), obj.get("message")]
                    .into_iter()
                    .flatten()
                    .filter_map(JsonValue::as_str)
                    .find(|s| !s.is_empty());
                match text {
                    Some(t) =>
                        WebhookReply::Flat(ReplyItem {
                            message: Some(t.to_string()),
                            type_message: obj
                                .get("typeMessage")
                                .and_then(JsonValue::as_str)
                                .map(str::to_string),
                        }),
                    None => WebhookReply::Unrecognized,
                }
            }
            JsonValue::Array(outer) => {
                let mut items = Vec::new();
                for entry in outer {
                    match output_items(entry) {
                        Some(nested) => items.extend(nested),
                        None => items.push(ReplyItem::from_value(entry)),
                    }
                }
                WebhookReply::Batch(items)
            }
            _ => WebhookReply::Unrecognized,
        }
    }

    pub fn into_messages(self) -> Vec<ReplyMessage> {
        match self {
            WebhookReply::Empty | WebhookReply::Unrecognized => Vec::new(),
            WebhookReply::Flat(item) => item.into_reply_message().into_iter().collect(),
            WebhookReply::Output(items) | WebhookReply::Batch(items) =>
                items.into_iter().filter_map(ReplyItem::into_reply_message).collect(),
        }
    }
}

/// Normalizes any reply body into the messages to display.
pub fn parse_reply(value: &JsonValue, policy: ReplyPolicy) -> Vec<ReplyMessage> {
    let reply = WebhookReply::from_value(value);
    if reply == WebhookReply::Unrecognized {
        debug!("Unrecognized webhook reply shape: {}", value);
    }
    let mut messages = reply.into_messages();
    if policy == ReplyPolicy::First {
        messages.truncate(1);
    }
    messages
}
