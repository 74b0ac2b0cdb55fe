use serde::{ Deserialize, Serialize };
use crate::models::chat::MessageType;
use crate::models::contact::ContactInfo;

pub const CHAT_OPENED: &str = "CHAT_OPENED";
pub const USER_INFO_COLLECTED: &str = "USER_INFO_COLLECTED";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeMessage {
    Text,
    Audio,
    System,
}

/// Body of every POST to the webhook.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WebhookPayload {
    pub agent: String,
    pub message: String,
    #[serde(rename = "typeMessage")]
    pub type_message: TypeMessage,
    #[serde(rename = "sessionId")]
    pub session_id: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub nome: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub whatsapp: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub email: Option<String>,
}

impl WebhookPayload {
    pub fn new(
        agent: impl Into<String>,
        message: impl Into<String>,
        type_message: TypeMessage,
        session_id: impl Into<String>
    ) -> Self {
        Self {
            agent: agent.into(),
            message: message.into(),
            type_message,
            session_id: session_id.into(),
            nome: None,
            whatsapp: None,
            email: None,
        }
    }

    pub fn with_contact(mut self, contact: Option<&ContactInfo>) -> Self {
        if let Some(c) = contact {
            self.nome = Some(c.name.clone());
            self.whatsapp = Some(c.whatsapp.clone());
            self.email = Some(c.email.clone());
        }
        self
    }
}

/// A displayable `(text, type)` pair extracted from a webhook reply.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReplyMessage {
    pub text: String,
    pub message_type: MessageType,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn payload_uses_wire_field_names() {
        let payload = WebhookPayload::new("sdr", "Olá", TypeMessage::Text, "abc").with_contact(
            Some(&ContactInfo::new("Ana", "11999998888", "ana@example.com"))
        );
        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            json!({
                "agent": "sdr",
                "message": "Olá",
                "typeMessage": "text",
                "sessionId": "abc",
                "nome": "Ana",
                "whatsapp": "11999998888",
                "email": "ana@example.com"
            })
        );
    }

    #[test]
    fn contact_fields_are_omitted_when_unknown() {
        let payload = WebhookPayload::new("sdr", CHAT_OPENED, TypeMessage::System, "abc");
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["typeMessage"], "system");
        assert!(value.get("nome").is_none());
        assert!(value.get("email").is_none());
    }
}
