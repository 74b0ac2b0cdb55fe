use log::{ debug, error, info };
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use crate::models::chat::MessageType;
use crate::models::contact::ContactInfo;
use crate::models::webhook::{ ReplyMessage, TypeMessage, WebhookPayload };
use crate::slug::agent_slug_or_unknown;
use crate::webhook::{ parse_reply, ReplyPolicy, WebhookTransport };

pub const TECHNICAL_DIFFICULTIES: &str =
    "Desculpe, estamos com dificuldades técnicas. Por favor, tente novamente mais tarde.";

/// What the user is sending.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outgoing {
    Text(String),
    /// Bare base64 (no data-URI prefix) and the `mm:ss` duration.
    Audio {
        base64: String,
        duration: String,
    },
}

impl Outgoing {
    fn type_message(&self) -> TypeMessage {
        match self {
            Outgoing::Text(_) => TypeMessage::Text,
            Outgoing::Audio { .. } => TypeMessage::Audio,
        }
    }

    fn into_message(self) -> String {
        match self {
            Outgoing::Text(text) => text,
            Outgoing::Audio { base64, .. } => base64,
        }
    }
}

/// Per-session values attached to every payload.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SessionContext {
    pub agent_slug: String,
    pub session_id: String,
    pub contact: Option<ContactInfo>,
}

impl SessionContext {
    pub fn new(agent_name: Option<&str>, session_id: impl Into<String>, contact: Option<ContactInfo>) -> Self {
        Self {
            agent_slug: agent_slug_or_unknown(agent_name),
            session_id: session_id.into(),
            contact,
        }
    }

    fn payload(&self, message: String, type_message: TypeMessage) -> WebhookPayload {
        WebhookPayload::new(
            self.agent_slug.clone(),
            message,
            type_message,
            self.session_id.clone()
        ).with_contact(self.contact.as_ref())
    }
}

/// Sends user input to the webhook and turns whatever comes back into
/// displayable replies.
pub struct MessageExchange {
    transport: Arc<dyn WebhookTransport>,
    policy: ReplyPolicy,
    typing: watch::Sender<bool>,
}

impl MessageExchange {
    pub fn new(transport: Arc<dyn WebhookTransport>, policy: ReplyPolicy) -> Self {
        let (typing, _) = watch::channel(false);
        Self { transport, policy, typing }
    }

    pub fn subscribe_typing(&self) -> watch::Receiver<bool> {
        self.typing.subscribe()
    }

    pub fn is_typing(&self) -> bool {
        *self.typing.borrow()
    }

    pub fn reply_policy(&self) -> ReplyPolicy {
        self.policy
    }

    /// One POST, then the parsed replies. Never fails: a transport or decode
    /// error becomes the single apology message. The typing indicator is on
    /// for the duration of the call and off afterwards on every path.
    pub async fn send_message(&self, outgoing: Outgoing, ctx: &SessionContext) -> Vec<ReplyMessage> {
        let kind = outgoing.type_message();
        let payload = ctx.payload(outgoing.into_message(), kind);
        info!("Sending {:?} message to webhook for agent '{}'", kind, payload.agent);

        self.typing.send_replace(true);
        let result = self.transport.post(&payload).await;
        self.typing.send_replace(false);

        match result {
            Ok(body) => {
                debug!("Webhook reply ({:?}): {}", kind, body);
                parse_reply(&body, self.policy)
            }
            Err(e) => {
                error!("Webhook call failed ({:?}): {}", kind, e);
                vec![ReplyMessage {
                    text: TECHNICAL_DIFFICULTIES.to_string(),
                    message_type: MessageType::Text,
                }]
            }
        }
    }

    /// Posts a system event (`CHAT_OPENED`, `USER_INFO_COLLECTED`) on a
    /// detached task. The reply body is ignored and failures are only logged.
    pub fn notify(&self, event: &'static str, ctx: &SessionContext) -> JoinHandle<()> {
        let payload = ctx.payload(event.to_string(), TypeMessage::System);
        let transport = self.transport.clone();
        tokio::spawn(async move {
            match transport.post(&payload).await {
                Ok(body) => debug!("System event {} acknowledged: {}", event, body),
                Err(e) => error!("System event {} failed: {}", event, e),
            }
        })
    }

    pub fn endpoint(&self) -> String {
        self.transport.endpoint()
    }
}
