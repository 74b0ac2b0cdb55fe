use log::{ error, info, warn };
use std::sync::Arc;
use tokio::task::JoinHandle;
use uuid::Uuid;
use crate::audio::{ AudioError, AudioRecorder };
use crate::contact::{
    CollectorReply,
    ContactPolicy,
    ContactPopup,
    ContactStore,
    ConversationalCollector,
    AUDIO_REQUIRES_CONTACT,
};
use crate::exchange::{ MessageExchange, Outgoing, SessionContext };
use crate::modal::{ ChatModalStore, ModalState };
use crate::models::chat::{ ChatMessage, MessageType };
use crate::models::contact::ContactInfo;
use crate::models::webhook::{ ReplyMessage, CHAT_OPENED, USER_INFO_COLLECTED };

pub fn welcome_message(agent_name: &str) -> String {
    format!("Olá, você está no {}. Como posso ajudar?", agent_name)
}

/// Result of the user asking to close the modal.
#[derive(Debug)]
pub enum CloseOutcome {
    Closed,
    /// Contact is still missing; show this form instead of closing.
    ContactRequired(ContactPopup),
}

/// The chat widget: transcript, session identity, contact gate, recorder and
/// the webhook exchange for whichever agent the modal currently shows.
pub struct ChatSession {
    modal: Arc<ChatModalStore>,
    exchange: MessageExchange,
    recorder: AudioRecorder,
    contact_store: ContactStore,
    contact_policy: ContactPolicy,
    session_id: String,
    agent_name: Option<String>,
    contact: Option<ContactInfo>,
    collector: Option<ConversationalCollector>,
    messages: Vec<ChatMessage>,
    next_id: u64,
    pending_events: Vec<JoinHandle<()>>,
}

impl ChatSession {
    pub fn new(
        modal: Arc<ChatModalStore>,
        exchange: MessageExchange,
        recorder: AudioRecorder,
        contact_store: ContactStore,
        contact_policy: ContactPolicy
    ) -> Self {
        let contact = match contact_store.load() {
            Ok(c) => c,
            Err(e) => {
                error!("Failed to read stored contact info from {}: {}", contact_store.path().display(), e);
                None
            }
        };
        let session_id = Uuid::new_v4().to_string();
        info!("Chat session {} created (contact collected: {})", session_id, contact.is_some());
        Self {
            modal,
            exchange,
            recorder,
            contact_store,
            contact_policy,
            session_id,
            agent_name: None,
            contact,
            collector: None,
            messages: Vec::new(),
            next_id: 1,
            pending_events: Vec::new(),
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn agent_name(&self) -> Option<&str> {
        self.agent_name.as_deref()
    }

    pub fn contact(&self) -> Option<&ContactInfo> {
        self.contact.as_ref()
    }

    pub fn is_contact_collected(&self) -> bool {
        self.contact.is_some()
    }

    pub fn is_collecting_contact(&self) -> bool {
        self.collector.as_ref().is_some_and(|c| !c.is_complete())
    }

    pub fn is_typing(&self) -> bool {
        self.exchange.is_typing()
    }

    pub fn exchange(&self) -> &MessageExchange {
        &self.exchange
    }

    pub fn recorder(&self) -> &AudioRecorder {
        &self.recorder
    }

    fn context(&self) -> SessionContext {
        SessionContext::new(self.agent_name.as_deref(), self.session_id.clone(), self.contact.clone())
    }

    fn push(&mut self, text: impl Into<String>, is_user: bool, message_type: MessageType) -> ChatMessage {
        let message = ChatMessage::new(self.next_id, text, is_user, message_type);
        self.next_id += 1;
        self.messages.push(message.clone());
        message
    }

    fn push_replies(&mut self, replies: Vec<ReplyMessage>) -> Vec<ChatMessage> {
        replies
            .into_iter()
            .map(|r| self.push(r.text, false, r.message_type))
            .collect()
    }

    fn send_event(&mut self, event: &'static str) {
        self.pending_events.retain(|h| !h.is_finished());
        let handle = self.exchange.notify(event, &self.context());
        self.pending_events.push(handle);
    }

    /// Waits for system events still in flight.
    pub async fn flush_events(&mut self) {
        for handle in self.pending_events.drain(..) {
            if let Err(e) = handle.await {
                warn!("System event task ended abnormally: {}", e);
            }
        }
    }

    /// Reacts to a modal store change. Opening starts a fresh transcript.
    pub fn handle_modal_state(&mut self, state: &ModalState) {
        if state.is_open && !state.agent_name.is_empty() {
            self.open(&state.agent_name);
        }
    }

    fn open(&mut self, agent_name: &str) {
        self.messages.clear();
        self.next_id = 1;
        self.agent_name = Some(agent_name.to_string());
        self.push(welcome_message(agent_name), false, MessageType::Text);

        if self.contact_policy == ContactPolicy::Conversational && self.contact.is_none() {
            let collector = ConversationalCollector::new();
            let prompt = collector.first_prompt();
            self.collector = Some(collector);
            self.push(prompt, false, MessageType::Text);
        }

        self.send_event(CHAT_OPENED);
    }

    /// Appends the user's text and whatever the agent answers. While the
    /// conversational contact flow is active the answer is handled locally.
    pub async fn send_text(&mut self, text: &str) -> Vec<ChatMessage> {
        if text.trim().is_empty() {
            return Vec::new();
        }
        let mut appended = vec![self.push(text, true, MessageType::Text)];

        if self.is_collecting_contact() {
            appended.extend(self.answer_collector(text));
            return appended;
        }

        let replies = self.exchange.send_message(Outgoing::Text(text.to_string()), &self.context()).await;
        appended.extend(self.push_replies(replies));
        appended
    }

    fn answer_collector(&mut self, answer: &str) -> Vec<ChatMessage> {
        let Some(collector) = self.collector.as_mut() else {
            return Vec::new();
        };
        match collector.handle_answer(answer) {
            CollectorReply::Prompt(prompt) => vec![self.push(prompt, false, MessageType::Text)],
            CollectorReply::Completed(info) => {
                let done = ConversationalCollector::completion_message(&info);
                self.complete_contact(info);
                vec![self.push(done, false, MessageType::Text)]
            }
        }
    }

    pub fn start_recording(&mut self) -> Result<(), AudioError> {
        self.recorder.start()
    }

    pub fn discard_recording(&mut self) -> Result<(), AudioError> {
        self.recorder.discard()
    }

    /// Stops the recorder, waits for encoding and sends the clip. Without
    /// contact info the clip is dropped and the gate message shown instead.
    pub async fn stop_and_send_audio(&mut self) -> Result<Vec<ChatMessage>, AudioError> {
        let pending = self.recorder.stop()?;
        let encoded = pending.wait().await?;

        if self.contact.is_none() {
            warn!("Audio refused: contact info not collected");
            return Ok(vec![self.push(AUDIO_REQUIRES_CONTACT, false, MessageType::Text)]);
        }

        let mut appended = vec![self.push(encoded.attachment().encode(), true, MessageType::Audio)];
        let outgoing = Outgoing::Audio {
            base64: encoded.base64,
            duration: encoded.duration,
        };
        let replies = self.exchange.send_message(outgoing, &self.context()).await;
        appended.extend(self.push_replies(replies));
        Ok(appended)
    }

    /// Closing is intercepted by the contact form when the popup design is
    /// active and nothing was collected yet.
    pub fn request_close(&mut self) -> CloseOutcome {
        if self.contact_policy == ContactPolicy::Popup && self.contact.is_none() {
            let agent = self.agent_name.clone().unwrap_or_default();
            return CloseOutcome::ContactRequired(ContactPopup::new(agent));
        }
        if self.recorder.is_recording() {
            if let Err(e) = self.recorder.discard() {
                warn!("Failed to discard recording on close: {}", e);
            }
        }
        self.modal.close();
        CloseOutcome::Closed
    }

    /// Form for collecting contact outside of a close attempt.
    pub fn contact_popup(&self) -> ContactPopup {
        ContactPopup::new(self.agent_name.clone().unwrap_or_default())
    }

    /// Stores validated contact info, persists it, and tells the webhook.
    pub fn complete_contact(&mut self, info: ContactInfo) {
        if let Err(e) = self.contact_store.save(&info) {
            error!("Failed to persist contact info: {}", e);
        }
        self.contact = Some(info);
        self.collector = None;
        info!("Contact info collected for session {}", self.session_id);

        self.send_event(USER_INFO_COLLECTED);
    }
}
