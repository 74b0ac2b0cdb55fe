use crate::contact::{ validate_contact, validate_email, validate_name, validate_whatsapp, ContactFormErrors };
use crate::models::contact::ContactInfo;

/// Blocking form that collects all three fields at once.
#[derive(Clone, Debug, Default)]
pub struct ContactPopup {
    agent_name: String,
    pub name: String,
    pub whatsapp: String,
    pub email: String,
    errors: ContactFormErrors,
}

impl ContactPopup {
    pub fn new(agent_name: impl Into<String>) -> Self {
        Self {
            agent_name: agent_name.into(),
            ..Default::default()
        }
    }

    pub fn intro(&self) -> String {
        format!(
            "Para continuar sua interação com o {}, precisamos de algumas informações para contato.",
            self.agent_name
        )
    }

    pub fn errors(&self) -> &ContactFormErrors {
        &self.errors
    }

    /// Validates every field; on failure the per-field errors are kept for display.
    pub fn submit(&mut self) -> Option<ContactInfo> {
        let draft = ContactInfo::new(self.name.clone(), self.whatsapp.clone(), self.email.clone());
        match validate_contact(&draft) {
            Ok(info) => {
                self.errors = ContactFormErrors::default();
                Some(info)
            }
            Err(errors) => {
                self.errors = errors;
                None
            }
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConversationStep {
    AskName,
    AskWhatsapp,
    AskEmail,
    Done,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CollectorReply {
    /// Next question, or the validation message for a rejected answer.
    Prompt(String),
    Completed(ContactInfo),
}

/// Asks for name, WhatsApp and email as successive chat turns.
#[derive(Clone, Debug)]
pub struct ConversationalCollector {
    step: ConversationStep,
    draft: ContactInfo,
}

impl Default for ConversationalCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl ConversationalCollector {
    pub fn new() -> Self {
        Self {
            step: ConversationStep::AskName,
            draft: ContactInfo::default(),
        }
    }

    pub fn step(&self) -> ConversationStep {
        self.step
    }

    pub fn is_complete(&self) -> bool {
        self.step == ConversationStep::Done
    }

    pub fn first_prompt(&self) -> &'static str {
        "Antes de começarmos, qual é o seu nome?"
    }

    pub fn completion_message(info: &ContactInfo) -> String {
        format!("Perfeito, {}! Agora me conte: como posso ajudar?", info.name)
    }

    pub fn handle_answer(&mut self, answer: &str) -> CollectorReply {
        let answer = answer.trim();
        match self.step {
            ConversationStep::AskName =>
                match validate_name(answer) {
                    Ok(()) => {
                        self.draft.name = answer.to_string();
                        self.step = ConversationStep::AskWhatsapp;
                        CollectorReply::Prompt(
                            format!("Prazer, {}! Qual é o seu WhatsApp (com DDD)?", self.draft.name)
                        )
                    }
                    Err(msg) => CollectorReply::Prompt(msg.to_string()),
                }
            ConversationStep::AskWhatsapp =>
                match validate_whatsapp(answer) {
                    Ok(()) => {
                        self.draft.whatsapp = answer.to_string();
                        self.step = ConversationStep::AskEmail;
                        CollectorReply::Prompt("Obrigado! E qual é o seu email?".to_string())
                    }
                    Err(msg) => CollectorReply::Prompt(msg.to_string()),
                }
            ConversationStep::AskEmail =>
                match validate_email(answer) {
                    Ok(()) => {
                        self.draft.email = answer.to_string();
                        self.step = ConversationStep::Done;
                        CollectorReply::Completed(self.draft.clone())
                    }
                    Err(msg) => CollectorReply::Prompt(msg.to_string()),
                }
            ConversationStep::Done => CollectorReply::Completed(self.draft.clone()),
        }
    }
}
