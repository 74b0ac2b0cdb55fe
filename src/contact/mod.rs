pub mod flow;
pub mod store;

use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use crate::models::contact::ContactInfo;

pub use flow::{ CollectorReply, ContactPopup, ConversationStep, ConversationalCollector };
pub use store::ContactStore;

pub const NAME_REQUIRED: &str = "Por favor, informe seu nome.";
pub const WHATSAPP_REQUIRED: &str = "Por favor, informe seu WhatsApp.";
pub const WHATSAPP_INVALID: &str = "WhatsApp inválido. Informe pelo menos 10 dígitos.";
pub const EMAIL_REQUIRED: &str = "Por favor, informe seu email.";
pub const EMAIL_INVALID: &str = "Email inválido. Deve conter @.";
pub const AUDIO_REQUIRES_CONTACT: &str =
    "Por favor, complete suas informações de contato para utilizar o áudio.";

const MIN_WHATSAPP_DIGITS: usize = 10;

#[derive(Debug, Error)]
pub enum ContactError {
    #[error("contact store IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("contact store JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("no data directory available for the contact store")]
    NoDataDir,
}

/// Whether contact details are asked up front in the chat or through a form.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ContactPolicy {
    /// Form shown on close or on demand; text is never blocked.
    #[default]
    Popup,
    /// Name, WhatsApp and email asked as chat turns; free text and audio wait.
    Conversational,
}

#[derive(Debug, PartialEq, Eq)]
pub struct ParseContactPolicyError {
    message: String,
}

impl fmt::Display for ParseContactPolicyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ParseContactPolicyError {}

impl FromStr for ContactPolicy {
    type Err = ParseContactPolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "popup" => Ok(ContactPolicy::Popup),
            "conversational" | "chat" => Ok(ContactPolicy::Conversational),
            _ =>
                Err(ParseContactPolicyError {
                    message: format!("Invalid contact policy: '{}' (expected popup or conversational)", s),
                }),
        }
    }
}

pub fn validate_name(name: &str) -> Result<(), &'static str> {
    if name.trim().is_empty() { Err(NAME_REQUIRED) } else { Ok(()) }
}

pub fn validate_whatsapp(whatsapp: &str) -> Result<(), &'static str> {
    if whatsapp.trim().is_empty() {
        return Err(WHATSAPP_REQUIRED);
    }
    let digits = whatsapp.chars().filter(|c| c.is_ascii_digit()).count();
    if digits < MIN_WHATSAPP_DIGITS {
        return Err(WHATSAPP_INVALID);
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), &'static str> {
    if email.trim().is_empty() {
        return Err(EMAIL_REQUIRED);
    }
    if !email.contains('@') {
        return Err(EMAIL_INVALID);
    }
    Ok(())
}

/// Per-field messages from a failed form submission.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ContactFormErrors {
    pub name: Option<&'static str>,
    pub whatsapp: Option<&'static str>,
    pub email: Option<&'static str>,
}

impl ContactFormErrors {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.whatsapp.is_none() && self.email.is_none()
    }

    pub fn messages(&self) -> Vec<&'static str> {
        [self.name, self.whatsapp, self.email].into_iter().flatten().collect()
    }
}

/// Checks all three fields at once, returning the trimmed contact on success.
pub fn validate_contact(info: &ContactInfo) -> Result<ContactInfo, ContactFormErrors> {
    let errors = ContactFormErrors {
        name: validate_name(&info.name).err(),
        whatsapp: validate_whatsapp(&info.whatsapp).err(),
        email: validate_email(&info.email).err(),
    };
    if !errors.is_empty() {
        return Err(errors);
    }
    Ok(ContactInfo::new(info.name.trim(), info.whatsapp.trim(), info.email.trim()))
}
