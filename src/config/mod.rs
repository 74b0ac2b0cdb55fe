use log::info;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use url::Url;
use crate::cli::Args;
use crate::contact::{ ContactError, ContactPolicy, ContactStore };
use crate::webhook::ReplyPolicy;

pub const DEFAULT_WEBHOOK_URL: &str = "https://webhook.hubnexusai.com/webhook/meuportfolio";
pub const DEFAULT_LOGO_URL: &str =
    "https://ykrznbgxhdulsatplwnp.supabase.co/storage/v1/object/public/imagem//LOGO%203D%20SEM%20FUNDO.png";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {name} '{value}': {source}")]
    InvalidUrl {
        name: &'static str,
        value: String,
        #[source]
        source: url::ParseError,
    },
    #[error("{0}")]
    InvalidValue(String),
    #[error(transparent)]
    ContactStore(#[from] ContactError),
}

/// Settings resolved from flags, env and compiled-in fallbacks.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub webhook_url: Url,
    pub logo_url: Url,
    pub request_timeout: Option<Duration>,
    pub reply_policy: ReplyPolicy,
    pub contact_policy: ContactPolicy,
    pub contact_store_path: PathBuf,
    pub agent_name: String,
    pub agent_icon: String,
}

fn url_or_default(name: &'static str, value: Option<&str>, fallback: &str) -> Result<Url, ConfigError> {
    let raw = value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(fallback);
    Url::parse(raw).map_err(|source| ConfigError::InvalidUrl {
        name,
        value: raw.to_string(),
        source,
    })
}

impl AppConfig {
    pub fn from_args(args: &Args) -> Result<Self, ConfigError> {
        let webhook_url = url_or_default("webhook url", args.webhook_url.as_deref(), DEFAULT_WEBHOOK_URL)?;
        let logo_url = url_or_default("logo url", args.logo_url.as_deref(), DEFAULT_LOGO_URL)?;
        let reply_policy = args.reply_policy
            .parse::<ReplyPolicy>()
            .map_err(|e| ConfigError::InvalidValue(e.to_string()))?;
        let contact_policy = args.contact_policy
            .parse::<ContactPolicy>()
            .map_err(|e| ConfigError::InvalidValue(e.to_string()))?;
        let contact_store_path = match args.contact_store.as_deref().filter(|p| !p.trim().is_empty()) {
            Some(p) => PathBuf::from(p),
            None => ContactStore::default_path()?,
        };

        Ok(Self {
            webhook_url,
            logo_url,
            request_timeout: args.request_timeout_secs.filter(|s| *s > 0).map(Duration::from_secs),
            reply_policy,
            contact_policy,
            contact_store_path,
            agent_name: args.agent.clone(),
            agent_icon: args.agent_icon.clone(),
        })
    }

    pub fn log_summary(&self) {
        info!("--- Chat Configuration ---");
        info!("Webhook URL: {}", self.webhook_url);
        info!("Logo URL: {}", self.logo_url);
        info!("Request Timeout: {:?}", self.request_timeout);
        info!("Reply Policy: {:?}", self.reply_policy);
        info!("Contact Policy: {:?}", self.contact_policy);
        info!("Contact Store: {}", self.contact_store_path.display());
        info!("Agent: {} ({})", self.agent_name, self.agent_icon);
        info!("--------------------------");
    }
}
