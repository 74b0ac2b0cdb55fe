pub mod audio;
pub mod cli;
pub mod config;
pub mod contact;
pub mod exchange;
pub mod modal;
pub mod models;
pub mod presentation;
pub mod session;
pub mod slug;
pub mod terminal;
pub mod webhook;

use audio::AudioRecorder;
use cli::Args;
use config::AppConfig;
use contact::ContactStore;
use exchange::MessageExchange;
use log::{ info, warn };
use modal::ChatModalStore;
use session::ChatSession;
use std::error::Error;
use std::sync::Arc;
use std::time::Duration;
use terminal::{ default_microphone, Terminal };
use webhook::{ HttpWebhookClient, WebhookTransport };

const EVENT_FLUSH_TIMEOUT: Duration = Duration::from_secs(5);

pub async fn run(args: Args) -> Result<(), Box<dyn Error + Send + Sync>> {
    let config = AppConfig::from_args(&args)?;
    config.log_summary();

    let transport = Arc::new(HttpWebhookClient::new(config.webhook_url.as_str(), config.request_timeout)?);
    info!("Using webhook URL: {}", transport.endpoint());

    let modal = ChatModalStore::new();
    let exchange = MessageExchange::new(transport, config.reply_policy);
    let recorder = AudioRecorder::new(default_microphone());
    let contact_store = ContactStore::new(config.contact_store_path.clone());
    let mut session = ChatSession::new(
        modal.clone(),
        exchange,
        recorder,
        contact_store,
        config.contact_policy
    );

    let mut terminal = Terminal::new();
    terminal.run(
        modal,
        &mut session,
        config.logo_url.as_str(),
        &config.agent_name,
        &config.agent_icon
    ).await?;

    if tokio::time::timeout(EVENT_FLUSH_TIMEOUT, session.flush_events()).await.is_err() {
        warn!("Gave up waiting for pending system events");
    }
    info!("Chat session {} finished", session.session_id());
    Ok(())
}
