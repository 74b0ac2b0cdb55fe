use log::{ debug, error };
use std::error::Error;
use std::sync::Arc;
use tokio::io::{ AsyncBufReadExt, BufReader, Lines, Stdin };
use tokio::sync::mpsc;
use crate::audio::{ Microphone, MICROPHONE_ALERT };
use crate::contact::ContactPopup;
use crate::modal::{ ChatModalStore, ModalState };
use crate::models::chat::ChatMessage;
use crate::models::contact::ContactInfo;
use crate::presentation::{ render_message, TYPING_INDICATOR };
use crate::session::{ ChatSession, CloseOutcome };

const HELP: &str =
    "Comandos: /gravar, /parar, /descartar, /contato, /fechar, /sair, /ajuda. Qualquer outro texto é enviado ao agente.";

#[derive(Debug, PartialEq, Eq)]
pub enum Command {
    Say(String),
    Record,
    StopRecording,
    Discard,
    Contact,
    Close,
    Quit,
    Help,
    Unknown(String),
}

pub fn parse_command(line: &str) -> Command {
    let trimmed = line.trim();
    if !trimmed.starts_with('/') {
        return Command::Say(line.to_string());
    }
    match trimmed.to_lowercase().as_str() {
        "/gravar" => Command::Record,
        "/parar" => Command::StopRecording,
        "/descartar" => Command::Discard,
        "/contato" => Command::Contact,
        "/fechar" => Command::Close,
        "/sair" => Command::Quit,
        "/ajuda" => Command::Help,
        other => Command::Unknown(other.to_string()),
    }
}

pub fn default_microphone() -> Arc<dyn Microphone> {
    #[cfg(feature = "cpal-mic")]
    {
        Arc::new(crate::audio::cpal_mic::CpalMicrophone)
    }
    #[cfg(not(feature = "cpal-mic"))]
    {
        Arc::new(crate::audio::NoMicrophone)
    }
}

/// Line-oriented view over a `ChatSession`.
pub struct Terminal {
    lines: Lines<BufReader<Stdin>>,
    agent_name: String,
}

impl Terminal {
    pub fn new() -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
            agent_name: String::new(),
        }
    }

    async fn read_line(&mut self) -> Result<Option<String>, std::io::Error> {
        self.lines.next_line().await
    }

    fn show(&self, messages: &[ChatMessage]) {
        for m in messages {
            println!("{}", render_message(m, &self.agent_name));
        }
    }

    fn header(&mut self, state: &ModalState, logo_url: &str) {
        self.agent_name = state.agent_name.clone();
        println!("==== {} [{}] · Online agora ====", state.agent_name, state.agent_icon);
        println!("Hub Nexus AI · {}", logo_url);
        println!("{}", HELP);
    }

    async fn ask(&mut self, label: &str) -> Result<Option<String>, std::io::Error> {
        println!("{}:", label);
        self.read_line().await
    }

    async fn fill_popup(&mut self, mut popup: ContactPopup) -> Result<Option<ContactInfo>, std::io::Error> {
        println!("{}", popup.intro());
        loop {
            let Some(name) = self.ask("Nome").await? else {
                return Ok(None);
            };
            let Some(whatsapp) = self.ask("WhatsApp").await? else {
                return Ok(None);
            };
            let Some(email) = self.ask("Email").await? else {
                return Ok(None);
            };
            popup.name = name;
            popup.whatsapp = whatsapp;
            popup.email = email;
            if let Some(info) = popup.submit() {
                return Ok(Some(info));
            }
            for msg in popup.errors().messages() {
                println!("! {}", msg);
            }
        }
    }

    async fn collect_contact(&mut self, session: &mut ChatSession, popup: ContactPopup) -> Result<(), std::io::Error> {
        if let Some(info) = self.fill_popup(popup).await? {
            session.complete_contact(info);
            println!("Obrigado! Informações registradas.");
        }
        Ok(())
    }

    /// Drives the chat until the modal closes or input ends.
    pub async fn run(
        &mut self,
        modal: Arc<ChatModalStore>,
        session: &mut ChatSession,
        logo_url: &str,
        agent_name: &str,
        agent_icon: &str
    ) -> Result<(), Box<dyn Error + Send + Sync>> {
        let (state_tx, mut state_rx) = mpsc::unbounded_channel::<ModalState>();
        let subscription = modal.subscribe(move |state| {
            let _ = state_tx.send(state.clone());
        });

        let mut typing = session.exchange().subscribe_typing();
        let typing_label = agent_name.to_string();
        let typing_task = tokio::spawn(async move {
            while typing.changed().await.is_ok() {
                if *typing.borrow() {
                    println!("{} {}", typing_label, TYPING_INDICATOR);
                }
            }
        });

        modal.open(agent_name, agent_icon);
        let result = self.event_loop(session, &mut state_rx, logo_url).await;

        modal.unsubscribe(subscription);
        typing_task.abort();
        result
    }

    async fn event_loop(
        &mut self,
        session: &mut ChatSession,
        state_rx: &mut mpsc::UnboundedReceiver<ModalState>,
        logo_url: &str
    ) -> Result<(), Box<dyn Error + Send + Sync>> {
        loop {
            while let Ok(state) = state_rx.try_recv() {
                if !state.is_open {
                    println!("Chat encerrado.");
                    return Ok(());
                }
                self.header(&state, logo_url);
                session.handle_modal_state(&state);
                self.show(session.messages());
            }

            let Some(line) = self.read_line().await? else {
                return Ok(());
            };
            match parse_command(&line) {
                Command::Say(text) => {
                    let appended = session.send_text(&text).await;
                    // The user's own line is already on screen.
                    self.show(appended.get(1..).unwrap_or_default());
                }
                Command::Record =>
                    match session.start_recording() {
                        Ok(()) => println!("Gravando… use /parar para enviar ou /descartar para cancelar."),
                        Err(e) if e.is_access_error() => {
                            error!("Microphone unavailable: {}", e);
                            println!("! {}", MICROPHONE_ALERT);
                        }
                        Err(e) => println!("! {}", e),
                    }
                Command::StopRecording =>
                    match session.stop_and_send_audio().await {
                        Ok(appended) => self.show(&appended),
                        Err(e) => println!("! {}", e),
                    }
                Command::Discard =>
                    match session.discard_recording() {
                        Ok(()) => println!("Gravação descartada."),
                        Err(e) => println!("! {}", e),
                    }
                Command::Contact => {
                    if session.is_contact_collected() {
                        println!("Suas informações de contato já foram registradas.");
                    } else {
                        let popup = session.contact_popup();
                        self.collect_contact(session, popup).await?;
                    }
                }
                Command::Close =>
                    match session.request_close() {
                        CloseOutcome::Closed => debug!("Close requested"),
                        CloseOutcome::ContactRequired(popup) => {
                            self.collect_contact(session, popup).await?;
                        }
                    }
                Command::Quit => {
                    return Ok(());
                }
                Command::Help => println!("{}", HELP),
                Command::Unknown(cmd) => println!("Comando desconhecido: {}. {}", cmd, HELP),
            }
        }
    }
}

impl Default for Terminal {
    fn default() -> Self {
        Self::new()
    }
}
