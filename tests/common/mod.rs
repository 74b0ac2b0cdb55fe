#![allow(dead_code)]

use hubnexus_chat::audio::{ AudioError, AudioRecorder, AudioSpec, ChunkSender, Microphone, MicrophoneTrack };
use hubnexus_chat::contact::{ ContactPolicy, ContactStore };
use hubnexus_chat::exchange::MessageExchange;
use hubnexus_chat::modal::ChatModalStore;
use hubnexus_chat::session::ChatSession;
use hubnexus_chat::webhook::{ HttpWebhookClient, ReplyPolicy };
use serde_json::Value as JsonValue;
use std::path::Path;
use std::sync::atomic::{ AtomicBool, Ordering };
use std::sync::Arc;
use wiremock::MockServer;

struct FakeTrack {
    live: Arc<AtomicBool>,
}

impl MicrophoneTrack for FakeTrack {
    fn spec(&self) -> AudioSpec {
        AudioSpec { sample_rate: 8000, channels: 1 }
    }

    fn stop(&mut self) {
        self.live.store(false, Ordering::SeqCst);
    }
}

/// Microphone that emits a fixed burst of samples and records whether it is held.
pub struct FakeMicrophone {
    pub live: Arc<AtomicBool>,
}

impl Microphone for FakeMicrophone {
    fn open(&self, chunks: ChunkSender) -> Result<Box<dyn MicrophoneTrack>, AudioError> {
        self.live.store(true, Ordering::SeqCst);
        chunks.send(vec![0, 100, -100, 0]).ok();
        Ok(Box::new(FakeTrack { live: self.live.clone() }))
    }
}

pub struct Harness {
    pub session: ChatSession,
    pub modal: Arc<ChatModalStore>,
    pub mic_live: Arc<AtomicBool>,
}

pub fn harness(webhook_url: &str, policy: ContactPolicy, store_path: &Path) -> Harness {
    let transport = Arc::new(HttpWebhookClient::new(webhook_url, None).expect("webhook client"));
    let modal = ChatModalStore::new();
    let live = Arc::new(AtomicBool::new(false));
    let recorder = AudioRecorder::new(Arc::new(FakeMicrophone { live: live.clone() }));
    let session = ChatSession::new(
        modal.clone(),
        MessageExchange::new(transport, ReplyPolicy::All),
        recorder,
        ContactStore::new(store_path),
        policy
    );
    Harness { session, modal, mic_live: live }
}

impl Harness {
    pub fn open(&mut self, agent: &str) {
        self.modal.open(agent, "fas fa-robot");
        let state = self.modal.state();
        self.session.handle_modal_state(&state);
    }

    /// Recorded requests once every system event has reached the server.
    pub async fn bodies(&mut self, server: &MockServer) -> Vec<JsonValue> {
        self.session.flush_events().await;
        request_bodies(server).await
    }
}

pub async fn request_bodies(server: &MockServer) -> Vec<JsonValue> {
    server
        .received_requests().await
        .expect("request recording enabled")
        .iter()
        .map(|r| serde_json::from_slice(&r.body).expect("json body"))
        .collect()
}

/// URL of a local port nothing listens on.
pub fn dead_endpoint() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().expect("addr").port();
    drop(listener);
    format!("http://127.0.0.1:{}/webhook/chat", port)
}
