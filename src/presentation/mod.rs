pub mod duration;
pub mod player;

use crate::models::chat::{ ChatMessage, MessageType };

pub use duration::{ format_clock, format_time, normalize_duration, parse_duration };
pub use player::{ AudioAttachment, AudioPlayer };

pub const TYPING_INDICATOR: &str = "digitando…";
const PROGRESS_WIDTH: usize = 16;

/// Body of a bubble, by message type.
pub fn render_content(message: &ChatMessage) -> String {
    match message.message_type {
        MessageType::Audio =>
            match AudioAttachment::decode(&message.text) {
                Some(att) => {
                    let player = AudioPlayer::new(&att.duration);
                    format!("▶ {} {}", player.progress_bar(PROGRESS_WIDTH), player.time_display())
                }
                None => message.text.clone(),
            }
        MessageType::Image if message.text.starts_with("data:image") => "[imagem]".to_string(),
        _ => message.text.clone(),
    }
}

pub fn render_message(message: &ChatMessage, agent_name: &str) -> String {
    let author = if message.is_user { "Você" } else { agent_name };
    format!("[{}] {}: {}", message.time, author, render_content(message))
}

pub fn render_transcript(messages: &[ChatMessage], agent_name: &str, typing: bool) -> String {
    let mut lines: Vec<String> = messages
        .iter()
        .map(|m| render_message(m, agent_name))
        .collect();
    if typing {
        lines.push(format!("{} {}", agent_name, TYPING_INDICATOR));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn message(text: &str, is_user: bool, message_type: MessageType) -> ChatMessage {
        let mut m = ChatMessage::new(1, text, is_user, message_type);
        m.time = "10:30".to_string();
        m
    }

    #[test]
    fn audio_bubble_shows_the_scrubber() {
        let m = message("data:audio/wav;base64,AAAA|duration:01:05", true, MessageType::Audio);
        assert_eq!(render_message(&m, "SDR"), format!("[10:30] Você: ▶ {} 0:00 / 1:05", "─".repeat(16)));
    }

    #[test]
    fn audio_with_oversized_duration_renders_as_zero() {
        let m = message("data:audio/mp3;base64,AAAA|duration:999999999999999999:00", false, MessageType::Audio);
        assert_eq!(render_content(&m), format!("▶ {} 0:00 / 0:00", "─".repeat(16)));
    }

    #[test]
    fn images_and_text() {
        let img = message("data:image/png;base64,AAAA", false, MessageType::Image);
        assert_eq!(render_content(&img), "[imagem]");
        let link = message("https://example.com/a.png", false, MessageType::Image);
        assert_eq!(render_content(&link), "https://example.com/a.png");
        let doc = message("contrato.pdf", false, MessageType::Document);
        assert_eq!(render_message(&doc, "Jurídico"), "[10:30] Jurídico: contrato.pdf");
    }

    #[test]
    fn typing_indicator_trails_the_transcript() {
        let msgs = vec![message("Olá", true, MessageType::Text)];
        assert_eq!(render_transcript(&msgs, "SDR", true), "[10:30] Você: Olá\nSDR digitando…");
        assert_eq!(render_transcript(&msgs, "SDR", false), "[10:30] Você: Olá");
    }
}
