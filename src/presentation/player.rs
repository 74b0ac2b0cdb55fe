use crate::presentation::duration::{ format_time, normalize_duration, parse_duration };

const DATA_AUDIO_PREFIX: &str = "data:audio";
const DURATION_TAG: &str = "duration:";

/// An audio bubble's payload: `<data URI>|duration:<mm:ss>`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AudioAttachment {
    pub data_uri: String,
    pub duration: String,
}

impl AudioAttachment {
    pub fn new(data_uri: impl Into<String>, duration: impl Into<String>) -> Self {
        Self {
            data_uri: data_uri.into(),
            duration: duration.into(),
        }
    }

    pub fn encode(&self) -> String {
        format!("{}|{}{}", self.data_uri, DURATION_TAG, self.duration)
    }

    /// Splits a message text back into URI and a display-safe duration.
    /// Returns `None` when the text carries no audio data URI.
    pub fn decode(text: &str) -> Option<Self> {
        if !text.contains(DATA_AUDIO_PREFIX) {
            return None;
        }
        let mut parts = text.splitn(2, '|');
        let data_uri = parts.next().unwrap_or_default().to_string();
        let duration = parts
            .next()
            .and_then(|p| p.trim().strip_prefix(DURATION_TAG))
            .map(normalize_duration)
            .unwrap_or_else(|| normalize_duration(""));
        Some(Self { data_uri, duration })
    }
}

/// Scrubber state for one audio bubble.
#[derive(Clone, Debug, PartialEq)]
pub struct AudioPlayer {
    total_seconds: f64,
    current_time: f64,
    playing: bool,
}

impl AudioPlayer {
    pub fn new(duration: &str) -> Self {
        Self {
            total_seconds: parse_duration(duration) as f64,
            current_time: 0.0,
            playing: false,
        }
    }

    /// Replaces the declared duration with the one measured from the media.
    pub fn set_media_duration(&mut self, seconds: f64) {
        if seconds.is_finite() && seconds > 0.0 {
            self.total_seconds = seconds;
        }
    }

    pub fn toggle(&mut self) -> bool {
        self.playing = !self.playing;
        self.playing
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    pub fn total_seconds(&self) -> f64 {
        self.total_seconds
    }

    /// Playback tick. Reaching the end stops and rewinds.
    pub fn advance(&mut self, elapsed: f64) {
        if !self.playing {
            return;
        }
        self.current_time += elapsed;
        if self.current_time >= self.total_seconds {
            self.playing = false;
            self.current_time = 0.0;
        }
    }

    /// Click on the progress track at `offset_x` of a `width`-wide bar.
    pub fn seek(&mut self, offset_x: f64, width: f64) {
        if width <= 0.0 || !offset_x.is_finite() {
            return;
        }
        let fraction = (offset_x / width).clamp(0.0, 1.0);
        self.current_time = fraction * self.total_seconds;
    }

    pub fn progress_percentage(&self) -> f64 {
        if self.total_seconds > 0.0 {
            (self.current_time / self.total_seconds) * 100.0
        } else {
            0.0
        }
    }

    pub fn time_display(&self) -> String {
        format!(
            "{} / {}",
            format_time(self.current_time.floor() as u64),
            format_time(self.total_seconds.floor() as u64)
        )
    }

    pub fn progress_bar(&self, width: usize) -> String {
        let filled = ((self.progress_percentage() / 100.0) * width as f64).round() as usize;
        let filled = filled.min(width);
        format!("{}{}", "━".repeat(filled), "─".repeat(width - filled))
    }
}
