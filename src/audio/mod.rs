pub mod encode;
#[cfg(feature = "cpal-mic")]
pub mod cpal_mic;

use log::{ info, warn };
use std::sync::atomic::{ AtomicU64, Ordering };
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{ interval_at, Instant };
use crate::presentation::format_clock;

pub use encode::{ encode_recording, wav_bytes, EncodedAudio, WAV_MIME };

pub const MICROPHONE_ALERT: &str =
    "Não foi possível acessar o microfone. Verifique as permissões do navegador.";

const TICK: Duration = Duration::from_secs(1);

#[derive(Debug, Error)]
pub enum AudioError {
    #[error("microphone permission denied: {0}")]
    PermissionDenied(String),
    #[error("no microphone available")]
    NoDevice,
    #[error("unsupported capture format: {0}")]
    Unsupported(String),
    #[error("a recording is already in progress")]
    AlreadyRecording,
    #[error("no recording in progress")]
    NotRecording,
    #[error("audio encoding failed: {0}")]
    Encode(String),
}

impl AudioError {
    /// Failures the user must be told about with the microphone alert.
    pub fn is_access_error(&self) -> bool {
        matches!(
            self,
            AudioError::PermissionDenied(_) | AudioError::NoDevice | AudioError::Unsupported(_)
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AudioSpec {
    pub sample_rate: u32,
    pub channels: u16,
}

pub type ChunkSender = mpsc::UnboundedSender<Vec<i16>>;

/// Source of 16-bit PCM chunks.
pub trait Microphone: Send + Sync {
    /// Requests access and starts pushing captured chunks into `chunks`.
    fn open(&self, chunks: ChunkSender) -> Result<Box<dyn MicrophoneTrack>, AudioError>;
}

/// A live capture. `stop` releases the device; no chunk is sent after it returns.
pub trait MicrophoneTrack: Send {
    fn spec(&self) -> AudioSpec;
    fn stop(&mut self);
}

/// Used when the binary is built without a capture back-end.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoMicrophone;

impl Microphone for NoMicrophone {
    fn open(&self, _chunks: ChunkSender) -> Result<Box<dyn MicrophoneTrack>, AudioError> {
        Err(AudioError::NoDevice)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecorderState {
    Idle,
    Recording,
}

/// Raw result of a stopped recording.
#[derive(Clone, Debug, PartialEq)]
pub struct FinishedRecording {
    pub samples: Vec<i16>,
    pub spec: AudioSpec,
    pub duration_secs: u64,
}

/// Encoding running in the background after `stop`.
pub struct PendingAudio {
    duration_secs: u64,
    handle: JoinHandle<EncodedAudio>,
}

impl PendingAudio {
    pub fn duration_secs(&self) -> u64 {
        self.duration_secs
    }

    pub async fn wait(self) -> Result<EncodedAudio, AudioError> {
        self.handle.await.map_err(|e| AudioError::Encode(e.to_string()))
    }
}

struct ActiveRecording {
    track: Box<dyn MicrophoneTrack>,
    chunks: mpsc::UnboundedReceiver<Vec<i16>>,
    elapsed: Arc<AtomicU64>,
    ticker: JoinHandle<()>,
}

/// `Idle -> Recording -> (stop | discard) -> Idle`, one capture at a time.
pub struct AudioRecorder {
    microphone: Arc<dyn Microphone>,
    active: Option<ActiveRecording>,
}

impl AudioRecorder {
    pub fn new(microphone: Arc<dyn Microphone>) -> Self {
        Self { microphone, active: None }
    }

    pub fn state(&self) -> RecorderState {
        if self.active.is_some() { RecorderState::Recording } else { RecorderState::Idle }
    }

    pub fn is_recording(&self) -> bool {
        self.active.is_some()
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.active
            .as_ref()
            .map(|a| a.elapsed.load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    pub fn formatted_time(&self) -> String {
        format_clock(self.elapsed_secs())
    }

    pub fn start(&mut self) -> Result<(), AudioError> {
        if self.active.is_some() {
            return Err(AudioError::AlreadyRecording);
        }
        let (tx, rx) = mpsc::unbounded_channel();
        let track = self.microphone.open(tx)?;

        let elapsed = Arc::new(AtomicU64::new(0));
        let counter = elapsed.clone();
        let ticker = tokio::spawn(async move {
            let mut interval = interval_at(Instant::now() + TICK, TICK);
            loop {
                interval.tick().await;
                counter.fetch_add(1, Ordering::Relaxed);
            }
        });

        info!("Recording started ({} Hz, {} ch)", track.spec().sample_rate, track.spec().channels);
        self.active = Some(ActiveRecording {
            track,
            chunks: rx,
            elapsed,
            ticker,
        });
        Ok(())
    }

    fn teardown(&mut self) -> Result<FinishedRecording, AudioError> {
        let mut active = self.active.take().ok_or(AudioError::NotRecording)?;
        let duration_secs = active.elapsed.load(Ordering::Relaxed);
        active.ticker.abort();
        active.track.stop();

        let mut samples = Vec::new();
        while let Ok(chunk) = active.chunks.try_recv() {
            samples.extend(chunk);
        }
        Ok(FinishedRecording {
            samples,
            spec: active.track.spec(),
            duration_secs,
        })
    }

    /// Finalizes the capture and starts encoding it. The duration is the
    /// counter value at this call.
    pub fn stop(&mut self) -> Result<PendingAudio, AudioError> {
        let recording = self.teardown()?;
        let duration_secs = recording.duration_secs;
        info!("Recording stopped after {} s", duration_secs);
        let handle = tokio::task::spawn_blocking(move || encode_recording(recording));
        Ok(PendingAudio { duration_secs, handle })
    }

    pub fn discard(&mut self) -> Result<(), AudioError> {
        let recording = self.teardown()?;
        info!("Recording discarded ({} samples dropped)", recording.samples.len());
        Ok(())
    }
}

impl Drop for AudioRecorder {
    fn drop(&mut self) {
        if self.active.is_some() {
            warn!("Recorder dropped while recording; releasing microphone");
            let _ = self.teardown();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::sync::atomic::AtomicBool;

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

    struct FakeMicrophone {
        live: Arc<AtomicBool>,
        deny: bool,
    }

    impl Microphone for FakeMicrophone {
        fn open(&self, chunks: ChunkSender) -> Result<Box<dyn MicrophoneTrack>, AudioError> {
            if self.deny {
                return Err(AudioError::PermissionDenied("denied by user".into()));
            }
            self.live.store(true, Ordering::SeqCst);
            chunks.send(vec![1, 2, 3]).ok();
            chunks.send(vec![4]).ok();
            Ok(Box::new(FakeTrack { live: self.live.clone() }))
        }
    }

    fn recorder(deny: bool) -> (AudioRecorder, Arc<AtomicBool>) {
        let live = Arc::new(AtomicBool::new(false));
        let mic = FakeMicrophone { live: live.clone(), deny };
        (AudioRecorder::new(Arc::new(mic)), live)
    }

    #[tokio::test(start_paused = true)]
    async fn stop_captures_elapsed_time_and_releases_the_track() {
        let (mut rec, live) = recorder(false);
        rec.start().unwrap();
        assert_eq!(rec.state(), RecorderState::Recording);
        assert!(live.load(Ordering::SeqCst));

        tokio::time::sleep(Duration::from_millis(3500)).await;
        assert_eq!(rec.formatted_time(), "00:03");

        let pending = rec.stop().unwrap();
        assert_eq!(pending.duration_secs(), 3);
        assert!(!live.load(Ordering::SeqCst));
        assert_eq!(rec.state(), RecorderState::Idle);

        let encoded = pending.wait().await.unwrap();
        assert_eq!(encoded.duration, "00:03");
        assert_eq!(encoded.sample_count, 4);
    }

    #[tokio::test]
    async fn second_start_is_refused() {
        let (mut rec, _) = recorder(false);
        rec.start().unwrap();
        assert!(matches!(rec.start(), Err(AudioError::AlreadyRecording)));
        rec.discard().unwrap();
    }

    #[tokio::test]
    async fn discard_releases_and_returns_to_idle() {
        let (mut rec, live) = recorder(false);
        rec.start().unwrap();
        rec.discard().unwrap();
        assert!(!live.load(Ordering::SeqCst));
        assert_eq!(rec.state(), RecorderState::Idle);
        assert!(matches!(rec.stop(), Err(AudioError::NotRecording)));
    }

    #[tokio::test]
    async fn denied_permission_leaves_recorder_idle() {
        let (mut rec, live) = recorder(true);
        let err = rec.start().unwrap_err();
        assert!(err.is_access_error());
        assert!(!live.load(Ordering::SeqCst));
        assert_eq!(rec.state(), RecorderState::Idle);
    }

    #[tokio::test]
    async fn dropping_a_live_recorder_releases_the_microphone() {
        let (mut rec, live) = recorder(false);
        rec.start().unwrap();
        drop(rec);
        assert!(!live.load(Ordering::SeqCst));
    }
}
