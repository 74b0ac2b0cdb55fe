use cpal::traits::{ DeviceTrait, HostTrait, StreamTrait };
use cpal::SampleFormat;
use log::{ debug, error };
use std::sync::atomic::{ AtomicBool, Ordering };
use std::sync::{ mpsc as std_mpsc, Arc };
use std::thread::{ self, JoinHandle };
use std::time::Duration;
use crate::audio::{ AudioError, AudioSpec, ChunkSender, Microphone, MicrophoneTrack };

const POLL: Duration = Duration::from_millis(20);

/// Default input device of the default cpal host.
#[derive(Debug, Default, Clone, Copy)]
pub struct CpalMicrophone;

struct CpalTrack {
    spec: AudioSpec,
    stop: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
}

impl MicrophoneTrack for CpalTrack {
    fn spec(&self) -> AudioSpec {
        self.spec
    }

    fn stop(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                error!("Microphone capture thread panicked");
            }
        }
    }
}

impl Drop for CpalTrack {
    fn drop(&mut self) {
        self.stop();
    }
}

fn f32_to_i16(s: f32) -> i16 {
    (s.clamp(-1.0, 1.0) * f32::from(i16::MAX)) as i16
}

// cpal streams are not Send; the stream lives and dies on its own thread.
fn capture(chunks: ChunkSender, stop: Arc<AtomicBool>, ready: std_mpsc::Sender<Result<AudioSpec, AudioError>>) {
    let host = cpal::default_host();
    let Some(device) = host.default_input_device() else {
        let _ = ready.send(Err(AudioError::NoDevice));
        return;
    };
    let config = match device.default_input_config() {
        Ok(c) => c,
        Err(e) => {
            let _ = ready.send(Err(AudioError::PermissionDenied(e.to_string())));
            return;
        }
    };
    let spec = AudioSpec {
        sample_rate: config.sample_rate().0,
        channels: config.channels(),
    };
    let sample_format = config.sample_format();
    let stream_config: cpal::StreamConfig = config.into();
    let on_error = |e: cpal::StreamError| error!("Microphone stream error: {}", e);

    let stream = match sample_format {
        SampleFormat::F32 =>
            device.build_input_stream(
                &stream_config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    let _ = chunks.send(data.iter().copied().map(f32_to_i16).collect());
                },
                on_error,
                None
            ),
        SampleFormat::I16 =>
            device.build_input_stream(
                &stream_config,
                move |data: &[i16], _: &cpal::InputCallbackInfo| {
                    let _ = chunks.send(data.to_vec());
                },
                on_error,
                None
            ),
        SampleFormat::U16 =>
            device.build_input_stream(
                &stream_config,
                move |data: &[u16], _: &cpal::InputCallbackInfo| {
                    let _ = chunks.send(data.iter().map(|s| (i32::from(*s) - 32_768) as i16).collect());
                },
                on_error,
                None
            ),
        other => {
            let _ = ready.send(Err(AudioError::Unsupported(format!("{:?}", other))));
            return;
        }
    };

    let stream = match stream {
        Ok(s) => s,
        Err(e) => {
            let _ = ready.send(Err(AudioError::PermissionDenied(e.to_string())));
            return;
        }
    };
    if let Err(e) = stream.play() {
        let _ = ready.send(Err(AudioError::PermissionDenied(e.to_string())));
        return;
    }
    let _ = ready.send(Ok(spec));

    while !stop.load(Ordering::SeqCst) {
        thread::sleep(POLL);
    }
    drop(stream);
    debug!("Microphone released");
}

impl Microphone for CpalMicrophone {
    fn open(&self, chunks: ChunkSender) -> Result<Box<dyn MicrophoneTrack>, AudioError> {
        let (ready_tx, ready_rx) = std_mpsc::channel();
        let stop = Arc::new(AtomicBool::new(false));
        let worker_stop = stop.clone();
        let worker = thread::spawn(move || capture(chunks, worker_stop, ready_tx));

        let spec = ready_rx.recv().map_err(|_| AudioError::NoDevice)??;
        Ok(Box::new(CpalTrack {
            spec,
            stop,
            worker: Some(worker),
        }))
    }
}
