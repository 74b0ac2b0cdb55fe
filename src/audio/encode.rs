use base64::{ engine::general_purpose::STANDARD, Engine as _ };
use crate::audio::{ AudioSpec, FinishedRecording };
use crate::presentation::{ format_clock, AudioAttachment };

pub const WAV_MIME: &str = "audio/wav";

const BITS_PER_SAMPLE: u16 = 16;
const WAV_HEADER_LEN: u32 = 44;

/// A recording ready to be sent: bare base64 for the webhook, plus the
/// `mm:ss` duration captured when recording stopped.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncodedAudio {
    pub base64: String,
    pub mime: &'static str,
    pub duration: String,
    pub sample_count: usize,
}

impl EncodedAudio {
    pub fn data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime, self.base64)
    }

    /// Transcript text for the user's audio bubble.
    pub fn attachment(&self) -> AudioAttachment {
        AudioAttachment::new(self.data_uri(), self.duration.clone())
    }
}

/// 16-bit PCM in a RIFF/WAVE container.
pub fn wav_bytes(samples: &[i16], spec: AudioSpec) -> Vec<u8> {
    let block_align = spec.channels * (BITS_PER_SAMPLE / 8);
    let byte_rate = spec.sample_rate * u32::from(block_align);
    let data_len = (samples.len() * 2) as u32;

    let mut out = Vec::with_capacity((WAV_HEADER_LEN + data_len) as usize);
    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&(WAV_HEADER_LEN - 8 + data_len).to_le_bytes());
    out.extend_from_slice(b"WAVE");
    out.extend_from_slice(b"fmt ");
    out.extend_from_slice(&16u32.to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes());
    out.extend_from_slice(&spec.channels.to_le_bytes());
    out.extend_from_slice(&spec.sample_rate.to_le_bytes());
    out.extend_from_slice(&byte_rate.to_le_bytes());
    out.extend_from_slice(&block_align.to_le_bytes());
    out.extend_from_slice(&BITS_PER_SAMPLE.to_le_bytes());
    out.extend_from_slice(b"data");
    out.extend_from_slice(&data_len.to_le_bytes());
    for s in samples {
        out.extend_from_slice(&s.to_le_bytes());
    }
    out
}

pub fn encode_recording(recording: FinishedRecording) -> EncodedAudio {
    let bytes = wav_bytes(&recording.samples, recording.spec);
    EncodedAudio {
        base64: STANDARD.encode(bytes),
        mime: WAV_MIME,
        duration: format_clock(recording.duration_secs),
        sample_count: recording.samples.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn wav_header_describes_the_samples() {
        let spec = AudioSpec { sample_rate: 16_000, channels: 2 };
        let bytes = wav_bytes(&[0, -1, 256, 7], spec);
        assert_eq!(bytes.len(), 44 + 8);
        assert_eq!(&bytes[0..4], b"RIFF");
        assert_eq!(u32::from_le_bytes(bytes[4..8].try_into().unwrap()), 36 + 8);
        assert_eq!(&bytes[8..12], b"WAVE");
        assert_eq!(u16::from_le_bytes(bytes[22..24].try_into().unwrap()), 2);
        assert_eq!(u32::from_le_bytes(bytes[24..28].try_into().unwrap()), 16_000);
        assert_eq!(u32::from_le_bytes(bytes[28..32].try_into().unwrap()), 64_000);
        assert_eq!(u32::from_le_bytes(bytes[40..44].try_into().unwrap()), 8);
        assert_eq!(&bytes[44..48], &[0, 0, 0xff, 0xff]);
    }

    #[test]
    fn encoded_recording_carries_data_uri_and_duration() {
        let encoded = encode_recording(FinishedRecording {
            samples: vec![0; 10],
            spec: AudioSpec { sample_rate: 8000, channels: 1 },
            duration_secs: 75,
        });
        assert_eq!(encoded.duration, "01:15");
        assert!(encoded.data_uri().starts_with("data:audio/wav;base64,UklGR"));
        assert_eq!(
            encoded.attachment().encode(),
            format!("data:audio/wav;base64,{}|duration:01:15", encoded.base64)
        );
        assert_eq!(STANDARD.decode(&encoded.base64).unwrap().len(), 64);
    }
}
