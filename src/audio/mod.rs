// src/audio/mod.rs
// Microphone capture and the audio payloads it produces.

pub mod buffer;
pub mod capture;

pub use buffer::AudioBuffer;

use capture::AudioCapture;
use std::fs;
use std::path::Path;
use thiserror::Error;

pub const WAV_MIME: &str = "audio/wav";

const RECORDING_NAME: &str = "recording.wav";

/// Audio handed to the capture controller: a finished microphone recording
/// or a file the user picked. Consumed exactly once by `acquire_audio`.
#[derive(Debug, Clone)]
pub enum AudioSource {
    Recording {
        bytes: Vec<u8>,
        mime_type: String,
    },
    File {
        bytes: Vec<u8>,
        mime_type: String,
        name: String,
    },
}

impl AudioSource {
    /// Read a user-selected file from disk, deriving the container mime type
    /// from the extension.
    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        let bytes = fs::read(path)?;
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("upload")
            .to_string();
        let mime_type = mime_for_extension(path.extension().and_then(|e| e.to_str()));
        Ok(Self::File {
            bytes,
            mime_type,
            name,
        })
    }

    pub fn mime_type(&self) -> &str {
        match self {
            Self::Recording { mime_type, .. } | Self::File { mime_type, .. } => mime_type,
        }
    }

    pub fn file_name(&self) -> &str {
        match self {
            Self::Recording { .. } => RECORDING_NAME,
            Self::File { name, .. } => name,
        }
    }

    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            Self::Recording { bytes, .. } | Self::File { bytes, .. } => bytes,
        }
    }
}

fn mime_for_extension(extension: Option<&str>) -> String {
    let lower = extension.map(|e| e.to_ascii_lowercase());
    match lower.as_deref() {
        Some("mp3") => "audio/mp3",
        Some("wav") => "audio/wav",
        Some("ogg") | Some("oga") => "audio/ogg",
        Some("m4a") | Some("mp4") => "audio/mp4",
        Some("flac") => "audio/flac",
        Some("webm") => "audio/webm",
        _ => "application/octet-stream",
    }
    .to_string()
}

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("Microphone unavailable: {0}")]
    MicrophoneUnavailable(String),

    #[error("Recording already in progress")]
    AlreadyRecording,

    #[error("No recording in progress")]
    NotRecording,

    #[error("Audio stream error: {0}")]
    Stream(String),
}

/// Microphone capture as a strict start/stop toggle. `stop()` from idle is a
/// caller bug and is reported as `NotRecording`, never silently ignored.
pub struct Recorder {
    capture: AudioCapture,
    is_recording: bool,
}

impl Recorder {
    pub fn new() -> Self {
        Self {
            capture: AudioCapture::new(),
            is_recording: false,
        }
    }

    pub fn is_recording(&self) -> bool {
        self.is_recording
    }

    pub fn start(&mut self) -> Result<(), CaptureError> {
        if self.is_recording {
            return Err(CaptureError::AlreadyRecording);
        }
        self.capture.start()?;
        self.is_recording = true;
        Ok(())
    }

    /// Finalize the capture and return the recording as a WAV payload.
    pub fn stop(&mut self) -> Result<AudioSource, CaptureError> {
        if !self.is_recording {
            return Err(CaptureError::NotRecording);
        }
        let buffer = self.capture.stop()?;
        self.is_recording = false;

        tracing::info!(
            "Recording stopped: {:.1}s at {} Hz",
            buffer.duration_secs(),
            buffer.sample_rate
        );

        Ok(AudioSource::Recording {
            bytes: buffer.to_wav_bytes(),
            mime_type: WAV_MIME.to_string(),
        })
    }
}

impl Default for Recorder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stop_while_idle_signals_caller_bug() {
        let mut recorder = Recorder::new();
        assert!(matches!(recorder.stop(), Err(CaptureError::NotRecording)));
    }

    #[test]
    fn mime_guess_covers_common_containers() {
        assert_eq!(mime_for_extension(Some("MP3")), "audio/mp3");
        assert_eq!(mime_for_extension(Some("ogg")), "audio/ogg");
        assert_eq!(mime_for_extension(None), "application/octet-stream");
    }

    #[test]
    fn recording_source_reports_wav_payload() {
        let source = AudioSource::Recording {
            bytes: vec![1, 2, 3],
            mime_type: WAV_MIME.to_string(),
        };
        assert_eq!(source.mime_type(), "audio/wav");
        assert_eq!(source.file_name(), "recording.wav");
        assert_eq!(source.into_bytes(), vec![1, 2, 3]);
    }
}
