use crate::audio::{AudioSource, CaptureError, Recorder};
use crate::transcode::{FfmpegEngine, TranscodeEngine, TranscodeError, TranscodedAudio, Transcoder};

/// Front door for submission-ready audio: one recorder, one transcoder, and a
/// single `acquire_audio` entry point that always hands back MP3.
pub struct CaptureController {
    recorder: Recorder,
    transcoder: Transcoder,
}

impl CaptureController {
    pub fn from_env() -> Self {
        Self::with_engine(Box::new(FfmpegEngine::from_env()))
    }

    /// Inject the transcoding engine; tests pass a fake.
    pub fn with_engine(engine: Box<dyn TranscodeEngine>) -> Self {
        Self {
            recorder: Recorder::new(),
            transcoder: Transcoder::new(engine),
        }
    }

    pub fn is_recording(&self) -> bool {
        self.recorder.is_recording()
    }

    pub fn start_recording(&mut self) -> Result<(), CaptureError> {
        self.recorder.start()
    }

    pub fn stop_recording(&mut self) -> Result<AudioSource, CaptureError> {
        self.recorder.stop()
    }

    /// Consume `source` and produce a submission-ready MP3. Input that is
    /// already MP3 passes through byte-identical; everything else goes
    /// through the transcoding engine. Errors propagate unchanged.
    pub async fn acquire_audio(
        &self,
        source: AudioSource,
    ) -> Result<TranscodedAudio, TranscodeError> {
        self.transcoder.transcode_to_mp3(source).await
    }
}
