// src/transcode/mod.rs
// Everything sent to the analysis service is MP3; this layer normalizes
// whatever the recorder or the user supplied.

mod ffmpeg;

pub use ffmpeg::FfmpegEngine;

use crate::audio::AudioSource;
use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::{Mutex, OnceCell};
use tracing::info;

pub const MP3_MIME: &str = "audio/mp3";

const CONVERTED_NAME: &str = "converted.mp3";

/// Submission-ready audio. `mime_type` is always `audio/mp3` no matter what
/// the source container was.
#[derive(Debug, Clone)]
pub struct TranscodedAudio {
    pub name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Error)]
pub enum TranscodeError {
    #[error("Transcoding engine failed to load: {0}")]
    EngineLoad(String),

    #[error("Conversion failed: {0}")]
    CommandFailed(String),

    #[error("Conversion produced no output")]
    EmptyOutput,

    #[error("Working storage error: {0}")]
    Io(String),
}

/// Seam for the audio converter so tests can substitute a fake engine.
/// `convert_to_mp3` stages the input in the engine's working storage under a
/// stable name and hands back the produced MP3 bytes.
#[async_trait]
pub trait TranscodeEngine: Send + Sync {
    async fn load(&self) -> Result<(), TranscodeError>;

    async fn convert_to_mp3(&self, bytes: &[u8]) -> Result<Vec<u8>, TranscodeError>;

    fn name(&self) -> &str;
}

/// Owns one engine per session. Initialization is lazy and shared: concurrent
/// callers await the same load, and a failed load is retried by the next
/// call rather than poisoning the cell. Jobs are serialized because the
/// engine's working storage is a single mutable resource.
pub struct Transcoder {
    engine: Box<dyn TranscodeEngine>,
    loaded: OnceCell<()>,
    job_lock: Mutex<()>,
}

impl Transcoder {
    pub fn new(engine: Box<dyn TranscodeEngine>) -> Self {
        Self {
            engine,
            loaded: OnceCell::new(),
            job_lock: Mutex::new(()),
        }
    }

    /// Load the engine at most once. Idempotent; cheap after the first call.
    pub async fn ensure_ready(&self) -> Result<(), TranscodeError> {
        self.loaded
            .get_or_try_init(|| async {
                info!("Loading transcoding engine: {}", self.engine.name());
                self.engine.load().await
            })
            .await?;
        Ok(())
    }

    /// Normalize `source` to MP3. Input that is already MP3 is passed through
    /// untouched without initializing or invoking the engine.
    pub async fn transcode_to_mp3(
        &self,
        source: AudioSource,
    ) -> Result<TranscodedAudio, TranscodeError> {
        if source.mime_type() == MP3_MIME {
            let name = source.file_name().to_string();
            return Ok(TranscodedAudio {
                name,
                mime_type: MP3_MIME.to_string(),
                bytes: source.into_bytes(),
            });
        }

        self.ensure_ready().await?;

        let _job = self.job_lock.lock().await;
        let mime = source.mime_type().to_string();
        let bytes = self.engine.convert_to_mp3(&source.into_bytes()).await?;

        info!("Transcoded {} input to {} MP3 bytes", mime, bytes.len());

        Ok(TranscodedAudio {
            name: CONVERTED_NAME.to_string(),
            mime_type: MP3_MIME.to_string(),
            bytes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    struct FakeEngine {
        load_calls: Arc<AtomicUsize>,
        convert_calls: Arc<AtomicUsize>,
        fail_loads: Arc<AtomicUsize>,
        in_flight: Arc<AtomicUsize>,
        overlapped: Arc<AtomicBool>,
    }

    impl FakeEngine {
        fn new() -> Self {
            Self {
                load_calls: Arc::new(AtomicUsize::new(0)),
                convert_calls: Arc::new(AtomicUsize::new(0)),
                fail_loads: Arc::new(AtomicUsize::new(0)),
                in_flight: Arc::new(AtomicUsize::new(0)),
                overlapped: Arc::new(AtomicBool::new(false)),
            }
        }

        fn failing_first_loads(self, count: usize) -> Self {
            self.fail_loads.store(count, Ordering::SeqCst);
            self
        }
    }

    #[async_trait]
    impl TranscodeEngine for FakeEngine {
        async fn load(&self) -> Result<(), TranscodeError> {
            self.load_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_loads.load(Ordering::SeqCst) > 0 {
                self.fail_loads.fetch_sub(1, Ordering::SeqCst);
                return Err(TranscodeError::EngineLoad("simulated".into()));
            }
            Ok(())
        }

        async fn convert_to_mp3(&self, bytes: &[u8]) -> Result<Vec<u8>, TranscodeError> {
            if self.in_flight.fetch_add(1, Ordering::SeqCst) > 0 {
                self.overlapped.store(true, Ordering::SeqCst);
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            self.convert_calls.fetch_add(1, Ordering::SeqCst);

            let mut out = b"mp3:".to_vec();
            out.extend_from_slice(bytes);
            Ok(out)
        }

        fn name(&self) -> &str {
            "fake"
        }
    }

    fn wav_source(bytes: &[u8]) -> AudioSource {
        AudioSource::Recording {
            bytes: bytes.to_vec(),
            mime_type: "audio/wav".to_string(),
        }
    }

    fn mp3_file(bytes: &[u8], name: &str) -> AudioSource {
        AudioSource::File {
            bytes: bytes.to_vec(),
            mime_type: MP3_MIME.to_string(),
            name: name.to_string(),
        }
    }

    #[tokio::test]
    async fn mp3_input_passes_through_without_the_engine() {
        let engine = FakeEngine::new();
        let load_calls = engine.load_calls.clone();
        let convert_calls = engine.convert_calls.clone();
        let transcoder = Transcoder::new(Box::new(engine));

        let out = transcoder
            .transcode_to_mp3(mp3_file(b"already mp3", "take1.mp3"))
            .await
            .unwrap();

        assert_eq!(out.bytes, b"already mp3");
        assert_eq!(out.mime_type, "audio/mp3");
        assert_eq!(out.name, "take1.mp3");
        assert_eq!(load_calls.load(Ordering::SeqCst), 0);
        assert_eq!(convert_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn non_mp3_input_is_converted_and_renamed() {
        let transcoder = Transcoder::new(Box::new(FakeEngine::new()));

        let out = transcoder
            .transcode_to_mp3(wav_source(b"pcm"))
            .await
            .unwrap();

        assert_eq!(out.name, "converted.mp3");
        assert_eq!(out.mime_type, "audio/mp3");
        assert_eq!(out.bytes, b"mp3:pcm");
    }

    #[tokio::test]
    async fn engine_loads_once_across_jobs() {
        let engine = FakeEngine::new();
        let load_calls = engine.load_calls.clone();
        let transcoder = Transcoder::new(Box::new(engine));

        transcoder.transcode_to_mp3(wav_source(b"a")).await.unwrap();
        transcoder.transcode_to_mp3(wav_source(b"b")).await.unwrap();

        assert_eq!(load_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn concurrent_callers_share_one_load() {
        let engine = FakeEngine::new();
        let load_calls = engine.load_calls.clone();
        let transcoder = Transcoder::new(Box::new(engine));

        let (a, b) = tokio::join!(transcoder.ensure_ready(), transcoder.ensure_ready());
        a.unwrap();
        b.unwrap();

        assert_eq!(load_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failed_load_is_retried_on_the_next_job() {
        let engine = FakeEngine::new().failing_first_loads(1);
        let load_calls = engine.load_calls.clone();
        let transcoder = Transcoder::new(Box::new(engine));

        let first = transcoder.transcode_to_mp3(wav_source(b"a")).await;
        assert!(matches!(first, Err(TranscodeError::EngineLoad(_))));

        let second = transcoder.transcode_to_mp3(wav_source(b"a")).await;
        assert!(second.is_ok());
        assert_eq!(load_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn overlapping_jobs_are_serialized() {
        let engine = FakeEngine::new();
        let overlapped = engine.overlapped.clone();
        let convert_calls = engine.convert_calls.clone();
        let transcoder = Transcoder::new(Box::new(engine));

        let (a, b) = tokio::join!(
            transcoder.transcode_to_mp3(wav_source(b"a")),
            transcoder.transcode_to_mp3(wav_source(b"b")),
        );
        a.unwrap();
        b.unwrap();

        assert_eq!(convert_calls.load(Ordering::SeqCst), 2);
        assert!(!overlapped.load(Ordering::SeqCst));
    }
}
