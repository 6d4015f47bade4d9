pub mod analysis;
pub mod audio;
pub mod config;
pub mod markup;
pub mod pipeline;
pub mod transcode;

pub use analysis::{AnalysisBackend, AnalysisError, AnalysisResult, HttpAnalysisClient};
pub use audio::{AudioSource, CaptureError, Recorder};
pub use config::Settings;
pub use markup::{ErrorCategory, Segment};
pub use pipeline::{CaptureController, SubmissionError, SubmissionPipeline, SubmissionStatus};
pub use transcode::{FfmpegEngine, TranscodeEngine, TranscodeError, TranscodedAudio, Transcoder};
