// src/pipeline/mod.rs
// The submit state machine: idle -> processing -> completed | failed.

mod acquire;

pub use acquire::CaptureController;

use crate::analysis::{AnalysisBackend, AnalysisError, AnalysisResult};
use crate::audio::{AudioSource, CaptureError};
use crate::transcode::TranscodeError;
use serde::Serialize;
use thiserror::Error;
use tracing::{error, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionStatus {
    Idle,
    Processing,
    Completed,
    Failed,
}

#[derive(Debug, Error)]
pub enum SubmissionError {
    #[error(transparent)]
    Capture(#[from] CaptureError),

    #[error(transparent)]
    Transcode(#[from] TranscodeError),

    #[error(transparent)]
    Analysis(#[from] AnalysisError),
}

/// One submission at a time. Acquisition strictly precedes the network call;
/// the network result strictly precedes the transition out of `Processing`.
/// The pipeline does not queue or reject overlapping submissions itself — it
/// exposes `status()` so the caller gates while one is `Processing` (and
/// `submit` takes `&mut self`, so overlap cannot compile anyway). No retries
/// at any layer; resubmitting after `Completed` or `Failed` starts a fresh
/// attempt and discards the previous outcome.
pub struct SubmissionPipeline {
    controller: CaptureController,
    backend: Box<dyn AnalysisBackend>,
    status: SubmissionStatus,
    result: Option<AnalysisResult>,
    failure: Option<String>,
}

impl SubmissionPipeline {
    pub fn new(controller: CaptureController, backend: Box<dyn AnalysisBackend>) -> Self {
        Self {
            controller,
            backend,
            status: SubmissionStatus::Idle,
            result: None,
            failure: None,
        }
    }

    pub fn status(&self) -> SubmissionStatus {
        self.status
    }

    /// The last successful analysis, until the next submission replaces it.
    pub fn result(&self) -> Option<&AnalysisResult> {
        self.result.as_ref()
    }

    /// Why the last attempt failed, if it did.
    pub fn failure(&self) -> Option<&str> {
        self.failure.as_deref()
    }

    pub fn controller_mut(&mut self) -> &mut CaptureController {
        &mut self.controller
    }

    /// Acquire audio, then perform exactly one analysis request. An
    /// acquisition failure settles the attempt without any network traffic.
    pub async fn submit(
        &mut self,
        reference_text: &str,
        source: AudioSource,
    ) -> Result<AnalysisResult, SubmissionError> {
        self.status = SubmissionStatus::Processing;
        self.result = None;
        self.failure = None;

        info!(
            "Submission started: {} source, {} chars of reference text",
            source.mime_type(),
            reference_text.len()
        );

        let audio = match self.controller.acquire_audio(source).await {
            Ok(audio) => audio,
            Err(e) => return Err(self.fail(e.into())),
        };

        match self.backend.analyze(reference_text, &audio).await {
            Ok(result) => {
                info!(
                    "Submission completed: accuracy={}, reading_speed={}",
                    result.accuracy, result.reading_speed
                );
                self.status = SubmissionStatus::Completed;
                self.result = Some(result.clone());
                Ok(result)
            }
            Err(e) => Err(self.fail(e.into())),
        }
    }

    fn fail(&mut self, err: SubmissionError) -> SubmissionError {
        error!("Submission failed: {}", err);
        self.status = SubmissionStatus::Failed;
        self.failure = Some(err.to_string());
        err
    }
}
