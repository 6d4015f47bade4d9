use super::{AudioBuffer, CaptureError};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use std::sync::{Arc, Mutex};
use tracing::{error, info};

/// Owns the cpal input stream and the buffer its callback writes into.
pub(crate) struct AudioCapture {
    stream: Option<cpal::Stream>,
    buffer: Arc<Mutex<AudioBuffer>>,
}

impl AudioCapture {
    pub(crate) fn new() -> Self {
        Self {
            stream: None,
            buffer: Arc::new(Mutex::new(AudioBuffer::new(16000, 1))),
        }
    }

    pub(crate) fn start(&mut self) -> Result<(), CaptureError> {
        let host = cpal::default_host();
        let device = host
            .default_input_device()
            .ok_or_else(|| CaptureError::MicrophoneUnavailable("no input device available".into()))?;

        let device_name = device.name().unwrap_or_else(|_| "unknown input".to_string());
        info!("Input device: {}", device_name);

        let config = device
            .default_input_config()
            .map_err(|e| CaptureError::MicrophoneUnavailable(e.to_string()))?;
        if let Ok(mut guard) = self.buffer.lock() {
            guard.sample_rate = config.sample_rate();
            guard.channels = config.channels();
            guard.clear();
        }

        let buffer_clone = self.buffer.clone();
        let err_fn = |err| error!("an error occurred on stream: {}", err);

        let stream = match config.sample_format() {
            cpal::SampleFormat::I16 => device.build_input_stream(
                &config.into(),
                move |data: &[i16], _: &_| write_input_data(data, &buffer_clone),
                err_fn,
                None,
            ),
            cpal::SampleFormat::F32 => device.build_input_stream(
                &config.into(),
                move |data: &[f32], _: &_| write_input_data_f32(data, &buffer_clone),
                err_fn,
                None,
            ),
            other => {
                return Err(CaptureError::Stream(format!(
                    "unsupported sample format: {:?}",
                    other
                )))
            }
        }
        .map_err(|e| CaptureError::MicrophoneUnavailable(e.to_string()))?;

        stream
            .play()
            .map_err(|e| CaptureError::Stream(e.to_string()))?;
        self.stream = Some(stream);

        Ok(())
    }

    pub(crate) fn stop(&mut self) -> Result<AudioBuffer, CaptureError> {
        self.stream.take();

        let mut guard = self
            .buffer
            .lock()
            .map_err(|e| CaptureError::Stream(e.to_string()))?;
        let out = guard.clone();
        guard.clear();
        Ok(out)
    }
}

fn write_input_data(input: &[i16], buffer: &Arc<Mutex<AudioBuffer>>) {
    if let Ok(mut guard) = buffer.lock() {
        guard.append(input);
    }
}

fn write_input_data_f32(input: &[f32], buffer: &Arc<Mutex<AudioBuffer>>) {
    let samples: Vec<i16> = input
        .iter()
        .map(|&x| (x * i16::MAX as f32) as i16)
        .collect();
    if let Ok(mut guard) = buffer.lock() {
        guard.append(&samples);
    }
}
