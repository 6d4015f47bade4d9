use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioBuffer {
    pub samples: Vec<i16>,
    pub sample_rate: u32,
    pub channels: u16,
}

impl AudioBuffer {
    pub fn new(sample_rate: u32, channels: u16) -> Self {
        Self {
            samples: Vec::new(),
            sample_rate,
            channels,
        }
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }

    pub fn append(&mut self, data: &[i16]) {
        self.samples.extend_from_slice(data);
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn duration_secs(&self) -> f32 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        let channels = self.channels.max(1) as f32;
        self.samples.len() as f32 / (self.sample_rate as f32 * channels)
    }

    /// Encode as a 16-bit PCM RIFF/WAVE container.
    pub fn to_wav_bytes(&self) -> Vec<u8> {
        let mut wav = Vec::with_capacity(44 + self.samples.len() * 2);

        // RIFF header
        wav.extend_from_slice(b"RIFF");
        let file_size = (36 + self.samples.len() * 2) as u32;
        wav.extend_from_slice(&file_size.to_le_bytes());
        wav.extend_from_slice(b"WAVE");

        // fmt chunk
        wav.extend_from_slice(b"fmt ");
        wav.extend_from_slice(&16u32.to_le_bytes()); // chunk size
        wav.extend_from_slice(&1u16.to_le_bytes()); // PCM format
        wav.extend_from_slice(&self.channels.to_le_bytes());
        wav.extend_from_slice(&self.sample_rate.to_le_bytes());
        let byte_rate = self.sample_rate * self.channels as u32 * 2;
        wav.extend_from_slice(&byte_rate.to_le_bytes());
        wav.extend_from_slice(&(self.channels * 2).to_le_bytes()); // block align
        wav.extend_from_slice(&16u16.to_le_bytes()); // bits per sample

        // data chunk
        wav.extend_from_slice(b"data");
        let data_size = (self.samples.len() * 2) as u32;
        wav.extend_from_slice(&data_size.to_le_bytes());

        for &sample in &self.samples {
            wav.extend_from_slice(&sample.to_le_bytes());
        }

        wav
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_accounts_for_channels() {
        let mut buffer = AudioBuffer::new(16000, 2);
        buffer.append(&vec![0i16; 32000]);
        assert!((buffer.duration_secs() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn wav_layout_matches_pcm_header() {
        let mut buffer = AudioBuffer::new(16000, 1);
        buffer.append(&[1, -1, 100, -100]);
        let wav = buffer.to_wav_bytes();

        assert_eq!(&wav[0..4], b"RIFF");
        assert_eq!(&wav[8..12], b"WAVE");
        assert_eq!(&wav[12..16], b"fmt ");
        // PCM format tag and channel count
        assert_eq!(u16::from_le_bytes([wav[20], wav[21]]), 1);
        assert_eq!(u16::from_le_bytes([wav[22], wav[23]]), 1);
        assert_eq!(u32::from_le_bytes([wav[24], wav[25], wav[26], wav[27]]), 16000);
        // data chunk holds 2 bytes per sample
        assert_eq!(&wav[36..40], b"data");
        assert_eq!(u32::from_le_bytes([wav[40], wav[41], wav[42], wav[43]]), 8);
        assert_eq!(wav.len(), 44 + 8);
    }
}
