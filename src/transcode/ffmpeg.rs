// src/transcode/ffmpeg.rs
// ffmpeg-backed transcoding engine. The binary is probed once at load; each
// job stages its input under a stable name in a private working directory.

use super::{TranscodeEngine, TranscodeError};
use async_trait::async_trait;
use std::{
    env, fs,
    path::{Path, PathBuf},
    process::Command,
};
use tracing::info;
use uuid::Uuid;

const INPUT_NAME: &str = "input";
const OUTPUT_NAME: &str = "output.mp3";

pub struct FfmpegEngine {
    bin: PathBuf,
    workdir: PathBuf,
}

impl FfmpegEngine {
    /// Binary path from `FFMPEG_BIN`, else `ffmpeg` on PATH. The working
    /// directory is unique per engine instance so two sessions never share
    /// staging files.
    pub fn from_env() -> Self {
        let bin = env::var("FFMPEG_BIN")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("ffmpeg"));
        Self::with_binary(bin)
    }

    pub fn with_binary(bin: PathBuf) -> Self {
        let workdir = env::temp_dir().join(format!("readaloud-{}", Uuid::new_v4()));
        Self { bin, workdir }
    }

    fn run_conversion(&self, input_path: &Path, output_path: &Path) -> Result<(), TranscodeError> {
        let output = Command::new(&self.bin)
            .arg("-y")
            .arg("-i")
            .arg(input_path)
            .arg(output_path)
            .output()
            .map_err(|e| TranscodeError::CommandFailed(e.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(TranscodeError::CommandFailed(
                last_line(&stderr).to_string(),
            ));
        }

        Ok(())
    }
}

#[async_trait]
impl TranscodeEngine for FfmpegEngine {
    async fn load(&self) -> Result<(), TranscodeError> {
        let output = Command::new(&self.bin)
            .arg("-version")
            .output()
            .map_err(|e| {
                TranscodeError::EngineLoad(format!("{}: {}", self.bin.display(), e))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(TranscodeError::EngineLoad(last_line(&stderr).to_string()));
        }

        fs::create_dir_all(&self.workdir).map_err(|e| TranscodeError::EngineLoad(e.to_string()))?;

        info!("ffmpeg ready: {}", self.bin.display());
        Ok(())
    }

    async fn convert_to_mp3(&self, bytes: &[u8]) -> Result<Vec<u8>, TranscodeError> {
        let input_path = self.workdir.join(INPUT_NAME);
        let output_path = self.workdir.join(OUTPUT_NAME);

        fs::write(&input_path, bytes).map_err(|e| TranscodeError::Io(e.to_string()))?;

        let converted = self
            .run_conversion(&input_path, &output_path)
            .and_then(|_| fs::read(&output_path).map_err(|_| TranscodeError::EmptyOutput));

        // Staging files are reused by name; drop them either way.
        let _ = fs::remove_file(&input_path);
        let _ = fs::remove_file(&output_path);

        let converted = converted?;
        if converted.is_empty() {
            return Err(TranscodeError::EmptyOutput);
        }

        Ok(converted)
    }

    fn name(&self) -> &str {
        "ffmpeg"
    }
}

/// ffmpeg is chatty on stderr; the last non-empty line carries the failure.
fn last_line(text: &str) -> &str {
    text.lines()
        .rev()
        .find(|line| !line.trim().is_empty())
        .unwrap_or("")
        .trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_line_picks_the_failure_out_of_chatter() {
        let stderr = "ffmpeg version n6.0\nbuilt with gcc\n\ninput: Invalid data found\n";
        assert_eq!(last_line(stderr), "input: Invalid data found");
        assert_eq!(last_line(""), "");
    }

    #[test]
    fn engine_instances_get_distinct_workdirs() {
        let a = FfmpegEngine::from_env();
        let b = FfmpegEngine::from_env();
        assert_ne!(a.workdir, b.workdir);
    }
}
