// src/main.rs
// Demo driver: record or load an audio file, submit it with the reference
// text, print the metrics and the color-coded corrected transcription.

use anyhow::{bail, Context, Result};
use clap::Parser;
use readaloud::analysis::HttpAnalysisClient;
use readaloud::audio::AudioSource;
use readaloud::config::Settings;
use readaloud::markup::{self, ErrorCategory, Segment};
use readaloud::pipeline::{CaptureController, SubmissionPipeline};
use readaloud::AnalysisResult;
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const RESET: &str = "\x1b[0m";

#[derive(Parser)]
#[command(name = "readaloud")]
#[command(about = "Submit a read-aloud recording for reading-practice analysis", long_about = None)]
struct Cli {
    /// File containing the reference text the user reads aloud
    #[arg(short, long)]
    text: PathBuf,

    /// Audio file to submit instead of recording
    #[arg(short, long, conflicts_with = "record")]
    audio: Option<PathBuf>,

    /// Record from the default microphone until Enter is pressed
    #[arg(short, long)]
    record: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let reference_text = fs::read_to_string(&cli.text)
        .with_context(|| format!("reading reference text from {}", cli.text.display()))?;

    let settings = Settings::from_env();
    let backend = Box::new(HttpAnalysisClient::new(&settings));
    let mut pipeline = SubmissionPipeline::new(CaptureController::from_env(), backend);

    let source = if cli.record {
        record_until_enter(pipeline.controller_mut())?
    } else if let Some(path) = cli.audio {
        AudioSource::from_path(&path)
            .with_context(|| format!("reading audio from {}", path.display()))?
    } else {
        bail!("either --audio <path> or --record is required");
    };

    let result = pipeline.submit(reference_text.trim(), source).await?;
    print_report(&result);
    Ok(())
}

fn record_until_enter(controller: &mut CaptureController) -> Result<AudioSource> {
    controller.start_recording()?;
    println!("Recording... press Enter to stop.");
    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    Ok(controller.stop_recording()?)
}

fn print_report(result: &AnalysisResult) {
    println!();
    println!("Accuracy:      {}", result.accuracy);
    println!("Reading speed: {}", result.reading_speed);
    println!(
        "Cost:          AssemblyAI {} / OpenAI {}",
        result.cost.assembly_ai, result.cost.open_ai
    );
    println!();
    println!("Analysis: {}", result.analysis);
    println!("Feedback: {}", result.feedback);
    println!();
    println!("Corrected transcription:");
    for segment in markup::parse(&result.corrected_transcription) {
        match segment {
            Segment::Plain { text } => print!("{}", text),
            Segment::Error {
                phrase,
                category,
                original,
            } => {
                print!("{}{}", category_color(category), phrase);
                if let Some(original) = original {
                    print!(" (original: {})", original);
                }
                print!("{}", RESET);
            }
        }
    }
    println!();
}

fn category_color(category: ErrorCategory) -> &'static str {
    match category {
        ErrorCategory::Replacement => "\x1b[35m",
        ErrorCategory::Addition => "\x1b[31m",
        ErrorCategory::Omission => "\x1b[34m",
        ErrorCategory::Repetition => "\x1b[33m",
        ErrorCategory::Reversal => "\x1b[32m",
    }
}
