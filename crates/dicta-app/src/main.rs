//! dicta application binary - composition root.
//!
//! Ties the dicta crates together into a terminal practice tool:
//! 1. Parse CLI args and initialize tracing
//! 2. Load configuration from TOML
//! 3. Seed the in-process passage catalog and attempt sink
//! 4. Drive a practice session (listen -> type -> complete -> submit)
//!    or render a review diff directly

use std::io::{self, BufRead, Write};
use std::sync::Arc;

use clap::Parser;

use dicta_audio::{AudioOutput, MockAudioOutput, PlaybackController};
use dicta_core::config::DictaConfig;
use dicta_core::diff::{diff_words, SpanKind};
use dicta_core::error::{DictaError, Result};
use dicta_core::types::Passage;
use dicta_services::{InMemoryAttemptSink, InMemoryCatalog, PassageCatalog, ToneSynthesizer};
use dicta_session::{Phase, SessionEngine, SessionOptions};

mod cli;

const GREEN: &str = "\x1b[32m";
const RED: &str = "\x1b[31m";
const RESET: &str = "\x1b[0m";

/// Built-in passage library for the in-process catalog.
fn seed_passages() -> Vec<Passage> {
    vec![
        Passage::new(1, "the quick brown fox jumps over the lazy dog", "en-US"),
        Passage::new(
            2,
            "A journey of a thousand miles begins with a single step.",
            "en-US",
        ),
        Passage::new(
            3,
            "The lighthouse keeper climbed the narrow staircase every evening \
             to trim the wicks and polish the great lens before nightfall.",
            "en-US",
        ),
    ]
}

/// Build the audio backend: the real device when the `playback` feature is
/// enabled and a device exists, the mock otherwise.
fn build_output(config: &DictaConfig, no_audio: bool) -> Box<dyn AudioOutput> {
    #[cfg(feature = "playback")]
    if !no_audio {
        match dicta_audio::RodioOutput::new(config.playback.volume as f32) {
            Ok(output) => return Box::new(output),
            Err(e) => {
                tracing::warn!(error = %e, "No usable audio device; falling back to silent output");
            }
        }
    }
    #[cfg(not(feature = "playback"))]
    let _ = (config, no_audio);

    Box::new(MockAudioOutput::new())
}

fn read_line(prompt: &str) -> io::Result<String> {
    print!("{prompt}");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

async fn run_list(catalog: &InMemoryCatalog) -> Result<()> {
    for passage in catalog.list().await? {
        println!(
            "{:>4}  [{}]  {} words  {}",
            passage.id,
            passage.language,
            passage.word_count(),
            passage.content
        );
    }
    Ok(())
}

/// Render the review diff: missed reference words in green, extra or
/// incorrect transcript words in red.
fn render_diff(reference: &str, typed: &str) {
    println!(
        "\nReview ({GREEN}missed{RESET} / {RED}extra{RESET}):"
    );
    for span in diff_words(reference, typed) {
        match span.kind {
            SpanKind::Matched => print!("{}", span.text),
            SpanKind::Deleted => print!("{GREEN}{}{RESET}", span.text),
            SpanKind::Inserted => print!("{RED}{}{RESET}", span.text),
        }
    }
    println!();
}

async fn run_review(catalog: &InMemoryCatalog, passage_id: i64, typed: &str) -> Result<()> {
    let passage = catalog
        .find_by_id(passage_id)
        .await?
        .ok_or_else(|| DictaError::Catalog(format!("no passage with id {passage_id}")))?;
    render_diff(&passage.content, typed);
    Ok(())
}

async fn run_practice(
    catalog: Arc<InMemoryCatalog>,
    config: &DictaConfig,
    passage_id: i64,
    no_audio: bool,
) -> Result<()> {
    let passage = catalog
        .find_by_id(passage_id)
        .await?
        .ok_or_else(|| DictaError::Catalog(format!("no passage with id {passage_id}")))?;

    let controller = PlaybackController::new(build_output(config, no_audio));
    let options = SessionOptions {
        auto_complete_on_length: config.session.auto_complete_on_length,
    };
    let mut engine = SessionEngine::new(passage, options, controller);

    if no_audio {
        let token = engine.load_token();
        engine.apply_audio(
            &token,
            Err(DictaError::Synthesis("audio disabled".to_string())),
        );
    } else {
        let synthesizer = ToneSynthesizer::new(config.synthesis.speaking_rate);
        engine.load_audio(&synthesizer).await;
    }

    println!("Listen carefully, then transcribe what you heard.");
    println!("Commands: play, pause, replay, type, quit");
    loop {
        let command = read_line("> ")?;
        match command.as_str() {
            "play" => engine.audio_mut().play(),
            "pause" => engine.audio_mut().pause(),
            "replay" => engine.audio_mut().replay(),
            "type" => break,
            "quit" => {
                engine.cancel();
                println!("Session cancelled.");
                return Ok(());
            }
            "" => {}
            other => println!("Unknown command: {other}"),
        }
    }

    engine.start_typing();
    let transcript = read_line("Type what you heard:\n")?;
    engine.handle_input(&transcript);
    if engine.phase() != Phase::Completed {
        engine.complete();
    }

    let stats = engine.stats();
    println!(
        "\nDone in {:.1}s — {:.0} wpm, {:.1}% progress",
        stats.elapsed_seconds, stats.wpm, stats.progress
    );

    let sink = InMemoryAttemptSink::new(Arc::clone(&catalog));
    match engine.submit(&sink).await {
        Ok(receipt) => {
            println!(
                "Attempt #{} recorded: {:.1}% accuracy",
                receipt.attempt_no, receipt.accuracy
            );
            if let Some(perf) = receipt.performance {
                println!(
                    "Overall: {} attempts, best {:.1}%, average {:.1}%",
                    perf.total_attempts, perf.best_accuracy, perf.average_accuracy
                );
            }
        }
        Err(e) => {
            // The transcript is still in the session; nothing is lost.
            eprintln!("Submission failed: {e}");
        }
    }

    if let Some(result) = engine.result() {
        render_diff(&engine.passage().content, &result.typed_text);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let args = cli::CliArgs::parse();

    // Tracing.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(args.resolve_log_level())),
        )
        .init();

    tracing::info!("Starting dicta v{}", env!("CARGO_PKG_VERSION"));

    // Config.
    let config_file = args.resolve_config_path();
    let config = DictaConfig::load_or_default(&config_file);

    let catalog = Arc::new(InMemoryCatalog::new(seed_passages()));

    match args.command {
        cli::Command::List => run_list(&catalog).await?,
        cli::Command::Practice { passage, no_audio } => {
            run_practice(Arc::clone(&catalog), &config, passage, no_audio).await?
        }
        cli::Command::Review { passage, typed } => run_review(&catalog, passage, &typed).await?,
    }

    Ok(())
}
