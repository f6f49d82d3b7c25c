//! CLI argument definitions for the dicta application.
//!
//! Uses `clap` with derive macros for ergonomic argument parsing.
//! Priority resolution: CLI args > env vars > defaults.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// dicta — terminal dictation practice: listen, type, review.
#[derive(Parser, Debug)]
#[command(name = "dicta", version, about)]
pub struct CliArgs {
    /// Path to the configuration file.
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short = 'l', long = "log-level")]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List the passage library.
    List,
    /// Run one practice session against a passage.
    Practice {
        /// Passage id to practice.
        #[arg(long = "passage")]
        passage: i64,

        /// Skip audio synthesis and playback entirely.
        #[arg(long = "no-audio")]
        no_audio: bool,
    },
    /// Diff a transcript against a passage and render the review.
    Review {
        /// Passage id to diff against.
        #[arg(long = "passage")]
        passage: i64,

        /// The transcript to analyze.
        #[arg(long = "typed")]
        typed: String,
    },
}

impl CliArgs {
    /// Resolve the configuration file path.
    ///
    /// Priority: --config flag > DICTA_CONFIG env var > ~/.dicta/config.toml.
    pub fn resolve_config_path(&self) -> PathBuf {
        if let Some(ref p) = self.config {
            return p.clone();
        }
        if let Ok(p) = std::env::var("DICTA_CONFIG") {
            return PathBuf::from(p);
        }
        default_config_path()
    }

    /// Resolve the log level used as the default tracing filter.
    ///
    /// Priority: --log-level flag > DICTA_LOG_LEVEL env var > "info".
    pub fn resolve_log_level(&self) -> String {
        if let Some(ref level) = self.log_level {
            return level.clone();
        }
        if let Ok(level) = std::env::var("DICTA_LOG_LEVEL") {
            return level;
        }
        "info".to_string()
    }
}

/// Default config file path for the current platform.
fn default_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    if let Ok(home) = std::env::var("USERPROFILE") {
        return PathBuf::from(home).join(".dicta").join("config.toml");
    }
    #[cfg(not(target_os = "windows"))]
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".dicta").join("config.toml");
    }
    PathBuf::from("config.toml")
}
