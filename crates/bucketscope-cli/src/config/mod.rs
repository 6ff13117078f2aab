//! CLI configuration management.
//!
//! This module defines the complete CLI configuration hierarchy:
//!
//! ```text
//! Cli
//! ├── session: SessionConfig   # Bucket, token, initial path
//! ├── gcs: GcsConfig           # Storage API root, HTTP timeout, user agent
//! ├── gemini: GeminiConfig     # Summary model and API key
//! ├── columns: ColumnPolicy    # Scene table column derivation
//! └── command: Command         # What to do
//! ```
//!
//! All configuration can be provided via CLI arguments or environment variables.
//! Use `--help` to see all available options.
//!
//! # Example
//!
//! ```bash
//! bucketscope --bucket media-archive --token "$(gcloud auth print-access-token)" list
//!
//! # Or via environment variables
//! GCS_BUCKET=media-archive GCS_ACCESS_TOKEN=... GCS_PATH=shots/ bucketscope browse
//! ```

mod session;

use std::path::PathBuf;
use std::process;

use bucketscope_core::scenes::ColumnPolicy;
use bucketscope_gcs::GcsConfig;
use bucketscope_rig::GeminiConfig;
use clap::{Parser, Subcommand};
pub use session::SessionConfig;

use crate::{TRACING_TARGET_CONFIG, TRACING_TARGET_STARTUP};

/// Complete CLI configuration.
#[derive(Debug, Clone, Parser)]
#[command(name = "bucketscope")]
#[command(about = "Explore media buckets and their scene metadata")]
#[command(version)]
pub struct Cli {
    /// Connection to the bucket.
    #[clap(flatten)]
    pub session: SessionConfig,

    /// Storage client configuration.
    #[clap(flatten)]
    pub gcs: GcsConfig,

    /// Summary model configuration.
    #[clap(flatten)]
    pub gemini: GeminiConfig,

    /// How scene table columns are derived
    #[arg(long, env = "SCENE_COLUMNS", value_enum, default_value_t = ColumnPolicy::FirstRecord)]
    pub columns: ColumnPolicy,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Show folders, media and the scene table of the current path
    List,

    /// Show every field of one scene and load its image
    Scene {
        /// Zero-based row of the scene table
        index: usize,

        /// Write the scene image to this file
        #[arg(long)]
        save_image: Option<PathBuf>,
    },

    /// Download one object
    Fetch {
        /// Full object name
        name: String,

        /// Output file; stdout when omitted
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Generate a summary of the scenes of the current path
    Summarize,

    /// Interactive explorer
    Browse,
}

impl Cli {
    /// Loads environment variables from .env file (if enabled) and parses CLI arguments.
    ///
    /// .env files are loaded before clap parses arguments, so that
    /// variables from .env are picked up as defaults.
    pub fn init() -> Self {
        Self::load_dotenv();
        Self::parse()
    }

    /// Loads environment variables from .env file if the dotenv feature is enabled.
    #[cfg(feature = "dotenv")]
    fn load_dotenv() {
        if let Err(err) = dotenvy::dotenv()
            && !err.not_found()
        {
            eprintln!("Warning: failed to load .env file: {err}");
        }
    }

    /// No-op when dotenv feature is disabled.
    #[cfg(not(feature = "dotenv"))]
    fn load_dotenv() {}

    /// Logs configuration at debug level (no sensitive information).
    pub fn log(&self) {
        tracing::debug!(
            target: TRACING_TARGET_STARTUP,
            version = env!("CARGO_PKG_VERSION"),
            pid = process::id(),
            arch = std::env::consts::ARCH,
            os = std::env::consts::OS,
            features = ?Self::enabled_features(),
            "Build information"
        );

        tracing::debug!(
            target: TRACING_TARGET_CONFIG,
            bucket = ?self.session.bucket,
            path = %self.session.path,
            token_set = self.session.token.is_some(),
            base_url = %self.gcs.base_url,
            http_timeout_secs = self.gcs.effective_timeout().as_secs(),
            gemini_model = %self.gemini.effective_model(),
            gemini_key_set = self.gemini.effective_api_key().is_some(),
            columns = %self.columns,
            "Configuration"
        );
    }

    /// Returns a list of enabled compile-time features.
    fn enabled_features() -> Vec<&'static str> {
        [cfg!(feature = "dotenv").then_some("dotenv")]
            .into_iter()
            .flatten()
            .collect()
    }
}
