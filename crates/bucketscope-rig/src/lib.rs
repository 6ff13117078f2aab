#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod config;
mod error;
mod generator;

pub use config::{DEFAULT_GEMINI_MODEL, GeminiConfig};
pub use error::{Error, Result};
pub use generator::GeminiGenerator;

/// Tracing target for text generation.
pub const TRACING_TARGET: &str = "bucketscope_rig";
