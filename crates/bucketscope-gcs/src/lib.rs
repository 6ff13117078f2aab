#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod client;
mod config;
mod error;

pub use client::{GcsClient, public_url};
pub use config::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS, GcsConfig};
pub use error::{Error, Result};

/// Tracing target for storage client operations.
pub const TRACING_TARGET: &str = "bucketscope_gcs";
