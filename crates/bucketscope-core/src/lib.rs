#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

pub mod listing;
pub mod loader;
pub mod navigation;
pub mod scenes;
pub mod session;
pub mod store;
pub mod summary;

mod error;

#[cfg(any(test, feature = "test-utils"))]
#[cfg_attr(docsrs, doc(cfg(feature = "test-utils")))]
pub mod mock;

pub mod prelude;

pub use error::{BoxedError, Error, ErrorKind, Result};
