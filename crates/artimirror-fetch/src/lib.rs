//! HTTP downloading into staging files.
//!
//! # Architecture
//!
//! - [`data`] - Immutable options and timeouts
//! - [`effects`] - I/O behind the [`HttpClient`] trait
//!
//! The [`Fetcher`] streams a response body to a caller-chosen staging path and cleans
//! it up on failure. It applies no policy: verification, promotion and retry decisions
//! stay with the caller.

pub mod data;
mod effects;
mod error;

pub use data::{FetchOptions, Timeouts};
pub use effects::{BoxStream, Fetcher, HttpClient, TextResponse};

#[cfg(feature = "reqwest")]
pub use effects::ReqwestClient;

pub use error::{FetchError, Result};
