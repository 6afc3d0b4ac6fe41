//! Immutable configuration types for HTTP fetching.

pub mod options;

pub use options::{FetchOptions, Timeouts};
