//! Filesystem primitives for the local artifact mirror.
//!
//! - [`atomic_write`] / [`promote`]: never expose a half-written file under its final name
//! - [`remove_empty_ancestors`]: best-effort bottom-up pruning of emptied directories
//! - [`dir_usage`]: size and file count of a mirrored tree

mod error;
mod primitives;
mod usage;

pub use error::{Error, Result};
pub use primitives::{
    atomic_write, promote, remove_empty_ancestors, remove_file_if_exists,
    AtomicWriteOptions,
};
pub use usage::{dir_usage, format_size, DirUsage};
