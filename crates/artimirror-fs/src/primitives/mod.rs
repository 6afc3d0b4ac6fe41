pub mod atomic_write;
pub mod prune;

pub use atomic_write::{atomic_write, promote, AtomicWriteOptions};
pub use prune::{remove_empty_ancestors, remove_file_if_exists};
