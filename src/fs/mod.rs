//! Filesystem utilities for docsmith.
//!
//! Documents are only ever persisted through atomic writes so a failed update
//! never leaves a half-written document behind.

pub mod atomic;

pub use atomic::atomic_write;
pub use atomic::atomic_write_file;
