//! Locking subsystem for docsmith.
//!
//! Two layers keep document updates single-flight:
//!
//! - [`DocumentLocks`]: an in-process keyed mutex, one slot per document path.
//!   Threads updating the same document queue up; different documents proceed
//!   independently.
//! - Lock files (`.<file>.lock` beside the document): created with
//!   **create_new** semantics so a second process fails fast with
//!   `LockError` instead of interleaving writes.
//!
//! # Lock Metadata
//!
//! Each lock file contains JSON metadata:
//! - `owner`: The owner of the lock (e.g., `user@HOST`)
//! - `pid`: The process ID (optional)
//! - `created_at`: RFC3339 timestamp
//! - `action`: The action being performed (update/render)
//!
//! # RAII Guards
//!
//! Lock files are managed through [`LockGuard`], which removes the file when
//! dropped. If deletion fails during drop, a warning is printed but the
//! program does not crash.

mod guard;
mod keyed;
mod metadata;
mod operations;


pub use guard::LockGuard;
pub use keyed::DocumentLocks;
pub use metadata::LockMetadata;
pub(crate) use metadata::get_owner_string;
pub use operations::{LockInfo, acquire_document_lock, clear_lock, lock_path_for, read_lock};
