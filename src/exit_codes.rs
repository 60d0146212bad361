//! Exit code constants for the docsmith CLI.
//!
//! - 0: Success
//! - 1: User error (bad args, unreadable config or template files)
//! - 2: Template failure (unknown template, missing required variables)
//! - 3: Document write failure
//! - 4: Lock acquisition failure

/// Successful execution.
pub const SUCCESS: i32 = 0;

/// User error: bad arguments or invalid workspace state.
pub const USER_ERROR: i32 = 1;

/// Template failure: unknown template id or missing required variables.
pub const TEMPLATE_FAILURE: i32 = 2;

/// Document write failure: the updated document could not be persisted.
pub const WRITE_FAILURE: i32 = 3;

/// Lock acquisition failure: another process holds the document lock.
pub const LOCK_FAILURE: i32 = 4;
