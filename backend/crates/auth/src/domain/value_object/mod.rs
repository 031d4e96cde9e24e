//! Value Object Module

pub mod public_id;
pub mod user_name;
pub mod user_status;

// The role vocabulary and typed user IDs live in the kernel: they are
// consulted by the session and accreditation domains as well.
pub use kernel::id::UserId;
pub use kernel::role::UserRole;
