//! Live wizard sessions.

pub mod store;

pub use store::{spawn_expiry_task, SessionEntry, SessionStore};
