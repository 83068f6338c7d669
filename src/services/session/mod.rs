pub mod memory;
pub mod store;
pub mod valkey;

pub use memory::MemorySessionStore;
pub use store::{SessionError, SessionResult, SessionStore};
pub use valkey::ValkeySessionStore;
