//! User storage.
//!
//! The token generator only needs [`UserLookup`]. [`UserStorage`] adds the
//! create-if-absent and by-email operations a user directory offers, and
//! [`InMemoryUserStorage`] implements both.

pub mod memory;
pub mod user;

pub use memory::InMemoryUserStorage;
pub use user::{User, UserLookup, UserStorage};
