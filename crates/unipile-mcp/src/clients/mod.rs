//! Unipile API client modules.
//!
//! - [`config`]: connection settings read from the environment
//! - [`unipile`]: the HTTP client core and its error type
//! - [`messaging`]: chats, messages and linked accounts
//! - [`linkedin`]: users, posts, comments, reactions and search
//!
//! A single [`UnipileClient`] serves every endpoint; the endpoint modules
//! only add `impl UnipileClient` blocks and their parameter structs.

pub mod config;
pub mod linkedin;
pub mod messaging;
pub mod unipile;

pub use config::{ConfigError, UnipileConfig};
pub use unipile::{UnipileClient, UnipileError, UnipileResult};
