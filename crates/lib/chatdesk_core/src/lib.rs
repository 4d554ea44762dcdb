//! # chatdesk_core
//!
//! Core domain logic for Chatdesk: conversation storage, the chat exchange,
//! completion clients and authentication primitives.

pub mod auth;
pub mod completion;
pub mod conversations;
pub mod db;
pub mod exchange;
pub mod migrate;
pub mod models;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_not_empty() {
        assert!(!version().is_empty());
    }
}
