//! Domain models shared by the core and API crates.

pub mod auth;
pub mod chat;
