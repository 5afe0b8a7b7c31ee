//! CLI command implementations.

pub mod chat;
pub mod serve;
pub mod tools;
