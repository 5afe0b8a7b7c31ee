//! # Confab Core
//!
//! Domain types, traits, and error definitions for the Confab chat service.
//! This crate has **zero framework dependencies** — it defines the domain model
//! that all other crates implement against.
//!
//! ## Design Philosophy
//!
//! The model backend is defined as a trait here; implementations live in their
//! own crates. This enables:
//! - Swapping backends via configuration
//! - Easy testing with mock/stub implementations
//! - Clean dependency graph (all crates depend inward on core)

pub mod error;
pub mod model;
pub mod turn;

// Re-export key types at crate root for ergonomics
pub use error::{ConfigError, Error, ModelError, Result, ValidationError};
pub use model::{ChatModel, Completion, CompletionRequest, TokenUsage};
pub use turn::{Role, Turn};
