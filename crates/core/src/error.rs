//! Error types for the Confab domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error variant, and the set is closed:
//! everything that can go wrong maps onto configuration, validation, or the
//! remote model.

use thiserror::Error;

/// The top-level error type for all Confab operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Configuration errors ---
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    // --- Request validation errors ---
    #[error("{0}")]
    Validation(#[from] ValidationError),

    // --- Remote model errors ---
    #[error("Model error: {0}")]
    Model(#[from] ModelError),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Render the full cause chain, outermost first, one cause per line.
    ///
    /// Used where callers want the whole diagnostic story in a single
    /// string (the HTTP error body, log events) without a backtrace.
    pub fn chain(&self) -> String {
        let mut out = self.to_string();
        let mut source = std::error::Error::source(self);
        while let Some(cause) = source {
            out.push_str("\nCaused by: ");
            out.push_str(&cause.to_string());
            source = cause.source();
        }
        out
    }
}

// --- Bounded context errors ---

/// Failures while loading or validating startup configuration.
///
/// These are fatal: they abort initialization and are never retried.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {reason}")]
    Read { path: String, reason: String },

    #[error("Failed to parse {path}: {reason}")]
    Parse { path: String, reason: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("No API key configured (set CONFAB_API_KEY or GROQ_API_KEY)")]
    MissingApiKey,
}

/// A request that failed input validation. The request is rejected and no
/// state is mutated.
#[derive(Debug, Clone, Error)]
pub enum ValidationError {
    #[error("Invalid input. 'message' is required.")]
    MissingMessage,
}

/// Failures from the remote inference call. No state is mutated; the caller
/// may retry the whole operation.
#[derive(Debug, Clone, Error)]
pub enum ModelError {
    #[error("API request failed: {message} (status: {status_code})")]
    Api { status_code: u16, message: String },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Malformed model response: {0}")]
    MalformedResponse(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_error_displays_correctly() {
        let err = Error::Model(ModelError::Api {
            status_code: 429,
            message: "Too many requests".into(),
        });
        assert!(err.to_string().contains("429"));
        assert!(err.to_string().contains("Too many requests"));
    }

    #[test]
    fn validation_error_displays_exact_contract_text() {
        let err = Error::Validation(ValidationError::MissingMessage);
        assert_eq!(err.to_string(), "Invalid input. 'message' is required.");
    }

    #[test]
    fn config_error_names_the_path() {
        let err = Error::Config(ConfigError::Read {
            path: "tools.toml".into(),
            reason: "No such file or directory".into(),
        });
        assert!(err.to_string().contains("tools.toml"));
    }

    #[test]
    fn chain_includes_the_source() {
        let err = Error::Model(ModelError::AuthenticationFailed("invalid API key".into()));
        let chain = err.chain();
        assert!(chain.starts_with("Model error:"));
        assert!(chain.contains("Caused by: Authentication failed: invalid API key"));
    }
}
