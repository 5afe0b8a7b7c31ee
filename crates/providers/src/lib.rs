//! Model backend implementations for Confab.
//!
//! All backends implement the `confab_core::ChatModel` trait. Construction
//! from configuration happens here, so the rest of the system only ever
//! sees an `Arc<dyn ChatModel>`.

use std::sync::Arc;

use confab_config::AppConfig;
use confab_core::{ChatModel, ConfigError};

pub mod openai_compat;

pub use openai_compat::OpenAiCompatClient;

/// Build the configured model backend.
///
/// Fails with [`ConfigError::MissingApiKey`] when no key is available, and
/// with [`ConfigError::Invalid`] for an unknown backend name without an
/// explicit `api_url`.
pub fn build_from_config(config: &AppConfig) -> Result<Arc<dyn ChatModel>, ConfigError> {
    let api_key = config.require_api_key()?;
    let timeout = std::time::Duration::from_secs(config.provider.timeout_secs);

    let client = match (config.provider.name.as_str(), &config.provider.api_url) {
        (name, Some(url)) => OpenAiCompatClient::new(name, url, api_key),
        ("groq", None) => OpenAiCompatClient::groq(api_key),
        ("openai", None) => OpenAiCompatClient::openai(api_key),
        (other, None) => {
            return Err(ConfigError::Invalid(format!(
                "unknown provider {other:?}: set provider.api_url for custom backends"
            )));
        }
    };

    Ok(Arc::new(client.with_timeout(timeout)))
}
