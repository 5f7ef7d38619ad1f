use std::sync::Arc;

use reqwest::StatusCode;

use crate::repositories::{provider::ProviderApi, token_cache::InMemoryTokenCache};
use crate::settings::Settings;

pub mod auth;
pub mod http;
#[cfg(test)]
mod testing;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Configuration error: {0}")]
    Configuration(String),
    #[error("Authentication failed: {status} => {body}")]
    Authentication { status: StatusCode, body: String },
    #[error("Protocol error: {reason} ({status} => {body})")]
    Protocol {
        reason: String,
        status: StatusCode,
        body: String,
    },
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Upstream error: {status}")]
    Upstream {
        status: StatusCode,
        body: serde_json::Value,
    },
    #[error("Communication error: {0}")]
    Communication(String),
}

impl From<reqwest::Error> for ServiceError {
    fn from(e: reqwest::Error) -> Self {
        ServiceError::Communication(e.to_string())
    }
}

pub async fn start_services(settings: Settings) -> Result<(), anyhow::Error> {
    let provider = Arc::new(ProviderApi::new(settings.provider.url.clone()));
    let cache = Arc::new(InMemoryTokenCache::new());

    let token_ttl = chrono::Duration::try_seconds(settings.provider.token_ttl_secs)
        .ok_or_else(|| anyhow::anyhow!("provider.token_ttl_secs is out of range"))?;

    log::info!("Starting authenticator for {}.", settings.provider.url);
    let authenticator = auth::Authenticator::new(
        auth::Credentials::new(
            settings.provider.client_id.clone(),
            settings.provider.client_secret.clone(),
        ),
        provider.clone(),
        cache,
        token_ttl,
    );

    log::info!("Starting HTTP server.");
    http::start_http_server(&settings, Arc::new(authenticator), provider).await
}
