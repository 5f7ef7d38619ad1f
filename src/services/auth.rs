use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use super::ServiceError;
use crate::repositories::{
    provider::ProviderApi,
    token_cache::{CachedToken, TokenCache},
};

/// Subtracted from a provider-stated token lifetime before caching.
const EXPIRY_MARGIN_SECS: i64 = 5 * 60;

/// Client credentials, fixed for the life of the process. Either value may
/// be absent; that is only reported when a login is attempted.
#[derive(Clone)]
pub struct Credentials {
    client_id: Option<String>,
    client_secret: Option<String>,
}

impl Credentials {
    pub fn new(client_id: Option<String>, client_secret: Option<String>) -> Self {
        Self {
            client_id: client_id.filter(|v| !v.is_empty()),
            client_secret: client_secret.filter(|v| !v.is_empty()),
        }
    }

    fn pair(&self) -> Result<(&str, &str), ServiceError> {
        match (self.client_id.as_deref(), self.client_secret.as_deref()) {
            (Some(id), Some(secret)) => Ok((id, secret)),
            (None, _) => Err(ServiceError::Configuration(
                "Provider client id is not set".to_string(),
            )),
            (_, None) => Err(ServiceError::Configuration(
                "Provider client secret is not set".to_string(),
            )),
        }
    }
}

pub struct Authenticator {
    credentials: Credentials,
    provider: Arc<ProviderApi>,
    cache: Arc<dyn TokenCache>,
    token_ttl: Duration,
}

impl Authenticator {
    pub fn new(
        credentials: Credentials,
        provider: Arc<ProviderApi>,
        cache: Arc<dyn TokenCache>,
        token_ttl: Duration,
    ) -> Self {
        Self {
            credentials,
            provider,
            cache,
            token_ttl,
        }
    }

    pub async fn authenticate(&self) -> Result<String, ServiceError> {
        if let Some(token) = self.cache.get(Utc::now()).await {
            log::debug!("Using cached provider token.");
            return Ok(token);
        }

        let (client_id, client_secret) = self.credentials.pair()?;
        let grant = self
            .provider
            .login(client_id, client_secret)
            .await
            .inspect_err(|e| log::warn!("Provider login failed: {}", e))?;

        let expires_at = self.expiry(Utc::now(), grant.expires_in);
        log::info!("Authenticated with provider, token valid until {}.", expires_at);

        self.cache
            .put(CachedToken {
                token: grant.token.clone(),
                expires_at,
            })
            .await;

        Ok(grant.token)
    }

    /// A provider lifetime within the margin expires at `now`. A lifetime
    /// that cannot be represented falls back to the configured TTL.
    fn expiry(&self, now: DateTime<Utc>, expires_in: Option<i64>) -> DateTime<Utc> {
        expires_in
            .map(|secs| secs.saturating_sub(EXPIRY_MARGIN_SECS).max(0))
            .and_then(Duration::try_seconds)
            .and_then(|lifetime| now.checked_add_signed(lifetime))
            .or_else(|| now.checked_add_signed(self.token_ttl))
            .unwrap_or(now)
    }
}
