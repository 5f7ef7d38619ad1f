use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

#[derive(Clone, Debug)]
pub struct CachedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl CachedToken {
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

/// Storage for the provider bearer token. Concurrent writers are not
/// coordinated: the last `put` wins.
#[async_trait]
pub trait TokenCache: Send + Sync + 'static {
    /// Returns the token only while `now` is strictly before its expiry.
    async fn get(&self, now: DateTime<Utc>) -> Option<String>;

    async fn put(&self, token: CachedToken);
}

#[derive(Default)]
pub struct InMemoryTokenCache {
    entry: RwLock<Option<CachedToken>>,
}

impl InMemoryTokenCache {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TokenCache for InMemoryTokenCache {
    async fn get(&self, now: DateTime<Utc>) -> Option<String> {
        let entry = self.entry.read().await;

        entry
            .as_ref()
            .filter(|cached| cached.is_valid_at(now))
            .map(|cached| cached.token.clone())
    }

    async fn put(&self, token: CachedToken) {
        let mut entry = self.entry.write().await;
        *entry = Some(token);
    }
}
