use config::{builder::DefaultState, Config, ConfigBuilder, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Server {
    pub listen: String,
    pub route: String,
}

#[derive(Debug, Deserialize)]
pub struct Provider {
    pub url: String,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub token_ttl_secs: i64,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Callback {
    pub scheme: String,
    pub path: String,
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub server: Server,
    pub provider: Provider,
    pub callback: Callback,
}

impl Settings {
    /// Reads `path` (optional) and then the `PIX_*` environment, e.g.
    /// `PIX_PROVIDER__CLIENT_SECRET`.
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        let config = Self::defaults()?
            .add_source(File::with_name(path).required(false))
            .add_source(
                Environment::with_prefix("PIX")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        config.try_deserialize()
    }

    fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        Config::builder()
            .set_default("server.listen", "0.0.0.0:8080")?
            .set_default("server.route", "/api/create-pix-deposit")?
            .set_default("provider.token_ttl_secs", 55 * 60_i64)?
            .set_default("callback.scheme", "https")?
            .set_default("callback.path", "/api/webhook")
    }
}
