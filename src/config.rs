use figment::providers::{Env, Serialized};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Runtime configuration, merged from defaults and `PARKDECK_`-prefixed
/// environment variables (e.g. `PARKDECK_DATABASE_URL`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database_url: String,
    pub loglevel: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: "sqlite:parkdeck.db".to_string(),
            loglevel: "info".to_string(),
        }
    }
}

impl Config {
    pub fn load() -> Self {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Env::prefixed("PARKDECK_"))
            .extract()
            .unwrap_or_default()
    }
}

pub static CONFIG: LazyLock<Config> = LazyLock::new(Config::load);
