use crate::error::AppError;
use config::{Config as Cfg, File};
use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// OTLP collector endpoint. Span export is disabled when unset.
    #[serde(default)]
    pub otlp_endpoint: Option<String>,
}

fn default_port() -> u16 {
    3000
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: default_port(),
            log_level: default_log_level(),
            otlp_endpoint: None,
        }
    }
}

impl Config {
    /// Layered load: `configuration.*` file, then `APP__*` variables, then the
    /// plain `PORT`, `LOG_LEVEL` and `OTLP_ENDPOINT` variables.
    pub fn load() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        Self::load_from(|key| env::var(key).ok())
    }

    /// Same layering as [`Config::load`], with the plain overrides read
    /// through `lookup` instead of the process environment.
    pub fn load_from<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = Cfg::builder()
            .add_source(File::with_name("configuration").required(false))
            .add_source(config::Environment::with_prefix("APP").separator("__"))
            .set_override_option("port", lookup("PORT"))?
            .set_override_option("log_level", lookup("LOG_LEVEL"))?
            .set_override_option("otlp_endpoint", lookup("OTLP_ENDPOINT"))?
            .build()?;

        Ok(config.try_deserialize()?)
    }
}
