use serde::Deserialize;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;

const DEFAULT_SERVICE_ACCOUNT_PATH: &str = "./firebase-service-account.json";
const DEFAULT_FCM_API_URL: &str = "https://fcm.googleapis.com";

#[derive(Debug, Clone, Deserialize)]
pub struct NotificationConfig {
    #[serde(flatten)]
    pub common: core_config::Config,
    pub fcm: FcmConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FcmConfig {
    /// When false the mock push provider is used and no credentials are read.
    pub enabled: bool,
    /// Path to the Google service account JSON.
    pub service_account_path: String,
    /// Overrides the `project_id` found in the service account file.
    pub project_id: Option<String>,
    pub api_url: String,
    pub timeout_secs: u64,
}

impl Default for FcmConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            service_account_path: DEFAULT_SERVICE_ACCOUNT_PATH.to_string(),
            project_id: None,
            api_url: DEFAULT_FCM_API_URL.to_string(),
            timeout_secs: 30,
        }
    }
}

impl NotificationConfig {
    pub fn load() -> Result<Self, AppError> {
        Ok(NotificationConfig {
            common: core_config::Config::load()?,
            fcm: FcmConfig::from_lookup(|key| env::var(key).ok())?,
        })
    }
}

impl FcmConfig {
    /// Read the FCM settings through `lookup`.
    ///
    /// With `ENVIRONMENT=prod` the credentials path must be set explicitly;
    /// elsewhere it falls back to `GOOGLE_APPLICATION_CREDENTIALS` and then to
    /// `./firebase-service-account.json`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let is_prod = lookup("ENVIRONMENT").as_deref() == Some("prod");

        let default_key_path = lookup("GOOGLE_APPLICATION_CREDENTIALS")
            .unwrap_or_else(|| DEFAULT_SERVICE_ACCOUNT_PATH.to_string());

        Ok(FcmConfig {
            enabled: parse_env(&lookup, "FCM_ENABLED", true)?,
            service_account_path: get_env(
                &lookup,
                "FCM_SERVICE_ACCOUNT_PATH",
                Some(&default_key_path),
                is_prod,
            )?,
            project_id: lookup("FCM_PROJECT_ID").filter(|v| !v.is_empty()),
            api_url: get_env(&lookup, "FCM_API_URL", Some(DEFAULT_FCM_API_URL), false)?,
            timeout_secs: parse_env(&lookup, "FCM_TIMEOUT_SECS", 30)?,
        })
    }
}

fn get_env<F>(lookup: &F, key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(val) => Ok(val),
        None => {
            if is_prod {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required in production but not set",
                    key
                )))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required but not set",
                    key
                )))
            }
        }
    }
}

fn parse_env<F, T>(lookup: &F, key: &str, default: T) -> Result<T, AppError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(val) => val.trim().parse().map_err(|e| {
            AppError::ConfigError(anyhow::anyhow!("{} has an invalid value {:?}: {}", key, val, e))
        }),
        None => Ok(default),
    }
}
