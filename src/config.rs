use std::env;
use std::time::Duration;

use log::LevelFilter;

use crate::now_playing::Credentials;

pub const DEFAULT_LASTFM_API_URL: &str = "https://ws.audioscrobbler.com/2.0/";

pub struct Config {
    pub api_host: String,
    pub api_port: u16,
    pub lastfm_api_key: Option<String>,
    pub lastfm_username: Option<String>,
    pub lastfm_api_url: String,
    pub lastfm_timeout: Duration,
    pub cors_allow_origin: Option<String>,
    pub log_level: LevelFilter,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup, so tests don't have to touch the process environment.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        Self {
            api_host: non_empty("API_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            api_port: non_empty("API_PORT")
                .and_then(|port| port.parse().ok())
                .unwrap_or(4000),
            lastfm_api_key: non_empty("LASTFM_API_KEY"),
            lastfm_username: non_empty("LASTFM_USERNAME"),
            lastfm_api_url: non_empty("LASTFM_API_URL")
                .unwrap_or_else(|| DEFAULT_LASTFM_API_URL.to_string()),
            lastfm_timeout: Duration::from_secs(
                non_empty("LASTFM_TIMEOUT_SECS")
                    .and_then(|secs| secs.parse().ok())
                    .unwrap_or(5),
            ),
            cors_allow_origin: non_empty("CORS_ALLOW_ORIGIN"),
            log_level: non_empty("LOG_LEVEL")
                .and_then(|level| level.parse().ok())
                .unwrap_or(LevelFilter::Info),
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api_host, self.api_port)
    }

    pub fn credentials(&self) -> Credentials {
        Credentials {
            api_key: self.lastfm_api_key.clone(),
            username: self.lastfm_username.clone(),
        }
    }
}
