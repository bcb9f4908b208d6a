use std::time::Duration;

use log::debug;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use thiserror::Error;
use url::Url;

// Last.fm API error codes as per documentation
const LASTFM_ERROR_INVALID_SERVICE: i32 = 2;
const LASTFM_ERROR_INVALID_METHOD: i32 = 3;
const LASTFM_ERROR_AUTH_FAILED: i32 = 4;
const LASTFM_ERROR_INVALID_FORMAT: i32 = 5;
const LASTFM_ERROR_INVALID_PARAMS: i32 = 6;
const LASTFM_ERROR_INVALID_RESOURCE: i32 = 7;
const LASTFM_ERROR_OPERATION_FAILED: i32 = 8;
const LASTFM_ERROR_INVALID_API_KEY: i32 = 10;
const LASTFM_ERROR_SERVICE_OFFLINE: i32 = 11;
const LASTFM_ERROR_TEMP_ERROR: i32 = 16;
const LASTFM_ERROR_SUSPENDED_API_KEY: i32 = 26;
const LASTFM_ERROR_RATE_LIMIT: i32 = 29;

#[derive(Debug, Error)]
pub enum LastfmError {
    #[error("invalid Last.fm API url: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Last.fm API returned {status}")]
    Status {
        status: StatusCode,
        code: Option<i32>,
        message: Option<String>,
    },
    #[error("failed to parse Last.fm response: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Top level of a `user.getrecenttracks` reply. Last.fm reports domain errors
/// as `error`/`message` pairs, sometimes inside a 200 response.
#[derive(Debug, Deserialize)]
pub struct RecentTracksEnvelope {
    pub recenttracks: Option<RecentTracks>,
    pub error: Option<i32>,
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RecentTracks {
    #[serde(default)]
    pub track: OneOrMany<UpstreamTrack>,
}

/// Last.fm collapses single-element lists into a bare object.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> Default for OneOrMany<T> {
    fn default() -> Self {
        OneOrMany::Many(Vec::new())
    }
}

impl<T> OneOrMany<T> {
    pub fn into_first(self) -> Option<T> {
        match self {
            OneOrMany::Many(items) => items.into_iter().next(),
            OneOrMany::One(item) => Some(item),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpstreamTrack {
    pub name: String,
    pub artist: TextField,
    #[serde(default)]
    pub image: Vec<TrackImage>,
    pub url: String,
    #[serde(rename = "@attr")]
    pub attr: Option<TrackAttr>,
    pub date: Option<PlayedAt>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TextField {
    #[serde(rename = "#text")]
    pub text: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TrackImage {
    pub size: String,
    #[serde(rename = "#text")]
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TrackAttr {
    pub nowplaying: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlayedAt {
    pub uts: Option<String>,
}

#[derive(Deserialize)]
struct LastfmErrorBody {
    error: Option<i32>,
    message: Option<String>,
}

pub struct LastfmClient {
    client: Client,
    api_url: Url,
}

impl LastfmClient {
    pub fn new(api_url: &str, timeout: Duration) -> Result<Self, LastfmError> {
        let api_url = Url::parse(api_url)?;
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self { client, api_url })
    }

    /// Fetches the single most recent track for `username`.
    pub async fn recent_tracks(&self, api_key: &str, username: &str) -> Result<RecentTracksEnvelope, LastfmError> {
        let params = [
            ("method", "user.getrecenttracks"),
            ("user", username),
            ("api_key", api_key),
            ("format", "json"),
            ("limit", "1"),
        ];

        debug!("Requesting recent tracks for user: {}", username);

        let response = self.client
            .get(self.api_url.clone())
            .query(&params)
            .send()
            .await
            .map_err(redact_url)?;

        let status = response.status();
        if !status.is_success() {
            // The error body is best effort only
            let body = response.bytes().await.unwrap_or_default();
            let (code, message) = match serde_json::from_slice::<LastfmErrorBody>(&body) {
                Ok(parsed) => (parsed.error, parsed.message),
                Err(_) => (None, None),
            };
            return Err(LastfmError::Status { status, code, message });
        }

        let body = response.bytes().await.map_err(redact_url)?;
        Ok(serde_json::from_slice(&body)?)
    }
}

// The request url carries the api key in its query string
fn redact_url(err: reqwest::Error) -> LastfmError {
    LastfmError::Transport(err.without_url())
}

pub fn describe_error_code(code: i32) -> &'static str {
    match code {
        LASTFM_ERROR_INVALID_SERVICE => "Invalid service - This service does not exist",
        LASTFM_ERROR_INVALID_METHOD => "Invalid Method - No method with that name exists in this package",
        LASTFM_ERROR_AUTH_FAILED => "Authentication Failed - You do not have permissions to access the service",
        LASTFM_ERROR_INVALID_FORMAT => "Invalid format - This service doesn't exist in that format",
        LASTFM_ERROR_INVALID_PARAMS => "Invalid parameters - Your request is missing a required parameter",
        LASTFM_ERROR_INVALID_RESOURCE => "Invalid resource specified",
        LASTFM_ERROR_OPERATION_FAILED => "Operation failed - Something else went wrong",
        LASTFM_ERROR_INVALID_API_KEY => "Invalid API key - You must be granted a valid key by last.fm",
        LASTFM_ERROR_SERVICE_OFFLINE => "Service Offline - This service is temporarily offline",
        LASTFM_ERROR_TEMP_ERROR => "There was a temporary error processing your request",
        LASTFM_ERROR_SUSPENDED_API_KEY => "Suspended API key - Access for your account has been suspended",
        LASTFM_ERROR_RATE_LIMIT => "Rate limit exceeded - Your IP has made too many requests in a short period",
        _ => "Unknown error",
    }
}
