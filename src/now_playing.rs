use axum::http::StatusCode;
use log::{error, warn};
use serde::Serialize;

use crate::lastfm::{describe_error_code, LastfmClient, LastfmError, RecentTracksEnvelope, UpstreamTrack};

pub const STATUS_NOW_PLAYING: &str = "Now Playing";
pub const STATUS_LAST_PLAYED: &str = "Last Played";
pub const STATUS_JUST_NOW: &str = "Just Now";
pub const STATUS_NO_RECENT_TRACKS: &str = "No Recent Tracks";
pub const STATUS_MISCONFIGURED: &str = "Server Misconfiguration";
pub const STATUS_API_ERROR: &str = "API Error";
pub const STATUS_FETCH_ERROR: &str = "API Fetch Error";

const ALBUM_ART_SIZE: &str = "medium";

const SECONDS_PER_MINUTE: i64 = 60;
const SECONDS_PER_HOUR: i64 = 3_600;
const SECONDS_PER_DAY: i64 = 86_400;

#[derive(Debug, Clone, Default)]
pub struct Credentials {
    pub api_key: Option<String>,
    pub username: Option<String>,
}

impl Credentials {
    /// Returns `(api_key, username)` only when both are present and non-empty.
    pub fn complete(&self) -> Option<(&str, &str)> {
        let api_key = self.api_key.as_deref().filter(|k| !k.is_empty())?;
        let username = self.username.as_deref().filter(|u| !u.is_empty())?;
        Some((api_key, username))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedTrack {
    pub name: String,
    pub artist: String,
    pub album_art: Option<String>,
    pub url: String,
    pub now_playing: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolverResult {
    pub track: Option<NormalizedTrack>,
    pub status_text: String,
}

impl ResolverResult {
    fn empty(status_text: impl Into<String>) -> Self {
        Self {
            track: None,
            status_text: status_text.into(),
        }
    }
}

/// Resolves the most recent track into the response status and body.
/// Every failure is folded into a well-formed result.
pub async fn resolve(client: &LastfmClient, credentials: &Credentials, now: i64) -> (StatusCode, ResolverResult) {
    let Some((api_key, username)) = credentials.complete() else {
        error!("Last.fm API key or username missing from configuration");
        return (StatusCode::INTERNAL_SERVER_ERROR, ResolverResult::empty(STATUS_MISCONFIGURED));
    };

    match client.recent_tracks(api_key, username).await {
        Ok(envelope) => resolve_envelope(envelope, now),
        Err(e) => resolve_error(e),
    }
}

pub fn resolve_envelope(envelope: RecentTracksEnvelope, now: i64) -> (StatusCode, ResolverResult) {
    let first = envelope
        .recenttracks
        .and_then(|recent| recent.track.into_first());

    match first {
        Some(track) => {
            let status_text = recency_status(&track, now);
            let result = ResolverResult {
                track: Some(normalize(track)),
                status_text,
            };
            (StatusCode::OK, result)
        }
        None => {
            let status_text = match envelope.error {
                Some(code) => {
                    let message = envelope
                        .message
                        .unwrap_or_else(|| describe_error_code(code).to_string());
                    warn!("Last.fm reported error {} in a successful response: {}", code, message);
                    format!("{} {}: {}", STATUS_API_ERROR, code, message)
                }
                None => STATUS_NO_RECENT_TRACKS.to_string(),
            };
            (StatusCode::OK, ResolverResult::empty(status_text))
        }
    }
}

fn resolve_error(err: LastfmError) -> (StatusCode, ResolverResult) {
    match err {
        LastfmError::Status { status, code, message } => {
            match (code, message) {
                (Some(code), Some(message)) => {
                    warn!("Last.fm API error {} ({}): {}", code, describe_error_code(code), message)
                }
                (None, Some(message)) => warn!("Last.fm API error: {}", message),
                _ => warn!(
                    "Last.fm API error: {} (Status: {})",
                    status.canonical_reason().unwrap_or("Unknown"),
                    status.as_u16()
                ),
            }
            (status, ResolverResult::empty(STATUS_API_ERROR))
        }
        LastfmError::Malformed(e) => {
            warn!("Malformed Last.fm payload: {}", e);
            (StatusCode::SERVICE_UNAVAILABLE, ResolverResult::empty(STATUS_FETCH_ERROR))
        }
        e @ (LastfmError::Transport(_) | LastfmError::InvalidUrl(_)) => {
            error!("Failed to fetch Last.fm data: {}", e);
            (StatusCode::SERVICE_UNAVAILABLE, ResolverResult::empty(STATUS_FETCH_ERROR))
        }
    }
}

pub fn normalize(track: UpstreamTrack) -> NormalizedTrack {
    let now_playing = is_now_playing(&track);
    let album_art = medium_album_art(&track);

    NormalizedTrack {
        name: track.name,
        artist: track.artist.text,
        album_art,
        url: track.url,
        now_playing,
    }
}

/// Upstream serializes the flag as text, so only the literal `"true"` counts.
pub fn is_now_playing(track: &UpstreamTrack) -> bool {
    track
        .attr
        .as_ref()
        .and_then(|attr| attr.nowplaying.as_deref())
        == Some("true")
}

pub fn medium_album_art(track: &UpstreamTrack) -> Option<String> {
    track
        .image
        .iter()
        .find(|image| image.size == ALBUM_ART_SIZE)
        .map(|image| image.url.clone())
}

pub fn recency_status(track: &UpstreamTrack, now: i64) -> String {
    if is_now_playing(track) {
        return STATUS_NOW_PLAYING.to_string();
    }

    let uts = track.date.as_ref().and_then(|date| date.uts.as_deref());
    match uts.map(str::parse::<i64>) {
        Some(Ok(played_at)) => time_ago(now.saturating_sub(played_at)),
        Some(Err(_)) | None => STATUS_LAST_PLAYED.to_string(),
    }
}

pub fn time_ago(diff_seconds: i64) -> String {
    if diff_seconds < 0 {
        return STATUS_JUST_NOW.to_string();
    }

    let days = diff_seconds / SECONDS_PER_DAY;
    let hours = diff_seconds / SECONDS_PER_HOUR;
    let minutes = diff_seconds / SECONDS_PER_MINUTE;

    if days > 0 {
        format!("{}D AGO", days)
    } else if hours > 0 {
        format!("{}H AGO", hours)
    } else {
        format!("{}M AGO", minutes)
    }
}
