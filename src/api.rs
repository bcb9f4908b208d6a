use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderName, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use chrono::Utc;
use log::info;
use tower_http::cors::CorsLayer;

use crate::lastfm::LastfmClient;
use crate::now_playing::{self, Credentials, ResolverResult};

#[derive(Clone)]
pub struct AppState {
    pub client: Arc<LastfmClient>,
    pub credentials: Arc<Credentials>,
}

pub fn create_router(state: AppState, cors: Option<CorsLayer>) -> Router {
    let router = Router::new()
        .route("/api/lastfm.json", get(get_now_playing))
        .route("/api/now-playing", get(get_now_playing))
        .with_state(state);

    match cors {
        Some(layer) => router.layer(layer),
        None => router,
    }
}

pub fn cors_layer(origin: &str) -> Result<CorsLayer, header::InvalidHeaderValue> {
    Ok(CorsLayer::new()
        .allow_origin(HeaderValue::from_str(origin)?)
        .allow_methods([Method::GET]))
}

// GET /api/lastfm.json - Most recent track with a display status
async fn get_now_playing(State(state): State<AppState>) -> Response {
    let now = Utc::now().timestamp();
    let (status, result) = now_playing::resolve(&state.client, &state.credentials, now).await;

    info!("GET now playing -> {} ({})", status.as_u16(), result.status_text);

    no_store_json(status, result)
}

fn no_store_json(status: StatusCode, result: ResolverResult) -> Response {
    (
        status,
        [
            (header::CACHE_CONTROL, "no-store, max-age=0, must-revalidate"),
            (header::PRAGMA, "no-cache"),
            (header::EXPIRES, "0"),
            (HeaderName::from_static("cdn-cache-control"), "no-store"),
        ],
        Json(result),
    )
        .into_response()
}
