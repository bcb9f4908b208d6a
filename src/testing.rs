//! Test helpers: a throwaway Last.fm stand-in served over real HTTP.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    extract::Query,
    http::{header, StatusCode},
    routing::get,
    Router,
};
use tokio::net::TcpListener;

pub struct FakeUpstream {
    pub url: String,
    requests: Arc<Mutex<Vec<HashMap<String, String>>>>,
}

impl FakeUpstream {
    pub async fn start(status: StatusCode, body: &str) -> Self {
        Self::start_with_delay(status, body, Duration::ZERO).await
    }

    pub async fn start_with_delay(status: StatusCode, body: &str, delay: Duration) -> Self {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let recorded = requests.clone();
        let body = body.to_string();

        let app = Router::new().route(
            "/2.0/",
            get(move |Query(params): Query<HashMap<String, String>>| {
                let recorded = recorded.clone();
                let body = body.clone();
                async move {
                    recorded.lock().unwrap().push(params);
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                    (status, [(header::CONTENT_TYPE, "application/json")], body)
                }
            }),
        );

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        Self {
            url: format!("http://{}/2.0/", addr),
            requests,
        }
    }

    /// Query strings of every request received so far.
    pub fn requests(&self) -> Vec<HashMap<String, String>> {
        self.requests.lock().unwrap().clone()
    }
}

/// A URL on a port nothing is listening on.
pub async fn closed_port_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}/2.0/", addr)
}
