//! Forwarding of sensor records to the backend.
//!
//! Each record is POSTed as JSON to `http://{host}:{port}/data` from a
//! detached tokio task. The caller never waits for the request: failures
//! are logged and otherwise ignored, with no retry. Requests still in
//! flight at shutdown are given a bounded grace period by [`Forwarder::flush`].

use std::sync::{Arc, Mutex};
use std::time::Duration;

use reqwest::Client;
use tokio::runtime::Handle;
use tokio::task::JoinSet;
use tracing::{debug, error, warn};

use crate::data::SensorRecord;

/// Default backend host.
pub const DEFAULT_HOST: &str = "127.0.0.1";
/// Default backend port.
pub const DEFAULT_PORT: u16 = 5000;
/// How long shutdown waits for outstanding requests.
pub const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// Sends records to the backend without blocking the caller.
#[derive(Debug, Clone)]
pub struct Forwarder {
    client: Client,
    url: String,
    runtime: Handle,
    in_flight: Arc<Mutex<JoinSet<()>>>,
}

impl Forwarder {
    /// Create a forwarder for `host:port`, spawning requests on `runtime`.
    pub fn new(host: &str, port: u16, runtime: Handle) -> Self {
        Self {
            client: Client::new(),
            url: endpoint(host, port),
            runtime,
            in_flight: Arc::new(Mutex::new(JoinSet::new())),
        }
    }

    /// The URL records are POSTed to.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// POST `record` in the background.
    pub fn forward(&self, record: &SensorRecord) {
        let client = self.client.clone();
        let url = self.url.clone();
        let body = record.to_json();

        let mut tasks = self.in_flight.lock().unwrap_or_else(|e| e.into_inner());
        // Reap finished requests so the set only holds live ones
        while tasks.try_join_next().is_some() {}

        tasks.spawn_on(
            async move {
                match client.post(&url).json(&body).send().await {
                    Ok(response) if response.status().is_success() => {
                        debug!("Forwarded record to {} ({})", url, response.status());
                    }
                    Ok(response) => {
                        error!("Failed to send data to backend: HTTP {}", response.status());
                    }
                    Err(e) => {
                        error!("Failed to send data to backend: {}", e);
                    }
                }
            },
            &self.runtime,
        );
    }

    /// Number of requests not yet reaped.
    pub fn pending(&self) -> usize {
        let mut tasks = self.in_flight.lock().unwrap_or_else(|e| e.into_inner());
        while tasks.try_join_next().is_some() {}
        tasks.len()
    }

    /// Wait up to `timeout` for every request started so far.
    ///
    /// Returns the number of requests abandoned because the wait ran out.
    pub async fn flush(&self, timeout: Duration) -> usize {
        let mut tasks = {
            let mut guard = self.in_flight.lock().unwrap_or_else(|e| e.into_inner());
            std::mem::take(&mut *guard)
        };

        let drained = tokio::time::timeout(timeout, async {
            while tasks.join_next().await.is_some() {}
        })
        .await;

        if drained.is_err() {
            warn!(
                "Abandoning {} backend requests still in flight after {:?}",
                tasks.len(),
                timeout
            );
        }
        tasks.len()
    }

    /// Blocking [`flush`](Self::flush) for synchronous callers outside the
    /// runtime's worker threads.
    pub fn shutdown(&self, timeout: Duration) -> usize {
        self.runtime.block_on(self.flush(timeout))
    }
}

/// Build the backend data endpoint URL.
pub fn endpoint(host: &str, port: u16) -> String {
    format!("http://{}:{}/data", host, port)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use axum::http::{header, HeaderMap, StatusCode};
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::Value;
    use std::net::SocketAddr;
    use tokio::sync::mpsc;

    pub(crate) type Received = mpsc::UnboundedReceiver<(String, Value)>;

    /// Start a backend that records every POSTed body and answers `status`
    /// after `delay`.
    pub(crate) async fn backend_with_delay(
        status: StatusCode,
        delay: Duration,
    ) -> (SocketAddr, Received) {
        let (tx, rx) = mpsc::unbounded_channel();
        let app = Router::new().route(
            "/data",
            post(move |headers: HeaderMap, Json(body): Json<Value>| {
                let tx = tx.clone();
                async move {
                    tokio::time::sleep(delay).await;
                    let content_type = headers
                        .get(header::CONTENT_TYPE)
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or_default()
                        .to_string();
                    tx.send((content_type, body)).unwrap();
                    status
                }
            }),
        );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (addr, rx)
    }

    pub(crate) async fn backend(status: StatusCode) -> (SocketAddr, Received) {
        backend_with_delay(status, Duration::ZERO).await
    }

    fn record() -> SensorRecord {
        SensorRecord::parse(
            r#"{"temperature":24.5,"airQuality":130,"soundLevel":55,"node":"lab"}"#,
        )
        .unwrap()
    }

    fn forwarder_for(addr: SocketAddr) -> Forwarder {
        Forwarder::new(&addr.ip().to_string(), addr.port(), Handle::current())
    }

    #[test]
    fn test_endpoint() {
        assert_eq!(endpoint("192.168.1.20", 5000), "http://192.168.1.20:5000/data");
    }

    #[tokio::test]
    async fn test_forward_posts_record_as_json() {
        let (addr, mut rx) = backend(StatusCode::OK).await;
        let forwarder = forwarder_for(addr);

        forwarder.forward(&record());
        assert_eq!(forwarder.flush(SHUTDOWN_GRACE).await, 0);

        let (content_type, body) = rx.recv().await.unwrap();
        assert_eq!(content_type, "application/json");
        assert_eq!(body, record().to_json());
        assert_eq!(body["node"], "lab");
    }

    #[tokio::test]
    async fn test_forward_preserves_order_of_sends() {
        let (addr, mut rx) = backend(StatusCode::OK).await;
        let forwarder = forwarder_for(addr);

        let first = SensorRecord::parse(r#"{"temperature":1,"airQuality":1,"soundLevel":1}"#)
            .unwrap();
        forwarder.forward(&first);
        forwarder.flush(SHUTDOWN_GRACE).await;
        forwarder.forward(&record());
        forwarder.flush(SHUTDOWN_GRACE).await;

        assert_eq!(rx.recv().await.unwrap().1, first.to_json());
        assert_eq!(rx.recv().await.unwrap().1, record().to_json());
    }

    #[tokio::test]
    async fn test_flush_waits_for_every_request() {
        let (addr, mut rx) = backend_with_delay(StatusCode::OK, Duration::from_millis(50)).await;
        let forwarder = forwarder_for(addr);

        for _ in 0..10 {
            forwarder.forward(&record());
        }
        assert_eq!(forwarder.flush(SHUTDOWN_GRACE).await, 0);
        assert_eq!(forwarder.pending(), 0);

        // Every body was delivered before flush returned
        for _ in 0..10 {
            assert!(rx.try_recv().is_ok());
        }
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_flush_gives_up_after_timeout() {
        let (addr, _rx) = backend_with_delay(StatusCode::OK, Duration::from_secs(10)).await;
        let forwarder = forwarder_for(addr);

        forwarder.forward(&record());
        forwarder.forward(&record());
        assert_eq!(forwarder.flush(Duration::from_millis(100)).await, 2);
        assert_eq!(forwarder.pending(), 0);
    }

    #[tokio::test]
    async fn test_forward_error_status_is_not_fatal() {
        let (addr, mut rx) = backend(StatusCode::INTERNAL_SERVER_ERROR).await;
        let forwarder = forwarder_for(addr);

        // Task completes normally even though the backend rejected the record
        forwarder.forward(&record());
        assert_eq!(forwarder.flush(SHUTDOWN_GRACE).await, 0);
        assert!(rx.recv().await.is_some());
    }

    #[tokio::test]
    async fn test_forward_unreachable_backend_is_not_fatal() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let forwarder = Forwarder::new("127.0.0.1", port, Handle::current());
        forwarder.forward(&record());
        assert_eq!(forwarder.flush(SHUTDOWN_GRACE).await, 0);
    }
}
