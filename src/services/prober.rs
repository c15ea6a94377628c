//! Stream liveness probing
//!
//! A probe is a HEAD request, falling back to a one-byte ranged GET for
//! origins that reject HEAD. Every failure mode (timeout, connection error,
//! non-success status) is folded into [`ProbeResult::unreachable`].

use anyhow::Result;
use async_trait::async_trait;
use reqwest::header::RANGE;
use reqwest::{Client, StatusCode};
use std::time::{Duration, Instant};

use crate::models::ProbeResult;

/// Liveness check for one candidate stream URL
#[async_trait]
pub trait Prober: Send + Sync {
    /// Never fails: unreachable sources come back with the sentinel latency
    async fn probe(&self, url: &str) -> ProbeResult;
}

/// HTTP prober backed by reqwest
pub struct HttpProber {
    client: Client,
    timeout: Duration,
}

fn is_live_status(status: StatusCode) -> bool {
    status.is_success() || status == StatusCode::PARTIAL_CONTENT
}

impl HttpProber {
    /// Create a prober with a per-probe time budget
    pub fn new(user_agent: &str, timeout_ms: u64) -> Result<Self> {
        let timeout = Duration::from_millis(timeout_ms);
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()?;

        Ok(Self { client, timeout })
    }

    async fn head_ok(&self, url: &str) -> bool {
        match self.client.head(url).send().await {
            Ok(resp) => is_live_status(resp.status()),
            Err(e) => {
                tracing::debug!("probe HEAD failed for {}: {}", url, e);
                false
            }
        }
    }

    async fn ranged_get_ok(&self, url: &str) -> bool {
        match self.client.get(url).header(RANGE, "bytes=0-0").send().await {
            // Dropping the response closes the body without reading it
            Ok(resp) => is_live_status(resp.status()),
            Err(e) => {
                tracing::debug!("probe GET failed for {}: {}", url, e);
                false
            }
        }
    }

    async fn check(&self, url: &str) -> bool {
        self.head_ok(url).await || self.ranged_get_ok(url).await
    }
}

#[async_trait]
impl Prober for HttpProber {
    async fn probe(&self, url: &str) -> ProbeResult {
        let start = Instant::now();

        // Both attempts share one budget
        match tokio::time::timeout(self.timeout, self.check(url)).await {
            Ok(true) => ProbeResult::reachable(start.elapsed().as_millis() as u64),
            Ok(false) => ProbeResult::unreachable(),
            Err(_) => {
                tracing::debug!("probe timed out for {}", url);
                ProbeResult::unreachable()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UNREACHABLE_LATENCY_MS;
    use axum::{
        http::{header, HeaderMap, StatusCode as AxumStatus},
        routing::get,
        Router,
    };
    use std::net::SocketAddr;

    async fn ranged_only(headers: HeaderMap) -> AxumStatus {
        if headers.contains_key(header::RANGE) {
            AxumStatus::PARTIAL_CONTENT
        } else {
            AxumStatus::OK
        }
    }

    async fn slow() -> &'static str {
        tokio::time::sleep(Duration::from_secs(5)).await;
        "late"
    }

    async fn spawn_origin() -> SocketAddr {
        let app = Router::new()
            .route("/live.m3u8", get(|| async { "#EXTM3U" }))
            // HEAD is rejected, ranged GET answers 206
            .route(
                "/no-head.ts",
                get(ranged_only).head(|| async { AxumStatus::METHOD_NOT_ALLOWED }),
            )
            .route("/gone.m3u8", get(|| async { AxumStatus::NOT_FOUND }))
            .route("/slow.m3u8", get(slow));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });
        addr
    }

    #[tokio::test]
    async fn test_reachable_stream() {
        let addr = spawn_origin().await;
        let prober = HttpProber::new("Mozilla/5.0", 2_000).unwrap();

        let result = prober.probe(&format!("http://{}/live.m3u8", addr)).await;
        assert!(result.reachable);
        assert!(result.latency_ms < UNREACHABLE_LATENCY_MS);
    }

    #[tokio::test]
    async fn test_falls_back_to_ranged_get() {
        let addr = spawn_origin().await;
        let prober = HttpProber::new("Mozilla/5.0", 2_000).unwrap();

        let result = prober.probe(&format!("http://{}/no-head.ts", addr)).await;
        assert!(result.reachable);
    }

    #[tokio::test]
    async fn test_error_status_is_unreachable() {
        let addr = spawn_origin().await;
        let prober = HttpProber::new("Mozilla/5.0", 2_000).unwrap();

        let result = prober.probe(&format!("http://{}/gone.m3u8", addr)).await;
        assert_eq!(result, ProbeResult::unreachable());
    }

    #[tokio::test]
    async fn test_timeout_is_unreachable() {
        let addr = spawn_origin().await;
        let prober = HttpProber::new("Mozilla/5.0", 200).unwrap();

        let result = prober.probe(&format!("http://{}/slow.m3u8", addr)).await;
        assert_eq!(result, ProbeResult::unreachable());
    }

    #[tokio::test]
    async fn test_connection_refused_is_unreachable() {
        let prober = HttpProber::new("Mozilla/5.0", 1_000).unwrap();

        // Port 9 (discard) is closed on test hosts
        let result = prober.probe("http://127.0.0.1:9/stream.m3u8").await;
        assert_eq!(result, ProbeResult::unreachable());
    }

    #[tokio::test]
    async fn test_invalid_url_is_unreachable() {
        let prober = HttpProber::new("Mozilla/5.0", 1_000).unwrap();

        let result = prober.probe("not a url").await;
        assert!(!result.reachable);
    }
}
