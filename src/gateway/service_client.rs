// ============================================================================
// Service Client
// ============================================================================
//
// Reverse-proxy seam for the gateway. ServiceClient forwards over reqwest:
// - request body streamed to the upstream
// - response body streamed back, never buffered whole
// - connect timeout, a response-header timeout and an idle timeout
//   between response body chunks
// - redirects are relayed, not followed
//
// ============================================================================

use anyhow::{Context, Result};
use async_trait::async_trait;
use axum::body::{Body, Bytes, HttpBody};
use axum::http::{header, HeaderName, Request, Response};
use futures_util::stream::{self, Stream, StreamExt};
use std::time::Duration;

use crate::config::GatewayConfig;

/// Failure to obtain a response from an upstream
#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    #[error("upstream did not respond within {0:?}")]
    Timeout(Duration),

    #[error("upstream request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("invalid upstream response: {0}")]
    InvalidResponse(String),
}

/// Forwards one request to a fully resolved upstream URL
#[async_trait]
pub trait ReverseProxy: Send + Sync {
    async fn forward(
        &self,
        request: Request<Body>,
        target: &str,
    ) -> Result<Response<Body>, UpstreamError>;
}

/// Connection-scoped headers that must not cross the proxy
fn is_hop_by_hop(name: &HeaderName) -> bool {
    matches!(
        name.as_str(),
        "connection"
            | "keep-alive"
            | "proxy-connection"
            | "te"
            | "trailer"
            | "transfer-encoding"
            | "upgrade"
    )
}

/// HTTP client for forwarding requests to upstream services
pub struct ServiceClient {
    client: reqwest::Client,
    response_timeout: Duration,
    idle_timeout: Duration,
}

impl ServiceClient {
    pub fn new(config: &GatewayConfig) -> Result<Self> {
        Ok(Self::with_timeouts(
            Duration::from_secs(config.connect_timeout_secs),
            Duration::from_secs(config.upstream_timeout_secs),
        )?
        .with_idle_timeout(Duration::from_secs(config.idle_timeout_secs)))
    }

    pub fn with_timeouts(connect_timeout: Duration, response_timeout: Duration) -> Result<Self> {
        // No total timeout on the client: it would cut long response streams.
        let client = reqwest::Client::builder()
            .connect_timeout(connect_timeout)
            .tcp_keepalive(Duration::from_secs(30))
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(90))
            .redirect(reqwest::redirect::Policy::none())
            .no_proxy()
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            response_timeout,
            idle_timeout: response_timeout,
        })
    }

    /// Longest silence tolerated between two response body chunks
    pub fn with_idle_timeout(mut self, idle_timeout: Duration) -> Self {
        self.idle_timeout = idle_timeout;
        self
    }
}

/// Relay an upstream body, ending it with an error once no chunk arrives
/// within `idle`. Total duration is unbounded.
fn idle_bounded<S>(
    body: S,
    idle: Duration,
) -> impl Stream<Item = Result<Bytes, UpstreamError>> + Send + 'static
where
    S: Stream<Item = reqwest::Result<Bytes>> + Send + 'static,
{
    stream::unfold(Some(Box::pin(body)), move |state| async move {
        let mut body = state?;
        match tokio::time::timeout(idle, body.next()).await {
            Ok(Some(Ok(chunk))) => Some((Ok(chunk), Some(body))),
            Ok(Some(Err(e))) => Some((Err(UpstreamError::Request(e)), None)),
            Ok(None) => None,
            Err(_) => {
                tracing::warn!(idle_ms = idle.as_millis() as u64, "Upstream body stalled");
                Some((Err(UpstreamError::Timeout(idle)), None))
            }
        }
    })
}

#[async_trait]
impl ReverseProxy for ServiceClient {
    async fn forward(
        &self,
        request: Request<Body>,
        target: &str,
    ) -> Result<Response<Body>, UpstreamError> {
        let (parts, body) = request.into_parts();

        let mut upstream_request = self.client.request(parts.method, target);

        // Copy headers (except Host, which reqwest sets for the upstream)
        for (name, value) in parts.headers.iter() {
            if name == header::HOST || is_hop_by_hop(name) {
                continue;
            }
            upstream_request = upstream_request.header(name, value);
        }

        if body.size_hint().exact() != Some(0) {
            upstream_request =
                upstream_request.body(reqwest::Body::wrap_stream(body.into_data_stream()));
        }

        // Dropping this future (client went away) abandons the upstream call
        let upstream_response =
            match tokio::time::timeout(self.response_timeout, upstream_request.send()).await {
                Ok(result) => result?,
                Err(_) => return Err(UpstreamError::Timeout(self.response_timeout)),
            };

        let mut response = Response::builder().status(upstream_response.status());
        for (name, value) in upstream_response.headers().iter() {
            if is_hop_by_hop(name) {
                continue;
            }
            response = response.header(name, value);
        }

        response
            .body(Body::from_stream(idle_bounded(
                upstream_response.bytes_stream(),
                self.idle_timeout,
            )))
            .map_err(|e| UpstreamError::InvalidResponse(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use std::time::Instant;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    #[test]
    fn test_hop_by_hop_headers() {
        assert!(is_hop_by_hop(&header::CONNECTION));
        assert!(is_hop_by_hop(&header::TRANSFER_ENCODING));
        assert!(!is_hop_by_hop(&header::AUTHORIZATION));
        assert!(!is_hop_by_hop(&header::CONTENT_TYPE));
    }

    #[tokio::test]
    async fn test_unreachable_upstream_is_an_error() {
        let client =
            ServiceClient::with_timeouts(Duration::from_millis(500), Duration::from_secs(2))
                .unwrap();
        let request = Request::builder()
            .uri("/courses")
            .body(Body::empty())
            .unwrap();

        // Port 1 is reserved (tcpmux) and closed on test machines
        let result = client.forward(request, "http://127.0.0.1:1/").await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_stalled_response_body_is_cut_off() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        // Sends headers and part of the body, then goes silent
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 1024];
            let _ = socket.read(&mut buf).await;
            socket
                .write_all(b"HTTP/1.1 200 OK\r\ncontent-length: 100\r\n\r\npartial")
                .await
                .unwrap();
            tokio::time::sleep(Duration::from_secs(30)).await;
        });

        let client = ServiceClient::with_timeouts(Duration::from_secs(1), Duration::from_secs(2))
            .unwrap()
            .with_idle_timeout(Duration::from_millis(300));
        let request = Request::builder().uri("/").body(Body::empty()).unwrap();

        let response = client
            .forward(request, &format!("http://{}/", addr))
            .await
            .unwrap();
        assert_eq!(response.status(), 200);

        let started = Instant::now();
        assert!(response.into_body().collect().await.is_err());
        assert!(started.elapsed() < Duration::from_secs(5));
    }
}
