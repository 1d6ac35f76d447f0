//! Health probe logic.
//!
//! Performs a single HTTP GET against the service health endpoint with
//! a hard timeout. Every failure mode — connect error, handshake
//! error, timeout, non-2xx status, unparseable body — collapses to an
//! unreachable snapshot; callers only ever see reachability and the
//! reported uptime.

use std::time::Duration;

use http_body_util::BodyExt;
use tracing::debug;

use hoist_core::HealthSnapshot;

/// Boxed future for dyn-compatible async capability traits.
pub type BoxFuture<'a, T> = std::pin::Pin<Box<dyn std::future::Future<Output = T> + Send + 'a>>;

/// Capability to observe the running service's health.
///
/// The promotion workflow and the API are written against this trait
/// so tests can drive them with scripted snapshots.
pub trait Probe: Send + Sync {
    fn probe(&self) -> BoxFuture<'_, HealthSnapshot>;
}

/// HTTP prober against the real service health endpoint.
#[derive(Debug, Clone)]
pub struct HealthProber {
    address: String,
    endpoint: String,
    timeout: Duration,
}

impl HealthProber {
    /// Probe `http://<address><endpoint>` with the given per-probe timeout.
    pub fn new(address: impl Into<String>, endpoint: impl Into<String>, timeout: Duration) -> Self {
        Self {
            address: address.into(),
            endpoint: endpoint.into(),
            timeout,
        }
    }

    /// Take one health snapshot.
    pub async fn snapshot(&self) -> HealthSnapshot {
        let uri = format!("http://{}{}", self.address, self.endpoint);

        let result = tokio::time::timeout(self.timeout, async {
            let stream = match tokio::net::TcpStream::connect(&self.address).await {
                Ok(s) => s,
                Err(e) => {
                    debug!(error = %e, %uri, "health probe connection failed");
                    return HealthSnapshot::unreachable();
                }
            };

            let io = hyper_util::rt::TokioIo::new(stream);
            let (mut sender, conn) = match hyper::client::conn::http1::handshake(io).await {
                Ok(pair) => pair,
                Err(e) => {
                    debug!(error = %e, %uri, "health probe handshake failed");
                    return HealthSnapshot::unreachable();
                }
            };

            // Drive the connection in the background.
            tokio::spawn(async move {
                let _ = conn.await;
            });

            let req = match http::Request::builder()
                .method("GET")
                .uri(&uri)
                .header("host", &self.address)
                .header("user-agent", "hoist-health/0.1")
                .body(http_body_util::Empty::<bytes::Bytes>::new())
            {
                Ok(req) => req,
                Err(e) => {
                    debug!(error = %e, %uri, "health probe request build failed");
                    return HealthSnapshot::unreachable();
                }
            };

            let resp = match sender.send_request(req).await {
                Ok(resp) => resp,
                Err(e) => {
                    debug!(error = %e, %uri, "health probe request failed");
                    return HealthSnapshot::unreachable();
                }
            };

            if !resp.status().is_success() {
                debug!(status = %resp.status(), %uri, "health probe non-2xx");
                return HealthSnapshot::unreachable();
            }

            let body = match resp.into_body().collect().await {
                Ok(collected) => collected.to_bytes(),
                Err(e) => {
                    debug!(error = %e, %uri, "health probe body read failed");
                    return HealthSnapshot::unreachable();
                }
            };

            match serde_json::from_slice::<serde_json::Value>(&body) {
                Ok(value) => {
                    let uptime = value
                        .get("uptime_secs")
                        .and_then(|v| v.as_u64())
                        .unwrap_or(0);
                    HealthSnapshot::reachable(uptime)
                }
                Err(e) => {
                    debug!(error = %e, %uri, "health probe body unparseable");
                    HealthSnapshot::unreachable()
                }
            }
        })
        .await;

        match result {
            Ok(snapshot) => snapshot,
            Err(_) => {
                debug!(%uri, "health probe timed out");
                HealthSnapshot::unreachable()
            }
        }
    }
}

impl Probe for HealthProber {
    fn probe(&self) -> BoxFuture<'_, HealthSnapshot> {
        Box::pin(self.snapshot())
    }
}
