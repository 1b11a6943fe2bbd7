use std::{fmt, time::Duration};

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use futures::{StreamExt, TryStreamExt, stream::BoxStream};
use reqwest::header::{CONTENT_TYPE, REFERER};

use crate::{
    fetch::allowlist::OutboundAllowlist,
    foundation::{
        config::RelayConfig,
        error::{RelayError, RelayResult},
        ids::WorkId,
    },
};

/// Upstream body as a stream of chunks.
pub type ByteStream = BoxStream<'static, RelayResult<Bytes>>;

/// An upstream response whose headers have arrived and whose body has not been read yet.
pub struct UpstreamBody {
    /// `Content-Type` reported by upstream, if any.
    pub content_type: Option<String>,
    /// `Content-Length` reported by upstream, if any.
    pub content_length: Option<u64>,
    /// Body chunks in arrival order.
    pub body: ByteStream,
}

impl fmt::Debug for UpstreamBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpstreamBody")
            .field("content_type", &self.content_type)
            .field("content_length", &self.content_length)
            .finish_non_exhaustive()
    }
}

/// Fetches binary resources (still images, frame bundles) from previously resolved URLs.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Send the request and return as soon as response headers are in.
    ///
    /// A non-success status is an error; no body is handed out for it.
    async fn open(&self, url: &str, work: &WorkId) -> RelayResult<UpstreamBody>;

    /// Fetch a whole resource into memory, refusing anything larger than `max_bytes`.
    async fn fetch_bytes(&self, url: &str, work: &WorkId, max_bytes: u64) -> RelayResult<Bytes> {
        let upstream = self.open(url, work).await?;
        collect_limited(upstream, max_bytes).await
    }
}

/// Drain an upstream body into one buffer, failing once it grows past `max_bytes`.
pub async fn collect_limited(upstream: UpstreamBody, max_bytes: u64) -> RelayResult<Bytes> {
    if let Some(len) = upstream.content_length
        && len > max_bytes
    {
        return Err(RelayError::limit(format!(
            "upstream body of {len} bytes exceeds the limit of {max_bytes}"
        )));
    }

    let capacity = upstream.content_length.unwrap_or(0).min(max_bytes) as usize;
    let mut buf = BytesMut::with_capacity(capacity);
    let mut body = upstream.body;
    while let Some(chunk) = body.try_next().await? {
        if (buf.len() + chunk.len()) as u64 > max_bytes {
            return Err(RelayError::limit(format!(
                "upstream body exceeds the limit of {max_bytes} bytes"
            )));
        }
        buf.extend_from_slice(&chunk);
    }
    Ok(buf.freeze())
}

/// [`Fetcher`] backed by a shared `reqwest` connection pool.
#[derive(Clone, Debug)]
pub struct HttpFetcher {
    client: reqwest::Client,
    allowlist: OutboundAllowlist,
    request_timeout: Duration,
}

impl HttpFetcher {
    /// Build a fetcher from relay configuration.
    pub fn new(cfg: &RelayConfig) -> RelayResult<Self> {
        let client = reqwest::Client::builder()
            .user_agent(cfg.user_agent.clone())
            .connect_timeout(cfg.connect_timeout)
            .read_timeout(cfg.stream_read_timeout)
            .build()
            .map_err(|e| RelayError::Other(anyhow::Error::new(e).context("build http client")))?;
        Ok(Self {
            client,
            allowlist: cfg.allowlist.clone(),
            request_timeout: cfg.request_timeout,
        })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn open(&self, url: &str, work: &WorkId) -> RelayResult<UpstreamBody> {
        let url = self.allowlist.check(url)?;
        let resp = self
            .client
            .get(url.clone())
            .header(REFERER, work.referer())
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(%url, error = %e, "upstream request failed");
                RelayError::upstream(format!("GET {url}: {e}"))
            })?;

        let status = resp.status();
        if !status.is_success() {
            tracing::warn!(%url, %status, "upstream returned non-success status");
            return Err(RelayError::UpstreamStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let content_type = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        let content_length = resp.content_length();
        let body = resp
            .bytes_stream()
            .map(move |chunk| {
                chunk.map_err(|e| RelayError::upstream(format!("read body of {url}: {e}")))
            })
            .boxed();

        Ok(UpstreamBody {
            content_type,
            content_length,
            body,
        })
    }

    async fn fetch_bytes(&self, url: &str, work: &WorkId, max_bytes: u64) -> RelayResult<Bytes> {
        let download = async {
            let upstream = self.open(url, work).await?;
            collect_limited(upstream, max_bytes).await
        };
        tokio::time::timeout(self.request_timeout, download)
            .await
            .map_err(|_| {
                RelayError::upstream(format!(
                    "GET {url}: timed out after {:?}",
                    self.request_timeout
                ))
            })?
    }
}

#[cfg(test)]
#[path = "../../tests/unit/fetch/http.rs"]
mod tests;
