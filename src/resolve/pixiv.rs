use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{COOKIE, REFERER};
use serde::{Deserialize, de::DeserializeOwned};

use crate::{
    foundation::{
        config::RelayConfig,
        error::{RelayError, RelayResult},
        ids::WorkId,
    },
    resolve::resolver::Resolver,
    ugoira::frames::{FrameDescriptor, UgoiraMeta},
};

/// Standard pixiv ajax wrapper: `{"error": bool, "message": str, "body": ...}`.
///
/// The body is kept untyped until `error` has been checked; failed lookups send `"body": []`.
#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    error: bool,
    #[serde(default)]
    message: String,
    #[serde(default)]
    body: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct PageEntry {
    urls: PageUrls,
}

#[derive(Debug, Deserialize)]
struct PageUrls {
    original: String,
}

#[derive(Debug, Deserialize)]
struct UgoiraBody {
    #[serde(rename = "originalSrc")]
    original_src: String,
    frames: Vec<FrameDescriptor>,
}

fn unwrap_envelope<T: DeserializeOwned>(bytes: &[u8], what: &str) -> RelayResult<Option<T>> {
    let envelope: Envelope = serde_json::from_slice(bytes)
        .map_err(|e| RelayError::upstream(format!("decode {what} response: {e}")))?;
    if envelope.error {
        return Err(RelayError::UpstreamRejected(format!(
            "{what}: {}",
            envelope.message
        )));
    }
    serde_json::from_value(envelope.body)
        .map_err(|e| RelayError::upstream(format!("decode {what} body: {e}")))
}

/// Parse a `/ajax/illust/<id>/pages` response into original image URLs.
///
/// A missing body means a work without pages.
pub fn parse_pages(bytes: &[u8]) -> RelayResult<Vec<String>> {
    let pages: Option<Vec<PageEntry>> = unwrap_envelope(bytes, "pages")?;
    Ok(pages
        .unwrap_or_default()
        .into_iter()
        .map(|p| p.urls.original)
        .collect())
}

/// Parse a `/ajax/illust/<id>/ugoira_meta` response.
pub fn parse_ugoira_meta(bytes: &[u8]) -> RelayResult<UgoiraMeta> {
    let body: UgoiraBody = unwrap_envelope(bytes, "ugoira_meta")?
        .ok_or_else(|| RelayError::upstream("ugoira_meta response has no body"))?;
    if body.frames.is_empty() {
        return Err(RelayError::upstream("ugoira_meta lists no frames"));
    }
    Ok(UgoiraMeta {
        bundle_url: body.original_src,
        frames: body.frames,
    })
}

/// [`Resolver`] speaking pixiv's ajax API with a session cookie.
#[derive(Clone, Debug)]
pub struct PixivResolver {
    client: reqwest::Client,
    api_base: String,
    cookie: String,
    timeout: Duration,
}

impl PixivResolver {
    /// Build a resolver from relay configuration.
    pub fn new(cfg: &RelayConfig) -> RelayResult<Self> {
        let client = reqwest::Client::builder()
            .user_agent(cfg.user_agent.clone())
            .connect_timeout(cfg.connect_timeout)
            .build()
            .map_err(|e| RelayError::Other(anyhow::Error::new(e).context("build http client")))?;
        Ok(Self {
            client,
            api_base: cfg.api_base.clone(),
            cookie: cfg.cookie.clone(),
            timeout: cfg.request_timeout,
        })
    }

    fn illust_url(&self, work: &WorkId, endpoint: &str) -> String {
        format!("{}/ajax/illust/{work}/{endpoint}", self.api_base)
    }

    async fn get(&self, url: &str, work: &WorkId) -> RelayResult<bytes::Bytes> {
        let resp = self
            .client
            .get(url)
            .header(REFERER, work.referer())
            .header(COOKIE, &self.cookie)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| RelayError::upstream(format!("GET {url}: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(RelayError::UpstreamStatus {
                status: status.as_u16(),
                url: url.to_owned(),
            });
        }
        resp.bytes()
            .await
            .map_err(|e| RelayError::upstream(format!("read {url}: {e}")))
    }
}

#[async_trait]
impl Resolver for PixivResolver {
    #[tracing::instrument(skip(self, work), fields(work = %work))]
    async fn resolve_static(&self, work: &WorkId) -> RelayResult<Vec<String>> {
        let body = self.get(&self.illust_url(work, "pages"), work).await?;
        let pages = parse_pages(&body)?;
        tracing::debug!(pages = pages.len(), "resolved still pages");
        Ok(pages)
    }

    #[tracing::instrument(skip(self, work), fields(work = %work))]
    async fn resolve_animation(&self, work: &WorkId) -> RelayResult<UgoiraMeta> {
        let body = self.get(&self.illust_url(work, "ugoira_meta"), work).await?;
        let meta = parse_ugoira_meta(&body)?;
        tracing::debug!(frames = meta.frames.len(), "resolved ugoira metadata");
        Ok(meta)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/resolve/pixiv.rs"]
mod tests;
