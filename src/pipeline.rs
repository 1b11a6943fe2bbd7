//! Per-request composition of resolver, fetcher, proxy and reconstructor.

use crate::{
    fetch::http::Fetcher,
    foundation::{
        config::Limits,
        error::{RelayError, RelayResult},
        ids::{PageIndex, WorkId},
        stop::StopFlag,
    },
    proxy::stream::{ProxiedImage, proxy_still},
    resolve::resolver::Resolver,
    ugoira::{
        frames::UgoiraMeta,
        reconstruct::{AnimatedImage, reconstruct},
    },
};

/// Resolve the pages of a still work and open page `page` for relaying.
#[tracing::instrument(skip(resolver, fetcher, work), fields(work = %work))]
pub async fn serve_still(
    resolver: &dyn Resolver,
    fetcher: &dyn Fetcher,
    work: &WorkId,
    page: PageIndex,
    chunk_size: usize,
) -> RelayResult<ProxiedImage> {
    let pages = resolver.resolve_static(work).await?;
    let url = page.select(&pages)?;
    proxy_still(fetcher, url, work, chunk_size).await
}

/// Resolve, download and reconstruct an animated work.
///
/// Decode and encode run on the blocking pool. Raising `stop` (e.g. when the caller's request
/// is dropped) makes the blocking half give up at the next frame boundary.
#[tracing::instrument(skip(resolver, fetcher, work, limits, stop), fields(work = %work))]
pub async fn serve_animation(
    resolver: &dyn Resolver,
    fetcher: &dyn Fetcher,
    work: &WorkId,
    limits: &Limits,
    stop: StopFlag,
) -> RelayResult<AnimatedImage> {
    let meta = resolver.resolve_animation(work).await?;
    serve_animation_meta(fetcher, work, meta, limits, stop).await
}

/// Download and reconstruct an animation whose metadata is already resolved.
pub async fn serve_animation_meta(
    fetcher: &dyn Fetcher,
    work: &WorkId,
    meta: UgoiraMeta,
    limits: &Limits,
    stop: StopFlag,
) -> RelayResult<AnimatedImage> {
    limits.check_frame_count(meta.frames.len())?;

    let bundle = fetcher
        .fetch_bytes(&meta.bundle_url, work, limits.max_bundle_bytes)
        .await?;
    tracing::debug!(bundle_len = bundle.len(), frames = meta.frames.len(), "bundle fetched");

    let limits = *limits;
    let frames = meta.frames;
    tokio::task::spawn_blocking(move || reconstruct(&bundle, &frames, &limits, &stop))
        .await
        .map_err(|e| RelayError::Other(anyhow::Error::new(e).context("reconstruction task")))?
}
