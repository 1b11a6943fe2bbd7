use std::fmt;

use futures::{StreamExt, stream};

use crate::{
    fetch::http::{ByteStream, Fetcher},
    foundation::{error::RelayResult, ids::WorkId},
};

/// Content type used when upstream does not send one.
pub const FALLBACK_CONTENT_TYPE: &str = "image/png";

/// A still image ready to be relayed: headers decided, body still upstream.
pub struct ProxiedImage {
    /// Outbound `Content-Type`.
    pub content_type: String,
    /// Outbound `Content-Length`, when upstream declared one.
    pub content_length: Option<u64>,
    /// Body in chunks of at most the configured chunk size.
    pub body: ByteStream,
}

impl fmt::Debug for ProxiedImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProxiedImage")
            .field("content_type", &self.content_type)
            .field("content_length", &self.content_length)
            .finish_non_exhaustive()
    }
}

/// Open `url` upstream and hand back its body as a bounded-chunk stream.
///
/// Only headers are awaited here; every upstream error up to that point surfaces before the
/// caller commits to a response. Dropping the returned body aborts the upstream transfer.
#[tracing::instrument(skip(fetcher, work), fields(work = %work))]
pub async fn proxy_still(
    fetcher: &dyn Fetcher,
    url: &str,
    work: &WorkId,
    chunk_size: usize,
) -> RelayResult<ProxiedImage> {
    let upstream = fetcher.open(url, work).await?;
    let content_type = upstream
        .content_type
        .filter(|ct| !ct.trim().is_empty())
        .unwrap_or_else(|| FALLBACK_CONTENT_TYPE.to_owned());

    tracing::debug!(
        %content_type,
        content_length = ?upstream.content_length,
        "relaying still image"
    );

    Ok(ProxiedImage {
        content_type,
        content_length: upstream.content_length,
        body: rechunk(upstream.body, chunk_size),
    })
}

/// Split every chunk larger than `chunk_size` into `chunk_size` pieces.
///
/// Pieces are zero-copy slices of the original chunk; small chunks pass through untouched so
/// nothing waits on the next network read.
pub fn rechunk(body: ByteStream, chunk_size: usize) -> ByteStream {
    let chunk_size = chunk_size.max(1);
    body.flat_map(move |item| {
        let pieces: Vec<RelayResult<_>> = match item {
            Ok(mut bytes) => {
                let mut out = Vec::with_capacity(bytes.len() / chunk_size + 1);
                while bytes.len() > chunk_size {
                    out.push(Ok(bytes.split_to(chunk_size)));
                }
                if !bytes.is_empty() {
                    out.push(Ok(bytes));
                }
                out
            }
            Err(e) => vec![Err(e)],
        };
        stream::iter(pieces)
    })
    .boxed()
}

#[cfg(test)]
#[path = "../../tests/unit/proxy/stream.rs"]
mod tests;
