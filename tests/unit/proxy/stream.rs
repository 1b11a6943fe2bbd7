use async_trait::async_trait;
use bytes::Bytes;
use futures::{StreamExt, TryStreamExt, stream};

use super::*;
use crate::{
    fetch::http::UpstreamBody,
    foundation::error::{RelayError, RelayResult},
};

fn chunks(items: Vec<RelayResult<Bytes>>) -> ByteStream {
    stream::iter(items).boxed()
}

struct OneShot {
    content_type: Option<&'static str>,
    payload: &'static [u8],
}

#[async_trait]
impl Fetcher for OneShot {
    async fn open(&self, _url: &str, _work: &WorkId) -> RelayResult<UpstreamBody> {
        Ok(UpstreamBody {
            content_type: self.content_type.map(str::to_owned),
            content_length: Some(self.payload.len() as u64),
            body: chunks(vec![Ok(Bytes::from_static(self.payload))]),
        })
    }
}

struct Refusing;

#[async_trait]
impl Fetcher for Refusing {
    async fn open(&self, url: &str, _work: &WorkId) -> RelayResult<UpstreamBody> {
        Err(RelayError::UpstreamStatus {
            status: 403,
            url: url.to_owned(),
        })
    }
}

#[tokio::test]
async fn rechunk_splits_large_chunks_and_keeps_small_ones() {
    let body = chunks(vec![
        Ok(Bytes::from_static(b"0123456789")),
        Ok(Bytes::from_static(b"ab")),
        Ok(Bytes::new()),
    ]);
    let pieces: Vec<Bytes> = rechunk(body, 4).try_collect().await.unwrap();
    let lens: Vec<usize> = pieces.iter().map(Bytes::len).collect();
    assert_eq!(lens, vec![4, 4, 2, 2]);
    assert_eq!(pieces.concat(), b"0123456789ab");
}

#[tokio::test]
async fn rechunk_forwards_errors_in_place() {
    let body = chunks(vec![
        Ok(Bytes::from_static(b"abcdef")),
        Err(RelayError::upstream("reset")),
    ]);
    let items: Vec<RelayResult<Bytes>> = rechunk(body, 4).collect().await;
    assert_eq!(items.len(), 3);
    assert!(items[0].is_ok());
    assert!(items[1].is_ok());
    assert!(items[2].is_err());
}

#[tokio::test]
async fn rechunk_treats_zero_chunk_size_as_one() {
    let body = chunks(vec![Ok(Bytes::from_static(b"abc"))]);
    let pieces: Vec<Bytes> = rechunk(body, 0).try_collect().await.unwrap();
    assert_eq!(pieces.len(), 3);
}

#[tokio::test]
async fn proxy_mirrors_upstream_content_type() {
    let fetcher = OneShot {
        content_type: Some("image/jpeg"),
        payload: b"jpeg-bytes",
    };
    let work = WorkId::parse("1").unwrap();
    let image = proxy_still(&fetcher, "https://i.pximg.net/a.jpg", &work, 8192)
        .await
        .unwrap();
    assert_eq!(image.content_type, "image/jpeg");
    assert_eq!(image.content_length, Some(10));
    let body: Vec<Bytes> = image.body.try_collect().await.unwrap();
    assert_eq!(body.concat(), b"jpeg-bytes");
}

#[tokio::test]
async fn proxy_defaults_missing_content_type() {
    let fetcher = OneShot {
        content_type: None,
        payload: b"x",
    };
    let work = WorkId::parse("1").unwrap();
    let image = proxy_still(&fetcher, "https://i.pximg.net/a", &work, 8192)
        .await
        .unwrap();
    assert_eq!(image.content_type, FALLBACK_CONTENT_TYPE);
}

#[tokio::test]
async fn proxy_surfaces_upstream_status_before_any_body() {
    let work = WorkId::parse("1").unwrap();
    let err = proxy_still(&Refusing, "https://i.pximg.net/a", &work, 8192)
        .await
        .unwrap_err();
    assert!(matches!(err, RelayError::UpstreamStatus { status: 403, .. }));
}
