use axum::{
    body::Body,
    extract::{Query, State},
    http::{HeaderValue, StatusCode, header},
    response::{Html, IntoResponse, Response},
};
use serde::Deserialize;

use crate::{
    foundation::{
        error::RelayError,
        ids::{PageIndex, WorkId},
        stop::StopFlag,
    },
    pipeline::{serve_animation, serve_still},
    proxy::stream::FALLBACK_CONTENT_TYPE,
    resolve::classify::{Classified, classify},
    server::{app::AppState, html, response::Failure},
};

/// Response header naming why a work was served as a still image.
pub const PROBE_HEADER: &str = "x-ugoira-probe";

type Handled = Result<Response, Failure>;

#[derive(Debug, Default, Deserialize)]
pub(crate) struct WorkQuery {
    #[serde(alias = "pid")]
    work: Option<String>,
    page: Option<String>,
}

impl WorkQuery {
    fn work(&self) -> Result<WorkId, RelayError> {
        WorkId::parse(self.work.as_deref().unwrap_or_default())
    }

    fn page(&self) -> Result<PageIndex, RelayError> {
        PageIndex::parse(self.page.as_deref())
    }
}

pub(crate) async fn index(State(state): State<AppState>) -> Html<String> {
    Html(html::index_page(state.locale))
}

pub(crate) async fn view(State(state): State<AppState>, Query(q): Query<WorkQuery>) -> Handled {
    let work = q.work().map_err(|e| state.fail(e))?;
    let page = q.page().map_err(|e| state.fail(e))?;

    let classified = classify(state.resolver.as_ref(), &work)
        .await
        .map_err(|e| state.fail(e))?;

    match classified {
        Classified::Animated(meta) => {
            tracing::info!(work = %work, frames = meta.frames.len(), "view animated");
            Ok(Html(html::animated_page(state.locale, &work)).into_response())
        }
        Classified::Static { pages, probe } => {
            page.select(&pages).map_err(|e| state.fail(e))?;
            tracing::info!(
                work = %work,
                page = page.get(),
                pages = pages.len(),
                probe = probe.label(),
                "view still"
            );
            let mut resp = Html(html::still_page(state.locale, &work, page)).into_response();
            resp.headers_mut()
                .insert(PROBE_HEADER, HeaderValue::from_static(probe.label()));
            Ok(resp)
        }
    }
}

pub(crate) async fn fetch_static(
    State(state): State<AppState>,
    Query(q): Query<WorkQuery>,
) -> Handled {
    let work = q.work().map_err(|e| state.fail(e))?;
    let page = q.page().map_err(|e| state.fail(e))?;

    let image = serve_still(
        state.resolver.as_ref(),
        state.fetcher.as_ref(),
        &work,
        page,
        state.chunk_size,
    )
    .await
    .map_err(|e| state.fail(e))?;

    tracing::info!(
        work = %work,
        page = page.get(),
        content_type = %image.content_type,
        content_length = image.content_length,
        "relaying still"
    );

    let content_type = HeaderValue::from_str(&image.content_type)
        .unwrap_or_else(|_| HeaderValue::from_static(FALLBACK_CONTENT_TYPE));
    let mut resp = Response::new(Body::from_stream(image.body));
    resp.headers_mut().insert(header::CONTENT_TYPE, content_type);
    if let Some(len) = image.content_length {
        resp.headers_mut()
            .insert(header::CONTENT_LENGTH, HeaderValue::from(len));
    }
    Ok(resp)
}

pub(crate) async fn fetch_animated(
    State(state): State<AppState>,
    Query(q): Query<WorkQuery>,
) -> Handled {
    let work = q.work().map_err(|e| state.fail(e))?;

    let _permit = state
        .reconstructions
        .acquire()
        .await
        .map_err(|e| state.fail(RelayError::Other(anyhow::Error::new(e))))?;

    let stop = StopFlag::new();
    let _abandon = stop.raise_on_drop();

    let gif = serve_animation(
        state.resolver.as_ref(),
        state.fetcher.as_ref(),
        &work,
        &state.limits,
        stop,
    )
    .await
    .map_err(|e| state.fail(e))?;

    tracing::info!(
        work = %work,
        frames = gif.frame_count,
        width = gif.width,
        height = gif.height,
        bytes = gif.bytes.len(),
        "serving reconstructed gif"
    );

    let disposition = format!("attachment; filename=\"{}\"", gif.file_name(&work));
    let disposition = HeaderValue::from_str(&disposition)
        .map_err(|e| state.fail(RelayError::Other(anyhow::Error::new(e))))?;
    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, HeaderValue::from_static(gif.content_type())),
            (header::CONTENT_DISPOSITION, disposition),
            (header::CONTENT_LENGTH, HeaderValue::from(gif.bytes.len())),
        ],
        gif.bytes,
    )
        .into_response())
}
