use std::sync::Arc;

use axum::{Router, routing::get};
use tokio::sync::Semaphore;

use crate::{
    fetch::http::Fetcher,
    foundation::{
        config::{DEFAULT_CHUNK_SIZE, Limits, RelayConfig},
        error::RelayError,
    },
    resolve::resolver::Resolver,
    server::{handlers, html::Locale, response::Failure},
};

/// Default number of reconstructions allowed to run at once.
pub const DEFAULT_MAX_CONCURRENT: usize = 4;

/// Shared, immutable state handed to every request handler.
#[derive(Clone)]
pub struct AppState {
    pub(crate) resolver: Arc<dyn Resolver>,
    pub(crate) fetcher: Arc<dyn Fetcher>,
    pub(crate) limits: Limits,
    pub(crate) chunk_size: usize,
    pub(crate) locale: Locale,
    pub(crate) reconstructions: Arc<Semaphore>,
}

impl AppState {
    /// State with default limits, chunk size, locale and concurrency.
    pub fn new(resolver: Arc<dyn Resolver>, fetcher: Arc<dyn Fetcher>) -> Self {
        Self {
            resolver,
            fetcher,
            limits: Limits::default(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            locale: Locale::default(),
            reconstructions: Arc::new(Semaphore::new(DEFAULT_MAX_CONCURRENT)),
        }
    }

    /// State whose limits and chunk size come from `cfg`, the same config the resolver and
    /// fetcher were built from.
    pub fn from_config(
        resolver: Arc<dyn Resolver>,
        fetcher: Arc<dyn Fetcher>,
        cfg: &RelayConfig,
    ) -> Self {
        Self::new(resolver, fetcher)
            .with_limits(cfg.limits)
            .with_chunk_size(cfg.chunk_size)
    }

    /// Replace the reconstruction limits.
    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    /// Largest body chunk relayed for still images.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Language of HTML pages and error text.
    pub fn with_locale(mut self, locale: Locale) -> Self {
        self.locale = locale;
        self
    }

    /// Cap concurrent reconstructions; further requests wait for a slot.
    pub fn with_max_concurrent(mut self, max: usize) -> Self {
        self.reconstructions = Arc::new(Semaphore::new(max.max(1)));
        self
    }

    pub(crate) fn fail(&self, err: RelayError) -> Failure {
        Failure::new(err, self.locale)
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("limits", &self.limits)
            .field("chunk_size", &self.chunk_size)
            .field("locale", &self.locale)
            .field(
                "available_reconstructions",
                &self.reconstructions.available_permits(),
            )
            .finish_non_exhaustive()
    }
}

/// Build the relay's HTTP routes.
///
/// `/pixiv`, `/pixiv/proxy` and `/pixiv/ugoira` are kept as aliases of `/view`,
/// `/fetch/static` and `/fetch/animated`.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/view", get(handlers::view))
        .route("/pixiv", get(handlers::view))
        .route("/fetch/static", get(handlers::fetch_static))
        .route("/pixiv/proxy", get(handlers::fetch_static))
        .route("/fetch/animated", get(handlers::fetch_animated))
        .route("/pixiv/ugoira", get(handlers::fetch_animated))
        .with_state(state)
}
