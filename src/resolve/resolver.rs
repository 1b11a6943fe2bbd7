use async_trait::async_trait;

use crate::{
    foundation::{error::RelayResult, ids::WorkId},
    ugoira::frames::UgoiraMeta,
};

/// Metadata lookups against the image host.
#[async_trait]
pub trait Resolver: Send + Sync {
    /// Original-resolution URLs of every page of a still work, in page order.
    async fn resolve_static(&self, work: &WorkId) -> RelayResult<Vec<String>>;

    /// Bundle URL and frame list of an animated work.
    ///
    /// Fails for works that are not animated.
    async fn resolve_animation(&self, work: &WorkId) -> RelayResult<UgoiraMeta>;
}
