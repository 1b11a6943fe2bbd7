use crate::{
    foundation::{
        error::{RelayError, RelayResult},
        ids::WorkId,
    },
    resolve::resolver::Resolver,
    ugoira::frames::UgoiraMeta,
};

/// Why the animation probe did not produce an animation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// Upstream answered and said no: the work is not animated (or does not exist).
    NotAnimated(String),
    /// The probe itself failed (network, timeout, unreadable payload); the work may still be
    /// animated.
    ResolutionFailed(String),
}

impl ProbeOutcome {
    /// 4xx answers and explicit API rejections mean "no"; 5xx, 408 and 429 are transient.
    fn from_error(err: &RelayError) -> Self {
        match err {
            RelayError::UpstreamStatus { status, .. } if is_definitive(*status) => {
                Self::NotAnimated(err.to_string())
            }
            RelayError::UpstreamRejected(_) => Self::NotAnimated(err.to_string()),
            _ => Self::ResolutionFailed(err.to_string()),
        }
    }

    /// Short machine-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::NotAnimated(_) => "not-animated",
            Self::ResolutionFailed(_) => "resolution-failed",
        }
    }
}

fn is_definitive(status: u16) -> bool {
    (400..500).contains(&status) && !matches!(status, 408 | 429)
}

/// Which rendering pipeline serves a work.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Classified {
    /// Animated work: serve a reconstructed GIF.
    Animated(UgoiraMeta),
    /// Still work: proxy one of `pages`.
    Static {
        /// Original-resolution page URLs.
        pages: Vec<String>,
        /// What happened to the animation probe.
        probe: ProbeOutcome,
    },
}

/// Probe for an animation first and fall back to still pages on any failure.
///
/// One attempt each, no retries. A transient probe failure still falls through to the still
/// path; [`ProbeOutcome`] and the logs keep the two cases apart.
#[tracing::instrument(skip(resolver, work), fields(work = %work))]
pub async fn classify(resolver: &dyn Resolver, work: &WorkId) -> RelayResult<Classified> {
    let err = match resolver.resolve_animation(work).await {
        Ok(meta) => {
            tracing::debug!(frames = meta.frames.len(), "classified as animated");
            return Ok(Classified::Animated(meta));
        }
        Err(err) => err,
    };

    let probe = ProbeOutcome::from_error(&err);
    match &probe {
        ProbeOutcome::NotAnimated(_) => {
            tracing::debug!(cause = %err, "animation probe declined, using still pages")
        }
        ProbeOutcome::ResolutionFailed(_) => {
            tracing::warn!(cause = %err, "animation probe failed, falling back to still pages")
        }
    }

    let pages = resolver.resolve_static(work).await?;
    Ok(Classified::Static { pages, probe })
}

#[cfg(test)]
#[path = "../../tests/unit/resolve/classify.rs"]
mod tests;
