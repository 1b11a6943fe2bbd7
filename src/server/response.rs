use axum::{
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};

use crate::{foundation::error::RelayError, server::html::Locale};

/// Non-standard status recorded for requests the client abandoned (nginx's 499).
pub const CLIENT_CLOSED_REQUEST: u16 = 499;

/// HTTP status for a pipeline error.
///
/// [`RelayError::Cancelled`] maps to [`CLIENT_CLOSED_REQUEST`]; the client is gone, so the
/// status only shows up in logs.
pub fn status_of(err: &RelayError) -> StatusCode {
    match err {
        RelayError::InvalidInput { .. } => StatusCode::BAD_REQUEST,
        RelayError::PageOutOfRange { .. } => StatusCode::NOT_FOUND,
        RelayError::UpstreamStatus { .. }
        | RelayError::UpstreamRejected(_)
        | RelayError::UpstreamUnavailable(_)
        | RelayError::MalformedBundle(_)
        | RelayError::UnsupportedFrame(_) => StatusCode::BAD_GATEWAY,
        RelayError::LimitExceeded(_) => StatusCode::UNPROCESSABLE_ENTITY,
        RelayError::Cancelled => StatusCode::from_u16(CLIENT_CLOSED_REQUEST)
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        RelayError::Encode(_) | RelayError::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// A failed request: the error plus the locale its message is rendered in.
#[derive(Debug)]
pub struct Failure {
    /// What went wrong.
    pub err: RelayError,
    /// Presentation language.
    pub locale: Locale,
}

impl Failure {
    /// Pair `err` with `locale`.
    pub fn new(err: RelayError, locale: Locale) -> Self {
        Self { err, locale }
    }
}

impl IntoResponse for Failure {
    fn into_response(self) -> Response {
        let status = status_of(&self.err);
        match &self.err {
            RelayError::Cancelled => tracing::debug!(%status, "request abandoned by client"),
            err if status.is_server_error() => {
                tracing::error!(%status, error = %err, "request failed")
            }
            err if err.is_upstream() => tracing::warn!(%status, error = %err, "upstream failure"),
            err => tracing::debug!(%status, error = %err, "rejected request"),
        }
        (
            status,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            self.locale.error_message(&self.err),
        )
            .into_response()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/server/response.rs"]
mod tests;
