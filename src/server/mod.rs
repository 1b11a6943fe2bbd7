//! axum HTTP surface: routes, handlers, error mapping and localized HTML.

pub(crate) mod app;
pub(crate) mod handlers;
pub(crate) mod html;
pub(crate) mod response;
