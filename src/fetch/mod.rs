//! Outbound binary fetches.

pub(crate) mod allowlist;
pub(crate) mod http;
