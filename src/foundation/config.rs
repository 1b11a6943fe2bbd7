use std::{fmt, time::Duration};

use crate::{
    fetch::allowlist::OutboundAllowlist,
    foundation::error::{RelayError, RelayResult},
};

/// User agent sent upstream unless overridden.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0";
/// Base URL of the pixiv ajax API.
pub const DEFAULT_API_BASE: &str = "https://www.pixiv.net";
/// Largest chunk relayed to the client in one write.
pub const DEFAULT_CHUNK_SIZE: usize = 8192;

/// Caps applied before and during reconstruction so a single request cannot exhaust memory.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Limits {
    /// Maximum number of frames in one animation.
    pub max_frames: usize,
    /// Maximum `width * height * frames` held decoded at once.
    pub max_total_pixels: u64,
    /// Maximum size of a fetched frame bundle.
    pub max_bundle_bytes: u64,
    /// Maximum uncompressed size of one bundle entry.
    pub max_entry_bytes: u64,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_frames: 1024,
            max_total_pixels: 400_000_000,
            max_bundle_bytes: 256 * 1024 * 1024,
            max_entry_bytes: 64 * 1024 * 1024,
        }
    }
}

impl Limits {
    /// Set the maximum frame count.
    pub fn with_max_frames(mut self, max: usize) -> Self {
        self.max_frames = max;
        self
    }

    /// Set the maximum decoded pixel budget.
    pub fn with_max_total_pixels(mut self, max: u64) -> Self {
        self.max_total_pixels = max;
        self
    }

    /// Set the maximum bundle size in bytes.
    pub fn with_max_bundle_bytes(mut self, max: u64) -> Self {
        self.max_bundle_bytes = max;
        self
    }

    /// Set the maximum size of a single bundle entry in bytes.
    pub fn with_max_entry_bytes(mut self, max: u64) -> Self {
        self.max_entry_bytes = max;
        self
    }

    /// Reject empty animations and animations with too many frames.
    pub fn check_frame_count(&self, frames: usize) -> RelayResult<()> {
        if frames == 0 {
            return Err(RelayError::malformed_bundle("animation lists no frames"));
        }
        if frames > self.max_frames {
            return Err(RelayError::limit(format!(
                "{frames} frames exceeds the limit of {}",
                self.max_frames
            )));
        }
        Ok(())
    }

    /// Reject canvases whose full decoded frame set would exceed the pixel budget.
    pub fn check_canvas(&self, width: u32, height: u32, frames: usize) -> RelayResult<()> {
        let total = u64::from(width)
            .saturating_mul(u64::from(height))
            .saturating_mul(frames as u64);
        if total > self.max_total_pixels {
            return Err(RelayError::limit(format!(
                "{width}x{height} x {frames} frames exceeds the pixel budget of {}",
                self.max_total_pixels
            )));
        }
        Ok(())
    }
}

/// Everything the upstream-facing components need, injected at construction time.
#[derive(Clone)]
pub struct RelayConfig {
    /// `User-Agent` header for every outbound request.
    pub user_agent: String,
    /// Session cookie sent to the metadata API.
    pub cookie: String,
    /// Base URL of the metadata API.
    pub api_base: String,
    /// TCP connect timeout.
    pub connect_timeout: Duration,
    /// Total timeout for metadata requests and bundle downloads.
    pub request_timeout: Duration,
    /// Idle read timeout for streamed still images.
    pub stream_read_timeout: Duration,
    /// Largest chunk relayed to the client in one write.
    pub chunk_size: usize,
    /// Hosts the fetcher may contact for resolved image and bundle URLs.
    pub allowlist: OutboundAllowlist,
    /// Reconstruction limits.
    pub limits: Limits,
}

impl RelayConfig {
    /// Defaults for everything except the session cookie.
    pub fn new(cookie: impl Into<String>) -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            cookie: cookie.into(),
            api_base: DEFAULT_API_BASE.to_owned(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            stream_read_timeout: Duration::from_secs(120),
            chunk_size: DEFAULT_CHUNK_SIZE,
            allowlist: OutboundAllowlist::pixiv(),
            limits: Limits::default(),
        }
    }

    /// Override the user agent.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Override the metadata API base URL.
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_owned();
        self
    }

    /// Override the metadata/bundle request timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Override the streamed still-image read timeout.
    pub fn with_stream_read_timeout(mut self, timeout: Duration) -> Self {
        self.stream_read_timeout = timeout;
        self
    }

    /// Override the outbound allowlist.
    pub fn with_allowlist(mut self, allowlist: OutboundAllowlist) -> Self {
        self.allowlist = allowlist;
        self
    }

    /// Override reconstruction limits.
    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }
}

impl fmt::Debug for RelayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelayConfig")
            .field("user_agent", &self.user_agent)
            .field("cookie_len", &self.cookie.len())
            .field("api_base", &self.api_base)
            .field("connect_timeout", &self.connect_timeout)
            .field("request_timeout", &self.request_timeout)
            .field("stream_read_timeout", &self.stream_read_timeout)
            .field("chunk_size", &self.chunk_size)
            .field("allowlist", &self.allowlist)
            .field("limits", &self.limits)
            .finish()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/config.rs"]
mod tests;
