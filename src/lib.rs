//! Streaming image relay for pixiv artwork.
//!
//! Still images are relayed chunk by chunk from upstream without being buffered. Animated works
//! (ugoira) arrive as a zip bundle of frames plus per-frame delays and are rebuilt into a looping
//! GIF:
//!
//! - [`classify`] a [`WorkId`] as animated or still through a [`Resolver`]
//! - [`proxy_still`] one page through a [`Fetcher`]
//! - [`reconstruct`] a frame bundle into an [`AnimatedImage`], or stream frames into any
//!   [`FrameSink`] with [`reconstruct_into`]
//!
//! [`router`] wires all of it into an axum application.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod fetch;
mod foundation;
mod pipeline;
mod proxy;
mod resolve;
mod server;
mod ugoira;

#[cfg(test)]
#[path = "../tests/unit/support.rs"]
mod test_support;

pub use crate::fetch::allowlist::OutboundAllowlist;
pub use crate::fetch::http::{ByteStream, Fetcher, HttpFetcher, UpstreamBody, collect_limited};
pub use crate::foundation::config::{
    DEFAULT_API_BASE, DEFAULT_CHUNK_SIZE, DEFAULT_USER_AGENT, Limits, RelayConfig,
};
pub use crate::foundation::error::{InputField, RelayError, RelayResult};
pub use crate::foundation::ids::{PageIndex, WorkId};
pub use crate::foundation::stop::{RaiseOnDrop, Stop, StopFlag, Unstoppable};
pub use crate::pipeline::{serve_animation, serve_animation_meta, serve_still};
pub use crate::proxy::stream::{FALLBACK_CONTENT_TYPE, ProxiedImage, proxy_still, rechunk};
pub use crate::resolve::classify::{Classified, ProbeOutcome, classify};
pub use crate::resolve::pixiv::{PixivResolver, parse_pages, parse_ugoira_meta};
pub use crate::resolve::resolver::Resolver;
pub use crate::server::app::{AppState, DEFAULT_MAX_CONCURRENT, router};
pub use crate::server::handlers::PROBE_HEADER;
pub use crate::server::html::{Locale, Strings};
pub use crate::server::response::{Failure, status_of};
pub use crate::ugoira::bundle::FrameBundle;
pub use crate::ugoira::decode::{FrameRaster, MAX_FRAME_EDGE, decode_frame};
pub use crate::ugoira::frames::{FrameDescriptor, UgoiraMeta};
pub use crate::ugoira::reconstruct::{
    AnimatedImage, AnimationSpec, GIF_CONTENT_TYPE, GIF_EXTENSION, decode_all, reconstruct,
    reconstruct_into,
};
pub use crate::ugoira::sink::{FrameSink, GifSink, InMemorySink, SinkConfig};
pub use crate::ugoira::timing::{GIF_TICK_MS, centis_to_ms, delay_ms_to_centis};
