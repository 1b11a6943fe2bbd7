//! Ugoira reconstruction: zip bundle of frames plus timings in, looping GIF out.
//!
//! 1. **Extract**: look up each descriptor's entry in the bundle ([`bundle`])
//! 2. **Decode**: every entry to RGBA8, in descriptor order ([`decode`])
//! 3. **Encode**: push frames with centisecond delays into a [`sink::FrameSink`] ([`sink`])
//!
//! Decoding finishes for every frame before the first one is encoded, so a bad frame anywhere
//! in the list leaves no partial output behind.

pub(crate) mod bundle;
pub(crate) mod decode;
pub(crate) mod frames;
pub(crate) mod reconstruct;
pub(crate) mod sink;
pub(crate) mod timing;
