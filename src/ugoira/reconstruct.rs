use crate::{
    foundation::{
        config::Limits,
        error::{RelayError, RelayResult},
        ids::WorkId,
        stop::Stop,
    },
    ugoira::{
        bundle::FrameBundle,
        decode::{FrameRaster, MAX_FRAME_EDGE, decode_frame},
        frames::FrameDescriptor,
        sink::{FrameSink, GifSink, SinkConfig},
        timing::delay_ms_to_centis,
    },
};

/// MIME type of reconstructed animations.
pub const GIF_CONTENT_TYPE: &str = "image/gif";
/// File extension of reconstructed animations.
pub const GIF_EXTENSION: &str = "gif";

/// Decoded frames plus their delays, index-aligned and non-empty.
#[derive(Clone, Debug)]
pub struct AnimationSpec {
    rasters: Vec<FrameRaster>,
    delays_ms: Vec<u32>,
}

impl AnimationSpec {
    /// Pair rasters with delays. Fails unless both are non-empty and the same length.
    pub fn new(rasters: Vec<FrameRaster>, delays_ms: Vec<u32>) -> RelayResult<Self> {
        if rasters.is_empty() {
            return Err(RelayError::malformed_bundle("animation has no frames"));
        }
        if rasters.len() != delays_ms.len() {
            return Err(RelayError::malformed_bundle(format!(
                "{} frames but {} delays",
                rasters.len(),
                delays_ms.len()
            )));
        }
        Ok(Self { rasters, delays_ms })
    }

    /// Number of frames.
    pub fn len(&self) -> usize {
        self.rasters.len()
    }

    /// Always `false`; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.rasters.is_empty()
    }

    /// Canvas size, taken from the first frame.
    pub fn canvas(&self) -> (u32, u32) {
        let first = &self.rasters[0];
        (first.width(), first.height())
    }

    /// Borrow the rasters.
    pub fn rasters(&self) -> &[FrameRaster] {
        &self.rasters
    }

    /// Borrow the delays in milliseconds.
    pub fn delays_ms(&self) -> &[u32] {
        &self.delays_ms
    }
}

/// A fully encoded animation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnimatedImage {
    /// Encoded GIF bytes.
    pub bytes: Vec<u8>,
    /// Canvas width.
    pub width: u16,
    /// Canvas height.
    pub height: u16,
    /// Number of frames.
    pub frame_count: usize,
}

impl AnimatedImage {
    /// MIME type of [`AnimatedImage::bytes`].
    pub fn content_type(&self) -> &'static str {
        GIF_CONTENT_TYPE
    }

    /// Download file name, `<work>.gif`.
    pub fn file_name(&self, work: &WorkId) -> String {
        format!("{work}.{GIF_EXTENSION}")
    }
}

/// Turn a zip bundle plus frame list into one looping GIF.
///
/// All-or-nothing: a missing entry or an undecodable frame fails the whole call. Identical inputs
/// produce identical bytes.
#[tracing::instrument(skip_all, fields(frames = frames.len(), bundle_len = bundle.len()))]
pub fn reconstruct(
    bundle: &[u8],
    frames: &[FrameDescriptor],
    limits: &Limits,
    stop: &dyn Stop,
) -> RelayResult<AnimatedImage> {
    let mut sink = GifSink::new();
    let cfg = reconstruct_into(bundle, frames, limits, stop, &mut sink)?;
    let bytes = sink.into_bytes()?;
    tracing::debug!(
        width = cfg.width,
        height = cfg.height,
        gif_len = bytes.len(),
        "reconstructed animation"
    );
    Ok(AnimatedImage {
        bytes,
        width: cfg.width,
        height: cfg.height,
        frame_count: cfg.frame_count,
    })
}

/// Same as [`reconstruct`] but feeds an arbitrary [`FrameSink`].
pub fn reconstruct_into(
    bundle: &[u8],
    frames: &[FrameDescriptor],
    limits: &Limits,
    stop: &dyn Stop,
    sink: &mut dyn FrameSink,
) -> RelayResult<SinkConfig> {
    limits.check_frame_count(frames.len())?;
    let mut archive = FrameBundle::open(bundle, limits.max_entry_bytes)?;
    let spec = decode_all(&mut archive, frames, limits, stop)?;
    encode(spec, sink, stop)
}

/// Extract and decode every frame in descriptor order.
pub fn decode_all(
    archive: &mut FrameBundle<'_>,
    frames: &[FrameDescriptor],
    limits: &Limits,
    stop: &dyn Stop,
) -> RelayResult<AnimationSpec> {
    let mut rasters = Vec::with_capacity(frames.len());
    for (idx, desc) in frames.iter().enumerate() {
        stop.check()?;
        let raw = archive.extract(&desc.name)?;
        let raster = decode_frame(&desc.name, &raw)?;
        if idx == 0 {
            let (w, h) = (raster.width(), raster.height());
            if w == 0 || h == 0 || w > MAX_FRAME_EDGE || h > MAX_FRAME_EDGE {
                return Err(RelayError::limit(format!(
                    "canvas {w}x{h} is outside 1..={MAX_FRAME_EDGE}"
                )));
            }
            limits.check_canvas(w, h, frames.len())?;
        }
        rasters.push(raster);
    }
    AnimationSpec::new(rasters, frames.iter().map(|f| f.delay_ms).collect())
}

fn encode(spec: AnimationSpec, sink: &mut dyn FrameSink, stop: &dyn Stop) -> RelayResult<SinkConfig> {
    let (w, h) = spec.canvas();
    let cfg = SinkConfig {
        // Checked against MAX_FRAME_EDGE while decoding.
        width: w as u16,
        height: h as u16,
        frame_count: spec.len(),
    };
    sink.begin(cfg)?;
    for (idx, (raster, delay_ms)) in spec.rasters.into_iter().zip(spec.delays_ms).enumerate() {
        stop.check()?;
        sink.push_frame(idx, raster, delay_ms_to_centis(delay_ms))?;
    }
    sink.end()?;
    Ok(cfg)
}

#[cfg(test)]
#[path = "../../tests/unit/ugoira/reconstruct.rs"]
mod tests;
