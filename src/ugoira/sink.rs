use image::imageops;

use crate::{
    foundation::error::{RelayError, RelayResult},
    ugoira::decode::FrameRaster,
};

/// NeuQuant sampling factor: 1 is slowest/best, 30 fastest. Fixed so output is reproducible.
pub const GIF_QUANTIZE_SPEED: i32 = 10;

/// Configuration provided to a [`FrameSink`] before the first frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SinkConfig {
    /// Canvas width in pixels.
    pub width: u16,
    /// Canvas height in pixels.
    pub height: u16,
    /// Number of frames that will be pushed.
    pub frame_count: usize,
}

/// Sink contract for consuming decoded frames in playback order.
///
/// Ordering contract: `push_frame` is called with strictly increasing indices starting at 0.
pub trait FrameSink {
    /// Called once before any frames are pushed.
    fn begin(&mut self, cfg: SinkConfig) -> RelayResult<()>;
    /// Push one frame with its delay in GIF centiseconds.
    fn push_frame(&mut self, idx: usize, frame: FrameRaster, delay_centis: u16) -> RelayResult<()>;
    /// Called once after the last frame is pushed.
    fn end(&mut self) -> RelayResult<()>;
}

fn encode_err(e: impl std::fmt::Display) -> RelayError {
    RelayError::encode(e.to_string())
}

/// Sink that writes an infinitely looping GIF into memory.
///
/// Frames are anchored at the top-left corner, cropped to the canvas, and disposed to
/// background so no pixels of a previous frame show through.
#[derive(Default)]
pub struct GifSink {
    encoder: Option<gif::Encoder<Vec<u8>>>,
    cfg: Option<SinkConfig>,
    last_idx: Option<usize>,
    pushed: usize,
    out: Option<Vec<u8>>,
}

impl GifSink {
    /// Create an idle sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Finished GIF bytes; available after [`FrameSink::end`].
    pub fn into_bytes(self) -> RelayResult<Vec<u8>> {
        self.out
            .ok_or_else(|| RelayError::encode("gif sink was not finished"))
    }
}

impl FrameSink for GifSink {
    fn begin(&mut self, cfg: SinkConfig) -> RelayResult<()> {
        if cfg.width == 0 || cfg.height == 0 {
            return Err(RelayError::encode("gif canvas width/height must be non-zero"));
        }
        let mut encoder =
            gif::Encoder::new(Vec::new(), cfg.width, cfg.height, &[]).map_err(encode_err)?;
        encoder
            .set_repeat(gif::Repeat::Infinite)
            .map_err(encode_err)?;

        self.encoder = Some(encoder);
        self.cfg = Some(cfg);
        self.last_idx = None;
        self.pushed = 0;
        self.out = None;
        Ok(())
    }

    fn push_frame(&mut self, idx: usize, frame: FrameRaster, delay_centis: u16) -> RelayResult<()> {
        let cfg = self
            .cfg
            .ok_or_else(|| RelayError::encode("gif sink not started"))?;
        if let Some(last) = self.last_idx
            && idx <= last
        {
            return Err(RelayError::encode(format!(
                "frames must be pushed in order (got {idx} after {last})"
            )));
        }
        let encoder = self
            .encoder
            .as_mut()
            .ok_or_else(|| RelayError::encode("gif sink not started"))?;

        let canvas_w = u32::from(cfg.width);
        let canvas_h = u32::from(cfg.height);
        let rgba = if frame.width() > canvas_w || frame.height() > canvas_h {
            let w = frame.width().min(canvas_w);
            let h = frame.height().min(canvas_h);
            imageops::crop_imm(&frame.image, 0, 0, w, h).to_image()
        } else {
            frame.image
        };

        // Both edges fit the canvas, which is u16-sized.
        let (w, h) = (rgba.width() as u16, rgba.height() as u16);
        let mut pixels = rgba.into_raw();
        let mut gif_frame = gif::Frame::from_rgba_speed(w, h, &mut pixels, GIF_QUANTIZE_SPEED);
        gif_frame.delay = delay_centis;
        gif_frame.dispose = gif::DisposalMethod::Background;
        encoder.write_frame(&gif_frame).map_err(encode_err)?;

        self.last_idx = Some(idx);
        self.pushed += 1;
        Ok(())
    }

    fn end(&mut self) -> RelayResult<()> {
        let cfg = self
            .cfg
            .ok_or_else(|| RelayError::encode("gif sink not started"))?;
        if self.pushed != cfg.frame_count {
            return Err(RelayError::encode(format!(
                "expected {} frames, got {}",
                cfg.frame_count, self.pushed
            )));
        }
        let encoder = self
            .encoder
            .take()
            .ok_or_else(|| RelayError::encode("gif sink not started"))?;
        self.out = Some(encoder.into_inner().map_err(encode_err)?);
        Ok(())
    }
}

/// In-memory sink for tests and debugging.
#[derive(Debug, Default)]
pub struct InMemorySink {
    cfg: Option<SinkConfig>,
    frames: Vec<(usize, FrameRaster, u16)>,
    ended: bool,
}

impl InMemorySink {
    /// Create a new in-memory sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the sink configuration captured in `begin`, if any.
    pub fn config(&self) -> Option<SinkConfig> {
        self.cfg
    }

    /// Borrow the captured `(index, frame, delay_centis)` triples.
    pub fn frames(&self) -> &[(usize, FrameRaster, u16)] {
        &self.frames
    }

    /// `true` once `end` has been called.
    pub fn is_ended(&self) -> bool {
        self.ended
    }
}

impl FrameSink for InMemorySink {
    fn begin(&mut self, cfg: SinkConfig) -> RelayResult<()> {
        self.cfg = Some(cfg);
        self.frames.clear();
        self.ended = false;
        Ok(())
    }

    fn push_frame(&mut self, idx: usize, frame: FrameRaster, delay_centis: u16) -> RelayResult<()> {
        self.frames.push((idx, frame, delay_centis));
        Ok(())
    }

    fn end(&mut self) -> RelayResult<()> {
        self.ended = true;
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/ugoira/sink.rs"]
mod tests;
