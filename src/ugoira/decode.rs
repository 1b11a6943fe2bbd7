use std::io::Cursor;

use image::{ImageReader, RgbaImage};

use crate::foundation::error::{RelayError, RelayResult};

/// Largest frame edge accepted; GIF stores dimensions as `u16`.
pub const MAX_FRAME_EDGE: u32 = u16::MAX as u32;

/// One decoded frame, straight-alpha RGBA8.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRaster {
    /// Bundle entry the frame came from.
    pub name: String,
    /// Decoded pixels.
    pub image: RgbaImage,
}

impl FrameRaster {
    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.image.height()
    }
}

/// Decode encoded image bytes (format sniffed from content) and convert to RGBA8.
///
/// Sources without alpha gain an opaque alpha channel so every frame shares one color model.
pub fn decode_frame(name: &str, bytes: &[u8]) -> RelayResult<FrameRaster> {
    let unsupported = |e: &dyn std::fmt::Display| {
        RelayError::unsupported_frame(format!("decode '{name}': {e}"))
    };

    let mut reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| unsupported(&e))?;
    let mut limits = image::Limits::default();
    limits.max_image_width = Some(MAX_FRAME_EDGE);
    limits.max_image_height = Some(MAX_FRAME_EDGE);
    reader.limits(limits);

    let dyn_img = reader.decode().map_err(|e| unsupported(&e))?;
    Ok(FrameRaster {
        name: name.to_owned(),
        image: dyn_img.to_rgba8(),
    })
}

#[cfg(test)]
#[path = "../../tests/unit/ugoira/decode.rs"]
mod tests;
