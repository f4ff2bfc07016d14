/// Decoded image, tightly packed RGBA8, row-major, top row first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Bitmap {
    /// Wraps an RGBA8 pixel buffer.
    ///
    /// Returns `None` if `pixels.len() != width * height * 4`.
    pub fn from_rgba8(width: u32, height: u32, pixels: Vec<u8>) -> Option<Self> {
        let expected = (width as usize)
            .checked_mul(height as usize)?
            .checked_mul(4)?;
        (pixels.len() == expected).then_some(Self { width, height, pixels })
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Bytes per row (no padding).
    #[inline]
    pub fn stride(&self) -> u32 {
        self.width * 4
    }

    #[inline]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }
}

/// Decodes an encoded image (PNG/JPEG) and converts it to RGBA8.
///
/// Channel values are kept as stored; no color management happens here.
pub fn decode_rgba8(bytes: &[u8]) -> Result<Bitmap, image::ImageError> {
    let rgba = image::load_from_memory(bytes)?.into_rgba8();
    let (width, height) = rgba.dimensions();
    Ok(Bitmap {
        width,
        height,
        pixels: rgba.into_raw(),
    })
}
