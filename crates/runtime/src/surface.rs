use formats::PixelBuffer;
use foundation::Dimensions;

/// A 2D drawing target that can show one decoded panorama.
pub trait PaintSurface {
    type Error: std::fmt::Display;

    /// Replace the whole visible content with `buffer`, anchored at (0, 0).
    ///
    /// Implementations must not leave a partially painted frame behind when
    /// they return an error.
    fn paint(&mut self, buffer: &PixelBuffer) -> Result<(), Self::Error>;
}

/// In-memory RGBA surface. Starts blank (transparent black).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemorySurface {
    dimensions: Dimensions,
    pixels: Vec<u8>,
    paints: u64,
}

impl MemorySurface {
    pub fn new(dimensions: Dimensions) -> Self {
        Self {
            dimensions,
            pixels: vec![0; dimensions.rgba_len().unwrap_or(0)],
            paints: 0,
        }
    }

    pub fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    pub fn as_rgba(&self) -> &[u8] {
        &self.pixels
    }

    /// Number of successful paints so far.
    pub fn paint_count(&self) -> u64 {
        self.paints
    }

    pub fn is_blank(&self) -> bool {
        self.paints == 0
    }
}

impl PaintSurface for MemorySurface {
    type Error = std::convert::Infallible;

    fn paint(&mut self, buffer: &PixelBuffer) -> Result<(), Self::Error> {
        // The surface follows the buffer size, like a canvas resized before
        // `putImageData`.
        self.dimensions = buffer.dimensions();
        self.pixels.clear();
        self.pixels.extend_from_slice(buffer.as_rgba());
        self.paints += 1;
        Ok(())
    }
}
