use foundation::Dimensions;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    SizeMismatch {
        dimensions: Dimensions,
        expected: Option<usize>,
        actual: usize,
    },
}

impl std::fmt::Display for DecodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DecodeError::SizeMismatch {
                dimensions,
                expected: Some(expected),
                actual,
            } => write!(
                f,
                "pixel buffer for {dimensions} needs {expected} bytes, got {actual}"
            ),
            DecodeError::SizeMismatch {
                dimensions,
                expected: None,
                actual,
            } => write!(
                f,
                "pixel buffer for {dimensions} is too large to hold ({actual} bytes given)"
            ),
        }
    }
}

impl std::error::Error for DecodeError {}

/// Immutable RGBA8 image, row-major with the origin at the top-left.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    dimensions: Dimensions,
    bytes: Vec<u8>,
}

impl PixelBuffer {
    /// Take ownership of `raw` as a `width x height` RGBA image.
    ///
    /// Bytes are kept verbatim: no colour conversion, no scaling.
    pub fn decode(raw: Vec<u8>, dimensions: Dimensions) -> Result<Self, DecodeError> {
        let expected = dimensions.rgba_len();
        if expected != Some(raw.len()) {
            return Err(DecodeError::SizeMismatch {
                dimensions,
                expected,
                actual: raw.len(),
            });
        }
        Ok(Self {
            dimensions,
            bytes: raw,
        })
    }

    pub fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    pub fn width(&self) -> u32 {
        self.dimensions.width
    }

    pub fn height(&self) -> u32 {
        self.dimensions.height
    }

    pub fn as_rgba(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_rgba(self) -> Vec<u8> {
        self.bytes
    }

    /// Channels of the pixel at `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width() || y >= self.height() {
            return None;
        }
        let offset = (y as usize * self.width() as usize + x as usize) * 4;
        let p = &self.bytes[offset..offset + 4];
        Some([p[0], p[1], p[2], p[3]])
    }

    /// One slice of `width * 4` bytes per row, top row first.
    pub fn rows(&self) -> impl Iterator<Item = &[u8]> {
        // Zero-width buffers are empty; `chunks_exact(0)` would panic.
        let stride = (self.width() as usize * 4).max(1);
        self.bytes.chunks_exact(stride)
    }
}

/// Decode a flat byte slice into a `width x height` buffer.
pub fn decode(raw: &[u8], width: u32, height: u32) -> Result<PixelBuffer, DecodeError> {
    PixelBuffer::decode(raw.to_vec(), Dimensions::new(width, height))
}
