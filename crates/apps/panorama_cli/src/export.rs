use std::path::Path;

use image::RgbaImage;
use runtime::MemorySurface;

#[derive(Debug)]
pub enum ExportError {
    Size { width: u32, height: u32, len: usize },
    Image(image::ImageError),
}

impl std::fmt::Display for ExportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportError::Size { width, height, len } => {
                write!(f, "surface {width}x{height} does not match its {len} bytes")
            }
            ExportError::Image(e) => write!(f, "image write failed: {e}"),
        }
    }
}

impl std::error::Error for ExportError {}

/// Save what the surface currently shows; the format follows the extension.
pub fn write_surface(surface: &MemorySurface, path: &Path) -> Result<(), ExportError> {
    let dims = surface.dimensions();
    let img = RgbaImage::from_raw(dims.width, dims.height, surface.as_rgba().to_vec()).ok_or(
        ExportError::Size {
            width: dims.width,
            height: dims.height,
            len: surface.as_rgba().len(),
        },
    )?;
    img.save(path).map_err(ExportError::Image)
}
