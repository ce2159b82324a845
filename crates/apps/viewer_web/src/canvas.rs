use foundation::Dimensions;
use formats::PixelBuffer;
use runtime::PaintSurface;
use wasm_bindgen::{Clamped, JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, ImageData};

/// `<canvas>` element painted through `putImageData`.
#[derive(Debug)]
pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
}

impl CanvasSurface {
    pub fn from_canvas_id(id: &str) -> Result<Self, JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let document = window
            .document()
            .ok_or_else(|| JsValue::from_str("no document"))?;
        let canvas = document
            .get_element_by_id(id)
            .ok_or_else(|| JsValue::from_str(&format!("missing {id}")))?
            .dyn_into::<HtmlCanvasElement>()?;
        let ctx = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("2d context unavailable"))?
            .dyn_into::<CanvasRenderingContext2d>()?;
        Ok(Self { canvas, ctx })
    }

    pub fn canvas(&self) -> &HtmlCanvasElement {
        &self.canvas
    }

    /// Size the backing store; resizing clears the canvas.
    pub fn resize(&self, width: u32, height: u32) {
        if self.canvas.width() != width {
            self.canvas.set_width(width);
        }
        if self.canvas.height() != height {
            self.canvas.set_height(height);
        }
    }
}

/// The 2d-canvas operations a whole-surface paint is made of.
trait Backing {
    type Image;

    fn size(&self) -> Dimensions;
    fn set_size(&self, dims: Dimensions);
    fn capture(&self) -> Result<Self::Image, String>;
    fn put(&self, image: &Self::Image) -> Result<(), String>;
}

impl Backing for CanvasSurface {
    type Image = ImageData;

    fn size(&self) -> Dimensions {
        Dimensions::new(self.canvas.width(), self.canvas.height())
    }

    fn set_size(&self, dims: Dimensions) {
        self.resize(dims.width, dims.height);
    }

    fn capture(&self) -> Result<ImageData, String> {
        let dims = self.size();
        self.ctx
            .get_image_data(0.0, 0.0, dims.width as f64, dims.height as f64)
            .map_err(|e| format!("{e:?}"))
    }

    fn put(&self, image: &ImageData) -> Result<(), String> {
        self.ctx
            .put_image_data(image, 0.0, 0.0)
            .map_err(|e| format!("{e:?}"))
    }
}

/// Show `image` at `dims`. On failure the backing keeps its previous size and
/// content.
fn replace<B: Backing>(backing: &B, image: &B::Image, dims: Dimensions) -> Result<(), String> {
    let before = backing.size();
    if before == dims {
        return backing.put(image);
    }
    // Resizing clears the canvas; an empty one has nothing to keep.
    let saved = match before.pixel_count() {
        Some(n) if n > 0 => Some(backing.capture()?),
        _ => None,
    };
    backing.set_size(dims);
    backing.put(image).inspect_err(|_| {
        backing.set_size(before);
        if let Some(saved) = &saved {
            let _ = backing.put(saved);
        }
    })
}

impl PaintSurface for CanvasSurface {
    type Error = String;

    fn paint(&mut self, buffer: &PixelBuffer) -> Result<(), Self::Error> {
        let image = ImageData::new_with_u8_clamped_array_and_sh(
            Clamped(buffer.as_rgba()),
            buffer.width(),
            buffer.height(),
        )
        .map_err(|e| format!("{e:?}"))?;
        replace(self, &image, buffer.dimensions())
    }
}
