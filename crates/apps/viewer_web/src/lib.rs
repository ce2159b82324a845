//! Browser front-end for the panorama viewer.
//!
//! `mount` binds the page's parameter inputs and "Load Panorama" control when
//! they exist; pages without them drive the viewer through the exported
//! functions below. This crate owns the parameter model, the fetch and the
//! canvas.

use console_error_panic_hook::set_once;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::HtmlInputElement;

use foundation::{DefaultParameters, ParamField};
use runtime::{LoadError, LoadMode, LoadingState, ViewerController};
use streaming::PanoramaFetcher;

mod canvas;
mod config;
mod transport;

pub use canvas::CanvasSurface;
pub use config::{ConfigOverrides, ViewerConfig};
pub use transport::GlooTransport;

struct Viewer {
    config: ViewerConfig,
    controller: Rc<RefCell<ViewerController<CanvasSurface>>>,
    fetcher: Rc<PanoramaFetcher<GlooTransport>>,
}

thread_local! {
    static VIEWER: RefCell<Option<Viewer>> = const { RefCell::new(None) };
}

fn with_viewer<R>(f: impl FnOnce(&Viewer) -> R) -> Result<R, JsValue> {
    VIEWER.with(|v| {
        v.borrow()
            .as_ref()
            .map(f)
            .ok_or_else(|| JsValue::from_str("viewer not mounted"))
    })
}

/// Text for the status element.
pub fn status_text(state: LoadingState, error: Option<&LoadError>) -> String {
    match (state, error) {
        (LoadingState::Loading, _) => "Loading panorama...".to_string(),
        (LoadingState::Failed, Some(e)) => format!("Could not load panorama: {e}"),
        (LoadingState::Failed, None) => "Could not load panorama".to_string(),
        (LoadingState::Idle | LoadingState::Ready, _) => String::new(),
    }
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    set_once();
    Ok(())
}

/// Attach the viewer to the page. Missing arguments fall back to
/// [`ViewerConfig::default`].
#[wasm_bindgen]
pub fn mount(
    service_url: Option<String>,
    canvas_id: Option<String>,
    status_id: Option<String>,
    input_prefix: Option<String>,
    trigger_id: Option<String>,
) -> Result<(), JsValue> {
    let config = ViewerConfig::with_overrides(ConfigOverrides {
        service_url,
        canvas_id,
        status_id,
        input_prefix,
        trigger_id,
    });
    let surface = CanvasSurface::from_canvas_id(&config.canvas_id)?;
    let defaults = DefaultParameters::default();
    surface.resize(defaults.values().image_width, defaults.values().image_height);

    let viewer = Viewer {
        controller: Rc::new(RefCell::new(ViewerController::new(defaults, surface))),
        fetcher: Rc::new(PanoramaFetcher::new(
            config.service_url.clone(),
            GlooTransport,
        )),
        config: config.clone(),
    };
    VIEWER.with(|v| *v.borrow_mut() = Some(viewer));
    bind_form(&config)?;
    sync_inputs()?;
    render_status()
}

/// Forward edits of every present `<input>` into the model and wire the
/// trigger to a parameterized load. Missing elements are skipped.
fn bind_form(config: &ViewerConfig) -> Result<(), JsValue> {
    let document = document()?;
    for field in ParamField::ALL {
        let Some(el) = document.get_element_by_id(&config.input_id(field)) else {
            continue;
        };
        let on_input = Closure::wrap(Box::new(move |ev: web_sys::Event| {
            let value = ev
                .target()
                .and_then(|t| t.dyn_into::<HtmlInputElement>().ok())
                .map(|input| input.value());
            if let Some(value) = value {
                // Only fails before mount, which has already happened.
                let _ = with_viewer(|v| v.controller.borrow_mut().set_param(field, value));
            }
        }) as Box<dyn FnMut(web_sys::Event)>);
        el.add_event_listener_with_callback("input", on_input.as_ref().unchecked_ref())?;
        on_input.forget();
    }

    if let Some(trigger) = document.get_element_by_id(&config.trigger_id) {
        let on_click = Closure::wrap(Box::new(move |_ev: web_sys::Event| {
            if let Err(err) = start_load(LoadMode::Parameterized) {
                web_sys::console::warn_1(&err);
            }
        }) as Box<dyn FnMut(web_sys::Event)>);
        trigger.add_event_listener_with_callback("click", on_click.as_ref().unchecked_ref())?;
        on_click.forget();
    }
    Ok(())
}

/// Copy the model's text into the bound inputs.
fn sync_inputs() -> Result<(), JsValue> {
    let values = with_viewer(|v| {
        let c = v.controller.borrow();
        ParamField::ALL.map(|f| (v.config.input_id(f), c.params().get(f).to_string()))
    })?;
    let document = document()?;
    for (id, value) in values {
        if let Some(input) = document
            .get_element_by_id(&id)
            .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
        {
            input.set_value(&value);
        }
    }
    Ok(())
}

fn document() -> Result<web_sys::Document, JsValue> {
    web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| JsValue::from_str("no document"))
}

/// Wire names of the editable fields, in form order.
#[wasm_bindgen]
pub fn parameter_keys() -> js_sys::Array {
    ParamField::ALL
        .into_iter()
        .map(|f| JsValue::from_str(f.key()))
        .collect()
}

#[wasm_bindgen]
pub fn parameter_label(key: &str) -> Result<String, JsValue> {
    ParamField::from_key(key)
        .map(|f| f.label().to_string())
        .ok_or_else(|| JsValue::from_str(&format!("unknown parameter: {key}")))
}

#[wasm_bindgen]
pub fn set_parameter(key: &str, value: &str) -> Result<(), JsValue> {
    with_viewer(|v| v.controller.borrow_mut().set_param_by_key(key, value))?
        .map_err(|e| JsValue::from_str(&e.to_string()))?;
    sync_inputs()
}

#[wasm_bindgen]
pub fn get_parameter(key: &str) -> Result<String, JsValue> {
    let field = ParamField::from_key(key)
        .ok_or_else(|| JsValue::from_str(&format!("unknown parameter: {key}")))?;
    with_viewer(|v| v.controller.borrow().params().get(field).to_string())
}

#[wasm_bindgen]
pub fn reset_parameters() -> Result<(), JsValue> {
    with_viewer(|v| v.controller.borrow_mut().reset_params())?;
    sync_inputs()
}

/// "Load Panorama": fetch the image for the current form values.
///
/// Invalid input is reported synchronously and no request is sent.
#[wasm_bindgen]
pub fn load_panorama() -> Result<(), JsValue> {
    start_load(LoadMode::Parameterized)
}

#[wasm_bindgen]
pub fn load_default_panorama() -> Result<(), JsValue> {
    start_load(LoadMode::DefaultImage)
}

#[wasm_bindgen]
pub fn loading_state() -> Result<String, JsValue> {
    with_viewer(|v| v.controller.borrow().state().as_str().to_string())
}

#[wasm_bindgen]
pub fn last_error() -> Result<Option<String>, JsValue> {
    with_viewer(|v| v.controller.borrow().last_error().map(|e| e.to_string()))
}

fn start_load(mode: LoadMode) -> Result<(), JsValue> {
    let (controller, fetcher, status_id) = with_viewer(|v| {
        (
            v.controller.clone(),
            v.fetcher.clone(),
            v.config.status_id.clone(),
        )
    })?;

    let begun = controller.borrow_mut().begin_load(mode);
    flush_events(&controller);
    let pending = match begun {
        Ok(p) => p,
        Err(e) => {
            let msg = e.to_string();
            write_status(&status_id, "invalid", &msg)?;
            return Err(JsValue::from_str(&msg));
        }
    };
    render_status()?;

    spawn_local(async move {
        let result = fetcher.fetch(&pending.descriptor, pending.dimensions).await;
        controller.borrow_mut().complete_load(pending.id, result);
        flush_events(&controller);
        if let Err(err) = render_status() {
            web_sys::console::error_1(&JsValue::from_str(&format!(
                "status update failed: {:?}",
                err
            )));
        }
    });
    Ok(())
}

fn flush_events(controller: &RefCell<ViewerController<CanvasSurface>>) {
    for event in controller.borrow_mut().drain_events() {
        let id = event.request.map(|r| r.to_string()).unwrap_or_default();
        let line = JsValue::from_str(&format!(
            "panorama {} {}: {}",
            event.kind.as_str(),
            id,
            event.message
        ));
        if event.kind.is_error() {
            web_sys::console::error_1(&line);
        } else {
            web_sys::console::log_1(&line);
        }
    }
}

fn render_status() -> Result<(), JsValue> {
    let (status_id, state, text) = with_viewer(|v| {
        let c = v.controller.borrow();
        c.surface()
            .canvas()
            .set_attribute("data-state", c.state().as_str())?;
        Ok::<_, JsValue>((
            v.config.status_id.clone(),
            c.state(),
            status_text(c.state(), c.last_error()),
        ))
    })??;
    write_status(&status_id, state.as_str(), &text)
}

fn write_status(status_id: &str, state: &str, text: &str) -> Result<(), JsValue> {
    let document = document()?;
    // The status element is optional; the canvas attribute still reflects state.
    if let Some(el) = document.get_element_by_id(status_id) {
        el.set_text_content(Some(text));
        el.set_attribute("data-state", state)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use streaming::FetchError;

    #[test]
    fn status_reports_loading_and_failure() {
        assert_eq!(status_text(LoadingState::Idle, None), "");
        assert_eq!(
            status_text(LoadingState::Loading, None),
            "Loading panorama..."
        );
        let err = LoadError::Fetch(FetchError::Status {
            url: "http://localhost:8080/getImage".to_string(),
            status: 503,
        });
        assert_eq!(
            status_text(LoadingState::Failed, Some(&err)),
            "Could not load panorama: request to http://localhost:8080/getImage returned HTTP 503"
        );
        assert_eq!(status_text(LoadingState::Ready, None), "");
    }
}
