//! Load orchestration: parameters in, painted panorama out.
//!
//! The controller is split into a synchronous `begin_load` / `complete_load`
//! pair so no borrow has to be held across the network await. Every issued
//! request gets a fresh [`RequestId`]; only the completion matching the most
//! recently issued id may touch the state or the surface.

use std::cell::RefCell;

use formats::{DecodeError, PixelBuffer};
use foundation::{
    DefaultParameters, Dimensions, InvalidParameterError, ParamField, ParameterModel, RequestId,
    RequestSequence,
};
use streaming::{
    FetchError, FetchFailure, HttpTransport, MalformedResponseError, PanoramaFetcher,
    RequestDescriptor,
};

use crate::event_bus::{Event, EventBus, EventKind};
use crate::surface::PaintSurface;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum LoadingState {
    Idle,
    Loading,
    Ready,
    Failed,
}

impl LoadingState {
    pub fn as_str(self) -> &'static str {
        match self {
            LoadingState::Idle => "idle",
            LoadingState::Loading => "loading",
            LoadingState::Ready => "ready",
            LoadingState::Failed => "failed",
        }
    }
}

/// Which endpoint a trigger targets.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum LoadMode {
    /// The service's built-in viewpoint, painted at the model's image size.
    DefaultImage,
    Parameterized,
}

/// A request that has been issued and awaits its fetch result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingLoad {
    pub id: RequestId,
    pub descriptor: RequestDescriptor,
    pub dimensions: Dimensions,
}

/// Why a load attempt ended in [`LoadingState::Failed`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    Fetch(FetchError),
    Malformed(MalformedResponseError),
    Decode(DecodeError),
    Paint(String),
}

impl std::fmt::Display for LoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadError::Fetch(e) => write!(f, "{e}"),
            LoadError::Malformed(e) => write!(f, "malformed response: {e}"),
            LoadError::Decode(e) => write!(f, "decode failed: {e}"),
            LoadError::Paint(msg) => write!(f, "paint failed: {msg}"),
        }
    }
}

impl std::error::Error for LoadError {}

impl From<FetchFailure> for LoadError {
    fn from(e: FetchFailure) -> Self {
        match e {
            FetchFailure::Fetch(e) => LoadError::Fetch(e),
            FetchFailure::Malformed(e) => LoadError::Malformed(e),
        }
    }
}

impl From<DecodeError> for LoadError {
    fn from(e: DecodeError) -> Self {
        LoadError::Decode(e)
    }
}

/// What happened to a fetch result handed to [`ViewerController::complete_load`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Completion {
    Painted,
    Failed,
    /// A newer request had been issued; the result was dropped.
    Stale,
}

#[derive(Debug)]
pub struct ViewerController<S> {
    defaults: DefaultParameters,
    params: ParameterModel,
    state: LoadingState,
    sequence: RequestSequence,
    awaiting: Option<(RequestId, Dimensions)>,
    last_error: Option<LoadError>,
    current: Option<PixelBuffer>,
    surface: S,
    events: EventBus,
}

impl<S: PaintSurface> ViewerController<S> {
    pub fn new(defaults: DefaultParameters, surface: S) -> Self {
        Self {
            params: ParameterModel::new(&defaults),
            defaults,
            state: LoadingState::Idle,
            sequence: RequestSequence::new(),
            awaiting: None,
            last_error: None,
            current: None,
            surface,
            events: EventBus::new(),
        }
    }

    pub fn params(&self) -> &ParameterModel {
        &self.params
    }

    pub fn set_param(&mut self, field: ParamField, raw: impl Into<String>) {
        self.params.set(field, raw);
    }

    pub fn set_param_by_key(
        &mut self,
        key: &str,
        raw: impl Into<String>,
    ) -> Result<ParamField, InvalidParameterError> {
        self.params.set_by_key(key, raw)
    }

    pub fn reset_params(&mut self) {
        self.params.reset(&self.defaults);
    }

    pub fn state(&self) -> LoadingState {
        self.state
    }

    pub fn is_loading(&self) -> bool {
        self.state == LoadingState::Loading
    }

    /// Error of the most recent failed attempt, cleared by the next success.
    pub fn last_error(&self) -> Option<&LoadError> {
        self.last_error.as_ref()
    }

    /// Buffer currently shown on the surface.
    pub fn current(&self) -> Option<&PixelBuffer> {
        self.current.as_ref()
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn events(&self) -> &[Event] {
        self.events.events()
    }

    pub fn drain_events(&mut self) -> Vec<Event> {
        self.events.drain()
    }

    /// Validate the model, encode a request and enter `Loading`.
    ///
    /// An invalid model is rejected before any id is issued and leaves the
    /// state untouched. The default image only needs a valid image size.
    pub fn begin_load(&mut self, mode: LoadMode) -> Result<PendingLoad, InvalidParameterError> {
        let prepared = match mode {
            LoadMode::DefaultImage => self
                .params
                .dimensions()
                .map(|dims| (streaming::default_image(), dims)),
            LoadMode::Parameterized => self
                .params
                .snapshot()
                .map(|snap| (streaming::encode(&snap), snap.dimensions())),
        };
        let (descriptor, dimensions) = match prepared {
            Ok(p) => p,
            Err(e) => {
                self.events.emit(None, EventKind::Rejected, e.to_string());
                return Err(e);
            }
        };
        let id = self.sequence.next_id();

        self.awaiting = Some((id, dimensions));
        self.state = LoadingState::Loading;
        self.events
            .emit(Some(id), EventKind::Issued, descriptor.path_and_query());

        Ok(PendingLoad {
            id,
            descriptor,
            dimensions,
        })
    }

    /// Apply the fetch result for request `id`.
    pub fn complete_load(
        &mut self,
        id: RequestId,
        result: Result<Vec<u8>, FetchFailure>,
    ) -> Completion {
        let dimensions = match self.awaiting {
            Some((latest, dims)) if latest == id => dims,
            _ => {
                let latest = self.sequence.latest().map(|l| l.to_string());
                self.events.emit(
                    Some(id),
                    EventKind::Stale,
                    format!("superseded by {}", latest.unwrap_or_default()),
                );
                return Completion::Stale;
            }
        };
        self.awaiting = None;

        let painted = result
            .map_err(LoadError::from)
            .and_then(|bytes| Ok(PixelBuffer::decode(bytes, dimensions)?))
            .and_then(|buffer| {
                self.surface
                    .paint(&buffer)
                    .map_err(|e| LoadError::Paint(e.to_string()))?;
                Ok(buffer)
            });

        match painted {
            Ok(buffer) => {
                self.events
                    .emit(Some(id), EventKind::Painted, format!("{dimensions}"));
                self.current = Some(buffer);
                self.last_error = None;
                self.state = LoadingState::Ready;
                Completion::Painted
            }
            Err(e) => {
                self.events.emit(Some(id), EventKind::Failed, e.to_string());
                self.last_error = Some(e);
                self.state = LoadingState::Failed;
                Completion::Failed
            }
        }
    }
}

/// Run one trigger-fetch-complete cycle.
///
/// The controller is only borrowed around the synchronous steps, so several
/// of these may be in flight on a single-threaded executor.
pub async fn drive_load<S, T>(
    controller: &RefCell<ViewerController<S>>,
    fetcher: &PanoramaFetcher<T>,
    mode: LoadMode,
) -> Result<Completion, InvalidParameterError>
where
    S: PaintSurface,
    T: HttpTransport,
{
    let pending = controller.borrow_mut().begin_load(mode)?;
    let result = fetcher.fetch(&pending.descriptor, pending.dimensions).await;
    Ok(controller.borrow_mut().complete_load(pending.id, result))
}
