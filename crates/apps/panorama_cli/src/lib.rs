//! Command-line panorama client: same pipeline as the browser viewer, painted
//! into memory and saved as an image file.

use std::cell::RefCell;
use std::env;
use std::path::PathBuf;

use clap::Parser;
use foundation::{DefaultParameters, Dimensions, ParamField, presets};
use runtime::{Completion, EventKind, LoadMode, MemorySurface, ViewerController, drive_load};
use streaming::PanoramaFetcher;
use tracing::{debug, error, info, warn};

pub mod export;
pub mod transport;

pub use transport::ReqwestTransport;

pub const DEFAULT_ENDPOINT: &str = "http://localhost:8080";

#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Fetch a rendered panorama and save it as an image")]
pub struct Args {
    /// Base URL of the rendering service (default: $PANORAMA_ENDPOINT, then http://localhost:8080)
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Start from a predefined viewpoint (alpes-du-jura, niesen)
    #[arg(long)]
    pub preset: Option<String>,

    #[command(flatten)]
    pub params: ParamArgs,

    /// Edit one parameter by its wire name, e.g. --set fieldOfView=45.
    /// Applied after the typed options above.
    #[arg(long = "set", value_name = "KEY=VALUE")]
    pub overrides: Vec<String>,

    /// Ask for the service's default image instead of computing one
    #[arg(long)]
    pub default_image: bool,

    /// Output file; the extension picks the format
    #[arg(long, default_value = "panorama.png")]
    pub out: PathBuf,
}

/// One option per viewpoint parameter. Unset options keep the preset's value;
/// values are checked by the parameter model, not by clap.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct ParamArgs {
    /// Longitude in 1/10000 degree (default 68087)
    #[arg(long, allow_hyphen_values = true)]
    pub longitude: Option<String>,
    /// Latitude in 1/10000 degree (default 470085)
    #[arg(long, allow_hyphen_values = true)]
    pub latitude: Option<String>,
    /// Observer elevation in meters (default 1380)
    #[arg(long, allow_hyphen_values = true)]
    pub elevation: Option<String>,
    /// View direction in degrees (default 162)
    #[arg(long, allow_hyphen_values = true)]
    pub azimuth: Option<String>,
    /// Horizontal field of view in degrees (default 27)
    #[arg(long, allow_hyphen_values = true)]
    pub field_of_view: Option<String>,
    /// Visibility limit in kilometers (default 300)
    #[arg(long, allow_hyphen_values = true)]
    pub max_distance: Option<String>,
    /// Image width in pixels (default 1080)
    #[arg(long, allow_hyphen_values = true)]
    pub image_width: Option<String>,
    /// Image height in pixels (default 480)
    #[arg(long, allow_hyphen_values = true)]
    pub image_height: Option<String>,
    /// Supersampling exponent (default 0)
    #[arg(long, allow_hyphen_values = true)]
    pub sampling_exponent: Option<String>,
}

impl ParamArgs {
    /// Options given on the command line, in wire order.
    pub fn values(&self) -> Vec<(ParamField, &str)> {
        let all = [
            (ParamField::Longitude, &self.longitude),
            (ParamField::Latitude, &self.latitude),
            (ParamField::Elevation, &self.elevation),
            (ParamField::Azimuth, &self.azimuth),
            (ParamField::FieldOfView, &self.field_of_view),
            (ParamField::MaxDistance, &self.max_distance),
            (ParamField::ImageWidth, &self.image_width),
            (ParamField::ImageHeight, &self.image_height),
            (ParamField::SamplingExponent, &self.sampling_exponent),
        ];
        all.into_iter()
            .filter_map(|(field, value)| value.as_deref().map(|v| (field, v)))
            .collect()
    }
}

impl Args {
    pub fn endpoint(&self) -> String {
        self.endpoint.clone().unwrap_or_else(|| {
            env::var("PANORAMA_ENDPOINT").unwrap_or_else(|_| DEFAULT_ENDPOINT.to_string())
        })
    }

    pub fn defaults(&self) -> Result<DefaultParameters, String> {
        match &self.preset {
            Some(name) => presets::find(name)
                .map(DefaultParameters::new)
                .ok_or_else(|| format!("unknown preset: {name}")),
            None => Ok(DefaultParameters::default()),
        }
    }
}

/// Load one panorama and write it to `args.out`. Returns the painted size.
pub async fn run(
    args: &Args,
    transport: ReqwestTransport,
) -> Result<Dimensions, Box<dyn std::error::Error>> {
    let defaults = args.defaults()?;
    let surface = MemorySurface::new(defaults.values().dimensions());
    let controller = RefCell::new(ViewerController::new(defaults, surface));

    for (field, value) in args.params.values() {
        controller.borrow_mut().set_param(field, value);
    }
    for kv in &args.overrides {
        let (key, value) = kv
            .split_once('=')
            .ok_or_else(|| format!("expected KEY=VALUE, got {kv:?}"))?;
        controller.borrow_mut().set_param_by_key(key.trim(), value)?;
    }

    let mode = if args.default_image {
        LoadMode::DefaultImage
    } else {
        LoadMode::Parameterized
    };
    let fetcher = PanoramaFetcher::new(args.endpoint(), transport);
    info!(endpoint = fetcher.base_url(), ?mode, "loading panorama");
    // An invalid model is reported by the load itself.
    if let Ok(snapshot) = controller.borrow().params().snapshot() {
        debug!(params = %serde_json::to_string(&snapshot)?, "resolved parameters");
    }

    let completion = drive_load(&controller, &fetcher, mode).await;
    let mut controller = controller.into_inner();
    log_events(&mut controller);

    match completion? {
        Completion::Painted => {}
        Completion::Failed => {
            return Err(match controller.last_error() {
                Some(e) => e.clone().into(),
                None => "load failed".into(),
            });
        }
        // Only one request is ever issued here.
        Completion::Stale => return Err("load was superseded".into()),
    }

    export::write_surface(controller.surface(), &args.out)?;
    let dims = controller.surface().dimensions();
    info!(out = %args.out.display(), %dims, "panorama saved");
    Ok(dims)
}

fn log_events(controller: &mut ViewerController<MemorySurface>) {
    for event in controller.drain_events() {
        let request = event.request.map(|r| r.get());
        match event.kind {
            EventKind::Issued | EventKind::Painted => {
                info!(?request, kind = event.kind.as_str(), "{}", event.message)
            }
            EventKind::Stale => debug!(?request, "{}", event.message),
            EventKind::Rejected => warn!("{}", event.message),
            EventKind::Failed => error!(?request, "{}", event.message),
        }
    }
}
